use sqlx::PgPool;

use crate::auth::repo_types::{Role, User};

impl User {
    /// Exact, case-sensitive username lookup.
    pub async fn find_by_username(db: &PgPool, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, full_name, role, is_active, hashed_password,
                   created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, full_name, role, is_active, hashed_password,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Insert a new user. The UNIQUE constraints on username/email back up the
    /// handler's read-then-write check; concurrent duplicates surface here as
    /// a unique violation, which the caller inspects.
    pub async fn create(
        db: &PgPool,
        username: &str,
        email: Option<&str>,
        full_name: Option<&str>,
        role: Role,
        hashed_password: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, full_name, role, hashed_password)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, email, full_name, role, is_active, hashed_password,
                      created_at, updated_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(full_name)
        .bind(role)
        .bind(hashed_password)
        .fetch_one(db)
        .await
    }
}
