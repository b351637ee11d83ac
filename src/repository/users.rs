//! User and access token methods on Repository

use chrono::{DateTime, Utc};

use super::Repository;
use crate::{
    error::AppResult,
    models::{AccessToken, User},
};

impl Repository {
    /// Get user by exact email
    pub async fn users_get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn users_get_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn users_find_many(&self, ids: &[i64]) -> AppResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let users = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    /// Create an enabled user; `password` is already hashed
    pub async fn users_create(&self, name: &str, email: &str, password: &str) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password, status)
            VALUES ($1, $2, $3, 1)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    /// Store a new token; `token_hash` is the SHA-256 hex of the secret
    pub async fn tokens_create(
        &self,
        user_id: i64,
        name: &str,
        token_hash: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> AppResult<AccessToken> {
        let token = sqlx::query_as::<_, AccessToken>(
            r#"
            INSERT INTO personal_access_tokens (user_id, name, token, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, name, token, last_used_at, expires_at, created_at
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(token)
    }

    pub async fn tokens_get_by_id(&self, id: i64) -> AppResult<Option<AccessToken>> {
        let token = sqlx::query_as::<_, AccessToken>(
            r#"
            SELECT id, user_id, name, token, last_used_at, expires_at, created_at
            FROM personal_access_tokens
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(token)
    }

    /// Record that a token authenticated a request
    pub async fn tokens_touch(&self, id: i64, now: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE personal_access_tokens SET last_used_at = $1, updated_at = $1 WHERE id = $2")
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
