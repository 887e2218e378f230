use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::database::{session, trade, user};

use super::{StoreError, TradeStore};

pub struct PgStore {
    db: sqlx::PgPool,
}

impl PgStore {
    pub fn new(db: sqlx::PgPool) -> Self {
        Self { db }
    }
}

// Postgres error code for foreign_key_violation.
const FOREIGN_KEY_VIOLATION: &str = "23503";

fn map_insert_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) {
            return StoreError::ForeignKey;
        }
    }

    StoreError::Database(err)
}

#[async_trait]
impl TradeStore for PgStore {
    async fn list_trades(&self) -> Result<Vec<trade::Model>, StoreError> {
        Ok(
            sqlx::query_as::<_, trade::Model>("SELECT * FROM trades ORDER BY id")
                .fetch_all(&self.db)
                .await?,
        )
    }

    async fn create_trade(&self, new: trade::NewTrade) -> Result<trade::Model, StoreError> {
        sqlx::query_as::<_, trade::Model>(
            "INSERT INTO trades (name, description, image, location, price, duration, trade_type, user_id, removed) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(new.name)
        .bind(new.description)
        .bind(new.image)
        .bind(new.location)
        .bind(new.price)
        .bind(new.duration)
        .bind(new.trade_type)
        .bind(new.user_id)
        .bind(new.removed)
        .fetch_one(&self.db)
        .await
        .map_err(map_insert_error)
    }

    async fn trade_by_id(&self, id: i64) -> Result<Option<trade::Model>, StoreError> {
        Ok(
            sqlx::query_as::<_, trade::Model>("SELECT * FROM trades WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db)
                .await?,
        )
    }

    async fn delete_trade(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM trades WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_user(&self, new: user::NewUser) -> Result<user::Model, StoreError> {
        sqlx::query_as::<_, user::Model>(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(new.username)
        .bind(new.email)
        .bind(new.password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(map_insert_error)
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<user::Model>, StoreError> {
        Ok(
            sqlx::query_as::<_, user::Model>("SELECT * FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.db)
                .await?,
        )
    }

    async fn create_session(
        &self,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<session::Model, StoreError> {
        sqlx::query_as::<_, session::Model>(
            "INSERT INTO sessions (user_id, expires_at) VALUES ($1, $2) RETURNING *",
        )
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(&self.db)
        .await
        .map_err(map_insert_error)
    }

    async fn session_by_id(&self, id: i64) -> Result<Option<session::Model>, StoreError> {
        Ok(
            sqlx::query_as::<_, session::Model>("SELECT * FROM sessions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db)
                .await?,
        )
    }

    async fn touch_session(&self, id: i64) -> Result<(), StoreError> {
        sqlx::query("UPDATE sessions SET last_used_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}
