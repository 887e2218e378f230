use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::database::{session, trade, user};

mod postgres;

#[cfg(any(test, feature = "testkit"))]
mod memory;

pub use postgres::PgStore;

#[cfg(any(test, feature = "testkit"))]
pub use memory::MemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A referenced row does not exist, e.g. a trade naming an unknown user.
    #[error("referenced row does not exist")]
    ForeignKey,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Narrow data-access interface between the HTTP layer and the persistence
/// engine. Absent rows are `Ok(None)` / `Ok(false)`, never an error, so the
/// HTTP layer owns the not-found translation.
#[async_trait]
pub trait TradeStore: Send + Sync {
    async fn list_trades(&self) -> Result<Vec<trade::Model>, StoreError>;
    async fn create_trade(&self, new: trade::NewTrade) -> Result<trade::Model, StoreError>;
    async fn trade_by_id(&self, id: i64) -> Result<Option<trade::Model>, StoreError>;
    /// Returns whether a row was deleted.
    async fn delete_trade(&self, id: i64) -> Result<bool, StoreError>;

    async fn create_user(&self, new: user::NewUser) -> Result<user::Model, StoreError>;
    async fn user_by_username(&self, username: &str) -> Result<Option<user::Model>, StoreError>;

    async fn create_session(
        &self,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<session::Model, StoreError>;
    async fn session_by_id(&self, id: i64) -> Result<Option<session::Model>, StoreError>;
    /// Bumps the session's last_used_at.
    async fn touch_session(&self, id: i64) -> Result<(), StoreError>;
}
