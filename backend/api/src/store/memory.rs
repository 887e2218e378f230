use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::database::{session, trade, user};

use super::{StoreError, TradeStore};

/// In-memory store backing the request-level test suite. Same contract as
/// `PgStore`, no database required.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, user::Model>,
    sessions: BTreeMap<i64, session::Model>,
    trades: BTreeMap<i64, trade::Model>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[async_trait]
impl TradeStore for MemoryStore {
    async fn list_trades(&self) -> Result<Vec<trade::Model>, StoreError> {
        let tables = self.inner.lock().expect("store mutex poisoned");
        Ok(tables.trades.values().cloned().collect())
    }

    async fn create_trade(&self, new: trade::NewTrade) -> Result<trade::Model, StoreError> {
        let mut tables = self.inner.lock().expect("store mutex poisoned");

        if !tables.users.contains_key(&new.user_id) {
            return Err(StoreError::ForeignKey);
        }

        let id = tables.next_id();
        let model = trade::Model {
            id,
            name: new.name,
            description: new.description,
            image: new.image,
            location: new.location,
            price: new.price,
            duration: new.duration,
            trade_type: new.trade_type,
            user_id: new.user_id,
            removed: new.removed,
            created_at: Utc::now(),
        };

        tables.trades.insert(id, model.clone());
        Ok(model)
    }

    async fn trade_by_id(&self, id: i64) -> Result<Option<trade::Model>, StoreError> {
        let tables = self.inner.lock().expect("store mutex poisoned");
        Ok(tables.trades.get(&id).cloned())
    }

    async fn delete_trade(&self, id: i64) -> Result<bool, StoreError> {
        let mut tables = self.inner.lock().expect("store mutex poisoned");
        Ok(tables.trades.remove(&id).is_some())
    }

    async fn create_user(&self, new: user::NewUser) -> Result<user::Model, StoreError> {
        let mut tables = self.inner.lock().expect("store mutex poisoned");

        let id = tables.next_id();
        let model = user::Model {
            id,
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            created_at: Utc::now(),
            last_login_at: Utc::now(),
        };

        tables.users.insert(id, model.clone());
        Ok(model)
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<user::Model>, StoreError> {
        let tables = self.inner.lock().expect("store mutex poisoned");
        Ok(tables
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn create_session(
        &self,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<session::Model, StoreError> {
        let mut tables = self.inner.lock().expect("store mutex poisoned");

        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::ForeignKey);
        }

        let id = tables.next_id();
        let model = session::Model {
            id,
            user_id,
            invalidated_at: None,
            created_at: Utc::now(),
            expires_at,
            last_used_at: Utc::now(),
        };

        tables.sessions.insert(id, model.clone());
        Ok(model)
    }

    async fn session_by_id(&self, id: i64) -> Result<Option<session::Model>, StoreError> {
        let tables = self.inner.lock().expect("store mutex poisoned");
        Ok(tables.sessions.get(&id).cloned())
    }

    async fn touch_session(&self, id: i64) -> Result<(), StoreError> {
        let mut tables = self.inner.lock().expect("store mutex poisoned");
        if let Some(session) = tables.sessions.get_mut(&id) {
            session.last_used_at = Utc::now();
        }

        Ok(())
    }
}
