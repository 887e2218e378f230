use chrono::{DateTime, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Model {
    pub id: i64,
    pub user_id: i64,
    pub invalidated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}

impl Model {
    pub fn is_valid(&self) -> bool {
        if self.invalidated_at.is_some() {
            return false;
        }

        self.expires_at > Utc::now()
    }
}
