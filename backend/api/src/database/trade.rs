use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// A service listing offered by a user.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct Model {
    /// The unique identifier for the trade, assigned on creation.
    pub id: i64,
    /// The name of the offered service.
    pub name: String,
    /// The description of the offered service.
    pub description: String,
    /// A reference/path to the trade image.
    pub image: String,
    /// Where the service is offered.
    pub location: String,
    /// The price of the service.
    pub price: Decimal,
    /// Free-form duration, e.g. "1 hour".
    pub duration: String,
    /// Free-form category of the trade.
    pub trade_type: String,
    /// The user offering the trade.
    pub user_id: i64,
    /// Whether the trade has been taken off the listing.
    pub removed: bool,
    /// The time the trade was created.
    pub created_at: DateTime<Utc>,
}

/// Field set required to insert a new trade.
#[derive(Debug, Clone)]
pub struct NewTrade {
    pub name: String,
    pub description: String,
    pub image: String,
    pub location: String,
    pub price: Decimal,
    pub duration: String,
    pub trade_type: String,
    pub user_id: i64,
    pub removed: bool,
}
