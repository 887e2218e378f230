use std::sync::Arc;

use common::context::Context;

use crate::config::AppConfig;
use crate::store::TradeStore;

pub struct GlobalState {
    pub config: AppConfig,
    pub store: Arc<dyn TradeStore>,
    pub ctx: Context,
}

impl GlobalState {
    pub fn new(config: AppConfig, store: Arc<dyn TradeStore>, ctx: Context) -> Self {
        Self { config, store, ctx }
    }
}
