use std::sync::Arc;

use hyper::Body;
use routerify::Router;

use crate::global::GlobalState;

use super::error::RouteError;

pub mod auth;
pub mod health;
pub mod jwt;
pub mod middleware;
pub mod trades;

#[cfg(test)]
pub(crate) mod test_helpers;

pub fn routes(global: &Arc<GlobalState>) -> Router<Body, RouteError> {
    Router::builder()
        .scope("/health", health::routes(global))
        .middleware(middleware::auth::auth_middleware(global))
        .scope("/auth", auth::routes(global))
        .scope("/trades", trades::routes(global))
        .build()
        .expect("failed to build router")
}
