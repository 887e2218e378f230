use std::{net::SocketAddr, sync::Arc};

use anyhow::{anyhow, Result};
use hyper::{Body, Response, Server, StatusCode};
use routerify::{Router, RouterService};
use serde_json::json;

use crate::global::GlobalState;

use self::error::{RouteError, ShouldLog};
use self::macros::make_response;

pub mod error;
pub mod macros;
pub mod v1;

async fn error_handler(err: routerify::RouteError) -> Response<Body> {
    let route_error = match err.downcast::<RouteError>() {
        Ok(err) => *err,
        Err(err) => {
            tracing::error!("unhandled route error: {:?}", err);
            return make_response!(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "message": "internal server error" })
            );
        }
    };

    match route_error.should_log() {
        ShouldLog::Yes => route_error.span().in_scope(|| {
            tracing::error!(location = %route_error.location(), error = ?route_error, "request failed");
        }),
        ShouldLog::Debug => route_error.span().in_scope(|| {
            tracing::debug!(location = %route_error.location(), error = ?route_error, "request failed");
        }),
        ShouldLog::No => {}
    }

    route_error.response()
}

pub fn routes(global: &Arc<GlobalState>) -> Router<Body, RouteError> {
    Router::builder()
        .data(global.clone())
        .scope("/api/v1", v1::routes(global))
        .err_handler(error_handler)
        .build()
        .expect("failed to build router")
}

pub async fn run(global: Arc<GlobalState>) -> Result<()> {
    let addr: SocketAddr = global.config.bind_address.parse()?;

    tracing::info!("listening on {}", addr);

    let service = RouterService::new(routes(&global))
        .map_err(|err| anyhow!("failed to build router service: {}", err))?;

    let ctx = global.ctx.clone();
    drop(global);

    let server = Server::try_bind(&addr)?.serve(service);

    server
        .with_graceful_shutdown(async move {
            ctx.done().await;
        })
        .await?;

    Ok(())
}
