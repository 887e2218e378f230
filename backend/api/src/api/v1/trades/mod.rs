use std::sync::Arc;

use hyper::{Body, Request, Response, StatusCode};
use routerify::prelude::RequestExt;
use routerify::Router;
use rust_decimal::Decimal;

use crate::api::error::{ResultExt, RouteError};
use crate::api::macros::make_response;
use crate::database::trade;
use crate::global::GlobalState;
use crate::store::StoreError;

#[derive(serde::Deserialize)]
struct CreateTradeRequest {
    trade: TradeParams,
}

/// Field set accepted under the `trade` namespace on create. The price
/// arrives as a decimal-formatted string and is parsed explicitly.
#[derive(serde::Deserialize)]
struct TradeParams {
    name: String,
    description: String,
    image: String,
    location: String,
    price: String,
    duration: String,
    trade_type: String,
    user_id: i64,
    #[serde(default)]
    removed: bool,
}

fn parse_id(req: &Request<Body>) -> Result<i64, RouteError> {
    req.param("id")
        .expect("route param missing")
        .parse()
        .map_err(|e| (StatusCode::BAD_REQUEST, "trade id must be an integer", e).into())
}

async fn list_trades(req: Request<Body>) -> Result<Response<Body>, RouteError> {
    let global = req.data::<Arc<GlobalState>>().expect("global state missing");

    let trades = global
        .store
        .list_trades()
        .await
        .extend_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to list trades"))?;

    let body = serde_json::to_value(&trades).extend_route("failed to serialize trades")?;

    Ok(make_response!(StatusCode::OK, body))
}

async fn create_trade(req: Request<Body>) -> Result<Response<Body>, RouteError> {
    let global = req
        .data::<Arc<GlobalState>>()
        .expect("global state missing")
        .clone();

    let body = hyper::body::to_bytes(req.into_body())
        .await
        .extend_route((StatusCode::BAD_REQUEST, "failed to read request body"))?;

    if body.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "body has no data").into());
    }

    let request: CreateTradeRequest = serde_json::from_slice(&body)
        .map_err(|e| (StatusCode::BAD_REQUEST, "body is not valid json", e))?;

    let params = request.trade;

    let price: Decimal = params.price.trim().parse().map_err(|e| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            "price is not a valid decimal",
            e,
        )
    })?;

    let new = trade::NewTrade {
        name: params.name,
        description: params.description,
        image: params.image,
        location: params.location,
        price,
        duration: params.duration,
        trade_type: params.trade_type,
        user_id: params.user_id,
        removed: params.removed,
    };

    let created = match global.store.create_trade(new).await {
        Ok(created) => created,
        Err(StoreError::ForeignKey) => {
            return Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                "user_id does not reference an existing user",
            )
                .into())
        }
        Err(err) => {
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to create trade",
                err,
            )
                .into())
        }
    };

    let body = serde_json::to_value(&created).extend_route("failed to serialize trade")?;

    Ok(make_response!(StatusCode::CREATED, body))
}

async fn get_trade(req: Request<Body>) -> Result<Response<Body>, RouteError> {
    let id = parse_id(&req)?;
    let global = req.data::<Arc<GlobalState>>().expect("global state missing");

    let trade = global
        .store
        .trade_by_id(id)
        .await
        .extend_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch trade"))?
        .ok_or((StatusCode::NOT_FOUND, "no trade found with the requested id"))?;

    let body = serde_json::to_value(&trade).extend_route("failed to serialize trade")?;

    Ok(make_response!(StatusCode::OK, body))
}

async fn delete_trade(req: Request<Body>) -> Result<Response<Body>, RouteError> {
    let id = parse_id(&req)?;
    let global = req.data::<Arc<GlobalState>>().expect("global state missing");

    let deleted = global
        .store
        .delete_trade(id)
        .await
        .extend_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to delete trade"))?;

    // A missing row gets the same not-found translation as a fetch instead of
    // escaping the request cycle as a raw lookup failure.
    if !deleted {
        return Err((StatusCode::NOT_FOUND, "no trade found with the requested id").into());
    }

    Ok(Response::builder()
        .status(StatusCode::NO_CONTENT)
        .body(Body::empty())
        .extend_route("failed to build response")?)
}

pub fn routes(_global: &Arc<GlobalState>) -> Router<Body, RouteError> {
    Router::builder()
        .get("/", list_trades)
        .post("/", create_trade)
        .get("/:id", get_trade)
        .delete("/:id", delete_trade)
        .build()
        .expect("failed to build trades router")
}

#[cfg(test)]
mod tests;
