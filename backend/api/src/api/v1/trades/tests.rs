use hyper::{Body, Request, StatusCode};
use serde_json::{json, Value};

use crate::api::v1::test_helpers::{spawn_api, TestApi};
use crate::database::trade;
use crate::store::TradeStore;

fn house_drilling(user_id: i64) -> Value {
    json!({
        "trade": {
            "name": "House Drilling",
            "description": "Description of the trade",
            "image": "image.jpg",
            "location": "Trade Location",
            "price": "100.0",
            "duration": "1 hour",
            "trade_type": "Type of Trade",
            "user_id": user_id,
            "removed": false
        }
    })
}

async fn seed_trade(api: &TestApi, user_id: i64, name: &str) -> trade::Model {
    api.store
        .create_trade(trade::NewTrade {
            name: name.to_string(),
            description: "Description of the trade".to_string(),
            image: "image.jpg".to_string(),
            location: "Trade Location".to_string(),
            price: "100.0".parse().unwrap(),
            duration: "1 hour".to_string(),
            trade_type: "Type of Trade".to_string(),
            user_id,
            removed: false,
        })
        .await
        .expect("failed to seed trade")
}

async fn read_json(resp: hyper::Response<Body>) -> Value {
    let body = hyper::body::to_bytes(resp.into_body()).await.unwrap();
    serde_json::from_slice(&body).expect("response body is not valid json")
}

#[tokio::test]
async fn test_list_trades() {
    let api = spawn_api().await;
    let user = api.seed_user("lister").await;

    for i in 0..5 {
        seed_trade(&api, user.id, &format!("Trade {}", i)).await;
    }

    let resp = api.client.get(api.uri("/api/v1/trades")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/json; charset=utf-8"
    );

    let trades = read_json(resp).await;
    let trades = trades.as_array().expect("expected a json array");
    assert_eq!(trades.len(), 5);

    api.shutdown().await;
}

#[tokio::test]
async fn test_list_trades_empty() {
    let api = spawn_api().await;

    let resp = api.client.get(api.uri("/api/v1/trades")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let trades = read_json(resp).await;
    assert_eq!(trades.as_array().expect("expected a json array").len(), 0);

    api.shutdown().await;
}

#[tokio::test]
async fn test_create_trade() {
    let api = spawn_api().await;
    let user = api.seed_user("driller").await;
    let token = api.sign_in(&user).await;

    let req = Request::builder()
        .method("POST")
        .uri(api.uri("/api/v1/trades"))
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(house_drilling(user.id).to_string()))
        .unwrap();

    let resp = api.client.request(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/json; charset=utf-8"
    );

    let trade = read_json(resp).await;
    assert!(trade.is_object());
    assert_eq!(trade["name"], "House Drilling");
    assert_eq!(trade["description"], "Description of the trade");
    assert_eq!(trade["image"], "image.jpg");
    assert_eq!(trade["location"], "Trade Location");
    assert_eq!(trade["price"], "100.0");
    assert_eq!(trade["duration"], "1 hour");
    assert_eq!(trade["trade_type"], "Type of Trade");
    assert_eq!(trade["user_id"], user.id);
    assert_eq!(trade["removed"], false);
    assert!(trade["id"].is_i64());

    api.shutdown().await;
}

#[tokio::test]
async fn test_create_trade_without_token() {
    // None of the trade operations require a caller identity.
    let api = spawn_api().await;
    let user = api.seed_user("driller").await;

    let req = Request::builder()
        .method("POST")
        .uri(api.uri("/api/v1/trades"))
        .body(Body::from(house_drilling(user.id).to_string()))
        .unwrap();

    let resp = api.client.request(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    api.shutdown().await;
}

#[tokio::test]
async fn test_create_trade_empty_body() {
    let api = spawn_api().await;

    let req = Request::builder()
        .method("POST")
        .uri(api.uri("/api/v1/trades"))
        .body(Body::empty())
        .unwrap();

    let resp = api.client.request(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = read_json(resp).await;
    assert_eq!(body["message"], "body has no data");

    api.shutdown().await;
}

#[tokio::test]
async fn test_create_trade_invalid_json() {
    let api = spawn_api().await;

    let req = Request::builder()
        .method("POST")
        .uri(api.uri("/api/v1/trades"))
        .body(Body::from("abc"))
        .unwrap();

    let resp = api.client.request(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = read_json(resp).await;
    assert_eq!(body["message"], "body is not valid json");

    api.shutdown().await;
}

#[tokio::test]
async fn test_create_trade_invalid_price() {
    let api = spawn_api().await;
    let user = api.seed_user("driller").await;

    let mut payload = house_drilling(user.id);
    payload["trade"]["price"] = json!("one hundred");

    let req = Request::builder()
        .method("POST")
        .uri(api.uri("/api/v1/trades"))
        .body(Body::from(payload.to_string()))
        .unwrap();

    let resp = api.client.request(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = read_json(resp).await;
    assert_eq!(body["message"], "price is not a valid decimal");

    api.shutdown().await;
}

#[tokio::test]
async fn test_create_trade_unknown_user() {
    let api = spawn_api().await;

    let req = Request::builder()
        .method("POST")
        .uri(api.uri("/api/v1/trades"))
        .body(Body::from(house_drilling(999).to_string()))
        .unwrap();

    let resp = api.client.request(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = read_json(resp).await;
    assert_eq!(body["message"], "user_id does not reference an existing user");

    api.shutdown().await;
}

#[tokio::test]
async fn test_get_trade() {
    let api = spawn_api().await;
    let user = api.seed_user("driller").await;
    let trade = seed_trade(&api, user.id, "House Drilling").await;

    let resp = api
        .client
        .get(api.uri(&format!("/api/v1/trades/{}", trade.id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/json; charset=utf-8"
    );

    let body = read_json(resp).await;
    assert!(body.is_object());
    assert_eq!(body["id"], trade.id);

    api.shutdown().await;
}

#[tokio::test]
async fn test_get_missing_trade() {
    let api = spawn_api().await;

    let resp = api.client.get(api.uri("/api/v1/trades/999")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/json; charset=utf-8"
    );

    let body = read_json(resp).await;
    assert!(body.is_object());
    assert_eq!(body["message"], "no trade found with the requested id");

    api.shutdown().await;
}

#[tokio::test]
async fn test_get_trade_invalid_id() {
    let api = spawn_api().await;

    let resp = api
        .client
        .get(api.uri("/api/v1/trades/not-a-number"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = read_json(resp).await;
    assert_eq!(body["message"], "trade id must be an integer");

    api.shutdown().await;
}

#[tokio::test]
async fn test_delete_trade() {
    let api = spawn_api().await;
    let user = api.seed_user("driller").await;
    let trade = seed_trade(&api, user.id, "House Drilling").await;

    let req = Request::builder()
        .method("DELETE")
        .uri(api.uri(&format!("/api/v1/trades/{}", trade.id)))
        .body(Body::empty())
        .unwrap();

    let resp = api.client.request(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let body = hyper::body::to_bytes(resp.into_body()).await.unwrap();
    assert!(body.is_empty());

    // The trade should no longer exist in the store
    assert!(api.store.trade_by_id(trade.id).await.unwrap().is_none());

    let resp = api
        .client
        .get(api.uri(&format!("/api/v1/trades/{}", trade.id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    api.shutdown().await;
}

#[tokio::test]
async fn test_delete_missing_trade() {
    // Deleting a missing id gets the same not-found translation as a fetch;
    // the raw lookup failure is never allowed to escape the request cycle.
    let api = spawn_api().await;

    let req = Request::builder()
        .method("DELETE")
        .uri(api.uri("/api/v1/trades/999"))
        .body(Body::empty())
        .unwrap();

    let resp = api.client.request(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body = read_json(resp).await;
    assert_eq!(body["message"], "no trade found with the requested id");

    api.shutdown().await;
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let api = spawn_api().await;

    let req = Request::builder()
        .method("GET")
        .uri(api.uri("/api/v1/trades"))
        .header("authorization", "Bearer garbage")
        .body(Body::empty())
        .unwrap();

    let resp = api.client.request(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body = read_json(resp).await;
    assert_eq!(body["message"], "invalid authentication token");

    api.shutdown().await;
}
