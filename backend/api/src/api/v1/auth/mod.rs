use std::sync::Arc;

use chrono::{Duration, Utc};
use hyper::{Body, Request, Response, StatusCode};
use routerify::prelude::RequestExt;
use routerify::Router;

use crate::api::error::{ResultExt, RouteError};
use crate::api::macros::make_response;
use crate::api::v1::jwt::JwtState;
use crate::database::{session, user};
use crate::global::GlobalState;

// 7 days
const SESSION_VALIDITY_SECONDS: i64 = 60 * 60 * 24 * 7;

#[derive(serde::Deserialize)]
struct RegisterRequest {
    username: String,
    password: String,
    email: String,
}

#[derive(serde::Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(serde::Serialize)]
struct SessionResponse {
    token: String,
    user: user::Model,
}

async fn read_json<T: serde::de::DeserializeOwned>(req: Request<Body>) -> Result<T, RouteError> {
    let body = hyper::body::to_bytes(req.into_body())
        .await
        .extend_route((StatusCode::BAD_REQUEST, "failed to read request body"))?;

    if body.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "body has no data").into());
    }

    serde_json::from_slice(&body)
        .map_err(|e| (StatusCode::BAD_REQUEST, "body is not valid json", e).into())
}

async fn issue_session(
    global: &Arc<GlobalState>,
    user: user::Model,
) -> Result<Response<Body>, RouteError> {
    let expires_at = Utc::now() + Duration::seconds(SESSION_VALIDITY_SECONDS);

    let session = global
        .store
        .create_session(user.id, expires_at)
        .await
        .extend_route((
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to create session",
        ))?;

    let token = JwtState::from(session)
        .serialize(global)
        .ok_or("failed to serialize session token")?;

    let body = serde_json::to_value(SessionResponse { token, user })
        .extend_route("failed to serialize session response")?;

    Ok(make_response!(StatusCode::OK, body))
}

async fn register(req: Request<Body>) -> Result<Response<Body>, RouteError> {
    if req.context::<session::Model>().is_some() {
        return Err((StatusCode::BAD_REQUEST, "already logged in").into());
    }

    let global = req
        .data::<Arc<GlobalState>>()
        .expect("global state missing")
        .clone();

    let request: RegisterRequest = read_json(req).await?;

    let username = request.username.to_lowercase();
    let email = request.email.to_lowercase();

    user::validate_username(&username).map_err(|e| (StatusCode::BAD_REQUEST, e))?;
    user::validate_password(&request.password).map_err(|e| (StatusCode::BAD_REQUEST, e))?;
    user::validate_email(&email).map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    if global
        .store
        .user_by_username(&username)
        .await
        .extend_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch user"))?
        .is_some()
    {
        return Err((StatusCode::BAD_REQUEST, "username already taken").into());
    }

    let new_user = global
        .store
        .create_user(user::NewUser {
            username,
            email,
            password_hash: user::hash_password(&request.password),
        })
        .await
        .extend_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to create user"))?;

    issue_session(&global, new_user).await
}

async fn login(req: Request<Body>) -> Result<Response<Body>, RouteError> {
    if req.context::<session::Model>().is_some() {
        return Err((StatusCode::BAD_REQUEST, "already logged in").into());
    }

    let global = req
        .data::<Arc<GlobalState>>()
        .expect("global state missing")
        .clone();

    let request: LoginRequest = read_json(req).await?;

    let user = global
        .store
        .user_by_username(&request.username.to_lowercase())
        .await
        .extend_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch user"))?
        .ok_or((StatusCode::UNAUTHORIZED, "invalid username or password"))?;

    if !user.verify_password(&request.password) {
        return Err((StatusCode::UNAUTHORIZED, "invalid username or password").into());
    }

    issue_session(&global, user).await
}

pub fn routes(_global: &Arc<GlobalState>) -> Router<Body, RouteError> {
    Router::builder()
        .post("/register", register)
        .post("/login", login)
        .build()
        .expect("failed to build auth router")
}
