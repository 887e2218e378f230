use std::sync::Arc;

use hyper::http::header;
use hyper::{Body, StatusCode};
use routerify::{prelude::RequestExt, Middleware};

use crate::api::error::{ResultExt, RouteError};
use crate::api::v1::jwt::JwtState;
use crate::global::GlobalState;

/// Resolves an optional `Authorization: Bearer` token to a session and
/// attaches it to the request context. Requests without a token pass through
/// untouched; a bad token is rejected rather than silently ignored.
pub fn auth_middleware(_global: &Arc<GlobalState>) -> Middleware<Body, RouteError> {
    Middleware::pre(|req| async move {
        let Some(token) = req.headers().get(header::AUTHORIZATION) else {
            return Ok(req);
        };

        let global = req
            .data::<Arc<GlobalState>>()
            .expect("global state missing")
            .clone();

        let token = token
            .to_str()
            .map_err(|e| (StatusCode::UNAUTHORIZED, "invalid authentication token", e))?;

        // Token's will start with "Bearer " so we need to remove that
        let Some(token) = token.strip_prefix("Bearer ") else {
            return Err(RouteError::from((
                StatusCode::UNAUTHORIZED,
                "invalid authentication token",
            )));
        };

        let jwt = JwtState::verify(&global, token)
            .ok_or((StatusCode::UNAUTHORIZED, "invalid authentication token"))?;

        let session = global
            .store
            .session_by_id(jwt.session_id)
            .await
            .extend_route((
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to fetch session",
            ))?
            .ok_or((StatusCode::UNAUTHORIZED, "invalid authentication token"))?;

        if !session.is_valid() {
            return Err(RouteError::from((
                StatusCode::UNAUTHORIZED,
                "session token has been invalidated",
            )));
        }

        global.store.touch_session(session.id).await.extend_route((
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to update session",
        ))?;

        req.set_context(session);

        Ok(req)
    })
}
