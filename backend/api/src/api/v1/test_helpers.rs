use std::sync::Arc;
use std::time::Duration;

use common::context::Context;
use common::logging;
use hyper::client::HttpConnector;
use hyper::Client;

use crate::api;
use crate::api::v1::jwt::JwtState;
use crate::config::AppConfig;
use crate::database::user;
use crate::global::GlobalState;
use crate::store::{MemoryStore, TradeStore};

pub struct TestApi {
    pub base: String,
    pub client: Client<HttpConnector>,
    pub store: Arc<MemoryStore>,
    pub global: Arc<GlobalState>,
    handler: common::context::Handler,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

/// Spawns the API on a free local port, backed by an in-memory store.
pub async fn spawn_api() -> TestApi {
    // We need to initalize logging
    logging::init("api=debug").expect("failed to initialize logging");

    let port = portpicker::pick_unused_port().expect("no free ports");
    let (ctx, handler) = Context::new();

    let store = Arc::new(MemoryStore::default());

    let global = Arc::new(GlobalState::new(
        AppConfig {
            bind_address: format!("127.0.0.1:{}", port),
            log_level: "api=debug".to_string(),
            ..Default::default()
        },
        store.clone(),
        ctx,
    ));

    let handle = tokio::spawn(api::run(global.clone()));

    // We need to wait for the server to start
    tokio::time::sleep(Duration::from_millis(200)).await;

    TestApi {
        base: format!("http://127.0.0.1:{}", port),
        client: Client::new(),
        store,
        global,
        handler,
        handle,
    }
}

impl TestApi {
    pub fn uri(&self, path: &str) -> hyper::Uri {
        format!("{}{}", self.base, path).parse().expect("invalid uri")
    }

    pub async fn seed_user(&self, username: &str) -> user::Model {
        self.store
            .create_user(user::NewUser {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password_hash: user::hash_password("Password1"),
            })
            .await
            .expect("failed to seed user")
    }

    pub async fn sign_in(&self, user: &user::Model) -> String {
        let session = self
            .store
            .create_session(user.id, chrono::Utc::now() + chrono::Duration::days(7))
            .await
            .expect("failed to create session");

        JwtState::from(session)
            .serialize(&self.global)
            .expect("failed to serialize session token")
    }

    pub async fn shutdown(self) {
        // The client uses Keep-Alive, so we need to drop it to release the global context
        drop(self.client);
        drop(self.global);
        drop(self.store);

        tokio::time::timeout(Duration::from_secs(1), self.handler.cancel())
            .await
            .expect("failed to cancel context");
        tokio::time::timeout(Duration::from_secs(1), self.handle)
            .await
            .expect("failed to cancel api")
            .expect("api failed")
            .expect("api failed");
    }
}
