//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/health", get(handlers::health::health))
        // Version
        .route("/version", get(handlers::version::get_version))
        .route("/version/check", post(handlers::version::check_version))
        // Dashboard identity
        .route("/analytics/identify", post(handlers::analytics::identify))
        .route("/analytics/reset", post(handlers::analytics::reset))
        // Relay diagnostics
        .route("/relay/decode", post(handlers::relay::decode_message));

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chattlin_infra::memory::MemoryKvStore;
    use chattlin_types::config::GlobalConfig;
    use chattlin_types::identity::IdentitySignal;
    use chattlin_types::version::LATEST_VERSION_KEY;
    use chattlin_core::storage::KvStore;
    use serde_json::{Value, json};

    use crate::state::AppStore;

    async fn spawn_app(config: GlobalConfig) -> (String, AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::with_store(
            config,
            dir.path().to_path_buf(),
            AppStore::Memory(MemoryKvStore::new()),
        )
        .await
        .unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = build_router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        (format!("http://{addr}/api/v1"), state, dir)
    }

    #[tokio::test]
    async fn test_health() {
        let (base, _state, _dir) = spawn_app(GlobalConfig::default()).await;
        let body: Value = reqwest::get(format!("{base}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["data"]["status"], "ok");
        assert_eq!(body["data"]["store"], "memory");
        assert_eq!(body["data"]["environment"], "development");
    }

    #[tokio::test]
    async fn test_version_status_reads_store() {
        let (base, state, _dir) = spawn_app(GlobalConfig::default()).await;
        state
            .kv_store
            .set(LATEST_VERSION_KEY, &json!("999.0.0"))
            .await
            .unwrap();

        let body: Value = reqwest::get(format!("{base}/version"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["data"]["latest"], "999.0.0");
        assert_eq!(body["data"]["update_available"], true);
    }

    #[tokio::test]
    async fn test_version_check_skips_outside_production() {
        let (base, state, _dir) = spawn_app(GlobalConfig::default()).await;
        let response = reqwest::Client::new()
            .post(format!("{base}/version/check"))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["data"]["outcome"], "skipped");
        assert_eq!(body["data"]["reason"], "non_production");
        assert!(state.kv_store.get(LATEST_VERSION_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_identify_publishes_signal() {
        let (base, state, _dir) = spawn_app(GlobalConfig::default()).await;
        let mut receiver = state.identity.subscribe();

        let body: Value = reqwest::Client::new()
            .post(format!("{base}/analytics/identify"))
            .json(&json!({"id": "42", "name": "Ada", "email": "ada@example.com"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["data"]["delivered_to"], 1);

        match receiver.recv().await.unwrap() {
            IdentitySignal::Identify { user } => assert_eq!(user.email, "ada@example.com"),
            other => panic!("unexpected signal: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_identify_rejects_blank_id() {
        let (base, _state, _dir) = spawn_app(GlobalConfig::default()).await;
        let response = reqwest::Client::new()
            .post(format!("{base}/analytics/identify"))
            .json(&json!({"id": " ", "name": "Ada", "email": "ada@example.com"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["errors"][0]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_reset_without_subscribers() {
        let (base, _state, _dir) = spawn_app(GlobalConfig::default()).await;
        let body: Value = reqwest::Client::new()
            .post(format!("{base}/analytics/reset"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["data"]["signal"], "reset");
        assert_eq!(body["data"]["delivered_to"], 0);
    }

    #[tokio::test]
    async fn test_relay_decode() {
        let (base, _state, _dir) = spawn_app(GlobalConfig::default()).await;
        let client = reqwest::Client::new();

        let body: Value = client
            .post(format!("{base}/relay/decode"))
            .json(&json!({"data": "chattlin-widget:{\"event\":\"closeChat\"}"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["data"]["dispatchable"], true);
        assert_eq!(body["data"]["event"], "closeChat");

        let body: Value = client
            .post(format!("{base}/relay/decode"))
            .json(&json!({"data": {"not": "text"}}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["data"]["dispatchable"], false);
        assert_eq!(body["data"]["ignored"]["reason"], "not_text");
    }
}
