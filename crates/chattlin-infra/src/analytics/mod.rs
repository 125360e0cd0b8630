//! Product analytics identity sink.
//!
//! Sends `$identify` captures to a PostHog-compatible API so product events
//! from the dashboard are attributed to the signed-in user. The API key is
//! wrapped in [`SecretString`] and never logged.

use std::sync::Mutex;
use std::time::Duration;

use chattlin_core::analytics::IdentitySink;
use chattlin_types::config::AnalyticsConfig;
use chattlin_types::error::AnalyticsError;
use chattlin_types::identity::DashboardUser;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

pub struct ProductAnalyticsSink {
    client: reqwest::Client,
    api_host: String,
    api_key: SecretString,
    distinct_id: Mutex<Option<String>>,
}

impl ProductAnalyticsSink {
    pub fn new(api_host: &str, api_key: SecretString) -> Result<Self, AnalyticsError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AnalyticsError::Request(e.to_string()))?;
        Ok(Self {
            client,
            api_host: api_host.trim_end_matches('/').to_string(),
            api_key,
            distinct_id: Mutex::new(None),
        })
    }

    /// Build a sink when analytics is configured; `Ok(None)` otherwise.
    pub fn from_config(config: &AnalyticsConfig) -> Result<Option<Self>, AnalyticsError> {
        match config.api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => Self::new(&config.api_host, SecretString::from(key.to_string())).map(Some),
            None => Ok(None),
        }
    }

    /// The user currently identified, if any.
    pub fn distinct_id(&self) -> Option<String> {
        self.distinct_id
            .lock()
            .map(|id| id.clone())
            .unwrap_or_default()
    }

    fn capture_url(&self) -> String {
        format!("{}/capture/", self.api_host)
    }

    fn set_distinct_id(&self, id: Option<String>) {
        if let Ok(mut current) = self.distinct_id.lock() {
            *current = id;
        }
    }
}

impl IdentitySink for ProductAnalyticsSink {
    fn name(&self) -> &str {
        "product_analytics"
    }

    async fn identify(&self, user: &DashboardUser) -> Result<(), AnalyticsError> {
        let payload = json!({
            "api_key": self.api_key.expose_secret(),
            "event": "$identify",
            "distinct_id": user.id,
            "properties": {
                "$set": {
                    "name": user.name,
                    "email": user.email,
                },
            },
        });

        let response = self
            .client
            .post(self.capture_url())
            .json(&payload)
            .send()
            .await
            .map_err(|e| AnalyticsError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalyticsError::Status(status.as_u16()));
        }

        self.set_distinct_id(Some(user.id.clone()));
        tracing::debug!(distinct_id = %user.id, "analytics identify sent");
        Ok(())
    }

    async fn reset(&self) -> Result<(), AnalyticsError> {
        self.set_distinct_id(None);
        tracing::debug!("analytics identity reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use axum::http::StatusCode;
    use axum::routing::post;
    use std::sync::Arc;

    async fn serve(router: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{addr}")
    }

    fn user() -> DashboardUser {
        DashboardUser {
            id: "42".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            avatar_url: None,
            hmac_identifier: None,
            created_at: None,
        }
    }

    #[test]
    fn from_config_requires_key() {
        let mut config = AnalyticsConfig::default();
        assert!(ProductAnalyticsSink::from_config(&config).unwrap().is_none());

        config.api_key = Some(String::new());
        assert!(ProductAnalyticsSink::from_config(&config).unwrap().is_none());

        config.api_key = Some("phc_test".to_string());
        assert!(ProductAnalyticsSink::from_config(&config).unwrap().is_some());
    }

    #[tokio::test]
    async fn identify_posts_capture_and_reset_clears() {
        let received = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink_log = received.clone();
        let router = axum::Router::new().route(
            "/capture/",
            post(move |Json(body): Json<serde_json::Value>| {
                let sink_log = sink_log.clone();
                async move {
                    sink_log.lock().unwrap().push(body);
                    Json(serde_json::json!({"status": 1}))
                }
            }),
        );
        let host = serve(router).await;
        let sink = ProductAnalyticsSink::new(&host, SecretString::from("phc_test".to_string()))
            .unwrap();

        sink.identify(&user()).await.unwrap();
        assert_eq!(sink.distinct_id().as_deref(), Some("42"));

        let bodies = received.lock().unwrap().clone();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["event"], "$identify");
        assert_eq!(bodies[0]["distinct_id"], "42");
        assert_eq!(bodies[0]["api_key"], "phc_test");
        assert_eq!(bodies[0]["properties"]["$set"]["email"], "ada@example.com");

        sink.reset().await.unwrap();
        assert!(sink.distinct_id().is_none());
        assert_eq!(received.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn identify_reports_error_status() {
        let router = axum::Router::new().route(
            "/capture/",
            post(|| async { StatusCode::UNAUTHORIZED }),
        );
        let host = serve(router).await;
        let sink = ProductAnalyticsSink::new(&host, SecretString::from("bad".to_string()))
            .unwrap();

        assert!(matches!(
            sink.identify(&user()).await,
            Err(AnalyticsError::Status(401))
        ));
        assert!(sink.distinct_id().is_none());
    }
}
