use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{instrument, warn};

use crate::relay::dto::{FoodAnalysis, ImageAnalysis};
use crate::relay::error::RelayError;
use crate::relay::gateway::ChatGateway;
use crate::relay::parse::validate;
use crate::relay::services;

/// Anything that turns a food name or a photo into a validated estimate.
#[async_trait]
pub trait FoodAnalyzer: Send + Sync {
    async fn analyze_food(&self, food_name: &str) -> Result<FoodAnalysis, RelayError>;
    async fn analyze_image(&self, image: &str) -> Result<ImageAnalysis, RelayError>;
}

/// Calls a remote relay deployment over HTTP.
pub struct RelayClient {
    client: reqwest::Client,
    base_url: String,
}

impl RelayClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T, RelayError> {
        let resp = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(&body)
            .send()
            .await?;
        let status = resp.status().as_u16();
        let text = resp.text().await?;
        interpret_response(status, &text)
    }
}

#[async_trait]
impl FoodAnalyzer for RelayClient {
    #[instrument(skip(self))]
    async fn analyze_food(&self, food_name: &str) -> Result<FoodAnalysis, RelayError> {
        let food: FoodAnalysis = self
            .post("/analyze-food", json!({ "foodName": food_name }))
            .await?;
        validate(&food).map_err(|e| RelayError::Malformed(e.to_string()))?;
        Ok(food)
    }

    #[instrument(skip(self, image))]
    async fn analyze_image(&self, image: &str) -> Result<ImageAnalysis, RelayError> {
        let analysis: ImageAnalysis = self
            .post("/analyze-food-image", json!({ "imageBase64": image }))
            .await?;
        validate(&analysis.food).map_err(|e| RelayError::Malformed(e.to_string()))?;
        Ok(analysis)
    }
}

/// In-process relay: same behaviour as the HTTP endpoints without the hop.
pub struct LocalRelay {
    gateway: Arc<dyn ChatGateway>,
}

impl LocalRelay {
    pub fn new(gateway: Arc<dyn ChatGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl FoodAnalyzer for LocalRelay {
    async fn analyze_food(&self, food_name: &str) -> Result<FoodAnalysis, RelayError> {
        services::analyze_food(self.gateway.as_ref(), food_name).await
    }

    async fn analyze_image(&self, image: &str) -> Result<ImageAnalysis, RelayError> {
        services::analyze_food_image(self.gateway.as_ref(), image).await
    }
}

/// Non-2xx and `{"error": ...}` bodies both become [`RelayError::Rejected`]
/// with a non-empty message.
pub fn interpret_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, RelayError> {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let error_field = parsed
        .as_ref()
        .and_then(|v| v.get("error"))
        .map(|e| match e {
            Value::String(s) => s.trim().to_string(),
            other => other.to_string(),
        });

    let ok = (200..300).contains(&status);
    if !ok || error_field.is_some() {
        let message = error_field
            .filter(|m| !m.is_empty())
            .or_else(|| {
                let raw = body.trim();
                (!ok && parsed.is_none() && !raw.is_empty()).then(|| raw.to_string())
            })
            .unwrap_or_else(|| format!("relay request failed with status {}", status));
        warn!(status, message = %message, "relay rejected request");
        return Err(RelayError::Rejected { status, message });
    }

    let value = parsed.ok_or_else(|| RelayError::Malformed("body is not JSON".into()))?;
    serde_json::from_value(value).map_err(|e| RelayError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_success_status_is_rejected_with_message() {
        let err = interpret_response::<FoodAnalysis>(
            429,
            r#"{"error":"Rate limit exceeded. Please try again in a moment."}"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            RelayError::Rejected {
                status: 429,
                message: "Rate limit exceeded. Please try again in a moment.".into()
            }
        );
    }

    #[test]
    fn empty_failure_body_still_has_message() {
        let err = interpret_response::<FoodAnalysis>(500, "").unwrap_err();
        assert!(!err.to_string().is_empty());
        assert_eq!(err.to_string(), "relay request failed with status 500");

        let err = interpret_response::<FoodAnalysis>(502, "Bad Gateway").unwrap_err();
        assert_eq!(err.to_string(), "Bad Gateway");

        let err = interpret_response::<FoodAnalysis>(500, r#"{"error":""}"#).unwrap_err();
        assert_eq!(err.to_string(), "relay request failed with status 500");
    }

    #[test]
    fn error_field_on_success_status_is_rejected() {
        let err = interpret_response::<FoodAnalysis>(200, r#"{"error":"oops"}"#).unwrap_err();
        assert_eq!(err, RelayError::Rejected { status: 200, message: "oops".into() });
    }

    #[test]
    fn success_body_parses() {
        let food: FoodAnalysis = interpret_response(
            200,
            r#"{"name":"Apple","calories":95,"protein":0.5,"carbs":25,"fat":0.3}"#,
        )
        .unwrap();
        assert_eq!(food.name, "Apple");
    }

    #[test]
    fn malformed_success_body() {
        assert!(matches!(
            interpret_response::<FoodAnalysis>(200, "<html>"),
            Err(RelayError::Malformed(_))
        ));
        assert!(matches!(
            interpret_response::<FoodAnalysis>(200, r#"{"name":"Apple"}"#),
            Err(RelayError::Malformed(_))
        ));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = RelayClient::new("http://relay.local/api/v1/", 5).unwrap();
        assert_eq!(client.base_url, "http://relay.local/api/v1");
    }

    async fn spawn(app: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn round_trip_through_served_relay() {
        use crate::relay::gateway::scripted::ScriptedGateway;
        use crate::state::AppState;

        let gateway = ScriptedGateway::replying(vec![
            Ok(r#"{"name":"Apple","calories":95,"protein":0.5,"carbs":25,"fat":0.3}"#.into()),
            Err(RelayError::RateLimited),
            Ok(r#"{"name":"Salad","calories":150,"protein":4,"carbs":10,"fat":9,"confidence":"high"}"#
                .into()),
        ]);
        let app = crate::app::build_app(AppState::fake_with_gateway(Arc::new(gateway)));
        let base = spawn(app).await;
        let client = RelayClient::new(&format!("{}/api/v1/", base), 5).unwrap();

        let food = client.analyze_food("apple").await.unwrap();
        assert_eq!(food.name, "Apple");
        assert_eq!(food.calories, 95.0);

        let err = client.analyze_food("apple").await.unwrap_err();
        assert_eq!(
            err,
            RelayError::Rejected {
                status: 429,
                message: "Rate limit exceeded. Please try again in a moment.".into()
            }
        );

        let analysis = client.analyze_image("AAAA").await.unwrap();
        assert_eq!(analysis.food.name, "Salad");
        assert_eq!(analysis.confidence, crate::relay::dto::Confidence::High);
    }

    #[tokio::test]
    async fn served_record_that_fails_validation_is_malformed() {
        use axum::{routing::post, Json};

        let app = axum::Router::new().route(
            "/analyze-food",
            post(|| async {
                Json(json!({"name":"","calories":1,"protein":1,"carbs":1,"fat":1}))
            }),
        );
        let client = RelayClient::new(&spawn(app).await, 5).unwrap();
        assert!(matches!(
            client.analyze_food("anything").await,
            Err(RelayError::Malformed(_))
        ));
    }
}
