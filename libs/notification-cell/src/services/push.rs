// libs/notification-cell/src/services/push.rs
use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};

use shared_config::AppConfig;
use shared_models::external::{ExternalError, PushGateway};

#[derive(Debug, Deserialize)]
struct SendResponse {
    delivery_id: String,
}

/// HTTP client for the push gateway. One POST per notification; the per-call
/// timeout is baked into the underlying client so a stuck gateway cannot hold
/// a dispatcher worker past its processing budget.
pub struct PushClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl PushClient {
    pub fn new(config: &AppConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.push_send_timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: config.push_gateway_url.trim_end_matches('/').to_string(),
            api_key: config.push_gateway_api_key.clone(),
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.api_key)) {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }
}

#[async_trait]
impl PushGateway for PushClient {
    async fn send(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: HashMap<String, String>,
    ) -> Result<String, ExternalError> {
        let url = format!("{}/v1/messages", self.base_url);
        debug!("Sending push via {}", url);

        let payload = json!({
            "to": token,
            "title": title,
            "body": body,
            "data": data,
        });

        let response = self
            .client
            .post(&url)
            .headers(self.headers())
            .json(&payload)
            .send()
            .await
            .map_err(|e| ExternalError::Unavailable(format!("push gateway request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!("Push gateway error ({}): {}", status, text);
            return Err(ExternalError::Unavailable(format!(
                "push gateway returned {}: {}",
                status, text
            )));
        }

        let parsed: SendResponse = response
            .json()
            .await
            .map_err(|e| ExternalError::Unavailable(format!("malformed gateway response: {}", e)))?;

        Ok(parsed.delivery_id)
    }
}
