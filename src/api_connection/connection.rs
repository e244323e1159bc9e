use dotenv::dotenv;
use reqwest::Client;
use serde_json::{json, Value};
use std::env;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::endpoints::{
    ChatCompletionRequest, ChatCompletionResponse, Provider, OPENROUTER_CHAT_URL, OPENROUTER_MODELS,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ApiConnectionError {
    #[error("API key not found in environment: {0}")]
    MissingApiKey(String),
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("API error {status}: {error_body}")]
    ApiError {
        status: reqwest::StatusCode,
        error_body: String,
    },
}

impl Provider {
    pub fn openrouter(api_key_env_var_name: &str) -> Self {
        dotenv().ok();
        Self::OpenRouter {
            api_key: api_key_env_var_name.to_string(),
            available_models: OPENROUTER_MODELS.to_vec(),
        }
    }

    /// Serializes the request and pins the upstream provider when the model is one we know.
    /// Unknown models are left to OpenRouter's default routing.
    pub fn build_request_payload(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<Value, ApiConnectionError> {
        let mut payload = serde_json::to_value(request)?;
        match self {
            Provider::OpenRouter {
                available_models, ..
            } => {
                let pinned = available_models
                    .iter()
                    .find(|m| m.model_name == request.model)
                    .map(|m| m.model_source);
                if let (Some(source), Some(obj)) = (pinned, payload.as_object_mut()) {
                    obj.insert("provider".to_string(), json!({ "only": [source] }));
                }
            }
        }
        Ok(payload)
    }

    pub async fn call_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ApiConnectionError> {
        match self {
            Provider::OpenRouter {
                api_key: api_key_env_var_name,
                ..
            } => {
                let actual_api_key = env::var(api_key_env_var_name)
                    .map_err(|_| ApiConnectionError::MissingApiKey(api_key_env_var_name.clone()))?;

                let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

                let request_payload = self.build_request_payload(&request)?;

                let site_url =
                    env::var("SITE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
                let app_name = env::var("APP_NAME").unwrap_or_else(|_| "PantryMatch".to_string());

                debug!("Calling {} with model {}", OPENROUTER_CHAT_URL, request.model);
                let response = client
                    .post(OPENROUTER_CHAT_URL)
                    .bearer_auth(actual_api_key)
                    .header("Content-Type", "application/json")
                    .header("HTTP-Referer", site_url)
                    .header("X-Title", app_name)
                    .json(&request_payload)
                    .send()
                    .await?;

                if response.status().is_success() {
                    Ok(response.json::<ChatCompletionResponse>().await?)
                } else {
                    let status = response.status();
                    let error_body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Failed to read error body".to_string());
                    Err(ApiConnectionError::ApiError { status, error_body })
                }
            }
        }
    }
}
