//! reqwest-backed [`FormService`].

use formgen_core::{ClientConfig, FormError, FormService, SchemaBundle};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const GENERATE_PATH: &str = "/generate-form";
const PROBE_PATH: &str = "/test";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    description: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    form_structure: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Talks to the generation service over HTTP. Cookies set by the service are kept
/// and sent back on later requests; every request declares a JSON content type.
pub struct HttpFormService {
    http: reqwest::Client,
    base_url: String,
}

impl HttpFormService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FormError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| FormError::Transport(format!("could not build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, FormError> {
        Self::new(config.base_url.clone(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn transport_error(e: reqwest::Error) -> FormError {
    if e.is_timeout() {
        FormError::Transport("Request timed out".to_string())
    } else {
        FormError::Transport(format!("Network Error: {}", e))
    }
}

fn status_message(status: StatusCode) -> String {
    format!("Request failed with status code {}", status.as_u16())
}

#[async_trait::async_trait]
impl FormService for HttpFormService {
    async fn generate_form(&self, description: &str) -> Result<SchemaBundle, FormError> {
        let url = self.url(GENERATE_PATH);
        tracing::info!(target: "formgen::client", %url, description, "POST generate-form");
        let response = self
            .http
            .post(&url)
            .json(&GenerateRequest { description })
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| status_message(status));
            tracing::warn!(target: "formgen::client", status = status.as_u16(), %message, "generate-form rejected");
            return Err(FormError::Service(message));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body).map_err(|e| {
            FormError::Parse(format!("response has no usable form_structure: {}", e))
        })?;
        let bundle = SchemaBundle::from_form_structure(&parsed.form_structure)?;
        tracing::debug!(target: "formgen::client", bytes = body.len(), "generate-form succeeded");
        Ok(bundle)
    }

    async fn ping(&self) -> Result<(), FormError> {
        let url = self.url(PROBE_PATH);
        tracing::debug!(target: "formgen::client", %url, "GET test");
        let response = self.http.get(&url).send().await.map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(FormError::Service(status_message(status)))
        }
    }
}
