//! Transparency API transport (blocking).
//!
//! The client is constructed from an explicit `ClientConfig`; nothing below reads the
//! environment except `ClientConfig::from_env`.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::data::request::RequestDescriptor;
use crate::document::{DocNode, XmlNode};
use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "https://web-api.tp.entsoe.eu/api";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const BODY_EXCERPT_CHARS: usize = 300;

const ENV_TOKEN: &str = "ENTSOE_API_TOKEN";
const ENV_BASE_URL: &str = "ENTSOE_BASE_URL";
const ENV_TIMEOUT: &str = "ENTSOE_TIMEOUT_SECS";

/// Root element the provider uses for "no data" / request problems.
const ACKNOWLEDGEMENT_TAG: &str = "Acknowledgement_MarketDocument";

#[derive(Clone)]
pub struct ClientConfig {
    pub token: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let token = std::env::var(ENV_TOKEN)
            .map_err(|_| AppError::input(format!("Missing {ENV_TOKEN} in environment (.env).")))?;
        Self::from_values(
            token,
            std::env::var(ENV_BASE_URL).ok(),
            std::env::var(ENV_TIMEOUT).ok(),
        )
    }

    pub fn from_values(
        token: String,
        base_url: Option<String>,
        timeout_secs: Option<String>,
    ) -> Result<Self, AppError> {
        if token.trim().is_empty() {
            return Err(AppError::input(format!("{ENV_TOKEN} is empty.")));
        }
        let timeout_secs = match timeout_secs {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| AppError::input(format!("Invalid {ENV_TIMEOUT} '{raw}'.")))?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        Ok(Self {
            token: token.trim().to_string(),
            base_url: base_url
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

pub struct EntsoeClient {
    client: Client,
    config: ClientConfig,
}

impl EntsoeClient {
    pub fn new(config: ClientConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::remote(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Issue one request and return the raw response body.
    pub fn fetch(&self, request: &RequestDescriptor) -> Result<Vec<u8>, AppError> {
        debug!(params = ?request.params, "requesting provider document");

        let resp = self
            .client
            .get(&self.config.base_url)
            .query(&[("securityToken", self.config.token.as_str())])
            .query(&request.params)
            .send()
            // The URL carries the token; keep it out of messages.
            .map_err(|e| AppError::remote(format!("Provider request failed: {}", e.without_url())))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            if let Some(reason) = XmlNode::parse(body.as_bytes())
                .ok()
                .and_then(|root| acknowledgement_reason(&root))
            {
                return Err(AppError::no_data(format!(
                    "Provider returned no data (HTTP {status}): {reason}"
                )));
            }
            return Err(AppError::remote(format!(
                "Provider request failed with status {status}: {}",
                excerpt(&body)
            )));
        }

        let bytes = resp
            .bytes()
            .map_err(|e| AppError::remote(format!("Failed to read provider response: {}", e.without_url())))?;
        info!(bytes = bytes.len(), "provider document received");
        Ok(bytes.to_vec())
    }
}

/// Reason text of an acknowledgement document, `None` for any other document.
pub fn acknowledgement_reason<N: DocNode>(root: &N) -> Option<String> {
    if root.tag() != ACKNOWLEDGEMENT_TAG {
        return None;
    }
    let reasons: Vec<&str> = root
        .children_named("Reason")
        .into_iter()
        .filter_map(|r| r.first_child("text"))
        .map(|t| t.text())
        .filter(|t| !t.is_empty())
        .collect();
    if reasons.is_empty() {
        Some("no reason given".to_string())
    } else {
        Some(reasons.join("; "))
    }
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= BODY_EXCERPT_CHARS {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(BODY_EXCERPT_CHARS).collect();
    format!("{cut}...")
}
