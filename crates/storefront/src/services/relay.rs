//! Chat-relay API client.
//!
//! The relay delivers a plain-text message to a messaging-app contact.
//! Its whole contract with this service is one endpoint: accept a
//! `{phone, message}` payload over a synchronous HTTP call and answer
//! success or failure. No retries happen here.

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, instrument};

use crate::config::RelayConfig;

/// Errors that can occur when calling the chat-relay API.
#[derive(Debug, Error)]
pub enum RelayError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The relay answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// Seam between the order submission flow and the relay, so the flow can
/// be exercised without a live relay.
pub trait MessageRelay: Send + Sync {
    /// Deliver an order summary to the configured destination contact.
    async fn send_order_message(&self, message: &str) -> Result<(), RelayError>;
}

/// Client for the chat-relay API.
#[derive(Clone)]
pub struct RelayClient {
    client: Client,
    api_url: String,
    api_token: SecretString,
    receiver_phone: String,
}

impl std::fmt::Debug for RelayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayClient")
            .field("api_url", &self.api_url)
            .field("api_token", &"[REDACTED]")
            .field("receiver_phone", &self.receiver_phone)
            .finish_non_exhaustive()
    }
}

/// Request body for `message/send-text`.
#[derive(Serialize)]
struct SendTextRequest<'a> {
    phone: &'a str,
    message: &'a str,
}

impl RelayClient {
    /// Create a new relay client.
    #[must_use]
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            client: Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            receiver_phone: config.receiver_phone.clone(),
        }
    }

    /// Send a text message to a phone contact.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the relay answers with a
    /// non-success status. The relay's response body is carried in the
    /// error for surfacing to the caller.
    #[instrument(skip(self, message), fields(phone = %phone))]
    pub async fn send_text(&self, phone: &str, message: &str) -> Result<(), RelayError> {
        let response = self
            .client
            .post(format!("{}/message/send-text", self.api_url))
            .bearer_auth(self.api_token.expose_secret())
            .json(&SendTextRequest { phone, message })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!(
                status = %status,
                body = %message.chars().take(500).collect::<String>(),
                "chat relay rejected message"
            );
            return Err(RelayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!("message delivered to chat relay");
        Ok(())
    }
}

impl MessageRelay for RelayClient {
    async fn send_order_message(&self, message: &str) -> Result<(), RelayError> {
        self.send_text(&self.receiver_phone, message).await
    }
}
