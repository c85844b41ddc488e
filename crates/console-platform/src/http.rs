//! HTTP adapters for the chat message store and the appointment store.
//!
//! Uses browser `fetch()` via gloo-net for WASM compatibility. Both stores
//! answer either with a bare payload or with a `{ success, ... }` envelope;
//! `success: false` is reported as [`ConsoleError::Rejected`].

use async_trait::async_trait;
use gloo_net::http::{Request, Response};
use serde::Deserialize;
use serde_json::json;

use console_core::ports::{AppointmentStorePort, FetchParams, MessageSourcePort};
use console_types::{
    config::ConsoleConfig,
    message::Message,
    session::LinkMap,
    ConsoleError, Result,
};

/// Message store speaking the chat messages REST API.
pub struct HttpMessageSource {
    config: ConsoleConfig,
}

impl HttpMessageSource {
    pub fn new(config: ConsoleConfig) -> Self {
        Self { config }
    }
}

#[async_trait(?Send)]
impl MessageSourcePort for HttpMessageSource {
    async fn fetch(&self, token: &str, params: &FetchParams) -> Result<Vec<Message>> {
        let url = fetch_url(&self.config, params);
        let response = Request::get(&url)
            .header("Authorization", &bearer(token))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ConsoleError::Network(e.to_string()))?;

        let body = read_body(response).await?;
        let messages = decode_messages(&body)?;
        log::debug!("Fetched {} messages from {}", messages.len(), url);
        Ok(messages)
    }

    async fn delete(&self, token: &str, session_id: &str) -> Result<()> {
        let url = self.config.session_url(session_id);
        let response = Request::delete(&url)
            .header("Authorization", &bearer(token))
            .send()
            .await
            .map_err(|e| ConsoleError::Network(e.to_string()))?;

        let body = read_body(response).await?;
        decode_ack(&body)
    }
}

/// Appointment store with a batched by-session lookup.
pub struct HttpAppointmentStore {
    config: ConsoleConfig,
}

impl HttpAppointmentStore {
    pub fn new(config: ConsoleConfig) -> Self {
        Self { config }
    }
}

#[async_trait(?Send)]
impl AppointmentStorePort for HttpAppointmentStore {
    async fn batch_lookup(&self, token: &str, session_ids: &[String]) -> Result<LinkMap> {
        let url = self.config.appointments_lookup_url();
        let response = Request::post(&url)
            .header("Authorization", &bearer(token))
            .json(&json!({ "sessionIds": session_ids }))
            .map_err(|e| ConsoleError::Serialization(e.to_string()))?
            .send()
            .await
            .map_err(|e| ConsoleError::Network(e.to_string()))?;

        let body = read_body(response).await?;
        decode_links(&body)
    }
}

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Collection URL for a full load, session URL for a detail load. The tier
/// bounds always travel as query parameters.
pub fn fetch_url(config: &ConsoleConfig, params: &FetchParams) -> String {
    let base = match &params.session_id {
        Some(id) => config.session_url(id),
        None => config.messages_url(),
    };
    format!("{}?limit={}&days={}", base, params.limit, params.days)
}

async fn read_body(response: Response) -> Result<String> {
    if !response.ok() {
        let status = response.status();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        return Err(status_error(status, &text));
    }
    response
        .text()
        .await
        .map_err(|e| ConsoleError::Network(e.to_string()))
}

/// Maps a non-2xx answer. An expired or rejected credential is never
/// retried, so 401 and 403 become `NotAuthenticated`.
pub fn status_error(status: u16, body: &str) -> ConsoleError {
    match status {
        401 | 403 => ConsoleError::NotAuthenticated,
        _ => {
            let message = match serde_json::from_str::<Ack>(body) {
                Ok(ack) => ack.reason().unwrap_or_else(|| body.trim().to_string()),
                Err(_) => body.trim().to_string(),
            };
            ConsoleError::Http {
                status,
                message: if message.is_empty() {
                    "unknown error".to_string()
                } else {
                    message
                },
            }
        }
    }
}

// ─── Wire types ──────────────────────────────────────────────

#[derive(Deserialize)]
struct Ack {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl Ack {
    fn reason(&self) -> Option<String> {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .filter(|s| !s.trim().is_empty())
    }

    fn into_result(self) -> Result<()> {
        if self.success {
            Ok(())
        } else {
            Err(ConsoleError::Rejected(
                self.reason().unwrap_or_else(|| "request rejected".to_string()),
            ))
        }
    }
}

fn default_success() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MessagesBody {
    Bare(Vec<Message>),
    Envelope {
        #[serde(flatten)]
        ack: Ack,
        #[serde(default, alias = "data")]
        messages: Vec<Message>,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LinksBody {
    Bare(LinkMap),
    Envelope {
        #[serde(flatten)]
        ack: Ack,
        #[serde(default, alias = "data")]
        appointments: LinkMap,
    },
}

pub fn decode_messages(body: &str) -> Result<Vec<Message>> {
    match serde_json::from_str::<MessagesBody>(body)? {
        MessagesBody::Bare(messages) => Ok(messages),
        MessagesBody::Envelope { ack, messages } => ack.into_result().map(|_| messages),
    }
}

pub fn decode_links(body: &str) -> Result<LinkMap> {
    match serde_json::from_str::<LinksBody>(body)? {
        LinksBody::Bare(map) => Ok(map),
        LinksBody::Envelope { ack, appointments } => ack.into_result().map(|_| appointments),
    }
}

/// A 2xx delete is a confirmation unless the body says otherwise.
pub fn decode_ack(body: &str) -> Result<()> {
    if body.trim().is_empty() {
        return Ok(());
    }
    match serde_json::from_str::<Ack>(body) {
        Ok(ack) => ack.into_result(),
        Err(_) => {
            log::debug!("Delete answered with a non-JSON body, treating as confirmed");
            Ok(())
        }
    }
}
