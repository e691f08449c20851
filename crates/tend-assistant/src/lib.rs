//! Chat relay to the Anthropic Messages API.
//!
//! The relay forwards one user message plus minimal context, bounded by a
//! hard request timeout. Failures surface as distinct errors — they are
//! never retried here, since a blind retry could duplicate a stored
//! conversation turn.

pub mod protocol;

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::protocol::{ChatContext, StructuredReply};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("provider request timed out")]
    Timeout,
    #[error("provider request failed: {0}")]
    Http(reqwest::Error),
    #[error("provider returned {status}: {body}")]
    Provider { status: u16, body: String },
    #[error("provider response had no text content")]
    EmptyResponse,
}

pub struct AssistantClient {
    http: Client,
    api_key: Option<String>,
    model: String,
}

impl AssistantClient {
    /// `api_key = None` puts the client in local mode: `reply` answers with
    /// a canned response and never touches the network.
    pub fn new(
        api_key: Option<String>,
        model: String,
        timeout: Duration,
    ) -> Result<Self, AssistantError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(AssistantError::Http)?;
        Ok(Self { http, api_key, model })
    }

    pub async fn reply(
        &self,
        context: &ChatContext,
        message: &str,
    ) -> Result<StructuredReply, AssistantError> {
        let Some(api_key) = &self.api_key else {
            debug!("no provider key configured, answering locally");
            return Ok(protocol::local_reply(message));
        };

        let body = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "system": protocol::system_prompt(context),
            "messages": [{"role": "user", "content": message}],
        });

        let resp = self
            .http
            .post(MESSAGES_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(classify)?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(AssistantError::Provider { status, body });
        }

        let parsed: MessagesResponse = resp.json().await.map_err(classify)?;
        let text = parsed
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .map(|block| block.text)
            .ok_or(AssistantError::EmptyResponse)?;

        Ok(protocol::parse_structured(&text))
    }
}

fn classify(e: reqwest::Error) -> AssistantError {
    if e.is_timeout() {
        AssistantError::Timeout
    } else {
        AssistantError::Http(e)
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}
