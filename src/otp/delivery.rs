//! Code delivery sink
//!
//! The engine only needs "deliver this text somewhere out of band". The
//! production sink is a Telegram-bot endpoint; tests plug in recorders.

use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::NotifyConfig;

/// The upstream endpoint rejects longer texts; refuse locally instead of
/// burning a request.
const MAX_MESSAGE_LEN: usize = 1200;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("message of {0} chars exceeds the {limit}-char limit", limit = MAX_MESSAGE_LEN)]
    MessageTooLong(usize),

    #[error("delivery request failed: {0}")]
    Http(String),

    #[error("delivery endpoint returned status {0}")]
    Status(u16),
}

#[async_trait]
pub trait CodeDelivery: Send + Sync {
    async fn deliver(&self, text: &str) -> Result<(), DeliveryError>;
}

#[derive(Serialize)]
struct SendMessageBody<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Telegram-bot sendMessage sink. The destination chat comes from
/// configuration at construction time.
pub struct TelegramDelivery {
    client: reqwest::Client,
    url: String,
    chat_id: String,
}

impl TelegramDelivery {
    pub fn new(config: &NotifyConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("failed to create delivery HTTP client")?;

        Ok(Self {
            client,
            url: format!(
                "{}/bot{}/sendMessage",
                config.api_url.trim_end_matches('/'),
                config.bot_token
            ),
            chat_id: config.chat_id.clone(),
        })
    }
}

#[async_trait]
impl CodeDelivery for TelegramDelivery {
    async fn deliver(&self, text: &str) -> Result<(), DeliveryError> {
        let len = text.chars().count();
        if len > MAX_MESSAGE_LEN {
            return Err(DeliveryError::MessageTooLong(len));
        }

        let resp = self
            .client
            .post(&self.url)
            .json(&SendMessageBody {
                chat_id: &self.chat_id,
                text,
            })
            .send()
            .await
            .map_err(|e| DeliveryError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(DeliveryError::Status(resp.status().as_u16()));
        }
        Ok(())
    }
}
