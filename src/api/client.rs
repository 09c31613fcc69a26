use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::types::PanelError;

use super::types::{CommandReply, CommandRequest, MessageReply, MessageRequest, StatusResponse};
use super::ManagementApi;

/// HTTP client for the management API.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Prepare an HTTP client for the configured API base URL.
    /// `PANEL_API_URL` overrides the configured value.
    pub fn connect(config: &Config) -> Result<Self, PanelError> {
        let base_url = resolve_base_url(config);

        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(PanelError::Http)?;

        Ok(Self { http, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn get_json<T>(&self, path: &str) -> Result<T, PanelError>
    where
        T: DeserializeOwned,
    {
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(PanelError::Http)?;

        if !response.status().is_success() {
            return Err(PanelError::Api(format!(
                "{} returned {}",
                path,
                response.status()
            )));
        }

        response.json::<T>().await.map_err(PanelError::Http)
    }

    async fn get_text(&self, path: &str) -> Result<String, PanelError> {
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(PanelError::Http)?;

        if !response.status().is_success() {
            return Err(PanelError::Api(format!(
                "{} returned {}",
                path,
                response.status()
            )));
        }

        response.text().await.map_err(PanelError::Http)
    }

    async fn post_json<B>(&self, path: &str, body: &B) -> Result<Value, PanelError>
    where
        B: Serialize + ?Sized,
    {
        let response = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(PanelError::Http)?;

        if !response.status().is_success() {
            return Err(PanelError::Api(format!(
                "{} returned {}",
                path,
                response.status()
            )));
        }

        response.json::<Value>().await.map_err(PanelError::Http)
    }
}

#[async_trait]
impl ManagementApi for ApiClient {
    async fn fetch_status(&self) -> Result<StatusResponse, PanelError> {
        self.get_json("/api/status").await
    }

    async fn fetch_clients(&self) -> Result<String, PanelError> {
        self.get_text("/api/clients").await
    }

    async fn fetch_logs(&self) -> Result<Value, PanelError> {
        self.get_json("/api/logs").await
    }

    async fn send_message(&self, target: &str, message: &str) -> Result<MessageReply, PanelError> {
        let request = MessageRequest { target, message };
        let reply = self.post_json("/api/message", &request).await?;
        Ok(MessageReply::from_value(&reply))
    }

    async fn send_command(&self, command: &str) -> Result<CommandReply, PanelError> {
        let request = CommandRequest { command };
        let reply = self.post_json("/api/command", &request).await?;
        Ok(CommandReply::from_value(&reply))
    }
}

fn resolve_base_url(config: &Config) -> String {
    if let Ok(custom) = env::var("PANEL_API_URL") {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    config.api_base_url.clone()
}
