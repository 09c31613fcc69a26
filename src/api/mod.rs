mod client;
mod types;

pub use client::ApiClient;
pub use types::{CommandReply, CommandRequest, MessageReply, MessageRequest, StatusResponse};

use async_trait::async_trait;
use serde_json::Value;

use crate::types::PanelError;

/// Seam between the panel and the management API. The production
/// implementation is [`ApiClient`]; tests substitute an in-memory fake.
#[async_trait]
pub trait ManagementApi: Send + Sync {
    async fn fetch_status(&self) -> Result<StatusResponse, PanelError>;

    /// Returns the raw response body. The client-list endpoint has shipped
    /// several incompatible encodings, so sniffing is left to the normalizer.
    async fn fetch_clients(&self) -> Result<String, PanelError>;

    async fn fetch_logs(&self) -> Result<Value, PanelError>;

    async fn send_message(&self, target: &str, message: &str) -> Result<MessageReply, PanelError>;

    async fn send_command(&self, command: &str) -> Result<CommandReply, PanelError>;
}
