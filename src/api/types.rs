use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response from `/api/status`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StatusResponse {
    #[serde(default)]
    pub server_connected: bool,
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct MessageRequest<'a> {
    pub target: &'a str,
    pub message: &'a str,
}

#[derive(Serialize)]
pub struct CommandRequest<'a> {
    pub command: &'a str,
}

/// Reply to a message dispatch. The server has shipped the recipient count
/// both as `sent_to` and as `sent_clients`, and either as a number or a
/// string, so the reply is probed out of the raw value rather than derived.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageReply {
    pub error: Option<String>,
    pub sent_to: Option<String>,
}

impl MessageReply {
    pub fn from_value(value: &Value) -> Self {
        Self {
            error: error_field(value),
            sent_to: count_field(value, "sent_to", "sent_clients"),
        }
    }
}

/// Reply to a command dispatch. Same historical field drift as
/// [`MessageReply`]: `disconnected` vs `disconnected_clients`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandReply {
    pub error: Option<String>,
    pub disconnected: Option<String>,
}

impl CommandReply {
    pub fn from_value(value: &Value) -> Self {
        Self {
            error: error_field(value),
            disconnected: count_field(value, "disconnected", "disconnected_clients"),
        }
    }
}

fn error_field(value: &Value) -> Option<String> {
    value
        .get("error")
        .and_then(Value::as_str)
        .map(|s| s.to_string())
}

fn count_field(value: &Value, current: &str, legacy: &str) -> Option<String> {
    let field = value.get(current).or_else(|| value.get(legacy))?;
    match field {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_reply_reads_current_count_field() {
        let reply = MessageReply::from_value(&json!({"sent_to": 3}));
        assert_eq!(reply.sent_to.as_deref(), Some("3"));
        assert!(reply.error.is_none());
    }

    #[test]
    fn message_reply_reads_legacy_count_field() {
        let reply = MessageReply::from_value(&json!({"sent_clients": 2}));
        assert_eq!(reply.sent_to.as_deref(), Some("2"));
    }

    #[test]
    fn message_reply_accepts_string_counts() {
        // The legacy single-target path reports the target address here.
        let reply = MessageReply::from_value(&json!({"sent_to": "10.0.0.7"}));
        assert_eq!(reply.sent_to.as_deref(), Some("10.0.0.7"));
    }

    #[test]
    fn command_reply_surfaces_error() {
        let reply = CommandReply::from_value(&json!({"error": "not connected"}));
        assert_eq!(reply.error.as_deref(), Some("not connected"));
        assert!(reply.disconnected.is_none());
    }

    #[test]
    fn command_reply_reads_either_count_spelling() {
        let current = CommandReply::from_value(&json!({"disconnected": 4}));
        let legacy = CommandReply::from_value(&json!({"disconnected_clients": 4}));
        assert_eq!(current.disconnected.as_deref(), Some("4"));
        assert_eq!(legacy.disconnected.as_deref(), Some("4"));
    }
}
