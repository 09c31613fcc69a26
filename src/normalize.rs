//! Tolerant parsing of management API responses.
//!
//! The client-list endpoint has shipped at least three encodings over time:
//! a JSON array of addresses, a comma-joined string, and a bare plain-text
//! line list from the original transport. The normalizer resolves them
//! through a fixed-priority detector chain and degrades to an IPv4 scrape of
//! the serialized body when nothing else matches. It never panics past its
//! caller: any parse failure becomes an empty set with an error marker.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::types::PanelError;

pub const NO_LOGS_PLACEHOLDER: &str = "No logs available";
pub const LOGS_UNAVAILABLE_PLACEHOLDER: &str = "Error loading logs";

static IPV4: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").expect("valid IPv4 pattern"));

/// Canonical result of normalizing one client-list response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientListOutcome {
    pub clients: Vec<String>,
    pub error: Option<String>,
}

impl ClientListOutcome {
    pub fn ok(clients: Vec<String>) -> Self {
        Self {
            clients,
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            clients: Vec::new(),
            error: Some(message.into()),
        }
    }
}

/// A detector inspects a structured body and either claims it or passes.
type Detector = fn(&Value) -> Option<Vec<String>>;

/// Tried in priority order, first match wins.
const DETECTORS: &[Detector] = &[clients_sequence, clients_comma_joined];

/// Normalize a raw `/api/clients` response body into a [`ClientListOutcome`].
pub fn normalize_client_list(body: &str) -> ClientListOutcome {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        // Legacy transport: bare text, one client per line.
        return ClientListOutcome::ok(plain_text_lines(body));
    };

    if let Some(message) = value.get("error").and_then(Value::as_str) {
        return ClientListOutcome::error(message);
    }

    for detect in DETECTORS {
        if let Some(clients) = detect(&value) {
            return ClientListOutcome::ok(clients);
        }
    }

    // Structured but unrecognized: scrape anything address-shaped.
    ClientListOutcome::ok(scan_for_addresses(&value.to_string()))
}

/// `clients` is already a sequence of identifiers.
fn clients_sequence(value: &Value) -> Option<Vec<String>> {
    let items = value.get("clients")?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|item| item.as_str().map(|s| s.to_string()))
            .collect(),
    )
}

/// `clients` is a single comma-joined string.
fn clients_comma_joined(value: &Value) -> Option<Vec<String>> {
    let joined = value.get("clients")?.as_str()?;
    Some(
        joined
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| entry.to_string())
            .collect(),
    )
}

fn plain_text_lines(body: &str) -> Vec<String> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.contains("error"))
        .map(|line| line.to_string())
        .collect()
}

/// Heuristic fallback: collect dotted-quad substrings in first-seen order.
/// No octet-range validation; this scrapes, it does not validate.
fn scan_for_addresses(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    IPV4.find_iter(text)
        .map(|m| m.as_str().to_string())
        .filter(|addr| seen.insert(addr.clone()))
        .collect()
}

/// Normalize a `/api/logs` response into the displayed log text.
/// Logs are always an opaque string field; no format sniffing here.
pub fn normalize_logs(response: Result<Value, PanelError>) -> String {
    match response {
        Ok(value) => {
            if let Some(message) = value.get("error").and_then(Value::as_str) {
                return format!("Error: {message}");
            }
            value
                .get("logs")
                .and_then(Value::as_str)
                .filter(|logs| !logs.is_empty())
                .map(|logs| logs.to_string())
                .unwrap_or_else(|| NO_LOGS_PLACEHOLDER.to_string())
        }
        Err(_) => LOGS_UNAVAILABLE_PLACEHOLDER.to_string(),
    }
}
