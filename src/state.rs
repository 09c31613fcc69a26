use serde::Serialize;

use crate::api::StatusResponse;
use crate::normalize::ClientListOutcome;
use crate::notify::Notification;

/// Target value for broadcasting to every connected client.
pub const ALL_TARGET: &str = "all";

pub const API_OFFLINE_LABEL: &str = "API OFFLINE";

/// Last-known connectivity of the managed server. Overwritten wholesale on
/// every status poll; never merged.
#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct ConnectivityState {
    pub connected: bool,
    pub last_update_label: String,
}

/// One entry in the operator's target-selection list.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TargetOption {
    pub value: String,
    pub label: String,
}

/// Serializable snapshot pushed to the frontend after every state change.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PanelSnapshot {
    pub connectivity: ConnectivityState,
    pub clients: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_error: Option<String>,
    pub targets: Vec<TargetOption>,
    pub logs: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
}

/// Single source of truth for everything the frontend renders.
/// Owned exclusively by the panel loop; only completion handlers write here.
#[derive(Debug, Default)]
pub struct StateStore {
    connectivity: ConnectivityState,
    clients: Vec<String>,
    client_error: Option<String>,
    logs: String,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_status(&mut self, status: &StatusResponse) {
        self.connectivity = ConnectivityState {
            connected: status.server_connected,
            last_update_label: format!("Last update: {}", status.timestamp),
        };
    }

    /// Transport failure talking to the API. Distinct from a server-reported
    /// disconnect: the panel cannot reach the API at all.
    pub fn apply_status_failure(&mut self) {
        self.connectivity = ConnectivityState {
            connected: false,
            last_update_label: API_OFFLINE_LABEL.to_string(),
        };
    }

    pub fn apply_clients(&mut self, outcome: ClientListOutcome) {
        if outcome.error.is_some() {
            self.clients.clear();
            self.client_error = outcome.error;
        } else {
            self.clients = outcome.clients;
            self.client_error = None;
        }
    }

    pub fn apply_logs(&mut self, logs: String) {
        // Always replace, never append.
        self.logs = logs;
    }

    pub fn connectivity(&self) -> &ConnectivityState {
        &self.connectivity
    }

    pub fn clients(&self) -> &[String] {
        &self.clients
    }

    pub fn client_error(&self) -> Option<&str> {
        self.client_error.as_deref()
    }

    pub fn logs(&self) -> &str {
        &self.logs
    }

    /// Derive the operator target list from the current client set:
    /// a count-labelled `all` entry followed by one entry per client.
    pub fn target_options(&self) -> Vec<TargetOption> {
        let mut targets = Vec::with_capacity(self.clients.len() + 1);
        targets.push(TargetOption {
            value: ALL_TARGET.to_string(),
            label: format!("All Clients ({})", self.clients.len()),
        });
        for client in &self.clients {
            targets.push(TargetOption {
                value: client.clone(),
                label: client.clone(),
            });
        }
        targets
    }

    pub fn snapshot(&self, notification: Option<&Notification>) -> PanelSnapshot {
        PanelSnapshot {
            connectivity: self.connectivity.clone(),
            clients: self.clients.clone(),
            client_error: self.client_error.clone(),
            targets: self.target_options(),
            logs: self.logs.clone(),
            notification: notification.cloned(),
        }
    }
}
