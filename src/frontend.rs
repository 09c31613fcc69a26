use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Local;
use tokio::sync::oneshot;

use crate::dispatch::Confirm;
use crate::notify::Severity;
use crate::state::PanelSnapshot;

/// Rendering substrate the panel pushes state into. The panel treats it as
/// a black box: it only ever receives snapshots and an input-clear signal.
#[async_trait]
pub trait Frontend: Send {
    async fn render(&mut self, snapshot: &PanelSnapshot);

    /// A message was accepted by the server; the operator's input field
    /// should be emptied.
    async fn clear_message_input(&mut self);
}

/// Minimal terminal rendering of panel snapshots.
pub struct TerminalFrontend;

impl TerminalFrontend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalFrontend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Frontend for TerminalFrontend {
    async fn render(&mut self, snapshot: &PanelSnapshot) {
        let status = if snapshot.connectivity.connected {
            "CONNECTED"
        } else {
            "DISCONNECTED"
        };
        println!(
            "[{}] {} | {}",
            Local::now().format("%H:%M:%S"),
            status,
            snapshot.connectivity.last_update_label
        );

        if let Some(error) = &snapshot.client_error {
            println!("  clients: Error: {error}");
        } else if snapshot.clients.is_empty() {
            println!("  clients: none connected");
        } else {
            println!("  clients: {}", snapshot.clients.join(", "));
        }

        let targets: Vec<&str> = snapshot
            .targets
            .iter()
            .map(|target| target.label.as_str())
            .collect();
        println!("  targets: {}", targets.join(" | "));

        let tail: Vec<&str> = snapshot.logs.lines().collect();
        for line in tail.iter().rev().take(5).rev() {
            println!("  log: {line}");
        }

        if let Some(notification) = &snapshot.notification {
            let tag = match notification.severity {
                Severity::Success => "ok",
                Severity::Error => "error",
            };
            println!("  [{tag}] {}", notification.message);
        }
    }

    async fn clear_message_input(&mut self) {
        // Nothing retained between stdin lines.
    }
}

/// Terminal confirmation gate.
///
/// The binary has a single stdin reader; prompting from the panel task
/// would race it for lines. Instead the prompt parks a oneshot here and the
/// stdin reader routes the operator's next line back as the answer.
#[derive(Clone, Default)]
pub struct PromptConfirm {
    pending: Arc<Mutex<Option<oneshot::Sender<bool>>>>,
}

impl PromptConfirm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route an input line to a waiting confirmation, if any.
    /// Returns false when no confirmation is pending.
    pub fn answer_pending(&self, line: &str) -> bool {
        let Some(reply) = self.pending.lock().expect("confirm slot poisoned").take() else {
            return false;
        };
        let accepted = matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes");
        let _ = reply.send(accepted);
        true
    }
}

#[async_trait]
impl Confirm for PromptConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        let (reply, answer) = oneshot::channel();
        *self.pending.lock().expect("confirm slot poisoned") = Some(reply);
        println!("{prompt} [y/N]");
        answer.await.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn answer_routes_to_the_pending_prompt() {
        let confirmer = PromptConfirm::new();
        let waiter = confirmer.clone();
        let handle = tokio::spawn(async move { waiter.confirm("Sure?").await });

        // Wait until the prompt has parked its oneshot.
        while !confirmer.answer_pending("yes") {
            tokio::task::yield_now().await;
        }

        assert!(handle.await.unwrap());
    }

    #[tokio::test]
    async fn anything_but_yes_declines() {
        let confirmer = PromptConfirm::new();
        let waiter = confirmer.clone();
        let handle = tokio::spawn(async move { waiter.confirm("Sure?").await });

        while !confirmer.answer_pending("nope") {
            tokio::task::yield_now().await;
        }

        assert!(!handle.await.unwrap());
    }

    #[test]
    fn answer_without_pending_prompt_is_ignored() {
        let confirmer = PromptConfirm::new();
        assert!(!confirmer.answer_pending("y"));
    }
}
