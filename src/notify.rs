use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
        }
    }
}

/// Single-slot transient notification display.
///
/// Each `show` replaces both the visible notification and the owned
/// dismissal deadline, so a stale deadline can never clear a newer
/// notification. The panel loop sleeps on [`Notifier::deadline`] and calls
/// [`Notifier::dismiss_if_due`] when it fires.
#[derive(Debug)]
pub struct Notifier {
    ttl: Duration,
    current: Option<Notification>,
    deadline: Option<Instant>,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            current: None,
            deadline: None,
        }
    }

    pub fn show(&mut self, notification: Notification) {
        self.current = Some(notification);
        self.deadline = Some(Instant::now() + self.ttl);
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Clear the notification if its deadline has passed.
    /// Returns true when something was dismissed.
    pub fn dismiss_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.current = None;
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
