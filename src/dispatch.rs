use async_trait::async_trait;
use tracing::warn;

use crate::api::ManagementApi;
use crate::notify::Notification;
use crate::scheduler::RefreshPlan;

/// Confirmation gate for destructive commands, injected so the binary can
/// prompt the operator and tests can script the answer.
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Safe,
    Destructive,
}

/// Predefined commands the panel can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelCommand {
    ShowIps,
    Help,
    KillSwitch,
    Stop,
}

impl PanelCommand {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "show_ips" => Some(Self::ShowIps),
            "help" => Some(Self::Help),
            "kill_switch" => Some(Self::KillSwitch),
            "stop" => Some(Self::Stop),
            _ => None,
        }
    }

    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::ShowIps => "show_ips",
            Self::Help => "help",
            Self::KillSwitch => "kill_switch",
            Self::Stop => "stop",
        }
    }

    /// Destructive commands disconnect clients or stop the server and
    /// cannot be undone; they require operator confirmation.
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::KillSwitch | Self::Stop => CommandKind::Destructive,
            Self::ShowIps | Self::Help => CommandKind::Safe,
        }
    }
}

/// Result of one dispatch: the feedback to show, which endpoints to
/// re-poll, and whether the operator's message input should be cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub notification: Notification,
    pub refresh: RefreshPlan,
    pub clear_input: bool,
}

impl DispatchOutcome {
    fn failure(notification: Notification) -> Self {
        Self {
            notification,
            refresh: RefreshPlan::NONE,
            clear_input: false,
        }
    }
}

/// Send a free-text message to one or all clients.
///
/// Empty content short-circuits locally; on success the input is cleared
/// and the logs are refreshed, on failure the input is left untouched so
/// the operator can retry.
pub async fn send_message<A>(api: &A, target: &str, content: &str) -> DispatchOutcome
where
    A: ManagementApi + ?Sized,
{
    if content.trim().is_empty() {
        return DispatchOutcome::failure(Notification::error("Please enter a message"));
    }

    match api.send_message(target, content).await {
        Ok(reply) => {
            if let Some(reason) = reply.error {
                return DispatchOutcome::failure(Notification::error(format!(
                    "Failed to send message: {reason}"
                )));
            }
            let count = reply.sent_to.unwrap_or_else(|| "unknown".to_string());
            DispatchOutcome {
                notification: Notification::success(format!("Message sent to {count} clients")),
                refresh: RefreshPlan::LOGS_ONLY,
                clear_input: true,
            }
        }
        Err(err) => {
            warn!(target, error = ?err, "Failed to send message");
            DispatchOutcome::failure(Notification::error("Error sending message"))
        }
    }
}

/// Issue a predefined command. Destructive commands go through the
/// injected confirmation gate first; a declined confirmation aborts with
/// no network call and no outcome.
pub async fn execute_command<A, C>(
    api: &A,
    confirmer: &C,
    command: PanelCommand,
) -> Option<DispatchOutcome>
where
    A: ManagementApi + ?Sized,
    C: Confirm + ?Sized,
{
    if command.kind() == CommandKind::Destructive {
        let prompt = format!(
            "Are you sure you want to execute \"{}\"? This action cannot be undone.",
            command.wire_name()
        );
        if !confirmer.confirm(&prompt).await {
            return None;
        }
    }

    let outcome = match api.send_command(command.wire_name()).await {
        Ok(reply) => {
            if let Some(reason) = reply.error {
                DispatchOutcome::failure(Notification::error(format!(
                    "Failed to execute \"{}\": {reason}",
                    command.wire_name()
                )))
            } else {
                let mut message =
                    format!("Command \"{}\" executed successfully", command.wire_name());
                if let Some(count) = reply.disconnected {
                    message.push_str(&format!(" ({count} clients affected)"));
                }
                DispatchOutcome {
                    notification: Notification::success(message),
                    refresh: RefreshPlan {
                        status: false,
                        clients: true,
                        logs: true,
                    },
                    clear_input: false,
                }
            }
        }
        Err(err) => {
            warn!(command = command.wire_name(), error = ?err, "Failed to execute command");
            DispatchOutcome::failure(Notification::error("Error executing command"))
        }
    };

    Some(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CommandReply, MessageReply, StatusResponse};
    use crate::notify::Severity;
    use crate::types::PanelError;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Message { target: String, content: String },
        Command(String),
    }

    /// In-memory API double that records every issued call.
    #[derive(Default)]
    struct FakeApi {
        calls: Mutex<Vec<Call>>,
        message_reply: Mutex<Option<Result<MessageReply, PanelError>>>,
        command_reply: Mutex<Option<Result<CommandReply, PanelError>>>,
    }

    impl FakeApi {
        fn with_message_reply(reply: Result<MessageReply, PanelError>) -> Self {
            let api = Self::default();
            *api.message_reply.lock().unwrap() = Some(reply);
            api
        }

        fn with_command_reply(reply: Result<CommandReply, PanelError>) -> Self {
            let api = Self::default();
            *api.command_reply.lock().unwrap() = Some(reply);
            api
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ManagementApi for FakeApi {
        async fn fetch_status(&self) -> Result<StatusResponse, PanelError> {
            Ok(StatusResponse::default())
        }

        async fn fetch_clients(&self) -> Result<String, PanelError> {
            Ok("{}".to_string())
        }

        async fn fetch_logs(&self) -> Result<Value, PanelError> {
            Ok(Value::Null)
        }

        async fn send_message(
            &self,
            target: &str,
            message: &str,
        ) -> Result<MessageReply, PanelError> {
            self.calls.lock().unwrap().push(Call::Message {
                target: target.to_string(),
                content: message.to_string(),
            });
            self.message_reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or(Ok(MessageReply::default()))
        }

        async fn send_command(&self, command: &str) -> Result<CommandReply, PanelError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Command(command.to_string()));
            self.command_reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or(Ok(CommandReply::default()))
        }
    }

    struct ScriptedConfirm {
        answer: bool,
        prompts: AtomicUsize,
    }

    impl ScriptedConfirm {
        fn new(answer: bool) -> Self {
            Self {
                answer,
                prompts: AtomicUsize::new(0),
            }
        }

        fn prompt_count(&self) -> usize {
            self.prompts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Confirm for ScriptedConfirm {
        async fn confirm(&self, _prompt: &str) -> bool {
            self.prompts.fetch_add(1, Ordering::SeqCst);
            self.answer
        }
    }

    #[tokio::test]
    async fn empty_message_never_issues_a_network_call() {
        let api = FakeApi::default();
        let outcome = send_message(&api, "all", "   ").await;

        assert!(api.calls().is_empty());
        assert_eq!(outcome.notification.severity, Severity::Error);
        assert!(!outcome.clear_input);
        assert!(outcome.refresh.is_empty());
    }

    #[tokio::test]
    async fn successful_message_clears_input_and_refreshes_logs() {
        let api = FakeApi::with_message_reply(Ok(MessageReply {
            error: None,
            sent_to: Some("3".to_string()),
        }));

        let outcome = send_message(&api, "all", "hello").await;

        assert_eq!(
            api.calls(),
            vec![Call::Message {
                target: "all".to_string(),
                content: "hello".to_string()
            }]
        );
        assert_eq!(outcome.notification.message, "Message sent to 3 clients");
        assert_eq!(outcome.notification.severity, Severity::Success);
        assert!(outcome.clear_input);
        assert_eq!(outcome.refresh, RefreshPlan::LOGS_ONLY);
    }

    #[tokio::test]
    async fn omitted_recipient_count_reads_unknown() {
        let api = FakeApi::with_message_reply(Ok(MessageReply::default()));
        let outcome = send_message(&api, "10.0.0.1", "hi").await;
        assert_eq!(outcome.notification.message, "Message sent to unknown clients");
    }

    #[tokio::test]
    async fn server_reported_message_error_keeps_the_input() {
        let api = FakeApi::with_message_reply(Ok(MessageReply {
            error: Some("no clients".to_string()),
            sent_to: None,
        }));

        let outcome = send_message(&api, "all", "hello").await;

        assert_eq!(
            outcome.notification.message,
            "Failed to send message: no clients"
        );
        assert!(!outcome.clear_input);
        assert!(outcome.refresh.is_empty());
    }

    #[tokio::test]
    async fn message_transport_failure_gets_a_generic_notification() {
        let api = FakeApi::with_message_reply(Err(PanelError::Api("boom".to_string())));
        let outcome = send_message(&api, "all", "hello").await;
        assert_eq!(outcome.notification.message, "Error sending message");
        assert!(!outcome.clear_input);
    }

    #[tokio::test]
    async fn declined_confirmation_aborts_without_a_network_call() {
        let api = FakeApi::default();
        let confirmer = ScriptedConfirm::new(false);

        let outcome = execute_command(&api, &confirmer, PanelCommand::Stop).await;

        assert!(outcome.is_none());
        assert_eq!(confirmer.prompt_count(), 1);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn accepted_confirmation_issues_exactly_one_call() {
        let api = FakeApi::with_command_reply(Ok(CommandReply {
            error: None,
            disconnected: Some("4".to_string()),
        }));
        let confirmer = ScriptedConfirm::new(true);

        let outcome = execute_command(&api, &confirmer, PanelCommand::KillSwitch)
            .await
            .unwrap();

        assert_eq!(api.calls(), vec![Call::Command("kill_switch".to_string())]);
        assert_eq!(
            outcome.notification.message,
            "Command \"kill_switch\" executed successfully (4 clients affected)"
        );
        assert!(outcome.refresh.clients);
        assert!(outcome.refresh.logs);
        assert!(!outcome.refresh.status);
    }

    #[tokio::test]
    async fn safe_commands_skip_the_confirmation_gate() {
        let api = FakeApi::default();
        let confirmer = ScriptedConfirm::new(false);

        let outcome = execute_command(&api, &confirmer, PanelCommand::ShowIps).await;

        assert!(outcome.is_some());
        assert_eq!(confirmer.prompt_count(), 0);
        assert_eq!(api.calls(), vec![Call::Command("show_ips".to_string())]);
    }

    #[tokio::test]
    async fn command_without_count_omits_the_affected_suffix() {
        let api = FakeApi::with_command_reply(Ok(CommandReply::default()));
        let confirmer = ScriptedConfirm::new(true);

        let outcome = execute_command(&api, &confirmer, PanelCommand::Help)
            .await
            .unwrap();

        assert_eq!(
            outcome.notification.message,
            "Command \"help\" executed successfully"
        );
    }

    #[tokio::test]
    async fn server_reported_command_error_is_surfaced() {
        let api = FakeApi::with_command_reply(Ok(CommandReply {
            error: Some("Unknown command".to_string()),
            disconnected: None,
        }));
        let confirmer = ScriptedConfirm::new(true);

        let outcome = execute_command(&api, &confirmer, PanelCommand::ShowIps)
            .await
            .unwrap();

        assert_eq!(
            outcome.notification.message,
            "Failed to execute \"show_ips\": Unknown command"
        );
        assert!(outcome.refresh.is_empty());
    }

    #[test]
    fn command_names_round_trip_and_classify() {
        for name in ["show_ips", "help", "kill_switch", "stop"] {
            let command = PanelCommand::parse(name).unwrap();
            assert_eq!(command.wire_name(), name);
        }
        assert!(PanelCommand::parse("reboot").is_none());
        assert_eq!(PanelCommand::Stop.kind(), CommandKind::Destructive);
        assert_eq!(PanelCommand::KillSwitch.kind(), CommandKind::Destructive);
        assert_eq!(PanelCommand::ShowIps.kind(), CommandKind::Safe);
    }
}
