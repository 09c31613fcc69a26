use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, Interval};
use tracing::{debug, warn};

use crate::api::ManagementApi;
use crate::config::Config;
use crate::dispatch::{self, Confirm, DispatchOutcome, PanelCommand};
use crate::normalize::{normalize_client_list, normalize_logs, ClientListOutcome};
use crate::notify::{Notification, Notifier};
use crate::scheduler::{PollScheduler, RefreshPlan};
use crate::state::StateStore;

use crate::frontend::Frontend;

/// Operator and visibility events fed into the panel loop.
#[derive(Debug)]
pub enum PanelEvent {
    SendMessage { target: String, content: String },
    RunCommand(PanelCommand),
    RefreshLogs,
    /// Hosting view became hidden; polling pauses.
    Hidden,
    /// Hosting view became visible again; polling resumes.
    Visible,
    Shutdown,
}

/// The panel loop. Owns the state store and multiplexes interval ticks,
/// operator events and the notification dismissal deadline on one task, so
/// every state write happens here and no locking is needed.
pub struct Panel<A, F, C> {
    api: A,
    frontend: F,
    confirmer: C,
    store: StateStore,
    notifier: Notifier,
    scheduler: PollScheduler,
    poll_interval: Duration,
}

impl<A, F, C> Panel<A, F, C>
where
    A: ManagementApi,
    F: Frontend,
    C: Confirm,
{
    pub fn new(api: A, frontend: F, confirmer: C, config: &Config) -> Self {
        Self {
            api,
            frontend,
            confirmer,
            store: StateStore::new(),
            notifier: Notifier::new(Duration::from_secs(config.notification_ttl_secs)),
            scheduler: PollScheduler::new(),
            poll_interval: Duration::from_secs(config.poll_interval_secs),
        }
    }

    /// Run until the event channel closes or a shutdown event arrives.
    /// Starts with one unconditional poll of status, clients and logs.
    pub async fn run(mut self, mut events: mpsc::Receiver<PanelEvent>) {
        self.refresh(RefreshPlan::STARTUP).await;
        self.push_snapshot().await;

        let mut ticker = Some(self.new_ticker());

        loop {
            let step = tokio::select! {
                _ = next_tick(&mut ticker) => LoopStep::Tick,
                _ = dismissal_due(self.notifier.deadline()) => LoopStep::Dismiss,
                event = events.recv() => LoopStep::Event(event),
            };

            match step {
                LoopStep::Tick => {
                    let plan = self.scheduler.on_tick();
                    if !plan.is_empty() {
                        self.refresh(plan).await;
                        self.push_snapshot().await;
                    }
                }
                LoopStep::Dismiss => {
                    if self.notifier.dismiss_if_due(Instant::now()) {
                        self.push_snapshot().await;
                    }
                }
                LoopStep::Event(None) => break,
                LoopStep::Event(Some(event)) => {
                    if !self.handle_event(event, &mut ticker).await {
                        break;
                    }
                }
            }
        }
    }

    async fn handle_event(&mut self, event: PanelEvent, ticker: &mut Option<Interval>) -> bool {
        match event {
            PanelEvent::Hidden => {
                debug!("View hidden, pausing polls");
                self.scheduler.on_hidden();
                *ticker = None;
            }
            PanelEvent::Visible => {
                let plan = self.scheduler.on_visible();
                if !plan.is_empty() {
                    debug!("View visible, resuming polls");
                    *ticker = Some(self.new_ticker());
                    self.refresh(plan).await;
                    self.push_snapshot().await;
                }
            }
            PanelEvent::RefreshLogs => {
                self.refresh(RefreshPlan::LOGS_ONLY).await;
                self.push_snapshot().await;
            }
            PanelEvent::SendMessage { target, content } => {
                let outcome = dispatch::send_message(&self.api, &target, &content).await;
                self.finish_dispatch(outcome).await;
            }
            PanelEvent::RunCommand(command) => {
                if let Some(outcome) =
                    dispatch::execute_command(&self.api, &self.confirmer, command).await
                {
                    self.finish_dispatch(outcome).await;
                }
            }
            PanelEvent::Shutdown => return false,
        }
        true
    }

    async fn finish_dispatch(&mut self, outcome: DispatchOutcome) {
        if outcome.clear_input {
            self.frontend.clear_message_input().await;
        }
        self.notifier.show(outcome.notification);
        if !outcome.refresh.is_empty() {
            self.refresh(outcome.refresh).await;
        }
        self.push_snapshot().await;
    }

    /// Execute one refresh pass. Each fetch is caught at this boundary and
    /// converted to panel state; nothing propagates further.
    async fn refresh(&mut self, plan: RefreshPlan) {
        if plan.status {
            match self.api.fetch_status().await {
                Ok(status) => self.store.apply_status(&status),
                Err(err) => {
                    warn!(error = ?err, "Failed to update status");
                    self.store.apply_status_failure();
                    self.notifier
                        .show(Notification::error("Failed to connect to API server"));
                }
            }
        }

        if plan.clients {
            match self.api.fetch_clients().await {
                Ok(body) => self.store.apply_clients(normalize_client_list(&body)),
                Err(err) => {
                    warn!(error = ?err, "Failed to refresh clients");
                    self.store
                        .apply_clients(ClientListOutcome::error("Error loading clients"));
                }
            }
        }

        if plan.logs {
            let response = self.api.fetch_logs().await;
            if let Err(err) = &response {
                warn!(error = ?err, "Failed to refresh logs");
            }
            self.store.apply_logs(normalize_logs(response));
        }
    }

    async fn push_snapshot(&mut self) {
        let snapshot = self.store.snapshot(self.notifier.current());
        self.frontend.render(&snapshot).await;
    }

    fn new_ticker(&self) -> Interval {
        // First tick is deferred a full period; startup and resume already
        // poll immediately.
        time::interval_at(Instant::now() + self.poll_interval, self.poll_interval)
    }
}

enum LoopStep {
    Tick,
    Dismiss,
    Event(Option<PanelEvent>),
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn dismissal_due(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
