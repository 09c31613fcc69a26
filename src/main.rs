use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::error;
use tracing_subscriber::EnvFilter;

use server_panel::api::ApiClient;
use server_panel::config::Config;
use server_panel::dispatch::PanelCommand;
use server_panel::frontend::{PromptConfirm, TerminalFrontend};
use server_panel::panel::{Panel, PanelEvent};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load().await;

    let api = match ApiClient::connect(&config) {
        Ok(api) => api,
        Err(err) => {
            error!(error = ?err, "Failed to prepare API client");
            return;
        }
    };

    let (events_tx, events_rx) = mpsc::channel(16);
    let confirmer = PromptConfirm::new();
    tokio::spawn(read_operator_input(events_tx, confirmer.clone()));

    let panel = Panel::new(api, TerminalFrontend::new(), confirmer, &config);
    panel.run(events_rx).await;
}

/// Single stdin reader. Confirmation answers are routed back to a pending
/// prompt before anything is parsed as a command.
async fn read_operator_input(events: mpsc::Sender<PanelEvent>, confirmer: PromptConfirm) {
    print_usage();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if confirmer.answer_pending(&line) {
            continue;
        }
        match parse_line(&line) {
            Some(event) => {
                if events.send(event).await.is_err() {
                    return;
                }
            }
            None => {
                if !line.trim().is_empty() {
                    print_usage();
                }
            }
        }
    }

    // stdin closed; shut the panel down.
    let _ = events.send(PanelEvent::Shutdown).await;
}

fn parse_line(line: &str) -> Option<PanelEvent> {
    let mut parts = line.split_whitespace();
    match parts.next()? {
        "send" => {
            let target = parts.next()?.to_string();
            let content = parts.collect::<Vec<_>>().join(" ");
            Some(PanelEvent::SendMessage { target, content })
        }
        "cmd" => {
            let name = parts.next()?;
            match PanelCommand::parse(name) {
                Some(command) => Some(PanelEvent::RunCommand(command)),
                None => {
                    println!("Unknown command: {name}");
                    None
                }
            }
        }
        "logs" => Some(PanelEvent::RefreshLogs),
        "pause" => Some(PanelEvent::Hidden),
        "resume" => Some(PanelEvent::Visible),
        "quit" | "exit" => Some(PanelEvent::Shutdown),
        _ => None,
    }
}

fn print_usage() {
    println!("Commands:");
    println!("  send <target|all> <text>   send a message");
    println!("  cmd <show_ips|help|kill_switch|stop>");
    println!("  logs                       refresh the log snapshot");
    println!("  pause / resume             suspend or resume polling");
    println!("  quit                       exit");
}
