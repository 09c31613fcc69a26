use thiserror::Error;

/// Errors surfaced by the panel backend. Nothing here is fatal: every
/// network-touching task catches these at its boundary and converts them
/// into visible panel state.
#[derive(Debug, Error)]
pub enum PanelError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("management API error: {0}")]
    Api(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
