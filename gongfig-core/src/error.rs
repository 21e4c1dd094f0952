use thiserror::Error;

/// Unified error type for Gongfig.
///
/// Every failure below the binary is returned as a `SyncError`; only the
/// top-level handler decides to exit the process.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Request to admin API failed: {method} {url}: {reason}")]
    Transport {
        method: &'static str,
        url: String,
        reason: String,
    },

    #[error("Unexpected status {status} from {method} {url}{}", message_suffix(.message))]
    UnexpectedStatus {
        method: &'static str,
        url: String,
        status: u16,
        message: Option<String>,
    },

    #[error("Route {route} references unknown service {service}")]
    OrphanRoute { route: String, service: String },

    #[error("Cannot address nested {kind}: parent has neither a name nor an id")]
    MissingParent { kind: &'static str },

    #[error("Invalid admin URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to parse {path}: {reason}")]
    Document { path: String, reason: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal: {0}")]
    Internal(String),
}

fn message_suffix(message: &Option<String>) -> String {
    match message {
        Some(m) => format!(": {m}"),
        None => String::new(),
    }
}

impl SyncError {
    /// Map to a process exit status. Never zero.
    pub fn exit_code(&self) -> u8 {
        match self {
            SyncError::Transport { .. } => 2,
            SyncError::UnexpectedStatus { .. } => 3,
            SyncError::Document { .. } | SyncError::Io(_) | SyncError::Yaml(_) => 4,
            SyncError::Config(_) | SyncError::InvalidUrl { .. } => 5,
            _ => 1,
        }
    }

    /// The message the admin API attached to a rejected request, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            SyncError::UnexpectedStatus { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}
