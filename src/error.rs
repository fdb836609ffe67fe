use thiserror::Error;

#[derive(Error, Debug)]
pub enum JenkinsError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected status code: {status}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("progressive log stalled at offset {start} (next offset {next})")]
    LogStalled { start: i64, next: i64 },

    #[error("Plugin install failed: {0}")]
    PluginInstall(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl JenkinsError {
    /// Status code carried by an [`JenkinsError::UnexpectedStatus`], if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, JenkinsError>;
