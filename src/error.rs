use thiserror::Error;

#[derive(Error, Debug)]
pub enum RangepilotError {
    #[error("Browser launch failed: {0}")]
    BrowserLaunchFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Session {0} is not active")]
    SessionNotActive(String),

    #[error("Session {0} is closing")]
    SessionClosing(String),

    #[error("Invalid {filter} value: {value}. Must be one of: {allowed}")]
    InvalidFilterValue {
        filter: &'static str,
        value: String,
        allowed: String,
    },

    #[error("Could not find or click the {control} control for '{value}'")]
    ControlNotFound { control: String, value: String },

    #[error("JavaScript execution failed: {0}")]
    JavaScriptError(String),

    #[error("CDP command failed: {0}")]
    CdpError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, RangepilotError>;
