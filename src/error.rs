use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("No active browser session found for ID: {0}")]
    SessionNotFound(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Form has {inputs} inputs but {supplied} values were supplied")]
    InputCountMismatch { inputs: usize, supplied: usize },

    #[error("Browser launch failed: {0}")]
    LaunchError(String),

    #[error("Navigation failed: {0}")]
    NavigationError(String),

    #[error("JavaScript error: {0}")]
    JsError(String),

    #[error("Screenshot failed: {0}")]
    ScreenshotError(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("CDP error: {0}")]
    CdpError(#[from] chromiumoxide::error::CdpError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Coarse error category reported back to the orchestration runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SessionNotFound,
    ElementNotFound,
    Timeout,
    InvalidInput,
    Browser,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::SessionNotFound => "session_not_found",
            ErrorKind::ElementNotFound => "element_not_found",
            ErrorKind::Timeout => "timeout",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Browser => "browser",
        }
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::SessionNotFound(_) => ErrorKind::SessionNotFound,
            Error::ElementNotFound(_) => ErrorKind::ElementNotFound,
            Error::Timeout(_) => ErrorKind::Timeout,
            Error::InputCountMismatch { .. }
            | Error::InvalidArguments(_)
            | Error::UnknownTool(_) => ErrorKind::InvalidInput,
            _ => ErrorKind::Browser,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
