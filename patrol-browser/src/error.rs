use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("CDP error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),

    #[error("No element matches selector: {0}")]
    ElementNotFound(String),

    #[error("Timed out after {timeout_ms}ms waiting for {what}")]
    Timeout { what: String, timeout_ms: u64 },

    #[error("JavaScript evaluation failed: {0}")]
    Js(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl BrowserError {
    pub fn timeout(what: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            what: what.into(),
            timeout_ms,
        }
    }
}
