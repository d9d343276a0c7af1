//! Clients for the outbound services: the language model and places search.
//!
//! Every call goes through [`ExternalCallPool`], which bounds concurrency, caps each
//! attempt with a timeout and retries a transient failure once.

pub mod fence;
pub mod gemini;
pub mod places;
mod pool;

use std::time::Duration;

use thiserror::Error;

pub use gemini::{GeminiClient, LlmClient};
pub use places::{GooglePlacesClient, Place, PlacesSearch, TextSearch};
pub use pool::ExternalCallPool;

#[derive(Debug, Error)]
pub enum ExternalError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("empty response")]
    Empty,
    #[error("call pool closed")]
    PoolClosed,
}

impl ExternalError {
    /// Failures worth one more attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            ExternalError::Timeout(_) | ExternalError::Transport(_) => true,
            ExternalError::Status { status, .. } => *status == 429 || *status >= 500,
            ExternalError::Malformed(_) | ExternalError::Empty | ExternalError::PoolClosed => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        let status = |status| ExternalError::Status {
            service: "test",
            status,
            body: String::new(),
        };
        assert!(ExternalError::Timeout(Duration::from_secs(1)).is_transient());
        assert!(status(503).is_transient());
        assert!(status(429).is_transient());
        assert!(!status(400).is_transient());
        assert!(!status(403).is_transient());
        assert!(!ExternalError::Empty.is_transient());
        assert!(!ExternalError::Malformed("x".into()).is_transient());
    }
}
