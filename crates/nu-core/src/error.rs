//! Errors raised while preparing a request for rewriting.
//!
//! These never reach the host: the orchestrator turns every one of them into
//! a pass-through.

use crate::types::SkipReason;

#[derive(Debug, thiserror::Error)]
pub enum CleanError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("URL has no hostname: {0}")]
    MissingHost(String),
}

impl CleanError {
    pub fn skip_reason(&self) -> SkipReason {
        match self {
            Self::InvalidUrl(_) => SkipReason::Unparsable,
            Self::MissingHost(_) => SkipReason::NoHost,
        }
    }
}
