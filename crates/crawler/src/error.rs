// ABOUTME: Error types for the DayBoard crawler including ErrorCode enum and CrawlError struct.
// ABOUTME: Provides categorized errors with convenience constructors and boolean helpers.

use std::fmt;

/// Error codes representing different categories of crawl failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidUrl,
    Transport,
    AuthFailed,
    EndpointNotFound,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidUrl => "invalid URL",
            ErrorCode::Transport => "transport error",
            ErrorCode::AuthFailed => "authentication failed",
            ErrorCode::EndpointNotFound => "data endpoint not found",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for crawl operations.
///
/// Only the session client, login sequencer, and endpoint resolver produce
/// these; the cookie jar, hidden-field extractor, and entry parser degrade
/// to empty results instead of raising.
#[derive(Debug, thiserror::Error)]
pub struct CrawlError {
    pub code: ErrorCode,
    pub url: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for CrawlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dayboard: {} {}: {}", self.op, self.url, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl CrawlError {
    /// Create an InvalidUrl error.
    pub fn invalid_url(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code: ErrorCode::InvalidUrl,
            url: url.into(),
            op: op.into(),
            source,
        }
    }

    /// Create a Transport error.
    pub fn transport(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code: ErrorCode::Transport,
            url: url.into(),
            op: op.into(),
            source,
        }
    }

    /// Create an AuthFailed error.
    pub fn auth_failed(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code: ErrorCode::AuthFailed,
            url: url.into(),
            op: op.into(),
            source,
        }
    }

    /// Create an EndpointNotFound error.
    pub fn endpoint_not_found(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code: ErrorCode::EndpointNotFound,
            url: url.into(),
            op: op.into(),
            source,
        }
    }

    /// Returns true if this is a Transport error.
    pub fn is_transport(&self) -> bool {
        self.code == ErrorCode::Transport
    }

    /// Returns true if this is an AuthFailed error.
    pub fn is_auth_failed(&self) -> bool {
        self.code == ErrorCode::AuthFailed
    }

    /// Returns true if this is an EndpointNotFound error.
    ///
    /// Callers should treat this as a stale-session signal and may re-run
    /// the login sequence once before giving up.
    pub fn is_endpoint_not_found(&self) -> bool {
        self.code == ErrorCode::EndpointNotFound
    }

    /// Returns true if this is an InvalidUrl error.
    pub fn is_invalid_url(&self) -> bool {
        self.code == ErrorCode::InvalidUrl
    }
}
