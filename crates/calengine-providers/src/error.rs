//! Fetch failures and their retry class.
//!
//! Every failure from a source is a [`ProviderError`]. Its [`ProviderErrorCode`]
//! falls in one of two classes: [`ErrorClass::Transient`] failures go back to
//! the retry loop, [`ErrorClass::Permanent`] ones stop the stream at once.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// Whether a failure may succeed on a later attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    Transient,
    Permanent,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Transient => "transient",
            Self::Permanent => "permanent",
        })
    }
}

/// What went wrong during a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    // Transient.
    /// Connection refused or reset, DNS failure.
    Network,
    /// No response within the HTTP timeout.
    Timeout,
    /// HTTP 429.
    RateLimited,
    /// HTTP 5xx.
    Server,
    /// A body that is not the JSON or iCalendar we asked for.
    InvalidResponse,
    Internal,

    // Permanent.
    /// Token missing, expired or rejected (HTTP 401).
    Authentication,
    /// Token lacks the scope (HTTP 403).
    Authorization,
    BadRequest,
    NotFound,
    /// Local setup is wrong: unreadable token file, bad feed URL.
    Configuration,
}

impl ProviderErrorCode {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Network
            | Self::Timeout
            | Self::RateLimited
            | Self::Server
            | Self::InvalidResponse
            | Self::Internal => ErrorClass::Transient,
            Self::Authentication
            | Self::Authorization
            | Self::BadRequest
            | Self::NotFound
            | Self::Configuration => ErrorClass::Permanent,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Transient
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::RateLimited => "rate limited",
            Self::Server => "server",
            Self::InvalidResponse => "invalid response",
            Self::Internal => "internal",
            Self::Authentication => "authentication",
            Self::Authorization => "authorization",
            Self::BadRequest => "bad request",
            Self::NotFound => "not found",
            Self::Configuration => "configuration",
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed fetch, tagged with the source name and, once the retry loop gives
/// up, how many attempts were made.
#[derive(Debug, Error)]
pub struct ProviderError {
    code: ProviderErrorCode,
    message: String,
    /// Source name, e.g. "google-people" or "holiday-feed".
    provider: Option<String>,
    attempts: Option<u32>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

macro_rules! constructors {
    ($($name:ident => $code:ident),* $(,)?) => {
        $(
            pub fn $name(message: impl Into<String>) -> Self {
                Self::new(ProviderErrorCode::$code, message)
            }
        )*
    };
}

impl ProviderError {
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider: None,
            attempts: None,
            source: None,
        }
    }

    constructors! {
        network => Network,
        timeout => Timeout,
        rate_limited => RateLimited,
        server => Server,
        invalid_response => InvalidResponse,
        internal => Internal,
        authentication => Authentication,
        authorization => Authorization,
        bad_request => BadRequest,
        not_found => NotFound,
        configuration => Configuration,
    }

    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    #[must_use]
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = Some(attempts);
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    pub fn class(&self) -> ErrorClass {
        self.code.class()
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    pub fn attempts(&self) -> Option<u32> {
        self.attempts
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.provider {
            Some(provider) => write!(f, "{provider}: {} error: {}", self.code, self.message)?,
            None => write!(f, "{} error: {}", self.code, self.message)?,
        }
        match self.attempts {
            Some(1) => f.write_str(" (1 attempt)"),
            Some(n) => write!(f, " ({n} attempts)"),
            None => Ok(()),
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_codes_are_retried() {
        for code in [
            ProviderErrorCode::Network,
            ProviderErrorCode::Timeout,
            ProviderErrorCode::RateLimited,
            ProviderErrorCode::Server,
            ProviderErrorCode::InvalidResponse,
            ProviderErrorCode::Internal,
        ] {
            assert_eq!(code.class(), ErrorClass::Transient, "{code}");
        }
    }

    #[test]
    fn permanent_codes_stop_at_once() {
        for code in [
            ProviderErrorCode::Authentication,
            ProviderErrorCode::Authorization,
            ProviderErrorCode::BadRequest,
            ProviderErrorCode::NotFound,
            ProviderErrorCode::Configuration,
        ] {
            assert!(!code.is_retryable(), "{code}");
        }
    }

    #[test]
    fn exhausted_fetch_reads_well() {
        let err = ProviderError::rate_limited("quota exceeded")
            .with_provider("google-tasks")
            .with_attempts(5);
        assert_eq!(err.to_string(), "google-tasks: rate limited error: quota exceeded (5 attempts)");
        assert_eq!(err.attempts(), Some(5));

        let once = ProviderError::server("502 bad gateway").with_attempts(1);
        assert_eq!(once.to_string(), "server error: 502 bad gateway (1 attempt)");
    }

    #[test]
    fn token_problem_keeps_io_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ProviderError::configuration("token file unreadable").with_source(io);
        assert_eq!(err.class(), ErrorClass::Permanent);
        assert!(err.provider().is_none());
        assert!(err.source().is_some());
    }
}
