//! Failure classification.
//!
//! Errors are mapped onto an [`ErrorKind`] by a case-insensitive substring scan of their
//! `Display` text. Rules are checked top-down and the first match wins, so a message that
//! mentions both a timeout and a `404` is a timeout.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Boxed failure kept as the cause of a [`ClassifiedError`].
pub type BoxError = Arc<dyn StdError + Send + Sync + 'static>;

/// Failure taxonomy used to decide retryability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Timeout,
    ConnectionFailed,
    ServerError,
    RateLimited,
    PermanentFailure,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::ConnectionFailed => "connection_failed",
            ErrorKind::ServerError => "server_error",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::PermanentFailure => "permanent_failure",
            ErrorKind::Unknown => "unknown",
        }
    }

    /// Only permanent failures stop the retry loop early.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ErrorKind::PermanentFailure)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct Rule {
    needles: &'static [&'static str],
    kind: ErrorKind,
    prefix: &'static str,
}

const RULES: &[Rule] = &[
    Rule { needles: &["timeout", "timed out"], kind: ErrorKind::Timeout, prefix: "Timeout" },
    Rule {
        needles: &[
            "net::err_failed",
            "connection failed",
            "econnrefused",
            "econnreset",
            "network error",
        ],
        kind: ErrorKind::ConnectionFailed,
        prefix: "Connection failed",
    },
    Rule {
        needles: &["500", "502", "503", "504", "server error"],
        kind: ErrorKind::ServerError,
        prefix: "Server error",
    },
    Rule {
        needles: &["429", "too many requests", "rate limit"],
        kind: ErrorKind::RateLimited,
        prefix: "Rate limited",
    },
    Rule {
        needles: &["401", "403", "unauthorized", "forbidden"],
        kind: ErrorKind::PermanentFailure,
        prefix: "Auth error",
    },
    Rule {
        needles: &["404", "not found", "video not available"],
        kind: ErrorKind::PermanentFailure,
        prefix: "Not found",
    },
    Rule {
        needles: &["login required", "sign in"],
        kind: ErrorKind::PermanentFailure,
        prefix: "Login required",
    },
    Rule { needles: &["unplayable"], kind: ErrorKind::PermanentFailure, prefix: "Unplayable" },
];

/// Kind and message prefix for a raw error message.
fn lookup(message: &str) -> (ErrorKind, &'static str) {
    let lowered = message.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.needles.iter().any(|needle| lowered.contains(needle)))
        .map(|rule| (rule.kind, rule.prefix))
        .unwrap_or((ErrorKind::Unknown, "Unknown error"))
}

/// Classify a bare message without keeping a cause.
pub fn classify_message(message: &str) -> ErrorKind {
    lookup(message).0
}

/// A failure annotated with its kind and retryability.
#[derive(Debug, Clone)]
pub struct ClassifiedError {
    message: String,
    kind: ErrorKind,
    retryable: bool,
    cause: BoxError,
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for ClassifiedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.cause.as_ref())
    }
}

impl ClassifiedError {
    /// Classify an error, keeping it as the cause.
    pub fn classify<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::from_cause(Arc::new(error))
    }

    /// Classify an already shared error.
    pub fn from_cause(cause: BoxError) -> Self {
        let raw = cause.to_string();
        let (kind, prefix) = lookup(&raw);
        Self { message: format!("{prefix}: {raw}"), kind, retryable: kind.is_retryable(), cause }
    }

    /// Human-readable message, prefixed with the failure category.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    /// The original error that was classified.
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.cause.as_ref()
    }
}
