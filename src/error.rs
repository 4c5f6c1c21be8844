//! Error types for the pop3-check crate.
//!
//! All errors implement [`std::error::Error`] and provide context about what went wrong.
//! Errors are categorized by their retryability - see [`Error::is_retryable`].

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// A step of the mailbox check script, used to give protocol errors context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Reading the unsolicited server greeting.
    Greeting,
    /// Sending `USER` and reading its acknowledgment.
    User,
    /// Sending `PASS` and reading its acknowledgment.
    Pass,
    /// Sending `LIST` and reading the message list.
    List,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Greeting => write!(f, "greeting"),
            Step::User => write!(f, "USER"),
            Step::Pass => write!(f, "PASS"),
            Step::List => write!(f, "LIST"),
        }
    }
}

/// Errors that can occur while checking a mailbox.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // Configuration / validation errors (NOT retryable)
    // ─────────────────────────────────────────────────────────────────────────
    /// Invalid configuration provided.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// The password file could not be read.
    #[error("unable to read password file {}", path.display())]
    PasswordFile {
        /// Path of the password file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Network / connection errors (RETRYABLE)
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to establish TCP connection.
    #[error("failed to connect to {target}")]
    TcpConnect {
        /// The target address that failed.
        target: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Connection timeout.
    #[error("connection timeout to {target} after {timeout:?}")]
    ConnectTimeout {
        /// The target address.
        target: String,
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// No line arrived within the per-read deadline.
    #[error("no line received within {timeout:?}")]
    ReadTimeout {
        /// The read deadline that was exceeded.
        timeout: Duration,
    },

    /// The server closed the connection.
    #[error("connection closed by server")]
    ConnectionClosed,

    /// Transport fault while reading a line.
    #[error("failed to read from connection")]
    Read {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Transport fault while writing a command.
    #[error("failed to write to connection")]
    Write {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Transport fault while flushing a command.
    #[error("failed to flush connection")]
    Flush {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // POP3 protocol errors (NOT retryable - the server answered, but wrongly)
    // ─────────────────────────────────────────────────────────────────────────
    /// The server response violated the expected shape.
    #[error("protocol error during {step}: {detail}")]
    Protocol {
        /// The script step that failed.
        step: Step,
        /// What was expected versus what was received.
        detail: String,
    },

    /// `USER` or `PASS` was not acknowledged with a single `+OK` line.
    #[error("{command} was not accepted (response: {})", response.as_deref().unwrap_or("<none>"))]
    Auth {
        /// The rejected command (`USER` or `PASS`).
        command: &'static str,
        /// The first response line, if any arrived.
        response: Option<String>,
    },

    /// A LIST entry line is not exactly two integers.
    #[error("unable to parse LIST line '{line}': {reason}")]
    ParseList {
        /// The offending line.
        line: String,
        /// Why the line was rejected.
        reason: String,
    },
}

impl Error {
    /// Returns `true` if this error represents a transient failure that might succeed on retry.
    ///
    /// The checker itself never retries; this is for callers that schedule checks.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            // RETRYABLE errors: network and transport faults
            Error::TcpConnect { .. }
            | Error::ConnectTimeout { .. }
            | Error::ReadTimeout { .. }
            | Error::ConnectionClosed
            | Error::Read { .. }
            | Error::Write { .. }
            | Error::Flush { .. } => true,

            // NOT retryable: config errors, rejected credentials, malformed replies
            Error::InvalidConfig { .. }
            | Error::PasswordFile { .. }
            | Error::Protocol { .. }
            | Error::Auth { .. }
            | Error::ParseList { .. } => false,
        }
    }

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidConfig { .. } | Error::PasswordFile { .. } => {
                ErrorCategory::Configuration
            }

            Error::TcpConnect { .. }
            | Error::ConnectionClosed
            | Error::Read { .. }
            | Error::Write { .. }
            | Error::Flush { .. } => ErrorCategory::Network,

            Error::ConnectTimeout { .. } | Error::ReadTimeout { .. } => ErrorCategory::Timeout,

            Error::Protocol { .. } => ErrorCategory::Protocol,

            Error::Auth { .. } => ErrorCategory::Authentication,

            Error::ParseList { .. } => ErrorCategory::Parse,
        }
    }
}

/// Error categories for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Configuration or validation errors.
    Configuration,
    /// Network connectivity errors.
    Network,
    /// Timeout errors.
    Timeout,
    /// POP3 protocol errors.
    Protocol,
    /// Rejected credentials.
    Authentication,
    /// Malformed LIST output.
    Parse,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Network => write!(f, "network"),
            ErrorCategory::Timeout => write!(f, "timeout"),
            ErrorCategory::Protocol => write!(f, "protocol"),
            ErrorCategory::Authentication => write!(f, "authentication"),
            ErrorCategory::Parse => write!(f, "parse"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        // Configuration errors are not retryable
        let err = Error::InvalidConfig {
            message: "host is required".into(),
        };
        assert!(!err.is_retryable());

        // Network errors are retryable
        let err = Error::TcpConnect {
            target: "pop.example.com:110".into(),
            source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
        };
        assert!(err.is_retryable());

        // A rejected password will be rejected again
        let err = Error::Auth {
            command: "PASS",
            response: Some("-ERR invalid password".into()),
        };
        assert!(!err.is_retryable());

        let err = Error::ParseList {
            line: "not-a-number".into(),
            reason: "expected two fields".into(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_error_categories() {
        let err = Error::ReadTimeout {
            timeout: Duration::from_secs(5),
        };
        assert_eq!(err.category(), ErrorCategory::Timeout);

        let err = Error::Protocol {
            step: Step::Greeting,
            detail: "invalid greeting".into(),
        };
        assert_eq!(err.category(), ErrorCategory::Protocol);

        assert_eq!(Error::ConnectionClosed.category(), ErrorCategory::Network);
    }

    #[test]
    fn test_display_includes_context() {
        let err = Error::Protocol {
            step: Step::Greeting,
            detail: "unexpected line count: expected 1, got 2".into(),
        };
        assert_eq!(
            err.to_string(),
            "protocol error during greeting: unexpected line count: expected 1, got 2"
        );

        let err = Error::Auth {
            command: "USER",
            response: None,
        };
        assert_eq!(err.to_string(), "USER was not accepted (response: <none>)");
    }
}
