//! End-of-response detection for multi-line reads.
//!
//! A [`Terminator`] tells [`LineSession::read_lines_until`](crate::session::LineSession::read_lines_until)
//! when a response is complete without waiting for the read deadline. A read
//! timeout or a closed stream always ends collection as well.
//!
//! # Example
//!
//! ```
//! use pop3_check::Terminator;
//!
//! let ack = Terminator::Prefix("+OK");
//! assert!(ack.is_end("+OK POP3 server ready"));
//! assert!(!ack.is_end("-ERR go away"));
//!
//! let list_end = Terminator::Exact(".");
//! assert!(list_end.is_end("."));
//! assert!(!list_end.is_end("1 500"));
//! ```

/// Strategy deciding whether a received line ends a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    /// Stop on the first line starting with the given prefix.
    Prefix(&'static str),
    /// Stop on the first line equal to the given text.
    Exact(&'static str),
}

impl Terminator {
    /// Positive POP3 status indicator.
    pub const OK: Terminator = Terminator::Prefix("+OK");

    /// Multi-line response terminator.
    pub const DOT: Terminator = Terminator::Exact(".");

    /// Returns `true` if `line` completes the response.
    ///
    /// `line` is expected to be already stripped of its line terminator.
    #[must_use]
    pub fn is_end(&self, line: &str) -> bool {
        match self {
            Terminator::Prefix(prefix) => line.starts_with(prefix),
            Terminator::Exact(text) => line == *text,
        }
    }

    /// Returns a human-readable description used in logs.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Terminator::Prefix(prefix) => format!("line starting with '{prefix}'"),
            Terminator::Exact(text) => format!("line equal to '{text}'"),
        }
    }
}
