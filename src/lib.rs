//! # pop3-check
//!
//! Async POP3 mailbox monitor that warns about oversized messages and quota pressure.
//!
//! Some mail fetchers (webmail services polling a POP3 box, for example) refuse to
//! download messages above a certain size. Those messages then pile up on the server
//! until the mailbox is full and new mail bounces. This crate connects to the mailbox,
//! lists its messages and reports:
//!
//! - every message larger than a warn size
//! - a total mailbox size larger than a quota
//!
//! It only reads the message list: no message is retrieved or deleted.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pop3_check::{CheckConfig, Pop3Checker};
//!
//! # async fn example() -> pop3_check::Result<()> {
//! let config = CheckConfig::builder()
//!     .host("pop.example.com")
//!     .username("user")
//!     .password("secret")
//!     .warn_size(5 * 1024 * 1024)
//!     .quota(10 * 1024 * 1024)
//!     .build()?;
//!
//! let report = Pop3Checker::new(config).check().await?;
//! println!("{} messages, {} bytes", report.message_count(), report.total_size);
//! report.log();
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All errors implement `std::error::Error` and provide context. Use [`Error::is_retryable`]
//! to tell transport hiccups from a misconfigured or misbehaving server:
//!
//! ```
//! use pop3_check::Error;
//!
//! fn handle_error(error: &Error) {
//!     if error.is_retryable() {
//!         println!("Transient error, check again later: {}", error);
//!     } else {
//!         println!("Permanent error ({}): {}", error.category(), error);
//!     }
//! }
//! ```
//!
//! ## Observability
//!
//! The crate uses `tracing` for instrumentation.
//!
//! ### Span Naming Convention
//!
//! - `Pop3Checker::check` - One full check run
//! - `connection::connect` - TCP connection
//! - `session::read_lines_until` - Collecting one server response
//!
//! ### Standard Fields
//!
//! - `host` / `port` - POP3 server
//! - `username` - POP3 account
//! - `step` - Protocol step (`greeting`, `USER`, `PASS`, `LIST`)
//!
//! With [`CheckConfig::verbose`] set, protocol traffic is logged at `info`
//! instead of `debug`. Passwords are never logged.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Logs at `info` when verbose output is enabled, `debug` otherwise.
macro_rules! chatter {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            tracing::info!($($arg)+)
        } else {
            tracing::debug!($($arg)+)
        }
    };
}

// Public modules
pub mod config;
pub mod error;
pub mod report;
pub mod session;
pub mod terminator;

// Internal modules
mod checker;
mod connection;

// Re-exports for ergonomic API
pub use checker::Pop3Checker;
pub use config::{load_password_file, CheckConfig, CheckConfigBuilder, TimeoutConfig};
pub use error::{Error, ErrorCategory, Result, Step};
pub use report::{CheckReport, MailboxEntry, Warning};
pub use session::{LineSession, Response, ResponseEnd};
pub use terminator::Terminator;
