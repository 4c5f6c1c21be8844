//! POP3 mailbox checker.
//!
//! The [`Pop3Checker`] runs one fixed protocol script against a POP3 server:
//!
//! 1. read the greeting
//! 2. `USER` / `PASS` authentication
//! 3. `LIST` the mailbox
//!
//! It then compares every message size, and the total, against the configured
//! thresholds. The connection is closed whether the script succeeds or not.
//!
//! # Example
//!
//! ```no_run
//! use pop3_check::{CheckConfig, Pop3Checker};
//!
//! # async fn example() -> pop3_check::Result<()> {
//! let config = CheckConfig::builder()
//!     .host("pop.example.com")
//!     .username("user")
//!     .password_file("/etc/pop3-check/password")
//!     .build()?;
//!
//! let report = Pop3Checker::new(config).check().await?;
//! for warning in &report.warnings {
//!     println!("{warning}");
//! }
//! # Ok(())
//! # }
//! ```

use crate::config::CheckConfig;
use crate::connection;
use crate::error::{Error, Result, Step};
use crate::report::{CheckReport, MailboxEntry};
use crate::session::{LineSession, Response};
use crate::terminator::Terminator;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, instrument, warn};

/// Runs mailbox checks for one configuration.
#[derive(Debug, Clone)]
pub struct Pop3Checker {
    config: CheckConfig,
}

impl Pop3Checker {
    /// Creates a checker. No connection is made until [`check`](Self::check).
    #[must_use]
    pub fn new(config: CheckConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration this checker runs with.
    #[must_use]
    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Connects to the configured server and checks the mailbox.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or any step of
    /// the protocol script fails. Nothing is retried.
    #[instrument(
        name = "Pop3Checker::check",
        skip_all,
        fields(
            host = %self.config.host,
            port = self.config.port,
            username = %self.config.username()
        )
    )]
    pub async fn check(&self) -> Result<CheckReport> {
        let config = &self.config;
        let target = config.server_address();

        chatter!(config.verbose, target = %target, "Connecting");

        let stream = connection::connect(&config.host, config.port, config.timeouts.connect)
            .await
            .inspect_err(|e| warn!(target = %target, error = %e, "Failed to connect"))?;

        match stream.peer_addr() {
            Ok(peer) => chatter!(config.verbose, target = %target, %peer, "Connected"),
            Err(_) => chatter!(config.verbose, target = %target, "Connected"),
        }

        self.check_stream(stream).await
    }

    /// Runs the protocol script over an already-connected stream.
    ///
    /// The stream is shut down before returning, on success and on failure.
    ///
    /// # Errors
    ///
    /// - [`Error::Protocol`] if the greeting is missing or malformed
    /// - [`Error::Auth`] if `USER` or `PASS` is not acknowledged
    /// - [`Error::ParseList`] if a LIST entry is not two integers
    /// - transport errors from the underlying [`LineSession`]
    pub async fn check_stream<S>(&self, stream: S) -> Result<CheckReport>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut session = LineSession::new(stream, self.config.timeouts.read, self.config.verbose);

        let result = self.run_script(&mut session).await;
        session.close().await;

        result
    }

    async fn run_script<S>(&self, session: &mut LineSession<S>) -> Result<CheckReport>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let config = &self.config;

        read_greeting(session).await?;
        acknowledge(session, Step::User, "USER", config.username()).await?;
        acknowledge(session, Step::Pass, "PASS", config.password()).await?;
        debug!("Authenticated");

        let response = list(session).await?;
        for line in response.lines() {
            chatter!(config.verbose, line = %line, "Read LIST line");
        }

        let entries = parse_list(response.lines())
            .inspect_err(|e| warn!(step = %Step::List, error = %e, "LIST line parse failure"))?;

        let report = CheckReport::evaluate(entries, config.warn_size, config.quota);
        chatter!(
            config.verbose,
            total_size = report.total_size,
            messages = report.message_count(),
            "Total size of mailbox"
        );

        Ok(report)
    }
}

/// Reads the greeting: exactly one line, starting with `+OK `.
async fn read_greeting<S>(session: &mut LineSession<S>) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let response = read_step(session, Step::Greeting, Terminator::OK).await?;

    if response.len() != 1 {
        return Err(protocol_error(
            Step::Greeting,
            format!("unexpected line count: expected 1, got {}", response.len()),
        ));
    }

    match response.first() {
        Some(line) if response.is_terminated() && line.starts_with("+OK ") => {
            debug!(greeting = %line, "Server greeting");
            Ok(())
        }
        line => Err(protocol_error(
            Step::Greeting,
            format!("invalid greeting: {}", line.unwrap_or_default()),
        )),
    }
}

/// Sends `command argument` and requires a single `+OK` line in reply.
///
/// A timeout or closed stream never counts as an acknowledgment.
async fn acknowledge<S>(
    session: &mut LineSession<S>,
    step: Step,
    command: &'static str,
    argument: &str,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    session
        .write_line(&format!("{command} {argument}"))
        .await
        .inspect_err(|e| warn!(step = %step, error = %e, "Login failure"))?;

    let response = read_step(session, step, Terminator::OK).await?;

    if response.len() != 1 || !response.is_terminated() {
        let error = Error::Auth {
            command,
            response: response.first().map(str::to_string),
        };
        warn!(
            step = %step,
            line_count = response.len(),
            end = ?response.end(),
            error = %error,
            "Unexpected response"
        );
        return Err(error);
    }

    Ok(())
}

/// Sends `LIST` and collects the reply up to the `.` line.
///
/// The reply is also complete when the server goes quiet or hangs up.
async fn list<S>(session: &mut LineSession<S>) -> Result<Response>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    session
        .write_line("LIST")
        .await
        .inspect_err(|e| warn!(step = %Step::List, error = %e, "Failed to send LIST"))?;

    let response = read_step(session, Step::List, Terminator::DOT).await?;

    if !response.is_terminated() {
        debug!(
            end = ?response.end(),
            line_count = response.len(),
            "LIST response ended without terminator"
        );
    }

    Ok(response)
}

async fn read_step<S>(
    session: &mut LineSession<S>,
    step: Step,
    terminator: Terminator,
) -> Result<Response>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    session
        .read_lines_until(terminator)
        .await
        .inspect_err(|e| warn!(step = %step, error = %e, "Error reading lines"))
}

fn protocol_error(step: Step, detail: String) -> Error {
    let error = Error::Protocol { step, detail };
    warn!(step = %step, error = %error, "Protocol error");
    error
}

/// Parses the lines of a LIST reply into mailbox entries.
///
/// A leading `+OK` status line and `.` terminator lines are skipped. Parsing
/// stops at the first malformed line.
pub(crate) fn parse_list(lines: &[String]) -> Result<Vec<MailboxEntry>> {
    lines
        .iter()
        .enumerate()
        .filter(|(index, line)| {
            let status = *index == 0 && line.starts_with("+OK");
            !status && line.as_str() != "."
        })
        .map(|(_, line)| parse_list_entry(line))
        .collect()
}

/// Parses `<id> <size>`.
fn parse_list_entry(line: &str) -> Result<MailboxEntry> {
    let parse_error = |reason: String| Error::ParseList {
        line: line.to_string(),
        reason,
    };

    let mut fields = line.split_whitespace();
    let (Some(id), Some(size), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(parse_error(
            "expected a message number and a size".to_string(),
        ));
    };

    let id: u64 = id
        .parse()
        .map_err(|e| parse_error(format!("invalid message number '{id}': {e}")))?;
    let size: u64 = size
        .parse()
        .map_err(|e| parse_error(format!("invalid size '{size}': {e}")))?;

    Ok(MailboxEntry { id, size })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|line| (*line).to_string()).collect()
    }

    #[test]
    fn test_parse_list_skips_status_and_terminator() {
        let reply = lines(&["+OK 2 messages", "1 1024", "2 6000000", "."]);
        let entries = parse_list(&reply).unwrap();

        assert_eq!(
            entries,
            [
                MailboxEntry { id: 1, size: 1024 },
                MailboxEntry {
                    id: 2,
                    size: 6_000_000
                }
            ]
        );
    }

    #[test]
    fn test_parse_list_without_status_line() {
        let entries = parse_list(&lines(&["1 500"])).unwrap();
        assert_eq!(entries, [MailboxEntry { id: 1, size: 500 }]);
    }

    #[test]
    fn test_parse_list_empty_mailbox() {
        assert!(parse_list(&lines(&["+OK 0 messages", "."])).unwrap().is_empty());
        assert!(parse_list(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_parse_list_stops_at_malformed_line() {
        let reply = lines(&["+OK", "1 100", "not-a-number", "3 x", "."]);
        let err = parse_list(&reply).unwrap_err();

        match err {
            Error::ParseList { line, .. } => assert_eq!(line, "not-a-number"),
            other => panic!("expected ParseList, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_list_only_skips_leading_status_line() {
        let err = parse_list(&lines(&["+OK", "1 100", "+OK", "."])).unwrap_err();
        assert!(matches!(err, Error::ParseList { .. }));
    }

    #[test]
    fn test_parse_entry_requires_exactly_two_integers() {
        assert!(parse_list_entry("1").is_err());
        assert!(parse_list_entry("1 2 3").is_err());
        assert!(parse_list_entry("1 -5").is_err());
        assert!(parse_list_entry("one 5").is_err());
        assert!(parse_list_entry("").is_err());
        assert_eq!(
            parse_list_entry("7\t 42").unwrap(),
            MailboxEntry { id: 7, size: 42 }
        );
    }

    #[test]
    fn test_parse_error_mentions_field() {
        let err = parse_list_entry("1 big").unwrap_err();
        assert!(err.to_string().contains("invalid size 'big'"));
        assert!(!err.is_retryable());
    }
}
