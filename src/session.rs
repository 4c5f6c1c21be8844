//! Line-oriented POP3 transport.
//!
//! [`LineSession`] wraps an already-connected byte stream and exchanges
//! CRLF-terminated text lines over it. Every line read gets its own deadline.
//! Multi-line responses are collected with [`LineSession::read_lines_until`],
//! which ends on a [`Terminator`] match, on a read timeout, or when the peer
//! closes the stream.
//!
//! # Example
//!
//! ```
//! use pop3_check::{LineSession, Terminator};
//! use std::time::Duration;
//! use tokio::io::AsyncWriteExt;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> pop3_check::Result<()> {
//! let (client, mut server) = tokio::io::duplex(256);
//! server.write_all(b"+OK POP3 ready\r\n").await.unwrap();
//!
//! let mut session = LineSession::new(client, Duration::from_secs(5), false);
//! let greeting = session.read_lines_until(Terminator::OK).await?;
//! assert_eq!(greeting.lines(), ["+OK POP3 ready"]);
//!
//! session.close().await;
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use crate::terminator::Terminator;
use std::borrow::Cow;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, instrument, warn};

/// Line terminator appended to every outgoing line.
const CRLF: &str = "\r\n";

/// How a multi-line read came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseEnd {
    /// A line satisfied the [`Terminator`]; it is the last collected line.
    Terminator,
    /// No further line arrived within the read deadline.
    Timeout,
    /// The peer closed the stream.
    Closed,
}

/// Lines collected during one [`LineSession::read_lines_until`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    lines: Vec<String>,
    end: ResponseEnd,
}

impl Response {
    /// Returns the collected lines in arrival order.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Consumes the response, returning its lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// Returns how collection ended.
    #[must_use]
    pub fn end(&self) -> ResponseEnd {
        self.end
    }

    /// Returns `true` if collection stopped on a terminator match.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.end == ResponseEnd::Terminator
    }

    /// Number of collected lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` if no line was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the first collected line, if any.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.lines.first().map(String::as_str)
    }
}

/// Line-level transport over one exclusively owned stream.
///
/// No operation is retried; every failure is returned to the caller.
pub struct LineSession<S> {
    stream: Option<BufReader<S>>,
    // Bytes of a line whose read was cut short by the deadline.
    pending: Vec<u8>,
    read_timeout: Duration,
    verbose: bool,
}

impl<S> LineSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps an established connection. No I/O is performed.
    pub fn new(stream: S, read_timeout: Duration, verbose: bool) -> Self {
        Self {
            stream: Some(BufReader::new(stream)),
            pending: Vec::new(),
            read_timeout,
            verbose,
        }
    }

    /// Returns the per-line read deadline.
    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.stream.is_none()
    }

    /// Reads one line, stripped of its terminator and surrounding whitespace.
    ///
    /// The deadline is measured from this call, not from the session start.
    ///
    /// # Errors
    ///
    /// - [`Error::ReadTimeout`] if no complete line arrives in time
    /// - [`Error::ConnectionClosed`] on end of stream (a trailing partial line is dropped)
    /// - [`Error::Read`] on any other transport fault
    pub async fn read_line(&mut self) -> Result<String> {
        let timeout = self.read_timeout;
        let stream = self.stream.as_mut().ok_or(Error::ConnectionClosed)?;

        // read_until appends to `pending`, so a line cut short by the deadline
        // is completed by the next call instead of being lost.
        let line = stream.read_until(b'\n', &mut self.pending);
        let read = tokio::time::timeout(timeout, line).await;

        match read {
            Err(_) => Err(Error::ReadTimeout { timeout }),
            Ok(Err(source)) => {
                debug!(error = %source, "Read failure");
                Err(Error::Read { source })
            }
            Ok(Ok(_)) => {
                if self.pending.last() != Some(&b'\n') {
                    if !self.pending.is_empty() {
                        debug!(
                            partial_len = self.pending.len(),
                            "Discarding unterminated line at end of stream"
                        );
                    }
                    self.pending.clear();
                    return Err(Error::ConnectionClosed);
                }

                let line = String::from_utf8_lossy(&self.pending).trim().to_string();
                self.pending.clear();
                Ok(line)
            }
        }
    }

    /// Reads lines until one satisfies `terminator`, the deadline passes, or the peer closes.
    ///
    /// The terminating line is included. A timeout or closed stream is a normal
    /// end: the lines collected so far are returned and [`Response::end`] says
    /// which condition stopped collection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Read`] on a transport fault; collected lines are discarded.
    #[instrument(
        name = "session::read_lines_until",
        skip(self, terminator),
        fields(terminator = %terminator.description())
    )]
    pub async fn read_lines_until(&mut self, terminator: Terminator) -> Result<Response> {
        let mut lines = Vec::new();

        let end = loop {
            match self.read_line().await {
                Ok(line) => {
                    let done = terminator.is_end(&line);
                    lines.push(line);
                    if done {
                        break ResponseEnd::Terminator;
                    }
                }
                Err(Error::ReadTimeout { .. }) => break ResponseEnd::Timeout,
                Err(Error::ConnectionClosed) => break ResponseEnd::Closed,
                Err(e) => {
                    warn!(error = %e, collected = lines.len(), "Read error");
                    return Err(e);
                }
            }
        };

        debug!(line_count = lines.len(), ?end, "Response collected");

        Ok(Response { lines, end })
    }

    /// Writes `line` followed by CRLF and flushes before returning.
    ///
    /// In verbose mode the line is logged before the write is attempted;
    /// `PASS` arguments are redacted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] or [`Error::Flush`] on a transport fault and
    /// [`Error::ConnectionClosed`] if the session was closed.
    pub async fn write_line(&mut self, line: &str) -> Result<()> {
        chatter!(self.verbose, line = %redact(line), "Writing line");

        let stream = self.stream.as_mut().ok_or(Error::ConnectionClosed)?;

        let mut data = String::with_capacity(line.len() + CRLF.len());
        data.push_str(line);
        data.push_str(CRLF);

        stream.write_all(data.as_bytes()).await.map_err(|source| {
            warn!(error = %source, "Failure writing");
            Error::Write { source }
        })?;

        stream.flush().await.map_err(|source| {
            warn!(error = %source, "Flush error");
            Error::Flush { source }
        })
    }

    /// Releases the connection. Safe to call more than once; errors are suppressed.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                debug!(error = %e, "Ignoring error while closing connection");
            }
        }
        self.pending.clear();
    }
}

impl<S> std::fmt::Debug for LineSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineSession")
            .field("open", &self.stream.is_some())
            .field("pending_bytes", &self.pending.len())
            .field("read_timeout", &self.read_timeout)
            .field("verbose", &self.verbose)
            .finish()
    }
}

/// Hides the argument of a `PASS` command.
fn redact(line: &str) -> Cow<'_, str> {
    match line.get(..5) {
        Some(command) if command.eq_ignore_ascii_case("PASS ") => {
            Cow::Owned(format!("{command}[REDACTED]"))
        }
        _ => Cow::Borrowed(line),
    }
}
