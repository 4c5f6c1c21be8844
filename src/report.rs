//! Outcome of a mailbox check.
//!
//! [`Pop3Checker`](crate::Pop3Checker) returns a [`CheckReport`] instead of
//! logging as it goes; [`CheckReport::log`] is the adapter that turns the
//! report into diagnostics.

use std::fmt;
use tracing::{info, warn};

/// One message as listed by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MailboxEntry {
    /// Message number.
    pub id: u64,
    /// Message size in bytes.
    pub size: u64,
}

/// A threshold that the mailbox crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warning {
    /// A single message is larger than the warn size.
    OversizedMessage {
        /// Message number.
        id: u64,
        /// Message size in bytes.
        size: u64,
    },
    /// All messages together are larger than the quota.
    QuotaExceeded {
        /// Total size of all messages in bytes.
        total: u64,
        /// The configured quota in bytes.
        quota: u64,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::OversizedMessage { id, size } => {
                write!(f, "Message {id} has size {size}")
            }
            Warning::QuotaExceeded { total, .. } => {
                write!(f, "Mailbox has total used size: {total}")
            }
        }
    }
}

/// Result of one successful check run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    /// Parsed LIST entries in server order.
    pub entries: Vec<MailboxEntry>,
    /// Sum of all entry sizes.
    pub total_size: u64,
    /// Per-message threshold that was applied.
    pub warn_size: u64,
    /// Total-size threshold that was applied.
    pub quota: u64,
    /// Per-message warnings in server order, then the quota warning if any.
    pub warnings: Vec<Warning>,
}

impl CheckReport {
    /// Evaluates parsed entries against both thresholds.
    #[must_use]
    pub fn evaluate(entries: Vec<MailboxEntry>, warn_size: u64, quota: u64) -> Self {
        let mut warnings: Vec<Warning> = entries
            .iter()
            .filter(|entry| entry.size > warn_size)
            .map(|entry| Warning::OversizedMessage {
                id: entry.id,
                size: entry.size,
            })
            .collect();

        let total_size = entries
            .iter()
            .fold(0u64, |total, entry| total.saturating_add(entry.size));

        if total_size > quota {
            warnings.push(Warning::QuotaExceeded {
                total: total_size,
                quota,
            });
        }

        Self {
            entries,
            total_size,
            warn_size,
            quota,
            warnings,
        }
    }

    /// Number of messages in the mailbox.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no threshold was crossed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Emits every warning through `tracing`, plus a summary line.
    pub fn log(&self) {
        for warning in &self.warnings {
            match warning {
                Warning::OversizedMessage { id, size } => {
                    warn!(id, size, warn_size = self.warn_size, "Warning: {warning}");
                }
                Warning::QuotaExceeded { total, quota } => {
                    warn!(total, quota, "Warning: {warning}");
                }
            }
        }

        info!(
            messages = self.message_count(),
            total_size = self.total_size,
            warnings = self.warnings.len(),
            "Mailbox check complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(sizes: &[(u64, u64)]) -> Vec<MailboxEntry> {
        sizes
            .iter()
            .map(|&(id, size)| MailboxEntry { id, size })
            .collect()
    }

    #[test]
    fn test_oversized_message_and_total() {
        let mailbox = entries(&[(1, 1024), (2, 6_000_000)]);
        let report = CheckReport::evaluate(mailbox, 5_000_000, 7_000_000);

        assert_eq!(report.total_size, 6_001_024);
        assert_eq!(
            report.warnings,
            [Warning::OversizedMessage {
                id: 2,
                size: 6_000_000
            }]
        );
    }

    #[test]
    fn test_quota_exceeded() {
        let mailbox = entries(&[(1, 1024), (2, 6_000_000)]);
        let report = CheckReport::evaluate(mailbox, 5_000_000, 6_000_000);

        assert_eq!(report.warnings.len(), 2);
        assert_eq!(
            report.warnings[1],
            Warning::QuotaExceeded {
                total: 6_001_024,
                quota: 6_000_000
            }
        );
    }

    #[test]
    fn test_thresholds_are_exclusive() {
        let report = CheckReport::evaluate(entries(&[(1, 500), (2, 500)]), 500, 1000);

        assert!(report.is_clean());
        assert_eq!(report.total_size, 1000);
        assert_eq!(report.message_count(), 2);
    }

    #[test]
    fn test_empty_mailbox() {
        let report = CheckReport::evaluate(Vec::new(), 1, 1);

        assert!(report.is_clean());
        assert_eq!(report.total_size, 0);
    }

    #[test]
    fn test_total_saturates() {
        let mailbox = entries(&[(1, u64::MAX), (2, 1)]);
        let report = CheckReport::evaluate(mailbox, u64::MAX, u64::MAX - 1);

        assert_eq!(report.total_size, u64::MAX);
        assert!(matches!(
            report.warnings.as_slice(),
            [Warning::QuotaExceeded { .. }]
        ));
    }

    #[test]
    fn test_warning_display() {
        let warning = Warning::OversizedMessage {
            id: 2,
            size: 6_000_000,
        };
        assert_eq!(warning.to_string(), "Message 2 has size 6000000");

        let warning = Warning::QuotaExceeded {
            total: 6_001_024,
            quota: 6_000_000,
        };
        assert_eq!(warning.to_string(), "Mailbox has total used size: 6001024");
    }
}
