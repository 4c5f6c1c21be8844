//! Configuration for a mailbox check.
//!
//! Use [`CheckConfigBuilder`] to create a configuration with sensible defaults:
//!
//! ```
//! use pop3_check::CheckConfig;
//!
//! let config = CheckConfig::builder()
//!     .host("pop.example.com")
//!     .username("user")
//!     .password("secret")
//!     .build()
//!     .expect("valid config");
//!
//! assert_eq!(config.server_address(), "pop.example.com:110");
//! ```

use crate::error::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Standard POP3 port.
pub const DEFAULT_PORT: u16 = 110;

/// Default per-message size (5 MiB) above which a warning is emitted.
pub const DEFAULT_WARN_SIZE: u64 = 5 * 1024 * 1024;

/// Default total mailbox size (10 MiB) above which a warning is emitted.
pub const DEFAULT_QUOTA: u64 = 10 * 1024 * 1024;

/// Configuration for checking one POP3 mailbox.
///
/// Create using [`CheckConfig::builder()`]. Immutable once built.
///
/// Note: The `password` field is stored as a [`SecretString`] to prevent
/// accidental logging of sensitive credentials.
#[derive(Clone)]
pub struct CheckConfig {
    /// POP3 server hostname.
    pub host: String,
    /// POP3 server port (default: 110).
    pub port: u16,
    username: String,
    password: SecretString,
    /// Per-message size in bytes above which a warning is emitted.
    pub warn_size: u64,
    /// Total mailbox size in bytes above which a warning is emitted.
    pub quota: u64,
    /// Log protocol traffic at `info` level instead of `debug`.
    pub verbose: bool,
    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
}

impl std::fmt::Debug for CheckConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("warn_size", &self.warn_size)
            .field("quota", &self.quota)
            .field("verbose", &self.verbose)
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

impl CheckConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> CheckConfigBuilder {
        CheckConfigBuilder::default()
    }

    /// Returns the POP3 username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password as a string slice.
    ///
    /// The password is intentionally not directly accessible to prevent accidental logging.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }

    /// Returns the full server address as "host:port".
    #[must_use]
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Timeout configuration.
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Timeout for establishing the TCP connection.
    pub connect: Duration,
    /// Deadline for each individual line read, armed afresh per line.
    pub read: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(30),
            read: Duration::from_secs(5),
        }
    }
}

/// Reads a password from a file.
///
/// Every line is trimmed of surrounding whitespace and the lines are joined
/// without separator, so a trailing newline never ends up in the password.
///
/// # Errors
///
/// Returns [`Error::PasswordFile`] if the file cannot be read and
/// [`Error::InvalidConfig`] if it holds no password.
pub fn load_password_file(path: impl AsRef<Path>) -> Result<SecretString> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| Error::PasswordFile {
        path: path.to_path_buf(),
        source,
    })?;

    let password: String = contents.lines().map(str::trim).collect();
    if password.is_empty() {
        return Err(Error::InvalidConfig {
            message: format!("password file {} is empty", path.display()),
        });
    }

    Ok(SecretString::from(password))
}

/// Builder for [`CheckConfig`].
#[derive(Debug, Default)]
pub struct CheckConfigBuilder {
    host: Option<String>,
    port: Option<u16>,
    username: Option<String>,
    password: Option<SecretString>,
    password_file: Option<PathBuf>,
    warn_size: Option<u64>,
    quota: Option<u64>,
    verbose: bool,
    timeouts: Option<TimeoutConfig>,
}

impl CheckConfigBuilder {
    /// Sets the POP3 server hostname (required).
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the POP3 server port.
    ///
    /// Default is 110.
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the username (required).
    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the password.
    ///
    /// Either this or [`password_file`](Self::password_file) is required.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::from(password.into()));
        self
    }

    /// Reads the password from a file during [`build()`](Self::build).
    ///
    /// An explicit [`password`](Self::password) takes precedence.
    #[must_use]
    pub fn password_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.password_file = Some(path.into());
        self
    }

    /// Sets the per-message warning size in bytes.
    #[must_use]
    pub fn warn_size(mut self, bytes: u64) -> Self {
        self.warn_size = Some(bytes);
        self
    }

    /// Sets the total mailbox warning size in bytes.
    #[must_use]
    pub fn quota(mut self, bytes: u64) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// Enables verbose protocol logging.
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Sets timeout configuration.
    #[must_use]
    pub fn timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = Some(timeouts);
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts
            .get_or_insert_with(TimeoutConfig::default)
            .connect = timeout;
        self
    }

    /// Sets the per-line read deadline.
    #[must_use]
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.get_or_insert_with(TimeoutConfig::default).read = timeout;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing or empty, a threshold is
    /// zero, or the password file cannot be read.
    pub fn build(self) -> Result<CheckConfig> {
        let host = required(self.host, "host")?;
        let username = required(self.username, "username")?;

        let password = match (self.password, self.password_file) {
            (Some(password), _) => password,
            (None, Some(path)) => load_password_file(path)?,
            (None, None) => {
                return Err(Error::InvalidConfig {
                    message: "password is required".into(),
                })
            }
        };
        if password.expose_secret().is_empty() {
            return Err(Error::InvalidConfig {
                message: "password must not be empty".into(),
            });
        }

        let warn_size = positive(self.warn_size.unwrap_or(DEFAULT_WARN_SIZE), "size")?;
        let quota = positive(self.quota.unwrap_or(DEFAULT_QUOTA), "quota")?;

        Ok(CheckConfig {
            host,
            port: self.port.unwrap_or(DEFAULT_PORT),
            username,
            password,
            warn_size,
            quota,
            verbose: self.verbose,
            timeouts: self.timeouts.unwrap_or_default(),
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        Some(_) => Err(Error::InvalidConfig {
            message: format!("{field} must not be empty"),
        }),
        None => Err(Error::InvalidConfig {
            message: format!("{field} is required"),
        }),
    }
}

fn positive(value: u64, field: &str) -> Result<u64> {
    if value == 0 {
        return Err(Error::InvalidConfig {
            message: format!("{field} must be larger than zero"),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "pop3-check-{}-{name}",
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_builder_minimal() {
        let config = CheckConfig::builder()
            .host("pop.example.com")
            .username("user")
            .password("secret")
            .build()
            .unwrap();

        assert_eq!(config.host, "pop.example.com");
        assert_eq!(config.username(), "user");
        assert_eq!(config.password(), "secret");
        assert_eq!(config.port, 110);
        assert_eq!(config.warn_size, 5_242_880);
        assert_eq!(config.quota, 10_485_760);
        assert!(!config.verbose);
        assert_eq!(config.timeouts.read, Duration::from_secs(5));
    }

    #[test]
    fn test_builder_full() {
        let config = CheckConfig::builder()
            .host("pop.example.com")
            .port(1110)
            .username("user")
            .password("secret")
            .warn_size(1000)
            .quota(2000)
            .verbose(true)
            .connect_timeout(Duration::from_secs(3))
            .read_timeout(Duration::from_secs(1))
            .build()
            .unwrap();

        assert_eq!(config.server_address(), "pop.example.com:1110");
        assert_eq!(config.warn_size, 1000);
        assert_eq!(config.quota, 2000);
        assert!(config.verbose);
        assert_eq!(config.timeouts.connect, Duration::from_secs(3));
        assert_eq!(config.timeouts.read, Duration::from_secs(1));
    }

    #[test]
    fn test_builder_missing_fields() {
        let result = CheckConfig::builder()
            .username("user")
            .password("secret")
            .build();
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));

        let result = CheckConfig::builder()
            .host("pop.example.com")
            .password("secret")
            .build();
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));

        let result = CheckConfig::builder()
            .host("pop.example.com")
            .username("user")
            .build();
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn test_builder_rejects_empty_values() {
        let result = CheckConfig::builder()
            .host("  ")
            .username("user")
            .password("secret")
            .build();
        assert!(result.is_err());

        let result = CheckConfig::builder()
            .host("pop.example.com")
            .username("user")
            .password("")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_rejects_zero_thresholds() {
        let base = || {
            CheckConfig::builder()
                .host("pop.example.com")
                .username("user")
                .password("secret")
        };

        assert!(base().warn_size(0).build().is_err());
        assert!(base().quota(0).build().is_err());
    }

    #[test]
    fn test_password_not_in_debug() {
        let config = CheckConfig::builder()
            .host("pop.example.com")
            .username("user")
            .password("super-secret-password")
            .build()
            .unwrap();

        let debug_str = format!("{config:?}");
        assert!(!debug_str.contains("super-secret-password"));
        assert!(debug_str.contains("[REDACTED]"));
    }

    #[test]
    fn test_password_file_lines_are_trimmed_and_joined() {
        let path = temp_file("joined", "  abc \r\ndef\n");
        let password = load_password_file(&path).unwrap();
        assert_eq!(password.expose_secret(), "abcdef");
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_builder_reads_password_file() {
        let path = temp_file("builder", "hunter2\n");
        let config = CheckConfig::builder()
            .host("pop.example.com")
            .username("user")
            .password_file(&path)
            .build()
            .unwrap();
        assert_eq!(config.password(), "hunter2");
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_empty_password_file() {
        let path = temp_file("empty", "\n  \n");
        let result = load_password_file(&path);
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_password_file() {
        let result = load_password_file("/nonexistent/pop3-check/password");
        assert!(matches!(result, Err(Error::PasswordFile { .. })));
    }
}
