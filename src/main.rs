//! Command-line entry point.
//!
//! ```bash
//! pop3-check --host pop.example.com --user alice --password-file ~/.pop3-password
//! ```
//!
//! Warnings are logged to stderr. The exit code is 0 when the check ran
//! (whether or not it produced warnings) and 1 when the configuration is
//! invalid or any protocol step failed.

use clap::Parser;
use pop3_check::{config, CheckConfig, Pop3Checker};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Warn about large messages and mailbox size in a POP3 mailbox.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// POP3 server host.
    #[arg(long)]
    host: String,

    /// POP3 username.
    #[arg(long)]
    user: String,

    /// File holding the POP3 password.
    #[arg(long)]
    password_file: PathBuf,

    /// Message size (bytes) above which to warn.
    #[arg(long, default_value_t = config::DEFAULT_WARN_SIZE)]
    size: u64,

    /// Total size (bytes) of all messages above which to warn. This catches a
    /// mailbox approaching its quota through many smaller messages.
    #[arg(long, default_value_t = config::DEFAULT_QUOTA)]
    quota: u64,

    /// Log protocol traffic.
    #[arg(long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "pop3_check=debug"
    } else {
        "pop3_check=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match CheckConfig::builder()
        .host(cli.host)
        .username(cli.user)
        .password_file(cli.password_file)
        .warn_size(cli.size)
        .quota(cli.quota)
        .verbose(cli.verbose)
        .build()
    {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    match Pop3Checker::new(config).check().await {
        Ok(report) => {
            report.log();
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(
                error = %e,
                category = %e.category(),
                retryable = e.is_retryable(),
                "Mailbox check failed"
            );
            ExitCode::FAILURE
        }
    }
}
