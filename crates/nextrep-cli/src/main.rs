//! Nextrep CLI - a command-line client for the Nextrep social network.
//!
//! Reads the feed, publishes posts and replies, and manages profiles and
//! follows through the `nextrep-core` API client.

mod commands;
mod format;

use std::io;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use nextrep_core::{ApiClient, ApiError, Config};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::Command;

/// Log file name prefix inside the `--log-dir` directory
const LOG_FILE_PREFIX: &str = "nextrep.log";

#[derive(Debug, Parser)]
#[command(name = "nextrep", version, about = "Command-line client for the Nextrep social network")]
struct Cli {
    /// API base URL (overrides NEXTREP_API_BASE_URL and the config file)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, global = true)]
    log_dir: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Initialize the tracing subscriber for logging.
/// The returned guard flushes the log file when dropped.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    config.base_url_override = cli.base_url;

    let session = config.open_session_store()?;
    let api = ApiClient::from_config(&config, session)?;
    info!(base_url = api.base_url(), "Nextrep CLI starting");

    api.on_session_expired(|| {
        eprintln!("Your session has expired. Run `nextrep login` to sign in again.");
    });

    commands::run(&api, &mut config, cli.command).await
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_dir.as_deref());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<ApiError>() {
                Some(api_err) => {
                    eprintln!("Error: {} (status {})", api_err.message(), api_err.status())
                }
                None => eprintln!("Error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_feed_flags() {
        let cli = Cli::try_parse_from([
            "nextrep", "feed", "--search", "rust", "--order", "asc", "--limit", "5",
        ])
        .unwrap();
        match cli.command {
            Command::Feed(args) => {
                assert_eq!(args.search.as_deref(), Some("rust"));
                assert_eq!(args.order, Some(nextrep_core::SortOrder::Ascending));
                assert_eq!(args.limit, Some(5));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_base_url_after_subcommand() {
        let cli = Cli::try_parse_from(["nextrep", "logout", "--base-url", "http://api.test"]).unwrap();
        assert_eq!(cli.base_url.as_deref(), Some("http://api.test"));
    }

    #[test]
    fn test_parse_post_create_attachments() {
        let cli = Cli::try_parse_from([
            "nextrep", "post", "create", "Leg day", "Squats", "--attach", "a.png", "--attach",
            "b.png", "--public",
        ])
        .unwrap();
        match cli.command {
            Command::Post(commands::PostCommand::Create {
                title,
                attachments,
                public,
                ..
            }) => {
                assert_eq!(title, "Leg day");
                assert_eq!(attachments.len(), 2);
                assert!(public);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_reply_to_reply() {
        let cli = Cli::try_parse_from(["nextrep", "reply", "r1", "agreed", "--to-reply"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Reply { ref target_id, to_reply: true, .. } if target_id == "r1"
        ));
    }

    #[test]
    fn test_rejects_unknown_visibility() {
        assert!(Cli::try_parse_from(["nextrep", "visibility", "friends"]).is_err());
    }
}
