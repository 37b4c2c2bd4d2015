//! divert CLI entry point.

use std::io::Write;
use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use divert_core::{TracingConfig, TracingOutputFormat, init_tracing};
use tracing::Level;

use divert_client::cli::{Cli, Command, ConfigAction};
use divert_client::commands::{self, Context};
use divert_client::config::ClientConfig;
use divert_client::error::{ClientError, ClientResult};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> ClientResult<()> {
    // Load configuration
    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let config = if cli.config.is_some() {
        ClientConfig::load_from(&config_path).map_err(ClientError::Config)?
    } else {
        ClientConfig::load().map_err(ClientError::Config)?
    };

    // Initialize tracing
    let tracing_config = if cli.debug || config.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::default()
            .with_level(Level::WARN)
            .with_format(TracingOutputFormat::Compact)
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    // Config commands must work even when the configured zone is broken.
    if let Command::Config { action } = &cli.command {
        return match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path, &mut out),
            ConfigAction::Validate => commands::config::validate(&config, &mut out),
            ConfigAction::Path => commands::config::path(&config_path, &mut out),
        };
    }

    let ctx = Context::new(config, cli.zone.as_deref(), cli.json)?;
    match cli.command {
        Command::Expand {
            from,
            to,
            daily_start,
            daily_end,
            report,
        } => commands::schedule::expand(
            &ctx,
            &mut out,
            &from,
            &to,
            &daily_start,
            &daily_end,
            &report,
        )?,
        Command::Single {
            date,
            time,
            end_date,
            end_time,
            report,
        } => commands::schedule::single(
            &ctx,
            &mut out,
            &date,
            &time,
            end_date.as_deref(),
            end_time.as_deref(),
            &report,
        )?,
        Command::Partitions {
            start,
            end,
            backfill,
        } => commands::query::partitions(
            &ctx,
            &mut out,
            start.as_deref(),
            end.as_deref(),
            backfill,
            Utc::now(),
        )?,
        Command::Format { instant } => commands::query::format(&ctx, &mut out, &instant)?,
        Command::Config { .. } => {}
    }

    out.flush()?;
    Ok(())
}
