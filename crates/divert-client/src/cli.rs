//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// divert - Hospital divert schedules in civil time
#[derive(Debug, Parser)]
#[command(name = "divert")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, global = true, env = "DIVERT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// IANA zone for civil input and output, overriding the config
    #[arg(long, global = true)]
    pub zone: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Expand a recurring daily schedule into occurrences
    Expand {
        /// First civil date of the schedule (YYYY-MM-DD)
        #[arg(long)]
        from: String,

        /// Last civil date of the schedule (YYYY-MM-DD)
        #[arg(long)]
        to: String,

        /// Daily start time (HH:MM)
        #[arg(long)]
        daily_start: String,

        /// Daily end time (HH:MM); at or before the start means overnight
        #[arg(long)]
        daily_end: String,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Build a single occurrence, open-ended unless an end is given
    Single {
        /// Civil start date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Civil start time (HH:MM)
        #[arg(long)]
        time: String,

        /// Civil end date (YYYY-MM-DD)
        #[arg(long, requires = "end_time")]
        end_date: Option<String>,

        /// Civil end time (HH:MM)
        #[arg(long, requires = "end_date")]
        end_time: Option<String>,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// List the day partitions to scan for a query window
    Partitions {
        /// Window start (RFC 3339 or "YYYY-MM-DD HH:MM" civil time); defaults to now
        #[arg(long)]
        start: Option<String>,

        /// Window end (RFC 3339 or civil time); defaults to the configured window length
        #[arg(long)]
        end: Option<String>,

        /// Days before the window start to include
        #[arg(long)]
        backfill: Option<u32>,
    },

    /// Format an instant as civil text
    Format {
        /// RFC 3339 timestamp or epoch milliseconds
        instant: String,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Report metadata; when a hospital is given, store payloads are printed.
#[derive(Debug, Clone, Args)]
pub struct ReportArgs {
    /// Hospital identifier
    #[arg(long)]
    pub hospital: Option<String>,

    /// Divert kind (full, ct, labs-xray, other)
    #[arg(long, default_value = "full")]
    pub kind: String,

    /// Free-text notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Uid of the reporting user
    #[arg(long)]
    pub reporter_uid: Option<String>,
}

/// Configuration subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration file
    Validate,

    /// Show configuration file path
    Path,
}
