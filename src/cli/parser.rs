use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line interface definition for spond-attendance
/// CLI application to turn Spond attendance exports into tidy CSV tables
#[derive(Parser)]
#[command(
    name = "spond-attendance",
    version = env!("CARGO_PKG_VERSION"),
    about = "Merge Spond attendance exports into long-format attendance and per-session summary CSVs",
    long_about = None
)]
pub struct Cli {
    /// Use this configuration file instead of the default one
    #[arg(global = true, long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// More diagnostic output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(global = true, short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process new exports and rewrite the output tables
    Process {
        /// Directory containing spond_attendance_<mon>_<yy>.xlsx files
        input_dir: PathBuf,

        /// Output directory (default: `output_dir` from the configuration)
        #[arg(short = 'o', long = "output-dir")]
        output_dir: Option<PathBuf>,

        #[arg(long = "full-refresh", help = "Ignore saved state and reprocess every file")]
        full_refresh: bool,

        #[arg(long = "no-suggest", help = "Do not ask the suggester for unmapped session names")]
        no_suggest: bool,

        #[arg(
            long = "review",
            help = "Review suggestions interactively and save the approved ones",
            conflicts_with = "no_suggest"
        )]
        review: bool,

        /// Drop sessions on or after this date (YYYY-MM-DD, default: today)
        #[arg(long = "as-of", value_name = "DATE")]
        as_of: Option<String>,

        #[arg(long = "xlsx", help = "Also write the XLSX report")]
        xlsx: bool,
    },

    /// Show the files recorded as processed
    Status {
        #[arg(short = 'o', long = "output-dir")]
        output_dir: Option<PathBuf>,
    },

    /// Forget the processed files so the next run starts over
    Reset {
        #[arg(short = 'o', long = "output-dir")]
        output_dir: Option<PathBuf>,

        #[arg(short = 'y', long = "yes", help = "Do not ask for confirmation")]
        yes: bool,
    },

    /// Print the internal run log
    Log {
        #[arg(short = 'o', long = "output-dir")]
        output_dir: Option<PathBuf>,

        /// Number of entries to show
        #[arg(long = "limit", default_value_t = 50)]
        limit: usize,
    },

    /// Show the configuration in effect
    Config {
        #[arg(long = "print", help = "Print the effective configuration")]
        print_config: bool,
    },
}
