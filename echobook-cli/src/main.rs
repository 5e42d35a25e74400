//! echobook command-line entry point

use anyhow::Result;
use clap::Parser;
use echobook_cli::commands::{CommandContext, Commands};
use echobook_cli::config::CliConfig;
use std::path::PathBuf;
use std::process::ExitCode;

/// Turn a marked-up book into sentence records, translations and narration
#[derive(Debug, Parser)]
#[command(name = "echobook", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (default: ./echobook.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Suppress progress output and warnings
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Increase verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Initialize logging based on verbosity level
    fn init_logging(&self) {
        let log_level = if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        };

        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
            .init();
    }

    fn run(&self) -> Result<()> {
        self.init_logging();
        log::debug!("Arguments: {self:?}");

        let config = CliConfig::load(self.config.as_deref())?;
        let context = CommandContext {
            config,
            quiet: self.quiet,
        };
        self.command.execute(&context)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
