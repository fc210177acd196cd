// gamestock CLI - link game catalogs to ratings and publisher stock history

mod exit_codes;
mod logger;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};

use exit_codes::EXIT_SUCCESS;

#[derive(Parser)]
#[command(name = "gamestock")]
#[command(about = "Link game catalog entries to ratings and publisher stock movements")]
#[command(version)]
struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Link games, notes and price history from a TOML config file
    #[command(after_help = "\
Examples:
  gamestock run publishers.toml
  gamestock run publishers.toml --json
  gamestock run publishers.toml --output dataset.json
  gamestock run publishers.toml --publisher UBI.PA --publisher EA")]
    Run {
        /// Path to the run config (.toml)
        config: PathBuf,

        /// Output JSON to stdout in addition to the human summary
        #[arg(long)]
        json: bool,

        /// Write JSON output to file (overrides [output].json)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Restrict the run to these publisher symbols (repeatable)
        #[arg(long = "publisher", value_name = "SYMBOL")]
        publishers: Vec<String>,
    },

    /// Validate a run config without loading inputs
    #[command(after_help = "\
Examples:
  gamestock validate publishers.toml")]
    Validate {
        /// Path to the run config (.toml)
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Run { config, json, output, publishers } => {
            run::cmd_run(config, json, output, publishers)
        }
        Commands::Validate { config } => run::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}
