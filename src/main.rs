//! claude-loop - decision core for iterative coding-agent loops
//!
//! Every subcommand prints one JSON document on stdout. Logs go to stderr.

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use claude_loop::analysis::client::detect_client;
use claude_loop::changes::{ChangeSource, GitChangeProbe, StaticChangeSource};
use claude_loop::{
    evaluate, AnalysisOrchestrator, CommandBuilder, Config, LoopError, PresetTable, Snapshot,
    SuggestionRotator,
};

#[derive(Parser)]
#[command(name = "claude-loop")]
#[command(version)]
#[command(about = "Progress analysis and suggestions for iterative coding-agent loops", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// User preset file (defaults to <config_dir>/claude-loop/presets.toml)
    #[arg(long, global = true, value_name = "FILE")]
    presets: Option<PathBuf>,

    /// Config file (defaults to <config_dir>/claude-loop/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a state file and report the next directive
    Analyze {
        /// Loop state document
        state_file: PathBuf,

        /// Skip the git change probe
        #[arg(long)]
        no_git: bool,
    },

    /// Pick the rotating suggestion for a preset and iteration
    #[command(allow_negative_numbers = true)]
    Suggest {
        /// Preset key (unknown keys fall back to generic)
        preset: String,

        /// Iteration number, may be negative
        #[arg(allow_hyphen_values = true)]
        iteration: String,
    },

    /// Compare two state files and report whether the iteration was idle
    Idle {
        /// State document before the iteration
        before: PathBuf,

        /// State document after the iteration
        after: PathBuf,

        /// Skip the git change probe
        #[arg(long)]
        no_git: bool,
    },

    /// Generate one command file per preset
    Build {
        /// Directory to write command files into
        #[arg(short, long, default_value = "commands")]
        output_dir: PathBuf,
    },
}

#[derive(Serialize)]
struct ErrorReport<'a> {
    error: bool,
    message: &'a str,
}

#[derive(Serialize)]
struct BuildReport {
    output_dir: PathBuf,
    generated: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let rendered = e.to_string();
            let message = rendered
                .lines()
                .next()
                .unwrap_or_default()
                .trim_start_matches("error: ");
            print_error(message);
            std::process::exit(1);
        }
    };

    // Initialize tracing
    let filter = if cli.verbose {
        "claude_loop=debug,warn"
    } else {
        "claude_loop=warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = run(cli).await {
        if !e.is_input_error() {
            eprintln!("{} {}", "Error:".red().bold(), e);
        }
        print_error(&e.to_string());
        std::process::exit(e.exit_code());
    }

    Ok(())
}

async fn run(cli: Cli) -> claude_loop::Result<()> {
    let Cli {
        presets: presets_file,
        config: config_file,
        command,
        ..
    } = cli;
    let config = Config::load(config_file.as_deref())?;

    match command {
        Commands::Analyze { state_file, no_git } => {
            let document = read_state(&state_file)?;
            let changes = change_source(&config, no_git);
            let orchestrator = AnalysisOrchestrator::new(detect_client(&config.analysis));

            let report = orchestrator.report(&document, changes.as_ref()).await;
            print_json(&report)?;
        }

        Commands::Suggest { preset, iteration } => {
            let iteration: i64 = iteration
                .trim()
                .parse()
                .map_err(|_| LoopError::InvalidIteration { value: iteration })?;

            let presets = load_presets(presets_file.as_deref(), &config);
            let result = SuggestionRotator::new(&presets).select(&preset, iteration);
            print_json(&result)?;
        }

        Commands::Idle {
            before,
            after,
            no_git,
        } => {
            let before = Snapshot::parse(&read_state(&before)?);
            let after = Snapshot::parse(&read_state(&after)?);
            let change_summary = change_source(&config, no_git).summarize().await;

            let verdict = evaluate(&before, &after, &change_summary);
            debug!("Iteration {} verdict: {}", after.iteration, verdict);
            print_json(&verdict)?;
        }

        Commands::Build { output_dir } => {
            let presets = load_presets(presets_file.as_deref(), &config);
            let generated = CommandBuilder::new(&presets).build(&output_dir)?;

            for path in &generated {
                eprintln!("{} {}", "Generated".green(), path.display());
            }
            print_json(&BuildReport {
                output_dir,
                generated,
            })?;
        }
    }

    Ok(())
}

fn read_state(path: &Path) -> claude_loop::Result<String> {
    if !path.exists() {
        return Err(LoopError::StateFileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(std::fs::read_to_string(path)?)
}

fn change_source(config: &Config, no_git: bool) -> Box<dyn ChangeSource> {
    if no_git {
        debug!("Git probe disabled");
        Box::new(StaticChangeSource::empty())
    } else {
        Box::new(
            GitChangeProbe::new(".")
                .with_timeout(Duration::from_secs(config.probe.timeout_secs)),
        )
    }
}

fn load_presets(presets_file: Option<&Path>, config: &Config) -> PresetTable {
    let user_file = presets_file
        .map(Path::to_path_buf)
        .or_else(|| config.user_presets_path());
    PresetTable::load(user_file.as_deref())
}

fn print_json<T: Serialize>(value: &T) -> claude_loop::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_error(message: &str) {
    let report = ErrorReport {
        error: true,
        message,
    };
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(_) => println!("{{\"error\": true}}"),
    }
}
