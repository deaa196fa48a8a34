//! conflict-advisor command-line tool.
//!
//! Walks the conflicted files of a jj working copy, asks an AI backend to
//! classify each conflict and propose a resolved file, and then, depending on
//! the mode, only reports (default), asks before writing (`--interactive`),
//! or writes every proposal (`--auto`).

mod terminal;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use conflict_advisor_core::ai::AnthropicClient;
use conflict_advisor_core::config::{AdvisorConfig, LOCAL_CONFIG_FILE};
use conflict_advisor_core::session::SystemClipboard;
use conflict_advisor_core::vcs::StatusCommand;
use conflict_advisor_core::{
    AnalysisRequester, ConflictLocator, Mode, ModeController, ResolutionStore, SessionDriver,
    SessionOutcome,
};

use crate::terminal::TerminalConsole;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// AI-assisted merge conflict advisor.
#[derive(Parser, Debug)]
#[command(
    name = "conflict-advisor",
    version,
    about = "Analyse merge conflicts with an AI backend and optionally apply its resolutions"
)]
struct Cli {
    /// Ask before writing each proposed resolution.
    #[arg(long, conflicts_with = "auto")]
    interactive: bool,

    /// Write every proposed resolution without asking. Requires typing a
    /// confirmation phrase first.
    #[arg(long)]
    auto: bool,

    /// Do not print the model's reasoning.
    #[arg(long)]
    no_reasoning: bool,

    /// Path to a TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Working copy to operate on.
    #[arg(short = 'C', long, global = true, default_value = ".")]
    workdir: PathBuf,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default configuration file.
    Init {
        /// Output path (default: ./.conflict-advisor.toml in the working copy).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate the configuration and check the API key is available.
    Validate,
}

impl Cli {
    fn mode(&self) -> Mode {
        if self.auto {
            Mode::Auto
        } else if self.interactive {
            Mode::Interactive
        } else {
            Mode::Advisor
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(status) => ExitCode::from(status),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so prompts and reports on stdout stay readable.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<u8> {
    match &cli.command {
        Some(Commands::Init { output }) => {
            let output = output
                .clone()
                .unwrap_or_else(|| cli.workdir.join(LOCAL_CONFIG_FILE));
            cmd_init(&output).map(|()| 0)
        }
        Some(Commands::Validate) => cmd_validate(cli.config.as_deref(), &cli.workdir).map(|()| 0),
        None => cmd_resolve(&cli).await,
    }
}

/// Exit status for a session that reached an outcome. Quitting, declining
/// auto mode, and per-file failures are all ordinary endings; only errors
/// that stop the run exit non-zero.
fn exit_status(outcome: &SessionOutcome) -> u8 {
    match outcome {
        SessionOutcome::NoConflicts
        | SessionOutcome::Aborted
        | SessionOutcome::Completed(_)
        | SessionOutcome::Quit(_) => 0,
    }
}

// ---------------------------------------------------------------------------
// Config helpers
// ---------------------------------------------------------------------------

fn load_config(explicit: Option<&Path>, workdir: &Path) -> Result<AdvisorConfig> {
    let mut config =
        AdvisorConfig::discover(explicit, workdir).context("failed to load configuration")?;
    config
        .resolve_env_vars()
        .context("failed to resolve environment variables")?;
    config.validate().context("invalid configuration")?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

async fn cmd_resolve(cli: &Cli) -> Result<u8> {
    let mut config = load_config(cli.config.as_deref(), &cli.workdir)?;
    if cli.no_reasoning {
        config.session.show_reasoning = false;
    }

    let api_key = match config.require_api_key() {
        Ok(key) => key,
        Err(e) => {
            eprintln!(
                "Set it with: export {}='your-api-key'",
                config.ai.api_key_env
            );
            return Err(e).context("missing AI backend credential");
        }
    };
    let backend =
        AnthropicClient::from_config(&config.ai, api_key).context("failed to build HTTP client")?;

    let status = StatusCommand::from_config(&config.vcs, &cli.workdir);
    let driver = SessionDriver::new(
        ConflictLocator::new(
            Box::new(status),
            config.vcs.conflict_marker.clone(),
            &cli.workdir,
        ),
        AnalysisRequester::from_config(Box::new(backend), &config.ai),
        ModeController::new(
            cli.mode(),
            ResolutionStore::new(&cli.workdir),
            config.session.show_reasoning,
            config.session.preview_lines,
        ),
        config.session.confirm_phrase.clone(),
    );

    let mut console = TerminalConsole::new();
    let outcome = driver
        .run(&mut console, &SystemClipboard)
        .await
        .context("session ended unexpectedly")?;

    match &outcome {
        SessionOutcome::NoConflicts => info!("nothing to resolve"),
        SessionOutcome::Aborted => info!("auto mode aborted before any conflict was touched"),
        SessionOutcome::Completed(summary) | SessionOutcome::Quit(summary) => info!(
            applied = summary.applied.len(),
            skipped = summary.skipped.len(),
            failed = summary.failed.len(),
            unprocessed = summary.unprocessed.len(),
            "session finished"
        ),
    }
    Ok(exit_status(&outcome))
}

fn cmd_init(output: &Path) -> Result<()> {
    if output.exists() {
        anyhow::bail!(
            "file already exists: {}. Use a different path or remove the existing file.",
            output.display()
        );
    }

    std::fs::write(output, AdvisorConfig::default_template())
        .context("failed to write config file")?;

    println!("Default configuration written to {}", output.display());
    println!();
    println!("Next steps:");
    println!("  1. Adjust the model or VCS command if needed");
    println!("  2. Export the API key variable (ANTHROPIC_API_KEY by default)");
    println!(
        "  3. Validate with: conflict-advisor validate --config {}",
        output.display()
    );

    Ok(())
}

fn cmd_validate(explicit: Option<&Path>, workdir: &Path) -> Result<()> {
    println!("Validating configuration");
    println!();

    let mut config =
        AdvisorConfig::discover(explicit, workdir).context("failed to parse configuration")?;
    println!("  [OK] TOML structure is valid");

    let _ = config.resolve_env_vars();
    println!("  [OK] Environment variable references processed");

    match config.validate() {
        Ok(()) => println!("  [OK] All fields are valid"),
        Err(e) => {
            println!("  [FAIL] Validation error: {}", e);
            anyhow::bail!("configuration validation failed");
        }
    }

    println!();
    println!("Configuration summary:");
    println!("  API URL        : {}", config.ai.api_url);
    println!("  Model          : {}", config.ai.model);
    println!("  Max tokens     : {}", config.ai.max_tokens);
    println!(
        "  API key ({})  : {}",
        config.ai.api_key_env,
        if config.ai.api_key.is_some() {
            "set"
        } else {
            "NOT SET"
        }
    );
    println!(
        "  Status command : {} {}",
        config.vcs.program,
        config.vcs.status_args.join(" ")
    );
    println!("  Conflict marker: {}", config.vcs.conflict_marker);
    println!("  Preview lines  : {}", config.session.preview_lines);

    if config.ai.api_key.is_none() {
        anyhow::bail!(
            "environment variable '{}' is not set",
            config.ai.api_key_env
        );
    }
    Ok(())
}
