//! Governance layer for AI coding.
//!
//! `sentinel init` scaffolds `.sentinel/rules.yml`; `sentinel create` runs the
//! rules → branch check → tests → code → audit pipeline and prints the
//! result. The exit code identifies the failing stage.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, warn};

use sentinel::core::branch::BranchDescriptor;
use sentinel::core::report::{PipelineReport, StageError, StageResult};
use sentinel::exit_codes;
use sentinel::io::git::Git;
use sentinel::io::init::{InitOptions, SentinelPaths, init_sentinel};
use sentinel::io::rules::load_rules;
use sentinel::io::settings::ConnectionSettings;
use sentinel::logging;
use sentinel::pipeline::run_pipeline;
use sentinel::provider::ProviderRegistry;
use sentinel::render::render_report;

#[derive(Parser)]
#[command(
    name = "sentinel",
    version,
    about = "Governance layer for AI coding: test-first, audited, branch-safe generation"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create `.sentinel/rules.yml` with the default rules.
    Init {
        /// Overwrite an existing rule file.
        #[arg(short, long)]
        force: bool,
    },
    /// Generate tests, then code, then a security audit, under the project rules.
    Create(CreateArgs),
}

#[derive(Args)]
struct CreateArgs {
    /// What you want to generate.
    prompt: String,
    /// Provider key (`mock` | `copilot`). Defaults to SENTINEL_AI_PROVIDER or `mock`.
    #[arg(short, long)]
    provider: Option<String>,
    /// Branch prefix to create when on a protected branch (e.g. `feature`).
    #[arg(long, value_name = "PREFIX")]
    branch_type: Option<String>,
    /// Branch name to create when on a protected branch (e.g. `add-login-form`).
    #[arg(long, value_name = "NAME")]
    branch_name: Option<String>,
    /// Rule file to load instead of `.sentinel/rules.yml`.
    #[arg(long, value_name = "PATH")]
    rules: Option<PathBuf>,
    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

fn main() {
    // `.env` may carry RUST_LOG, so load it before the subscriber reads the filter.
    // Only the working directory is consulted, never its parents.
    let dotenv = dotenvy::from_path(".env");
    logging::init();
    if let Err(err) = dotenv {
        if !err.not_found() {
            warn!("ignoring .env: {err}");
        }
    }

    let code = match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_codes::INVALID
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Init { force } => cmd_init(force),
        Command::Create(args) => cmd_create(args),
    }
}

fn cmd_init(force: bool) -> Result<i32> {
    let paths = init_sentinel(Path::new("."), &InitOptions { force })?;
    println!("Created {} with default rules.", paths.rules_path.display());
    Ok(exit_codes::OK)
}

fn cmd_create(args: CreateArgs) -> Result<i32> {
    let settings = ConnectionSettings::from_env();
    debug!(?settings, "connection settings");

    let rules_path = args
        .rules
        .unwrap_or_else(|| SentinelPaths::new(".").rules_path);
    let rules = match load_rules(Some(rules_path.as_path())) {
        Ok(rules) => rules,
        Err(err) => return emit(&PipelineReport::rules_failed(&err), args.json),
    };

    // Resolve before the branch check so a bad provider never leaves a new branch behind.
    let key = args.provider.as_deref().unwrap_or(&settings.ai_provider);
    let provider = match ProviderRegistry::builtin().resolve(key, &settings) {
        Ok(provider) => provider,
        Err(err) => {
            eprintln!("error[{}]: {err}", err.kind().as_str());
            if args.json {
                let output = ErrorOutput {
                    entries: &[],
                    error: StageError::from(&err),
                };
                let payload = serde_json::to_string_pretty(&output).context("serialize error")?;
                println!("{payload}");
            }
            return Ok(err.kind().exit_code());
        }
    };

    let branch =
        BranchDescriptor::from_parts(args.branch_type.as_deref(), args.branch_name.as_deref());
    let vcs = Git::new(".");
    let report = run_pipeline(&args.prompt, &rules, provider.as_ref(), &vcs, branch.as_ref());
    emit(&report, args.json)
}

/// JSON shape for failures that happen before any stage runs.
#[derive(Serialize)]
struct ErrorOutput<'a> {
    entries: &'a [StageResult],
    error: StageError,
}

fn emit(report: &PipelineReport, json: bool) -> Result<i32> {
    if json {
        let payload = serde_json::to_string_pretty(report).context("serialize report")?;
        println!("{payload}");
    } else {
        print!("{}", render_report(report));
    }
    Ok(report.exit_code())
}
