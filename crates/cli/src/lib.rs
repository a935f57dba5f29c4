pub mod commands;
pub mod pipeline;
pub mod runtime;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use policygen_core::config::{AppConfig, ConfigOverrides, LlmProvider, LoadOptions, LogFormat};

use crate::commands::{CommandResult, EXIT_FAILURE, EXIT_INVALID_INPUT};
use crate::runtime::CliRuntime;

#[derive(Debug, Parser)]
#[command(
    name = "policygen",
    about = "Policygen underwriting CLI",
    long_about = "Assess client risk, price coverage, and draft, refine or query insurance \
                  policies.",
    after_help = "Examples:\n  policygen risk --input client.json\n  \
                  echo '{\"risk_score\":\"High\"}' | policygen price\n  \
                  policygen generate --input application.json --offline"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a policygen.toml config file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Use the offline provider (fallback output only)")]
    offline: bool,
    #[arg(long, global = true, help = "Override logging.level")]
    log_level: Option<String>,
    #[arg(
        long = "model",
        global = true,
        value_name = "MODEL",
        help = "Candidate model, tried in the order given (repeatable)"
    )]
    models: Vec<String>,
    #[arg(long, global = true, help = "Override llm.max_retries")]
    max_retries: Option<u32>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Score a client profile and list the contributing risk factors")]
    Risk(InputArgs),
    #[command(about = "Price coverage from a risk level, amount and insurance type")]
    Price(InputArgs),
    #[command(about = "Run risk, pricing and policy drafting for an application")]
    Generate(InputArgs),
    #[command(about = "Revise a policy document with a plain-language instruction")]
    Refine(InputArgs),
    #[command(about = "Answer a question using only the supplied policy text")]
    Ask(InputArgs),
    #[command(about = "Show candidate models and the models the provider reports")]
    Models,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

#[derive(Debug, clap::Args)]
struct InputArgs {
    #[arg(long, short, help = "JSON input file (reads stdin when omitted)")]
    input: Option<PathBuf>,
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    let result = execute(cli).await;

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

async fn execute(cli: Cli) -> CommandResult {
    let options = load_options(&cli);
    if let Command::Config = cli.command {
        return commands::config::run(&options);
    }

    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                command_name(&cli.command),
                "config_validation",
                error.to_string(),
                EXIT_INVALID_INPUT,
            )
        }
    };
    init_logging(&config);

    match cli.command {
        Command::Risk(args) => with_input("risk", args, |payload| commands::risk::run(&payload)),
        Command::Price(args) => with_input("price", args, |payload| commands::price::run(&payload)),
        command => {
            let runtime = match CliRuntime::from_config(config).await {
                Ok(runtime) => runtime,
                Err(error) => {
                    return CommandResult::failure(
                        command_name(&command),
                        "runtime_init",
                        error.to_string(),
                        EXIT_FAILURE,
                    )
                }
            };
            run_with_runtime(&runtime, command).await
        }
    }
}

async fn run_with_runtime(runtime: &CliRuntime, command: Command) -> CommandResult {
    let pipeline = &runtime.pipeline;
    match command {
        Command::Generate(args) => match read(&args, "generate") {
            Ok(payload) => commands::generate::run(pipeline, &payload).await,
            Err(result) => result,
        },
        Command::Refine(args) => match read(&args, "refine") {
            Ok(payload) => commands::refine::run(pipeline, &payload).await,
            Err(result) => result,
        },
        Command::Ask(args) => match read(&args, "ask") {
            Ok(payload) => commands::ask::run(pipeline, &payload).await,
            Err(result) => result,
        },
        Command::Models => commands::models::run(pipeline).await,
        Command::Risk(_) | Command::Price(_) | Command::Config => {
            CommandResult::failure(command_name(&command), "internal", "unroutable", EXIT_FAILURE)
        }
    }
}

fn with_input(
    command: &str,
    args: InputArgs,
    run: impl FnOnce(serde_json::Value) -> CommandResult,
) -> CommandResult {
    match read(&args, command) {
        Ok(payload) => run(payload),
        Err(result) => result,
    }
}

fn read(args: &InputArgs, command: &str) -> Result<serde_json::Value, CommandResult> {
    commands::read_input(args.input.as_deref())
        .map_err(|error| commands::invalid_input(command, format!("{error:#}")))
}

fn load_options(cli: &Cli) -> LoadOptions {
    let overrides = ConfigOverrides {
        log_level: cli.log_level.clone(),
        llm_provider: cli.offline.then_some(LlmProvider::Offline),
        llm_models: (!cli.models.is_empty()).then(|| cli.models.clone()),
        llm_max_retries: cli.max_retries,
    };
    LoadOptions { config_path: cli.config.clone(), require_file: cli.config.is_some(), overrides }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Risk(_) => "risk",
        Command::Price(_) => "price",
        Command::Generate(_) => "generate",
        Command::Refine(_) => "refine",
        Command::Ask(_) => "ask",
        Command::Models => "models",
        Command::Config => "config",
    }
}

/// Logs go to stderr so stdout carries only the JSON command result.
pub fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let _ = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
