pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use commands::CommandResult;
use parley_core::config::{AppConfig, LoadOptions, LogFormat};
use parley_core::MessageGenerator;

#[derive(Debug, Parser)]
#[command(
    name = "parley",
    about = "Parley negotiation CLI",
    long_about = "Generate and validate contract-negotiation messages against a capability catalog.",
    after_help = "Examples:\n  parley operations\n  parley schema 0173-1#01-AKJ975#017\n  parley evaluate 0173-1#01-AKJ975#017 --values '{\"0173-1#02-AAH994#001\":42}'\n  parley generate --message-type callForProposal --user-id u1 --irdi 0173-1#01-AKJ975#017 --values '{\"0173-1#02-AAH994#001\":42}'"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to the parley.toml config file")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "List the negotiable operations declared by the catalog")]
    Operations,
    #[command(about = "Print a capability's negotiable element schema (price excluded)")]
    Schema { irdi: String },
    #[command(about = "Check a value set against a capability schema")]
    Evaluate {
        irdi: String,
        #[arg(long, help = "JSON object mapping semantic ids to proposed values")]
        values: String,
    },
    #[command(about = "Generate an outgoing negotiation message")]
    Generate(commands::generate::GenerateArgs),
    #[command(about = "Inspect effective configuration values")]
    Config,
}

fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        LogFormat::Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

fn dispatch(command: Command, config: &AppConfig) -> CommandResult {
    match command {
        Command::Config => commands::config::run(config),
        command => {
            let (catalog, templates) = match parley_store::load(&config.data) {
                Ok(pair) => pair,
                Err(error) => {
                    return CommandResult::failure("store", "data_load", error.to_string(), 2)
                }
            };
            let generator = MessageGenerator::new(Arc::new(catalog), Arc::new(templates));

            match command {
                Command::Operations => commands::operations::run(generator.catalog()),
                Command::Schema { irdi } => commands::schema::run(generator.catalog(), &irdi),
                Command::Evaluate { irdi, values } => {
                    commands::evaluate::run(generator.catalog(), &irdi, &values)
                }
                Command::Generate(args) => commands::generate::run(&generator, config, args),
                Command::Config => commands::config::run(config),
            }
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(LoadOptions {
        config_path: cli.config.clone(),
        ..LoadOptions::default()
    }) {
        Ok(config) => config,
        Err(error) => {
            let result = CommandResult::failure("config", "configuration", error.to_string(), 2);
            println!("{}", result.output);
            return ExitCode::from(result.exit_code);
        }
    };
    init_logging(&config);

    let result = dispatch(cli.command, &config);
    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
