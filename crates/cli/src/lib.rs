pub mod client;
pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "ozunlu",
    about = "Ozunlu quote request CLI",
    long_about = "Request damper and trailer quotes, inspect stored quotes, and operate the intake service.",
    after_help = "Examples:\n  ozunlu request\n  ozunlu quotes --id 1760000000000\n  ozunlu health --base-url http://localhost:3001"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Fill in a quote request step by step and submit it")]
    Request {
        #[arg(long, help = "Intake service URL (defaults to client.base_url)")]
        base_url: Option<String>,
    },
    #[command(about = "List stored quotes, or fetch one by id")]
    Quotes {
        #[arg(long, help = "Fetch a single quote by id")]
        id: Option<String>,
        #[arg(long, help = "Intake service URL (defaults to client.base_url)")]
        base_url: Option<String>,
    },
    #[command(about = "Probe the intake service liveness endpoint")]
    Health {
        #[arg(long, help = "Intake service URL (defaults to client.base_url)")]
        base_url: Option<String>,
    },
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Request { base_url } => commands::request::run(base_url),
        Command::Quotes { id, base_url } => commands::quotes::run(id, base_url),
        Command::Health { base_url } => commands::health::run(base_url),
        Command::Migrate => commands::migrate::run(),
        Command::Config => commands::config::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
