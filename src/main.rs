mod commands;
mod config;
mod error;
mod identity;
mod location;
mod logger;
mod params;
mod runner;
mod stack;
mod upload;
use crate::commands::Commands;
use crate::error::Error;
use crate::logger::Logger;
use crate::runner::{Runnable, Runner};
use clap::Parser;

#[derive(Parser)]
#[command(
    arg_required_else_help = true,
    name = "stackctl",
    version,
    about = "CLI tool for deploying CloudFormation stacks from build pipelines",
    long_about = "Deploys, updates, describes and tears down a CloudFormation stack, and publishes template and parameter files to S3. Stack identity and parameters are derived from stackctl.toml, CLI arguments and local parameter files."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Derive a runner from the command and run it
async fn run(command: impl Runnable) -> Result<(), Error> {
    command.runner().run().await
}

#[tokio::main]
async fn main() {
    Logger::init();
    let cli = Cli::parse();

    // Match all commands here, in one place
    let result = match cli.command {
        Commands::Describe(cmd) => run(cmd).await,
        Commands::Setup(cmd) => run(cmd).await,
        Commands::Publish(cmd) => run(cmd).await,
        Commands::Teardown(cmd) => run(cmd).await,
    };

    if let Err(error) = result {
        eprintln!("\n{}\n{error}", console::style("Error").red().bold());
        std::process::exit(1);
    }
}
