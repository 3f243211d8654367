//
//  git-weblinks
//  main.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use git_weblinks::cli::{Cli, CommandError, Commands};
use git_weblinks::exit_codes;
use git_weblinks::links::LinkError;

#[tokio::main]
async fn main() {
    // Initialize logging
    init_logging();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Execute command
    let result = run(cli).await;

    // Handle result and exit
    match result {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(exit_code(&e));
        }
    }
}

/// Initialize logging based on environment
fn init_logging() {
    let filter = EnvFilter::try_from_env("GWL_DEBUG")
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Maps an error to the process exit code
fn exit_code(error: &anyhow::Error) -> i32 {
    if let Some(e) = error.downcast_ref::<LinkError>() {
        return match e {
            LinkError::NoRemoteHead(_) => exit_codes::NO_REMOTE_HEAD,
            LinkError::NoMatchingServer(_) => exit_codes::NOT_FOUND,
            _ => exit_codes::ERROR,
        };
    }
    match error.downcast_ref::<CommandError>() {
        Some(CommandError::NotFound(_)) => exit_codes::NOT_FOUND,
        Some(CommandError::Cancelled) => exit_codes::CANCELLED,
        None => exit_codes::ERROR,
    }
}

/// Main command dispatcher
async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Link(cmd) => cmd.run(&cli.global).await,
        Commands::Goto(cmd) => cmd.run(&cli.global).await,
        Commands::Refs(cmd) => cmd.run(&cli.global).await,
        Commands::Handlers(cmd) => cmd.run(&cli.global).await,
        Commands::Config(cmd) => cmd.run(&cli.global).await,
        Commands::Completion(cmd) => cmd.run(&cli.global).await,
        Commands::Version => {
            println!("gwl version {}", git_weblinks::VERSION);
            Ok(())
        }
    }
}
