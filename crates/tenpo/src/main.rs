// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tenpo - AI interior editing for restaurant owners.
//!
//! This is the binary entry point for the Tenpo service.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod admin;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tenpo - AI interior editing for restaurant owners.
#[derive(Parser, Debug)]
#[command(name = "tenpo", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP service.
    Serve,
    /// Manage user profiles.
    Profile {
        #[command(subcommand)]
        action: ProfileCommands,
    },
    /// Show a user's generation quota for today.
    Quota {
        user: String,
        /// Clear today's count before printing.
        #[arg(long)]
        reset: bool,
    },
    /// Inspect configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileCommands {
    /// Create the profile row for a user (idempotent).
    Add { user: String },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Validate configuration and exit.
    Check,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => tenpo_config::load_and_validate_path(path),
        None => tenpo_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            tenpo_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => {
            serve::init_tracing(&config.app.log_level);
            serve::run_serve(config).await
        }
        Some(Commands::Profile {
            action: ProfileCommands::Add { user },
        }) => admin::run_profile_add(&config, &user).await,
        Some(Commands::Quota { user, reset }) => {
            admin::run_quota(&config, &user, reset).await.map(|_| ())
        }
        Some(Commands::Config {
            action: ConfigCommands::Check,
        }) => {
            println!(
                "tenpo: config ok (gateway={}:{}, model={}, daily_limit={})",
                config.gateway.host, config.gateway.port, config.gemini.model, config.quota.daily_limit
            );
            Ok(())
        }
        None => {
            println!("tenpo: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
