// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agendo - an appointment-scheduling conversational agent.
//!
//! Binary entry point: loads and validates configuration, initializes
//! tracing, wires the dependency container, and runs the selected
//! command.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod shell;
mod wiring;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Agendo - an appointment-scheduling conversational agent.
#[derive(Parser, Debug)]
#[command(name = "agendo", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Chat with the assistant from the terminal.
    Chat {
        /// Destination address (the business's channel phone).
        #[arg(long)]
        business: String,
        /// Origin address (the user's phone).
        #[arg(long)]
        user: String,
    },
    /// Print the resolved configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match agendo_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            for error in &errors {
                eprintln!("agendo: configuration error: {error}");
            }
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.agent.log_level.clone())),
        )
        .init();

    let result = match cli.command {
        Some(Commands::Chat { business, user }) => shell::run_chat(config, business, user).await,
        Some(Commands::Config) => {
            match toml::to_string_pretty(&config) {
                Ok(rendered) => {
                    println!("{rendered}");
                    Ok(())
                }
                Err(e) => Err(agendo_core::AgendoError::Internal(format!(
                    "failed to render configuration: {e}"
                ))),
            }
        }
        None => {
            println!("agendo: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("agendo: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Verify jemalloc is the global allocator by advancing the
        // epoch. Only jemalloc supports this.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = agendo_config::load_config_from_str("").expect("defaults should load");
        assert_eq!(config.agent.name, "agendo");
    }
}
