// Copyright 2026 Goatherd Contributors
// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code, unused_imports)]

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

mod browser;
mod cli;
mod config;
mod downloads;
mod error;
mod fetch;
mod page;

#[derive(Parser)]
#[command(
    name = "goatherd",
    about = "Goatherd — fetch MTGO price data from goatbots.com",
    version,
    after_help = "Run 'goatherd <command> --help' for details on each command.\nRun 'goatherd' with no command to fetch with defaults."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the price list (and card definitions when missing)
    Fetch {
        /// Directory downloads land in
        #[arg(long, default_value = config::DEFAULT_DOWNLOAD_DIR)]
        dir: PathBuf,
        /// Treat definitions files older than this many hours as missing
        #[arg(long)]
        max_age: Option<u64>,
        /// Seconds to wait for each download to complete
        #[arg(long, default_value = "30")]
        download_timeout: u64,
        /// Seconds to wait for the page to load
        #[arg(long, default_value = "30")]
        nav_timeout: u64,
        /// Run with a visible browser window (debugging aid)
        #[arg(long)]
        headful: bool,
    },
    /// Check environment and diagnose issues
    Doctor {
        /// Directory downloads land in
        #[arg(long, default_value = config::DEFAULT_DOWNLOAD_DIR)]
        dir: PathBuf,
        /// Also fetch the live page and verify both download links
        #[arg(long)]
        online: bool,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global flags via environment variables so all modules can check them
    if cli.json {
        std::env::set_var("GOATHERD_JSON", "1");
    }
    if cli.quiet {
        std::env::set_var("GOATHERD_QUIET", "1");
    }
    if cli.verbose {
        std::env::set_var("GOATHERD_VERBOSE", "1");
    }

    init_tracing(&cli);

    let result = match cli.command {
        // No subcommand → fetch with defaults
        None => {
            cli::fetch_cmd::run(
                PathBuf::from(config::DEFAULT_DOWNLOAD_DIR),
                None,
                config::DEFAULT_DOWNLOAD_TIMEOUT.as_secs(),
                config::DEFAULT_NAV_TIMEOUT.as_secs(),
                false,
            )
            .await
        }
        Some(Commands::Fetch {
            dir,
            max_age,
            download_timeout,
            nav_timeout,
            headful,
        }) => cli::fetch_cmd::run(dir, max_age, download_timeout, nav_timeout, headful).await,
        Some(Commands::Doctor { dir, online }) => cli::doctor::run(&dir, online).await,
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "goatherd", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if !cli::output::is_quiet() && !cli::output::is_json() {
            eprintln!("  Error: {e:#}");
        }
        if cli::output::is_json() {
            cli::output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        }
        std::process::exit(1);
    }

    result
}

/// Logs go to stderr; stdout is reserved for `--json` output.
fn init_tracing(cli: &Cli) {
    let directive = if cli.verbose {
        "goatherd=debug"
    } else if cli.quiet || cli.json {
        "goatherd=warn"
    } else {
        "goatherd=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(directive)),
        )
        .with_writer(std::io::stderr)
        .init();
}
