// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use cortex_harvest::cli;
use cortex_harvest::cli::extract_cmd::ExtractArgs;
use cortex_harvest::cli::get_cmd::GetArgs;

#[derive(Parser)]
#[command(
    name = "harvest",
    about = "Harvest structured posts from a logged-in timeline",
    version,
    after_help = "Run 'harvest <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Debug-level logs on stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Harvest records from the home feed, a timeline, a search or bookmarks
    Get(GetArgs),
    /// Extract records from a saved page without a browser
    Extract(ExtractArgs),
    /// Show the stored session and whether it is still valid
    Status {
        /// Session bundle file
        #[arg(long)]
        auth_file: Option<String>,
    },
    /// Remove the stored session
    Logout {
        /// Session bundle file
        #[arg(long)]
        auth_file: Option<String>,
    },
    /// Check Chromium and session readiness
    Doctor {
        /// Session bundle file
        #[arg(long)]
        auth_file: Option<String>,
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
    cli::init_tracing(cli.verbose, cli.log_json);

    let json = cli.json;
    let result = match cli.command {
        Commands::Get(args) => cli::get_cmd::run(&args, json).await,
        Commands::Extract(args) => cli::extract_cmd::run(&args, json).await,
        Commands::Status { auth_file } => cli::status::run(auth_file.as_deref(), json).await,
        Commands::Logout { auth_file } => {
            cli::status::run_logout(auth_file.as_deref(), json).await
        }
        Commands::Doctor { auth_file } => cli::doctor::run(auth_file.as_deref(), json).await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "harvest", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if json {
            cli::output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        } else {
            eprintln!("  Error: {e:#}");
        }
        std::process::exit(1);
    }

    result
}
