//! # cmdtree-console
//!
//! Line-oriented host for a cmdtree registry. Every stdin line is dispatched
//! as one command on behalf of a single caller; continuations scheduled onto
//! the main thread run after each line.
//!
//! ## Usage
//!
//! ```bash
//! # Interactive
//! cmdtree-console --caller alice --permission 'console.*'
//!
//! # Scripted
//! printf 'add 2 40\ngreet -e Bob\n' | cmdtree-console
//! ```

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use cmdtree::{CommandRegistry, MainThreadQueue, RegistryConfig, Scheduler};

use crate::commands::Caller;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "cmdtree-console")]
#[command(about = "Dispatch stdin lines through a cmdtree command tree")]
#[command(version)]
struct Args {
    /// Directory holding `.cmdtree/config.toml`
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Name of the caller issuing every line
    #[arg(long, default_value = "console")]
    caller: String,

    /// Permission granted to the caller (repeatable, `*` suffix for prefixes)
    #[arg(short = 'p', long = "permission")]
    permissions: Vec<String>,
}

// ============================================================================
// Console loop
// ============================================================================

/// Lines that failed, for the exit code.
async fn run_console(args: Args) -> Result<usize> {
    let config = RegistryConfig::load(&args.root);
    debug!(?config, root = %args.root.display(), "loaded config");

    let main_queue = MainThreadQueue::new();
    let registry = CommandRegistry::builder(Scheduler::tokio(main_queue.clone()))
        .config(&config)
        .authorizer(|caller: &Caller, permission: &str| caller.may(permission))
        .build();
    commands::register_all(&registry).context("built-in command tree is invalid")?;

    let caller = Caller {
        name: args.caller,
        permissions: args.permissions,
    };
    info!(caller = %caller.name, "console ready");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut failures = 0;
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        if let Err(err) = registry.handle(caller.clone(), line).await {
            eprintln!("error: {err}");
            failures += 1;
        }
        let ran = main_queue.run_pending();
        if ran > 0 {
            debug!(ran, "main thread continuations");
        }
    }

    Ok(failures)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Logs go to stderr, stdout carries command output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.parse().unwrap_or_default()),
        )
        .init();

    match run_console(args).await {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failures) => {
            info!(failures, "some lines failed");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("[cmdtree-console] Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
