//! `bookshelf`
//!
//! This crate contains the terminal front end of Bookshelf: configuration, logging and one command
//! per screen, all on top of `bookshelf_core`.
use crate::cli::{Cli, Command};
use crate::commands::FieldChanges;
use crate::config::Config;
use crate::state::AppState;
use anyhow::Error;
use bookshelf_core::library::types::BookDraft;
use clap::Parser as _;
use std::io;
use tokio::runtime;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::{EnvFilter, fmt};

/// Command line definition
pub mod cli;
/// Screens of the app, one function each
pub mod commands;
/// Settings from environment and flags
pub mod config;
/// The opened library
pub mod state;

/// Runs the command line application and reports whether it succeeded.
#[allow(
    clippy::missing_inline_in_public_items,
    reason = "Executed once per run, never across crate boundaries"
)]
#[allow(
    clippy::print_stderr,
    reason = "Tracing might not be available here if run_safe() failed before its initialization"
)]
#[must_use]
pub fn run() -> bool {
    if let Err(error) = run_safe() {
        eprintln!("Error: {error:#}");
        return false;
    }
    true
}

/// Encapsulated run function that allows returning errors instead of panicking on `Err` or `None`
/// variants. `run()` reports whatever ends up here.
fn run_safe() -> Result<(), Error> {
    let cli = Cli::parse();
    let config = Config::from_env()?.with_overrides(cli.backend, cli.library);

    let filter = EnvFilter::try_new(&config.log_filter)?;
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .finish()
        .try_init()?;
    tracing::debug!(?config, "configuration loaded");

    let runtime = runtime::Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(async move {
        let state = AppState::open(&config).await?;
        let result = execute(cli.command, &state).await;
        state.close().await;
        result
    })
}

async fn execute(command: Command, state: &AppState) -> Result<(), Error> {
    let library = &state.library;
    let mut out = io::stdout().lock();
    match command {
        Command::List { json } => commands::list(library, json, &mut out).await,
        Command::Show { id } => commands::show(library, id, &mut out).await,
        Command::Add {
            title,
            author,
            status,
        } => commands::add(library, BookDraft::new(title, author, status), &mut out).await,
        Command::Edit {
            id,
            title,
            author,
            status,
        } => {
            let changes = FieldChanges {
                title,
                author,
                status,
            };
            commands::edit(library, id, changes, &mut out).await
        }
        Command::Delete { id, yes } => {
            let mut input = io::stdin().lock();
            commands::delete(library, id, yes, &mut input, &mut out).await
        }
        Command::Last => commands::last(library, &mut out).await,
    }
}
