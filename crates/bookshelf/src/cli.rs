use crate::config::BackendKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "bookshelf", version, about = "Keep track of your books")]
pub struct Cli {
    /// Storage backend, overrides BOOKSHELF_BACKEND
    #[arg(long, global = true, value_enum)]
    pub backend: Option<BackendKind>,

    /// Library file, overrides BOOKSHELF_LIBRARY_PATH
    #[arg(long, global = true)]
    pub library: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List all books
    List {
        /// Print the collection as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one book and remember it as the last opened one
    Show { id: i64 },
    /// Add a new book
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        status: String,
    },
    /// Change some fields of a book
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Delete a book
    Delete {
        id: i64,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Show the last opened book
    Last,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory as _;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "bookshelf",
            "edit",
            "12",
            "--status",
            "read",
            "--backend",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.backend, Some(BackendKind::Json));
        assert!(matches!(
            cli.command,
            Command::Edit { id: 12, title: None, author: None, status: Some(ref status) }
                if status == "read"
        ));
    }
}
