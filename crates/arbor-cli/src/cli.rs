use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::search::{SearchArgs, run_search};
use crate::tree::{TreeArgs, run_tree};

#[derive(Debug, Parser)]
#[command(
    name = "arbor",
    about = "Browse and search very large hierarchies with lazy loading",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Bootstrap the tree, expand nodes, and print one viewport of rows.
    Tree(TreeArgs),

    /// Type terms into the debounced search and print the results.
    Search(SearchArgs),
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Tree(args) => run_tree(args),
        Commands::Search(args) => run_search(args),
    }
}
