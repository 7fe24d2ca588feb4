#![forbid(unsafe_code)]

//! The `arbor` command-line driver.

pub mod cli;
pub mod driver;
pub mod error;
pub mod logging;
pub mod search;
pub mod tree;

pub use cli::{Cli, Commands, run, run_from_env};
pub use error::{CliError, Result};
