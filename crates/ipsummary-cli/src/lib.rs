//! ipsummary CLI: batch front-end for the contract extraction pipeline.

pub mod cli;
pub mod commands;
pub mod document;
pub mod error;
pub mod tasks;

pub use cli::{Cli, Command};
pub use error::{CliError, Result};
