//! CLI module
//!
//! Command-line interface for running paged searches.
//!
//! # Commands
//!
//! - `fetch` - Run the paged search and write the records
//! - `validate` - Check the configuration file
//! - `encode` - Print a request control value
//! - `decode` - Inspect a response control value

mod commands;
mod runner;


pub use commands::{Cli, Commands, FetchArgs};
pub use runner::Runner;
