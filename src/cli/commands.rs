//! CLI commands and argument parsing

use crate::output::RecordFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// LDAP paged search client
#[derive(Parser, Debug)]
#[command(name = "ldap-pager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the paged search and write the mapped records
    Fetch(FetchArgs),

    /// Validate the configuration file
    Validate,

    /// Encode a paged results request value (printed as base64)
    Encode {
        /// Requested page size
        #[arg(short, long)]
        page_size: u32,

        /// Cookie from a previous response (base64)
        #[arg(long, default_value = "")]
        cookie: String,
    },

    /// Decode a paged results response value given as base64
    Decode {
        /// Control value (base64)
        value: String,
    },
}

/// Arguments of the `fetch` command
#[derive(Args, Debug, Clone, Default)]
pub struct FetchArgs {
    /// Output file (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output layout
    #[arg(short, long, default_value = "json")]
    pub format: RecordFormat,

    /// Pretty print the JSON array
    #[arg(long)]
    pub pretty: bool,

    /// Override the configured page size
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Fail if the server still has results after this many pages
    #[arg(long)]
    pub max_pages: Option<u32>,
}
