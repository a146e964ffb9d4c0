//! CLI argument parsing for ratematch

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Catalog shipped with the repository.
pub const DEFAULT_CATALOG: &str = "data/loan_products.json";

#[derive(Parser, Debug)]
#[command(name = "ratematch")]
#[command(author, version, about = "Mortgage product matching and missing-field checks", long_about = None)]
pub struct Cli {
    /// Runtime config file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Model name; overrides the config file and MODEL_NAME
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Filter the product catalog
    Products {
        /// Catalog file (JSON or YAML)
        #[arg(long, default_value = DEFAULT_CATALOG)]
        catalog: PathBuf,

        /// Criteria document, or "-" for stdin; omit for the whole catalog
        #[arg(long)]
        criteria: Option<String>,
    },

    /// Report the fields a mortgage form is still missing
    Check {
        /// Form document, or "-" for stdin
        #[arg(long, default_value = "-")]
        form: String,

        /// Use template messages; no provider or credentials needed
        #[arg(long)]
        offline: bool,
    },

    /// Send a free-form message to the model
    Chat {
        #[arg(required = true)]
        message: String,
    },

    /// Report service and provider health
    Health,
}
