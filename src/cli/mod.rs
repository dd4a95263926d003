use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::search::SearchMode;

mod commands;
mod errors;
mod handlers;
mod validation;

pub use handlers::*;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Directory holding the email folders. Overrides the config value.
    #[clap(long, global = true)]
    pub emails_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command that runs a query.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct QueryArgs {
    /// Ranking mode. Defaults to `default_mode` from the config.
    #[clap(short, long, value_enum)]
    pub mode: Option<SearchMode>,

    /// How many emails to use. Defaults to `top_k` from the config.
    #[clap(short = 'k', long)]
    pub top_k: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rank emails against a query
    Search {
        query: String,

        #[command(flatten)]
        query_args: QueryArgs,

        /// Print results as json
        #[clap(long, default_value = "false")]
        json: bool,

        /// Print the body of each email
        #[clap(long, default_value = "false")]
        body: bool,
    },

    /// Answer a question from the best matching emails
    Ask {
        query: String,

        #[command(flatten)]
        query_args: QueryArgs,

        /// Print the answer as json
        #[clap(long, default_value = "false")]
        json: bool,
    },

    /// Ask questions interactively. Empty input, `exit` or `quit` ends it.
    Chat {
        #[command(flatten)]
        query_args: QueryArgs,
    },

    /// Show corpus statistics
    Stats {
        #[clap(long, default_value = "false")]
        json: bool,
    },

    /// Build the semantic index and write the vector cache
    Index {},

    /// Serve the http api
    Daemon {
        /// Listen address, e.g. 127.0.0.1:8080
        #[clap(long)]
        addr: Option<String>,
    },
}
