use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod answer;
mod cli;
mod config;
mod mail;
mod search;
mod semantic;
mod storage;
#[cfg(test)]
mod tests;
mod web;

use cli::Command;
use config::Config;
use mail::Corpus;
use search::SearchEngine;

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // a subscriber may already be set when embedded, that's fine
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();

    init_logging(match args.command {
        Command::Daemon { .. } => "info",
        _ => "warn",
    });

    let mut config = Config::load().context("failed to load config")?;
    if let Some(dir) = args.emails_dir {
        config.emails_dir = dir;
    }

    let corpus = Corpus::load(&config.emails_dir, &config.extension)
        .with_context(|| format!("failed to load emails from {}", config.emails_dir.display()))?;
    if corpus.is_empty() {
        log::warn!("no .{} files under {}", config.extension, corpus.root().display());
    }

    let engine = SearchEngine::new(
        corpus,
        config.semantic_search.clone(),
        config.base_path().to_path_buf(),
    );

    match args.command {
        Command::Search {
            query,
            query_args,
            json,
            body,
        } => cli::handle_search(&query, &query_args, json, body, &config, &engine)?,

        Command::Ask {
            query,
            query_args,
            json,
        } => cli::handle_ask(&query, &query_args, json, &config, &engine)?,

        Command::Chat { query_args } => cli::handle_chat(&query_args, &config, &engine)?,

        Command::Stats { json } => cli::handle_stats(json, &engine)?,

        Command::Index {} => cli::handle_index(&config, &engine)?,

        Command::Daemon { addr } => {
            let addr = cli::resolve_daemon_addr(addr.as_deref(), &config)?;
            web::start_daemon(engine, &config, addr).context("http server failed")?;
        }
    }

    Ok(())
}
