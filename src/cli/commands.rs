use std::path::PathBuf;

use inquire::InquireError;

use crate::{
    cli::{errors::CliResult, validation::*, QueryArgs},
    config::Config,
    mail::CorpusStats,
    search::{SearchEngine, SearchHit, SearchMode},
    semantic,
};

const NOTHING_FOUND: &str = "No relevant emails were found.";
const CHAT_EXIT_WORDS: &[&str] = &["exit", "quit"];

/// Mode and result count for one query, after config defaults are applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryOptions {
    pub mode: SearchMode,
    pub top_k: usize,
}

impl QueryOptions {
    pub fn resolve(args: &QueryArgs, config: &Config) -> CliResult<Self> {
        Ok(Self {
            mode: args.mode.unwrap_or(config.default_mode),
            top_k: validate_top_k(args.top_k.unwrap_or(config.top_k))?,
        })
    }
}

/// Command for ranking emails
#[derive(Debug, Clone)]
pub struct SearchCommand {
    pub query: String,
    pub options: QueryOptions,
    pub json: bool,
    pub body: bool,
}

impl SearchCommand {
    pub fn new(query: &str, options: QueryOptions, json: bool, body: bool) -> CliResult<Self> {
        Ok(Self {
            query: validate_query(query)?.to_string(),
            options,
            json,
            body,
        })
    }

    pub fn execute(self, engine: &SearchEngine) -> CliResult<()> {
        let scored = engine.search(&self.query, self.options.mode, self.options.top_k)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&engine.hits(&scored))?);
            return Ok(());
        }

        if scored.is_empty() {
            println!("{NOTHING_FOUND}");
            return Ok(());
        }

        for (rank, hit) in scored.iter().enumerate() {
            let Some(email) = engine.email(hit) else {
                continue;
            };
            print_hit(rank + 1, &SearchHit::new(email, hit.score));
            if self.body {
                println!();
                for line in email.body.lines() {
                    println!("   {line}");
                }
            }
            println!();
        }

        Ok(())
    }
}

fn print_hit(rank: usize, hit: &SearchHit) {
    println!("{rank}. {} (score: {})", hit.source, hit.score);
    println!("   Subject: {}", hit.subject);
    println!("   From: {}", hit.from);
    println!("   To: {}", hit.to);
    println!("   Date: {}", hit.date);
}

/// Command for answering one question
#[derive(Debug, Clone)]
pub struct AskCommand {
    pub query: String,
    pub options: QueryOptions,
    pub json: bool,
}

impl AskCommand {
    pub fn new(query: &str, options: QueryOptions, json: bool) -> CliResult<Self> {
        Ok(Self {
            query: validate_query(query)?.to_string(),
            options,
            json,
        })
    }

    pub fn execute(self, engine: &SearchEngine) -> CliResult<()> {
        let answer = engine.ask(&self.query, self.options.mode, self.options.top_k)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&answer)?);
        } else {
            print!("{answer}");
        }
        Ok(())
    }
}

/// Interactive question loop over one loaded corpus
#[derive(Debug, Clone)]
pub struct ChatCommand {
    pub options: QueryOptions,
}

impl ChatCommand {
    pub fn new(options: QueryOptions) -> Self {
        Self { options }
    }

    pub fn execute(self, engine: &SearchEngine) -> CliResult<()> {
        // build the index before the first prompt, not after it
        if self.options.mode != SearchMode::Keyword {
            engine.semantic_searcher()?;
        }

        let corpus = engine.corpus();
        println!(
            "{} emails in {} folders, mode: {}. Type exit or quit to leave.",
            corpus.len(),
            corpus.folders().len(),
            self.options.mode
        );

        loop {
            let input = match inquire::Text::new("Question:").prompt() {
                Ok(input) => input,
                Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
                Err(err) => return Err(err.into()),
            };

            let input = input.trim();
            if input.is_empty() || CHAT_EXIT_WORDS.contains(&input.to_lowercase().as_str()) {
                break;
            }

            match engine.ask(input, self.options.mode, self.options.top_k) {
                Ok(answer) => println!("\n{answer}"),
                Err(err) => eprintln!("{err}"),
            }
        }

        Ok(())
    }
}

/// Command for printing corpus statistics
#[derive(Debug, Clone)]
pub struct StatsCommand {
    pub json: bool,
}

impl StatsCommand {
    pub fn execute(self, engine: &SearchEngine) -> CliResult<()> {
        let stats = engine.corpus().stats();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            print_stats(&stats);
        }
        Ok(())
    }
}

fn print_stats(stats: &CorpusStats) {
    println!("Emails: {}", stats.total);
    println!("Folders: {}", stats.folders.len());
    for folder in &stats.folders {
        println!("  {}: {}", folder.folder, folder.count);
    }
    match (stats.earliest, stats.latest) {
        (Some(earliest), Some(latest)) => println!(
            "Date range: {} .. {}",
            earliest.format("%Y-%m-%d"),
            latest.format("%Y-%m-%d")
        ),
        _ => println!("Date range: unknown"),
    }
}

/// Command for building the semantic index up front
#[derive(Debug, Clone)]
pub struct IndexCommand {
    /// Where vectors are written, `None` when caching is off
    pub vectors_path: Option<PathBuf>,
}

impl IndexCommand {
    pub fn new(config: &Config) -> Self {
        let vectors_path = config
            .semantic_search
            .cache
            .then(|| semantic::vectors_path(config.base_path()));
        Self { vectors_path }
    }

    pub fn execute(self, engine: &SearchEngine) -> CliResult<()> {
        let searcher = engine.semantic_searcher()?;
        let report = searcher.report();

        println!(
            "Indexed {} emails with {} ({} embedded, {} from cache, {} skipped)",
            report.indexed,
            searcher.model_name(),
            report.embedded,
            report.reused,
            report.skipped
        );
        match self.vectors_path {
            Some(path) => println!("Vectors saved to {}", path.display()),
            None => println!("Vector cache is disabled, nothing was written"),
        }
        Ok(())
    }
}
