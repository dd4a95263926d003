use crate::{
    cli::{
        commands::{AskCommand, ChatCommand, IndexCommand, QueryOptions, SearchCommand, StatsCommand},
        errors::CliResult,
        validation::validate_addr,
        QueryArgs,
    },
    config::Config,
    search::SearchEngine,
};

pub fn handle_search(
    query: &str,
    query_args: &QueryArgs,
    json: bool,
    body: bool,
    config: &Config,
    engine: &SearchEngine,
) -> CliResult<()> {
    let options = QueryOptions::resolve(query_args, config)?;
    SearchCommand::new(query, options, json, body)?.execute(engine)
}

pub fn handle_ask(
    query: &str,
    query_args: &QueryArgs,
    json: bool,
    config: &Config,
    engine: &SearchEngine,
) -> CliResult<()> {
    let options = QueryOptions::resolve(query_args, config)?;
    AskCommand::new(query, options, json)?.execute(engine)
}

pub fn handle_chat(query_args: &QueryArgs, config: &Config, engine: &SearchEngine) -> CliResult<()> {
    let options = QueryOptions::resolve(query_args, config)?;
    ChatCommand::new(options).execute(engine)
}

pub fn handle_stats(json: bool, engine: &SearchEngine) -> CliResult<()> {
    StatsCommand { json }.execute(engine)
}

pub fn handle_index(config: &Config, engine: &SearchEngine) -> CliResult<()> {
    IndexCommand::new(config).execute(engine)
}

/// Listen address from the flag, falling back to the config.
pub fn resolve_daemon_addr(addr: Option<&str>, config: &Config) -> CliResult<std::net::SocketAddr> {
    validate_addr(addr.unwrap_or(&config.daemon.addr))
}
