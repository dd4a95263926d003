use std::net::SocketAddr;

use crate::cli::errors::{CliError, CliResult};
use crate::config::MAX_TOP_K;

/// Validates a query and returns it trimmed
pub fn validate_query(query: &str) -> CliResult<&str> {
    let query = query.trim();
    if query.is_empty() {
        return Err(CliError::validation("query", "Query cannot be empty"));
    }
    Ok(query)
}

/// Validates the number of results
pub fn validate_top_k(top_k: usize) -> CliResult<usize> {
    if top_k == 0 || top_k > MAX_TOP_K {
        return Err(CliError::validation(
            "top_k",
            format!("must be between 1 and {MAX_TOP_K}"),
        ));
    }
    Ok(top_k)
}

/// Validates a listen address
pub fn validate_addr(addr: &str) -> CliResult<SocketAddr> {
    addr.trim()
        .parse()
        .map_err(|_| CliError::invalid_input(format!("'{addr}' is not a valid socket address")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_query_trims() {
        assert_eq!(validate_query("  契約条件  ").unwrap(), "契約条件");
    }

    #[test]
    fn test_validate_query_rejects_blank() {
        let err = validate_query(" \t ").unwrap_err();
        assert!(matches!(err, CliError::Validation { field, .. } if field == "query"));
    }

    #[test]
    fn test_validate_top_k_bounds() {
        assert_eq!(validate_top_k(1).unwrap(), 1);
        assert_eq!(validate_top_k(MAX_TOP_K).unwrap(), MAX_TOP_K);
        assert!(validate_top_k(0).is_err());
        assert!(validate_top_k(MAX_TOP_K + 1).is_err());
    }

    #[test]
    fn test_validate_addr() {
        assert_eq!(
            validate_addr("127.0.0.1:8080").unwrap(),
            "127.0.0.1:8080".parse::<SocketAddr>().unwrap()
        );
        assert!(matches!(
            validate_addr("localhost"),
            Err(CliError::InvalidInput { .. })
        ));
    }
}
