//! Keyword overlap scoring.
//!
//! Each whitespace-separated query token contributes the number of times it
//! occurs in the lowercased message text. There is no stop-word filtering
//! and no length normalization: a token repeated in the query counts again.

use rayon::prelude::*;

use crate::mail::Email;

/// Keyword hit for a single message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordHit {
    /// Position of the message in the corpus
    pub index: usize,
    /// Total token occurrences
    pub hits: u64,
}

/// Lowercase the query and split it on whitespace.
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Count non-overlapping occurrences of every token in `text`.
///
/// `text` must already be lowercased.
fn count_hits(tokens: &[String], text: &str) -> u64 {
    tokens
        .iter()
        .map(|token| text.matches(token.as_str()).count() as u64)
        .sum()
}

/// Rank messages by keyword hits, best first.
///
/// Messages without a single hit are dropped. Equal scores keep corpus
/// order.
pub fn score_keyword(query: &str, emails: &[Email], top_k: usize) -> Vec<KeywordHit> {
    let tokens = tokenize(query);
    if tokens.is_empty() || top_k == 0 {
        return vec![];
    }

    let mut results: Vec<KeywordHit> = emails
        .par_iter()
        .enumerate()
        .filter_map(|(index, email)| {
            let hits = count_hits(&tokens, &email.content.to_lowercase());
            (hits > 0).then_some(KeywordHit { index, hits })
        })
        .collect();

    // sort_by is stable, so ties stay in corpus order
    results.sort_by(|a, b| b.hits.cmp(&a.hits));
    results.truncate(top_k);

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::parse_email;
    use std::path::Path;

    fn email(folder: &str, name: &str, body: &str) -> Email {
        let content = format!("From: a\nTo: b\nSubject: s\nDate: d\n\n{body}");
        parse_email(&content, &Path::new(folder).join(name))
    }

    #[test]
    fn test_tokenize_lowercases_and_splits() {
        assert_eq!(
            tokenize("  Kai  Havertz\tJr. "),
            vec!["kai", "havertz", "jr."]
        );
    }

    #[test]
    fn test_tokenize_keeps_duplicates_and_short_tokens() {
        assert_eq!(tokenize("a fee a"), vec!["a", "fee", "a"]);
    }

    #[test]
    fn test_empty_query_returns_nothing() {
        let emails = vec![email("Arsenal", "1.msg", "anything")];
        assert!(score_keyword("", &emails, 3).is_empty());
        assert!(score_keyword("   \t", &emails, 3).is_empty());
    }

    #[test]
    fn test_occurrences_are_counted_not_just_presence() {
        let emails = vec![
            email("Arsenal", "1.msg", "transfer"),
            email("Chelsea", "2.msg", "transfer transfer transfer"),
        ];

        let results = score_keyword("transfer", &emails, 3);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].index, 1);
        assert_eq!(results[0].hits, 3);
        assert_eq!(results[1].hits, 1);
    }

    #[test]
    fn test_counts_substring_matches_case_insensitively() {
        let emails = vec![email("Liverpool", "1.msg", "ACADEMY graduate, academy-trained")];
        let results = score_keyword("Academy", &emails, 3);
        assert_eq!(results[0].hits, 2);
    }

    #[test]
    fn test_matching_covers_headers() {
        // scoring runs on the full content, not only the body
        let emails = vec![email("Chelsea", "1.msg", "nothing relevant")];
        let results = score_keyword("subject", &emails, 3);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_non_overlapping_count() {
        let emails = vec![email("Arsenal", "1.msg", "zzzz")];
        let results = score_keyword("zz", &emails, 3);
        assert_eq!(results[0].hits, 2);
    }

    #[test]
    fn test_duplicate_query_tokens_count_twice() {
        let emails = vec![email("Arsenal", "1.msg", "salary")];
        let results = score_keyword("salary salary", &emails, 3);
        assert_eq!(results[0].hits, 2);
    }

    #[test]
    fn test_zero_score_dropped_and_top_k_applied() {
        let emails = vec![
            email("Arsenal", "1.msg", "wage wage"),
            email("Arsenal", "2.msg", "cooking"),
            email("Chelsea", "3.msg", "wage"),
            email("Liverpool", "4.msg", "wage wage wage"),
        ];

        let results = score_keyword("wage", &emails, 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].index, 3);
        assert_eq!(results[1].index, 0);
    }

    #[test]
    fn test_ties_keep_corpus_order() {
        let emails = vec![
            email("Arsenal", "1.msg", "bonus"),
            email("Chelsea", "2.msg", "bonus"),
            email("Liverpool", "3.msg", "bonus"),
        ];

        let indices: Vec<usize> = score_keyword("bonus", &emails, 3)
            .into_iter()
            .map(|hit| hit.index)
            .collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }
}
