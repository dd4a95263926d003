//! Weighted Reciprocal Rank Fusion of keyword and semantic rankings.
//!
//!   score(d) = α / (k + rank_semantic) + (1 - α) / (k + rank_keyword)
//!
//! Ranks are 1-based; a document missing from one list gets nothing from it.

use std::collections::HashMap;

/// RRF constant (standard value from literature).
const RRF_K: f32 = 60.0;

#[derive(Debug, Clone, PartialEq)]
pub struct FusedHit {
    /// Corpus position
    pub index: usize,
    pub score: f32,
    pub semantic_rank: Option<usize>,
    pub keyword_rank: Option<usize>,
}

/// Fuse two best-first lists of corpus positions.
///
/// Ties are broken by corpus position so output is deterministic.
pub fn rrf_fusion(semantic: &[usize], keyword: &[usize], semantic_weight: f32) -> Vec<FusedHit> {
    let sem_weight = semantic_weight.clamp(0.0, 1.0);
    let kw_weight = 1.0 - sem_weight;

    let mut scores: HashMap<usize, FusedHit> = HashMap::new();

    for (rank, &index) in semantic.iter().enumerate() {
        scores.insert(
            index,
            FusedHit {
                index,
                score: sem_weight / (RRF_K + rank as f32 + 1.0),
                semantic_rank: Some(rank + 1),
                keyword_rank: None,
            },
        );
    }

    for (rank, &index) in keyword.iter().enumerate() {
        let rrf_score = kw_weight / (RRF_K + rank as f32 + 1.0);
        scores
            .entry(index)
            .and_modify(|hit| {
                hit.score += rrf_score;
                hit.keyword_rank = Some(rank + 1);
            })
            .or_insert(FusedHit {
                index,
                score: rrf_score,
                semantic_rank: None,
                keyword_rank: Some(rank + 1),
            });
    }

    let mut results: Vec<FusedHit> = scores.into_values().collect();
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.index.cmp(&b.index))
    });

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_inputs() {
        assert!(rrf_fusion(&[], &[], 0.5).is_empty());
    }

    #[test]
    fn test_document_in_both_lists_wins() {
        let results = rrf_fusion(&[1, 2], &[1, 3], 0.5);

        assert_eq!(results[0].index, 1);
        assert_eq!(results[0].semantic_rank, Some(1));
        assert_eq!(results[0].keyword_rank, Some(1));
        assert!((results[0].score - 1.0 / (RRF_K + 1.0)).abs() < 1e-6);
    }

    #[test]
    fn test_weight_favors_semantic() {
        let results = rrf_fusion(&[1, 2], &[2, 1], 0.8);
        assert_eq!(results[0].index, 1);
    }

    #[test]
    fn test_weight_favors_keyword() {
        let results = rrf_fusion(&[1, 2], &[2, 1], 0.2);
        assert_eq!(results[0].index, 2);
    }

    #[test]
    fn test_weight_clamped() {
        let results = rrf_fusion(&[1], &[2], 1.5);
        assert_eq!(results[0].index, 1);
        let keyword_only = results.iter().find(|hit| hit.index == 2).unwrap();
        assert!(keyword_only.score.abs() < 1e-6);
    }

    #[test]
    fn test_ties_broken_by_position() {
        let results = rrf_fusion(&[4, 3], &[3, 4], 0.5);
        assert_eq!(results[0].index, 3);
        assert_eq!(results[1].index, 4);
    }
}
