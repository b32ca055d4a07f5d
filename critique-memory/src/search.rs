//! Hybrid search: cosine similarity over embeddings when a provider is
//! available, a hand-rolled token-overlap fallback otherwise. The
//! fallback exists for the embedding-less path only — the embedding path
//! already covers the "real" ranking need for a sub-1000-item corpus, so
//! no standalone BM25 crate is pulled in.

use std::collections::HashSet;

use crate::model::{MemoryItem, SearchHit};

const SIMILARITY_FLOOR: f32 = 0.3;

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()).map(|t| t.to_lowercase()).collect()
}

fn token_overlap_score(query_tokens: &HashSet<String>, content: &str) -> f32 {
    if query_tokens.is_empty() {
        return 0.0;
    }
    let content_tokens = tokenize(content);
    let overlap = query_tokens.intersection(&content_tokens).count();
    overlap as f32 / query_tokens.len() as f32
}

/// Ranks `candidates` by cosine similarity to `query_embedding`, keeping
/// only those above the similarity floor, ties broken by recency.
pub fn rank_by_embedding(candidates: Vec<MemoryItem>, query_embedding: &[f32], limit: usize) -> Vec<SearchHit> {
    let mut hits: Vec<SearchHit> = candidates
        .into_iter()
        .filter_map(|item| {
            let score = item.embedding.as_ref().map(|e| cosine_similarity(e, query_embedding)).unwrap_or(0.0);
            (score > SIMILARITY_FLOOR).then_some(SearchHit { item, score })
        })
        .collect();
    hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal).then_with(|| b.item.last_accessed_at.cmp(&a.item.last_accessed_at)));
    hits.truncate(limit);
    hits
}

/// Token-overlap fallback when no embedding provider is configured.
pub fn rank_by_tokens(candidates: Vec<MemoryItem>, query: &str, limit: usize) -> Vec<SearchHit> {
    let query_tokens = tokenize(query);
    let mut hits: Vec<SearchHit> = candidates
        .into_iter()
        .map(|item| {
            let score = token_overlap_score(&query_tokens, &item.content);
            SearchHit { item, score }
        })
        .filter(|hit| hit.score > 0.0)
        .collect();
    hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal).then_with(|| b.item.last_accessed_at.cmp(&a.item.last_accessed_at)));
    hits.truncate(limit);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MemoryKind;

    #[test]
    fn cosine_similarity_of_identical_vectors_is_one() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_similarity_of_orthogonal_vectors_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn embedding_rank_filters_below_similarity_floor() {
        let mut low = MemoryItem::new(MemoryKind::Pattern, "low", vec![], 0.1);
        low.embedding = Some(vec![1.0, 0.0]);
        let mut high = MemoryItem::new(MemoryKind::Pattern, "high", vec![], 0.1);
        high.embedding = Some(vec![0.9, 0.1]);

        let query = vec![1.0, 0.0];
        let hits = rank_by_embedding(vec![low, high], &query, 10);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].item.content, "low");
    }

    #[test]
    fn token_rank_scores_by_overlap() {
        let a = MemoryItem::new(MemoryKind::Pattern, "rust ownership and borrowing", vec![], 0.1);
        let b = MemoryItem::new(MemoryKind::Pattern, "python duck typing", vec![], 0.1);
        let hits = rank_by_tokens(vec![a, b], "rust borrowing rules", 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].item.content, "rust ownership and borrowing");
    }
}
