//! Similarity scoring and rank fusion for chunk retrieval.
//!
//! - Cosine similarity over embeddings
//! - A keyword score tolerant of Russian inflection
//! - Weighted Reciprocal Rank Fusion (RRF) of the two rankings

use std::collections::HashMap;

/// Stem prefix length used when comparing query and chunk tokens.
const STEM_CHARS: usize = 5;

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1]. Returns 0.0 if the lengths differ, either
/// vector is empty, or either has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, norm_a, norm_b) = a.iter().zip(b).fold((0.0f64, 0.0f64, 0.0f64), |acc, (x, y)| {
        let (x, y) = (*x as f64, *y as f64);
        (acc.0 + x * y, acc.1 + x * x, acc.2 + y * y)
    });

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// Lowercased word stems of at least three characters.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().count() >= 3)
        .map(|word| word.to_lowercase().chars().take(STEM_CHARS).collect())
        .collect()
}

/// Keyword relevance of `content` to the query stems.
///
/// Sums stem occurrences and normalises by content length, so a long chunk
/// does not win on size alone. Zero when nothing matches.
pub fn keyword_score(query_stems: &[String], content: &str) -> f32 {
    if query_stems.is_empty() {
        return 0.0;
    }

    let content_stems = tokenize(content);
    let occurrences = query_stems
        .iter()
        .map(|stem| content_stems.iter().filter(|s| *s == stem).count())
        .sum::<usize>();

    let length_factor = (content.chars().count() as f32 / 100.0).max(1.0);
    occurrences as f32 / length_factor
}

/// Order `(index, score)` pairs best first, dropping non-positive scores.
pub fn rank(scores: impl IntoIterator<Item = (usize, f32)>) -> Vec<usize> {
    let mut scored: Vec<(usize, f32)> = scores.into_iter().filter(|(_, s)| *s > 0.0).collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0)));
    scored.into_iter().map(|(i, _)| i).collect()
}

/// Weighted Reciprocal Rank Fusion.
///
/// Each list contributes `weight / (k + rank)` per item (rank is 1-based).
/// Returns `(item, fused_score)` sorted by descending score, ties broken by
/// item so the order is deterministic. Standard value is k=60.
pub fn reciprocal_rank_fusion(
    rankings: &[(&[usize], f32)],
    k: u32,
    limit: usize,
) -> Vec<(usize, f32)> {
    let k = k as f32;
    let mut scores: HashMap<usize, f32> = HashMap::new();

    for (ranking, weight) in rankings {
        for (rank, item) in ranking.iter().enumerate() {
            *scores.entry(*item).or_insert(0.0) += weight / (k + rank as f32 + 1.0);
        }
    }

    let mut fused: Vec<(usize, f32)> = scores.into_iter().collect();
    fused.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0)));
    fused.truncate(limit);
    fused
}
