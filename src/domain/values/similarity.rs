/// Cosine similarity of two embedding vectors.
///
/// Returns `None` when the vectors differ in dimension or either has zero
/// magnitude; callers decide whether that is an error (compare) or a
/// zero-similarity result (store scan). Never produces NaN or infinity.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        None
    } else {
        Some(dot / denom)
    }
}

/// Cosine distance as stored alongside search results: `1 - similarity`,
/// with degenerate vectors treated as maximally distant.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    1.0 - cosine_similarity(a, b).unwrap_or(0.0)
}
