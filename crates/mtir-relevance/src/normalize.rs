use mtir_core::error::{Error, Result};

/// Rescale raw retrieval scores into `[0.0, 1.0]` by dividing through the
/// maximum. Pure and idempotent: a list whose maximum is already exactly
/// 1.0 comes back unchanged.
///
/// Errors on an empty list, on any non-finite or negative value, and on an
/// all-zero list (a degenerate vector carries no ranking signal; callers
/// that tolerate it must handle the case before normalizing).
pub fn normalize(scores: &[f64]) -> Result<Vec<f64>> {
    if scores.is_empty() {
        return Err(Error::InvalidScore("cannot normalize an empty score list".to_string()));
    }
    let mut max_score = 0.0f64;
    for &score in scores {
        if !score.is_finite() {
            return Err(Error::InvalidScore(format!("scores must be finite, got {score}")));
        }
        if score < 0.0 {
            return Err(Error::InvalidScore(format!("scores must be non-negative, got {score}")));
        }
        if score > max_score {
            max_score = score;
        }
    }
    if max_score == 0.0 {
        return Err(Error::InvalidScore("all scores are zero".to_string()));
    }
    Ok(scores.iter().map(|s| s / max_score).collect())
}
