//! Interval construction and score-to-grade lookup.

use mtir_core::config::{EvalConfig, RelevanceMode};
use mtir_core::error::{Error, Result};

use crate::jenks::natural_breaks;

/// Maps normalized scores onto integer relevance grades via a precomputed,
/// non-decreasing boundary list. Stateless apart from the boundaries.
#[derive(Debug, Clone)]
pub struct RelevanceBinner {
    intervals: Vec<f64>,
}

impl RelevanceBinner {
    /// Build the binner the configuration asks for. The substring strategy
    /// never bins scores, so requesting it here is a configuration error.
    pub fn from_config(scores: &[f64], config: &EvalConfig) -> Result<Self> {
        match config.relevance_mode {
            RelevanceMode::Jenks => Self::jenks(scores, config.grade_count),
            RelevanceMode::Percentile => Self::percentile(scores, config.percentile_threshold),
            RelevanceMode::Substring => Err(Error::InvalidConfig(
                "substring relevance mode does not use score binning".to_string(),
            )),
        }
    }

    /// Jenks natural breaks over the normalized scores, `nb_class` grades.
    /// 0.0 is injected into the sample when absent so the first interval
    /// always starts at zero.
    pub fn jenks(scores: &[f64], nb_class: usize) -> Result<Self> {
        if nb_class < 2 {
            return Err(Error::InvalidConfig(format!(
                "number of classes must be at least 2, got {nb_class}"
            )));
        }
        let mut sample = scores.to_vec();
        if !sample.iter().any(|&s| s == 0.0) {
            sample.push(0.0);
        }
        let intervals = natural_breaks(&sample, nb_class)?;
        Ok(Self { intervals })
    }

    /// Single percentile cutoff: scores in the top `n_percentile` percent
    /// get grade 1, the rest grade 0. Boundaries are exactly
    /// `[0.0, percentile(scores, 100 - n_percentile), 1.0]`.
    pub fn percentile(scores: &[f64], n_percentile: u32) -> Result<Self> {
        if n_percentile > 100 {
            return Err(Error::InvalidConfig(format!(
                "n_percentile must be between 0 and 100, got {n_percentile}"
            )));
        }
        if scores.is_empty() {
            return Err(Error::InvalidScore(
                "cannot compute a percentile of an empty score list".to_string(),
            ));
        }
        for &s in scores {
            if !s.is_finite() || !(0.0..=1.0).contains(&s) {
                return Err(Error::InvalidScore(format!(
                    "scores must be between 0.0 and 1.0, got {s}"
                )));
            }
        }
        let mut sorted = scores.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let cutoff = linear_percentile(&sorted, f64::from(100 - n_percentile));
        Ok(Self { intervals: vec![0.0, cutoff, 1.0] })
    }

    pub fn intervals(&self) -> &[f64] {
        &self.intervals
    }

    pub fn grade_count(&self) -> usize {
        self.intervals.len() - 1
    }

    /// Grade of one normalized score: the last interval `i` with
    /// `intervals[i] <= score < intervals[i+1]`. A score matching no
    /// interval (exactly 1.0, or boundary degeneracy) gets the top grade.
    pub fn grade(&self, score: f64) -> Result<usize> {
        if !score.is_finite() || !(0.0..=1.0).contains(&score) {
            return Err(Error::InvalidScore(format!(
                "document score must be between 0.0 and 1.0, got {score}"
            )));
        }
        let mut grade = None;
        for i in 0..self.intervals.len() - 1 {
            if self.intervals[i] <= score && score < self.intervals[i + 1] {
                grade = Some(i);
            }
        }
        Ok(grade.unwrap_or(self.intervals.len() - 2))
    }

    pub fn grades(&self, scores: &[f64]) -> Result<Vec<usize>> {
        scores.iter().map(|&s| self.grade(s)).collect()
    }
}

/// Linear-interpolated percentile over a sorted sample, `q` in `[0, 100]`.
fn linear_percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (rank - lo as f64) * (sorted[hi] - sorted[lo])
}
