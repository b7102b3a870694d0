//! Fisher-Jenks natural breaks.
//!
//! Classic O(k*n^2) dynamic program over the sorted sample: for every prefix
//! length and class count, track the minimal sum of within-class squared
//! deviations and the lower limit of the last class achieving it. Breaks are
//! reported as `[min, max of class 1, ..., max of class k-1, max]`.

use mtir_core::error::{Error, Result};

/// Compute `nb_class + 1` non-decreasing breakpoints minimizing within-class
/// variance over `scores`.
///
/// Scores must be finite and already normalized to `[0.0, 1.0]`. With fewer
/// values than classes the result degrades to duplicated boundaries rather
/// than failing; the grade lookup tolerates the collisions.
pub fn natural_breaks(scores: &[f64], nb_class: usize) -> Result<Vec<f64>> {
    if nb_class < 2 {
        return Err(Error::InvalidConfig(format!(
            "number of classes must be at least 2, got {nb_class}"
        )));
    }
    if scores.is_empty() {
        return Err(Error::InvalidScore("cannot compute breaks of an empty score list".to_string()));
    }
    for &s in scores {
        if !s.is_finite() {
            return Err(Error::InvalidScore(format!("scores must be finite, got {s}")));
        }
        if !(0.0..=1.0).contains(&s) {
            return Err(Error::InvalidScore(format!(
                "scores must be between 0.0 and 1.0, got {s}"
            )));
        }
    }

    let mut data = scores.to_vec();
    data.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = data.len();

    if n <= nb_class {
        // Not enough values for distinct classes: every value becomes its
        // own boundary and the top one is repeated.
        let mut breaks = data.clone();
        while breaks.len() < nb_class + 1 {
            breaks.push(data[n - 1]);
        }
        return Ok(breaks);
    }

    // lower[l][j]: 1-based start index of class j in the optimal partition
    // of the first l values; var[l][j]: its total within-class variance.
    let k = nb_class;
    let mut lower = vec![vec![0usize; k + 1]; n + 1];
    let mut var = vec![vec![0.0f64; k + 1]; n + 1];
    for j in 1..=k {
        lower[1][j] = 1;
        for i in 2..=n {
            var[i][j] = f64::INFINITY;
        }
    }

    let mut variance = 0.0;
    for l in 2..=n {
        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        let mut w = 0.0;
        for m in 1..=l {
            let lower_idx = l - m + 1;
            let val = data[lower_idx - 1];
            w += 1.0;
            sum += val;
            sum_sq += val * val;
            variance = sum_sq - (sum * sum) / w;
            let prefix = lower_idx - 1;
            if prefix != 0 {
                for j in 2..=k {
                    let candidate = variance + var[prefix][j - 1];
                    if var[l][j] >= candidate {
                        lower[l][j] = lower_idx;
                        var[l][j] = candidate;
                    }
                }
            }
        }
        lower[l][1] = 1;
        var[l][1] = variance;
    }

    let mut breaks = vec![0.0f64; k + 1];
    breaks[0] = data[0];
    breaks[k] = data[n - 1];
    let mut l = n;
    for j in (2..=k).rev() {
        // lower[l][j] - 2 indexes the maximum of class j-1; saturate on
        // degenerate partitions where a class collapsed onto the start.
        let id = lower[l][j].saturating_sub(2);
        breaks[j - 1] = data[id];
        l = lower[l][j].saturating_sub(1).max(1);
    }
    Ok(breaks)
}
