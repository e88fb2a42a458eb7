/// Weighted mean and population standard deviation of a sample
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightedStats {
    mean: f64,
    std: f64,
}

impl WeightedStats {
    pub fn get_mean(&self) -> f64 {
        self.mean
    }

    pub fn get_std(&self) -> f64 {
        self.std
    }
}

/// Computes the weighted mean `Σ(w·x)/Σw` and the population standard deviation
/// `sqrt(Σ(w·(x - mean)²)/Σw)` (ddof = 0).
///
/// Pairs with a non-finite value or weight are ignored. If the remaining weights sum to zero
/// or less all pairs are weighted equally. A single pair yields its value and a deviation of 0.
///
/// # Arguments
/// * `samples` - (value, weight) pairs
///
pub fn weighted_stats(samples: &[(f64, f64)]) -> Option<WeightedStats> {
    let valid: Vec<(f64, f64)> = samples
        .iter()
        .copied()
        .filter(|(value, weight)| value.is_finite() && weight.is_finite())
        .collect();
    if valid.is_empty() {
        return None;
    }
    let weight_sum: f64 = valid.iter().map(|(_, weight)| weight).sum();
    let valid: Vec<(f64, f64)> = if weight_sum > 0.0 {
        valid
    } else {
        valid.into_iter().map(|(value, _)| (value, 1.0)).collect()
    };
    let weight_sum: f64 = valid.iter().map(|(_, weight)| weight).sum();
    let mean = valid
        .iter()
        .map(|(value, weight)| value * weight)
        .sum::<f64>()
        / weight_sum;
    let variance = valid
        .iter()
        .map(|(value, weight)| weight * (value - mean).powi(2))
        .sum::<f64>()
        / weight_sum;
    Some(WeightedStats {
        mean,
        std: variance.max(0.0).sqrt(),
    })
}
