//! Ranking and error metrics.

use std::collections::HashSet;

use catalog::ItemId;

/// Recommended ids that are relevant
pub fn hits(recommended: &[ItemId], relevant: &HashSet<ItemId>) -> usize {
    recommended.iter().filter(|id| relevant.contains(id)).count()
}

/// hits / k
pub fn precision_at_k(recommended: &[ItemId], relevant: &HashSet<ItemId>, k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }
    hits(recommended, relevant) as f64 / k as f64
}

/// hits / |relevant|
pub fn recall(recommended: &[ItemId], relevant: &HashSet<ItemId>) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }
    hits(recommended, relevant) as f64 / relevant.len() as f64
}

pub fn f1_score(precision: f64, recall: f64) -> f64 {
    if precision + recall <= 0.0 {
        return 0.0;
    }
    2.0 * precision * recall / (precision + recall)
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Mean absolute error of signed errors
pub fn mae(errors: &[f64]) -> f64 {
    if errors.is_empty() {
        return 0.0;
    }
    errors.iter().map(|e| e.abs()).sum::<f64>() / errors.len() as f64
}

/// Root mean squared error of signed errors
pub fn rmse(errors: &[f64]) -> f64 {
    if errors.is_empty() {
        return 0.0;
    }
    (errors.iter().map(|e| e * e).sum::<f64>() / errors.len() as f64).sqrt()
}
