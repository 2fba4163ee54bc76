//! Seam for an externally trained scoring model.
//!
//! The engine never depends on how the model is served. Implementors return
//! a score in [0,1] per item; errors and non-finite values degrade to a
//! neutral score for that item so one bad prediction never aborts a ranking.

use catalog::Item;
use thiserror::Error;
use tracing::warn;

/// Score used when the external model cannot answer
pub const NEUTRAL_EXTERNAL_SCORE: f64 = 0.5;

/// Errors an external scorer implementation can report
#[derive(Error, Debug)]
pub enum ScorerError {
    #[error("External scorer unavailable: {0}")]
    Unavailable(String),

    #[error("External scorer has no prediction for item {0}")]
    NoPrediction(u32),

    #[error("External scorer returned an invalid score: {0}")]
    InvalidScore(f64),
}

/// An externally trained model that scores items.
pub trait ExternalScorer: Send + Sync {
    fn name(&self) -> &str;

    /// Score for `item` given the pool it is ranked in
    fn predict_score(&self, item: &Item, catalog: &[&Item]) -> anyhow::Result<f64>;
}

/// Prediction clamped to [0,1], or the neutral score on failure
pub fn score_or_neutral(scorer: &dyn ExternalScorer, item: &Item, catalog: &[&Item]) -> f64 {
    match scorer.predict_score(item, catalog) {
        Ok(score) if score.is_finite() => score.clamp(0.0, 1.0),
        Ok(score) => {
            warn!(
                "{}: {} for item {}",
                scorer.name(),
                ScorerError::InvalidScore(score),
                item.id
            );
            NEUTRAL_EXTERNAL_SCORE
        }
        Err(err) => {
            warn!("{} failed for item {}: {:#}", scorer.name(), item.id, err);
            NEUTRAL_EXTERNAL_SCORE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedScorer(f64);

    impl ExternalScorer for FixedScorer {
        fn name(&self) -> &str {
            "fixed"
        }

        fn predict_score(&self, _item: &Item, _catalog: &[&Item]) -> anyhow::Result<f64> {
            Ok(self.0)
        }
    }

    struct DownScorer;

    impl ExternalScorer for DownScorer {
        fn name(&self) -> &str {
            "down"
        }

        fn predict_score(&self, _item: &Item, _catalog: &[&Item]) -> anyhow::Result<f64> {
            Err(ScorerError::Unavailable("connection refused".to_string()).into())
        }
    }

    fn item() -> Item {
        Item {
            id: 1,
            brand: "Audi".to_string(),
            model: "A4".to_string(),
            power: 110,
            fuel: "Petrol".to_string(),
            price: 20_000.0,
            year: 2019,
            transmission: String::new(),
            body_type: String::new(),
        }
    }

    #[test]
    fn test_valid_scores_are_clamped() {
        assert_eq!(score_or_neutral(&FixedScorer(0.8), &item(), &[]), 0.8);
        assert_eq!(score_or_neutral(&FixedScorer(3.0), &item(), &[]), 1.0);
    }

    #[test]
    fn test_failures_degrade_to_neutral() {
        assert_eq!(score_or_neutral(&DownScorer, &item(), &[]), NEUTRAL_EXTERNAL_SCORE);
        assert_eq!(
            score_or_neutral(&FixedScorer(f64::NAN), &item(), &[]),
            NEUTRAL_EXTERNAL_SCORE
        );
    }
}
