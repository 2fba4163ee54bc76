//! Evaluation errors.

use thiserror::Error;
use vectors::VectorError;

#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Invalid fold count {0}: at least 2 folds are required")]
    InvalidFoldCount(usize),

    #[error("Vector error: {0}")]
    Vector(#[from] VectorError),
}

pub type Result<T> = std::result::Result<T, EvaluationError>;
