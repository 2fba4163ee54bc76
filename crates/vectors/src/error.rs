//! Errors raised by vector construction and comparison.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VectorError {
    /// A vector was requested before the factory learned its layout
    #[error("Feature vector factory has not been initialized")]
    Uninitialized,

    /// Two vectors of different length were compared
    #[error("Vector dimensions differ: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },
}

pub type Result<T> = std::result::Result<T, VectorError>;
