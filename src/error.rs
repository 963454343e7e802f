//! Error types for the estimation crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EstimationError {
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("particle weights collapsed (total weight {0})")]
    DegenerateWeights(f64),

    #[error("innovation covariance is zero")]
    DegenerateInnovation,
}

pub type Result<T> = std::result::Result<T, EstimationError>;
