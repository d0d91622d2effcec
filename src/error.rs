//! Error types for parameter validation and configuration loading

use thiserror::Error;

/// Errors surfaced by the simulation core
#[derive(Debug, Error)]
pub enum SimError {
    /// A parameter update was non-finite or outside its physical domain.
    /// The update is rejected and the previous value kept.
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("unknown plot quantity `{0}`")]
    UnknownPlotQuantity(String),

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;

/// Reject NaN and infinities
pub fn finite(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SimError::InvalidParameter {
            name,
            value,
            reason: "must be finite",
        })
    }
}

/// Accept values strictly greater than zero
pub fn positive(name: &'static str, value: f64) -> Result<f64> {
    finite(name, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(SimError::InvalidParameter {
            name,
            value,
            reason: "must be greater than zero",
        })
    }
}

/// Accept values greater than or equal to zero
pub fn non_negative(name: &'static str, value: f64) -> Result<f64> {
    finite(name, value)?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(SimError::InvalidParameter {
            name,
            value,
            reason: "must not be negative",
        })
    }
}
