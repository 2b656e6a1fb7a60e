// src/error.rs
use thiserror::Error;

/// Error types for payoff construction
///
/// Only configuration problems surface as errors. Misuse of a payoff during
/// a pricing run (evaluating `default_value`/`transient_value` at maturity,
/// mismatched node arrays) is an engine bug and panics instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PayoffError {
    /// Invalid parameter values
    #[error("Invalid parameter '{parameter}' = {value}: {constraint}")]
    InvalidParameters {
        parameter: String,
        value: f64,
        constraint: String,
    },

    /// Invalid configuration
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfiguration { field: String, reason: String },

    /// A raw time restriction that is neither an instant nor a `[lower, upper]` pair
    #[error("Malformed time restriction with {len} components: expected 1 (instant) or 2 (interval)")]
    MalformedRestriction { len: usize },

    /// Interval whose bounds are out of order
    #[error("Invalid time interval [{lower}, {upper}]: lower bound exceeds upper bound")]
    InvalidInterval { lower: f64, upper: f64 },

    /// Stack composed without any child payoff
    #[error("A payoff stack needs at least one child payoff")]
    EmptyStack,

    /// Stacked payoffs must share one maturity
    #[error("Stacked payoff #{index} matures at {found}, expected {expected}")]
    MaturityMismatch {
        index: usize,
        expected: f64,
        found: f64,
    },
}

/// Result type alias for payoff construction
pub type PayoffResult<T> = Result<T, PayoffError>;

/// Panic unless `t` lies strictly before maturity.
///
/// The terminal boundary belongs to `terminal_value` alone.
#[track_caller]
pub fn assert_before_maturity(t: f64, maturity: f64) {
    assert!(
        t != maturity,
        "transient/default payoff evaluated at maturity t = T = {}",
        maturity
    );
}

/// Panic unless the continuation values and the node array line up.
#[track_caller]
pub fn assert_same_nodes(v_len: usize, s_len: usize) {
    assert_eq!(
        v_len, s_len,
        "continuation value has {} nodes but the node array has {}",
        v_len, s_len
    );
}

/// Validation utilities
pub mod validation {
    use super::{PayoffError, PayoffResult};

    /// Validate that a parameter is positive
    pub fn validate_positive(name: &str, value: f64) -> PayoffResult<()> {
        validate_finite(name, value)?;
        if value <= 0.0 {
            Err(PayoffError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be positive (> 0)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is non-negative
    pub fn validate_non_negative(name: &str, value: f64) -> PayoffResult<()> {
        validate_finite(name, value)?;
        if value < 0.0 {
            Err(PayoffError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be non-negative (≥ 0)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is within a closed range
    pub fn validate_range(name: &str, value: f64, min: f64, max: f64) -> PayoffResult<()> {
        if !(min..=max).contains(&value) {
            Err(PayoffError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: format!("must be in range [{}, {}]", min, max),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> PayoffResult<()> {
        if !value.is_finite() {
            Err(PayoffError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be finite (not NaN or infinite)".to_string(),
            })
        } else {
            Ok(())
        }
    }
}
