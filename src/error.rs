//! Error types for caller-contract violations.
//!
//! Only genuine contract violations surface as errors. Recoverable numeric
//! degeneracies (zero distance, near-zero linear power before a logarithm)
//! are handled locally with documented substitute values, and out-of-grid
//! coordinates are silently ignored during placement and tracing (the
//! building exterior is expected, not exceptional).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Material fields outside their physical range (εᵣ < 1, σ < 0,
    /// non-positive thickness). Rejected at construction, never clamped.
    #[error("invalid material '{name}': {reason}")]
    InvalidMaterial { name: String, reason: String },

    /// Negative transmitter-receiver distance.
    #[error("distance must be non-negative, got {0}")]
    InvalidDistance(f64),

    /// Non-positive carrier frequency.
    #[error("frequency must be positive, got {0} Hz")]
    InvalidFrequency(f64),

    /// Non-positive grid extent or resolution.
    #[error("invalid grid geometry: {0}")]
    InvalidGrid(String),
}
