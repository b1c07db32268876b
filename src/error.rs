// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/sensordeck

//! Error types for sensor reads and configuration

use thiserror::Error;

/// Failure of a single sensor read attempt.
///
/// Both variants are local to one sensor: the pipeline converts them into a
/// connection-error event and the scheduler keeps running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    /// The sensor id is not known to the registry or configuration
    #[error("sensor {0} not found")]
    NotFound(String),

    /// Simulated transient communication failure
    #[error("communication error with sensor {0}")]
    Communication(String),
}

impl SensorError {
    /// Id of the sensor the failed read targeted
    pub fn sensor_id(&self) -> &str {
        match self {
            SensorError::NotFound(id) | SensorError::Communication(id) => id,
        }
    }
}

/// Invalid sensor definition detected at load time
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("sensor definition has an empty id")]
    EmptyId,

    #[error("duplicate sensor id {0}")]
    DuplicateId(String),

    #[error("sensor {id}: range min {min} must be below max {max}")]
    InvalidRange { id: String, min: f64, max: f64 },

    #[error(
        "sensor {id}: thresholds must satisfy min < alert < critical <= max \
         (min {min}, alert {alert}, critical {critical}, max {max})"
    )]
    ThresholdOrder {
        id: String,
        min: f64,
        alert: f64,
        critical: f64,
        max: f64,
    },

    #[error("{field} must lie in [0, 1], got {value}")]
    Probability { field: &'static str, value: f64 },

    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),

    #[error("alert log capacity must be at least 1")]
    ZeroCapacity,

    #[error("{field}: lower bound {low} must not exceed upper bound {high}")]
    LatencyWindow { field: &'static str, low: u64, high: u64 },
}
