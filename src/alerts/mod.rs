// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/sensordeck

//! Alerting - threshold evaluation and the bounded alert log

mod evaluator;
mod log;

pub use evaluator::{classify, evaluate, Evaluation, SEVERITY_MULTIPLIER};
pub use log::AlertLog;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sensors::SensorType;

/// Per-alert classification, computed independently of sensor status
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Critical,
}

impl Severity {
    /// `Critical` when `value > threshold * 1.2`, else `Warning`.
    ///
    /// `threshold` is the sensor's alert threshold, not its critical one, so
    /// a sensor in critical status can still produce a warning alert.
    pub fn for_value(value: f64, threshold: f64) -> Self {
        if value > threshold * SEVERITY_MULTIPLIER {
            Severity::Critical
        } else {
            Severity::Warning
        }
    }
}

/// Request to raise an alert, published on the event hub
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRequest {
    pub sensor_id: String,
    pub sensor_name: String,
    pub value: f64,
    /// The sensor's alert threshold at evaluation time
    pub threshold: f64,
    pub sensor_type: SensorType,
}

/// An alert recorded in the log. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: u64,
    pub sensor_id: String,
    pub sensor_name: String,
    pub value: f64,
    pub threshold: f64,
    pub sensor_type: SensorType,
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
}

impl Alert {
    pub fn from_request(id: u64, request: AlertRequest, timestamp: DateTime<Utc>) -> Self {
        let severity = Severity::for_value(request.value, request.threshold);
        Self {
            id,
            sensor_id: request.sensor_id,
            sensor_name: request.sensor_name,
            value: request.value,
            threshold: request.threshold,
            sensor_type: request.sensor_type,
            timestamp,
            severity,
        }
    }

    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_uses_scaled_alert_threshold() {
        // alert 40 / critical 45: both values are critical status,
        // only one clears 40 * 1.2 = 48
        assert_eq!(Severity::for_value(48.5, 40.0), Severity::Critical);
        assert_eq!(Severity::for_value(47.0, 40.0), Severity::Warning);
        assert_eq!(Severity::for_value(48.0, 40.0), Severity::Warning);
    }

    #[test]
    fn test_alert_from_request() {
        let request = AlertRequest {
            sensor_id: "hum1".to_string(),
            sensor_name: "Relative Humidity".to_string(),
            value: 97.0,
            threshold: 80.0,
            sensor_type: SensorType::Humidity,
        };
        let alert = Alert::from_request(1, request, Utc::now());
        assert!(alert.is_critical());
        assert_eq!(alert.threshold, 80.0);
    }
}
