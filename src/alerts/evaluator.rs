// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/sensordeck

//! Threshold evaluation

use super::AlertRequest;
use crate::sensors::{SensorDefinition, SensorReading, SensorStatus};

/// Multiplier applied to the alert threshold when grading severity
pub const SEVERITY_MULTIPLIER: f64 = 1.2;

/// Outcome of evaluating one reading against a sensor's thresholds
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub status: SensorStatus,
    /// Present whenever `status` is not normal
    pub alert: Option<AlertRequest>,
    /// Type-level advisory message, independent of `status`
    pub advisory: Option<String>,
}

/// Status for a value; both boundaries are inclusive
pub fn classify(value: f64, alert_threshold: f64, critical_threshold: f64) -> SensorStatus {
    if value >= critical_threshold {
        SensorStatus::Critical
    } else if value >= alert_threshold {
        SensorStatus::Alert
    } else {
        SensorStatus::Normal
    }
}

pub fn evaluate(def: &SensorDefinition, reading: &SensorReading) -> Evaluation {
    let status = classify(reading.value, def.alert_threshold, def.critical_threshold);

    let alert = (status != SensorStatus::Normal).then(|| AlertRequest {
        sensor_id: def.id.clone(),
        sensor_name: def.name.clone(),
        value: reading.value,
        threshold: def.alert_threshold,
        sensor_type: def.sensor_type,
    });

    Evaluation {
        status,
        alert,
        advisory: def.sensor_type.advisory(reading.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::Severity;

    fn temp() -> SensorDefinition {
        SensorDefinition::demo_fleet().remove(0)
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(39.99, 40.0, 45.0), SensorStatus::Normal);
        assert_eq!(classify(40.0, 40.0, 45.0), SensorStatus::Alert);
        assert_eq!(classify(44.99, 40.0, 45.0), SensorStatus::Alert);
        assert_eq!(classify(45.0, 40.0, 45.0), SensorStatus::Critical);
        assert_eq!(classify(-5.0, 40.0, 45.0), SensorStatus::Normal);
    }

    #[test]
    fn test_normal_reading_raises_nothing() {
        let eval = evaluate(&temp(), &SensorReading::new("temp1", 21.0));
        assert_eq!(eval.status, SensorStatus::Normal);
        assert!(eval.alert.is_none());
        assert!(eval.advisory.is_none());
    }

    #[test]
    fn test_critical_status_with_warning_severity() {
        let eval = evaluate(&temp(), &SensorReading::new("temp1", 47.0));
        assert_eq!(eval.status, SensorStatus::Critical);

        let request = eval.alert.unwrap();
        assert_eq!(request.threshold, 40.0);
        assert_eq!(Severity::for_value(request.value, request.threshold), Severity::Warning);
    }

    #[test]
    fn test_advisory_fires_below_alert_threshold() {
        let eval = evaluate(&temp(), &SensorReading::new("temp1", 36.0));
        assert_eq!(eval.status, SensorStatus::Normal);
        assert!(eval.alert.is_none());
        assert_eq!(eval.advisory.as_deref(), Some("High temperature: 36°C"));
    }
}
