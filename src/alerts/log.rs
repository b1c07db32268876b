// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/sensordeck

//! Bounded, newest-first alert log

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use super::{Alert, AlertRequest};

pub const DEFAULT_CAPACITY: usize = 10;

#[derive(Debug, Clone)]
pub struct AlertLog {
    alerts: VecDeque<Alert>,
    capacity: usize,
    last_id: u64,
}

impl AlertLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            alerts: VecDeque::with_capacity(capacity),
            capacity,
            last_id: 0,
        }
    }

    /// Create an alert from `request` and record it.
    ///
    /// Ids derive from the creation time in milliseconds and are bumped when
    /// two alerts land in the same millisecond, so they stay strictly
    /// increasing.
    pub fn raise(&mut self, request: AlertRequest, now: DateTime<Utc>) -> Alert {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let id = millis.max(self.last_id + 1);
        let alert = Alert::from_request(id, request, now);
        self.record(alert.clone());
        alert
    }

    /// Insert at the front, dropping the oldest entries beyond capacity
    pub fn record(&mut self, alert: Alert) {
        self.last_id = self.last_id.max(alert.id);
        self.alerts.push_front(alert);
        self.alerts.truncate(self.capacity);
    }

    pub fn clear(&mut self) {
        self.alerts.clear();
    }

    pub fn count(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    pub fn critical_count(&self) -> usize {
        self.alerts.iter().filter(|a| a.is_critical()).count()
    }

    /// Newest first
    pub fn iter(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter()
    }

    pub fn to_vec(&self) -> Vec<Alert> {
        self.alerts.iter().cloned().collect()
    }
}

impl Default for AlertLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::SensorType;

    fn request(value: f64) -> AlertRequest {
        AlertRequest {
            sensor_id: "co2_1".to_string(),
            sensor_name: "Indoor CO2".to_string(),
            value,
            threshold: 1000.0,
            sensor_type: SensorType::Co2,
        }
    }

    #[test]
    fn test_eleventh_alert_evicts_oldest() {
        let mut log = AlertLog::default();
        let now = Utc::now();
        for i in 0..11 {
            log.raise(request(1000.0 + i as f64), now);
        }

        assert_eq!(log.count(), 10);
        let values: Vec<f64> = log.iter().map(|a| a.value).collect();
        assert_eq!(values[0], 1010.0);
        assert_eq!(values[9], 1001.0);
        assert!(!values.contains(&1000.0));
    }

    #[test]
    fn test_ids_strictly_increase_within_one_millisecond() {
        let mut log = AlertLog::default();
        let now = Utc::now();
        let a = log.raise(request(1100.0), now);
        let b = log.raise(request(1200.0), now);
        assert!(b.id > a.id);
    }

    #[test]
    fn test_clear() {
        let mut log = AlertLog::default();
        log.raise(request(1300.0), Utc::now());
        log.raise(request(1250.0), Utc::now());
        log.clear();
        assert_eq!(log.count(), 0);

        log.clear();
        assert_eq!(log.count(), 0);
    }

    #[test]
    fn test_critical_count() {
        let mut log = AlertLog::default();
        log.raise(request(1100.0), Utc::now());
        log.raise(request(1300.0), Utc::now());
        assert_eq!(log.critical_count(), 1);
    }
}
