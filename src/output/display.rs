// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/sensordeck

//! Display surface - incremental re-render hooks

use tracing::{debug, trace};

use crate::alerts::Alert;
use crate::core::Stats;
use crate::sensors::SensorView;

/// Called after every state change with exactly the data needed to
/// re-render the affected part of a dashboard.
pub trait DisplaySurface: Send + Sync {
    /// One sensor card changed
    fn sensor_changed(&self, sensor: &SensorView);

    /// The alert panel changed; alerts are newest first
    fn alerts_changed(&self, alerts: &[Alert]);

    /// Aggregate counters changed
    fn stats_changed(&self, stats: &Stats);
}

/// Logs display updates at debug/trace level
#[derive(Debug, Default)]
pub struct TracingDisplay;

impl DisplaySurface for TracingDisplay {
    fn sensor_changed(&self, sensor: &SensorView) {
        debug!(
            "{} = {}{} [{}] active={}",
            sensor.definition.name,
            sensor.state.value,
            sensor.definition.unit,
            sensor.state.status.as_str(),
            sensor.state.is_active
        );
    }

    fn alerts_changed(&self, alerts: &[Alert]) {
        debug!("Alert panel: {} alerts", alerts.len());
    }

    fn stats_changed(&self, stats: &Stats) {
        trace!(
            "Stats: {} data points, {} alerts, uptime {}",
            stats.data_points,
            stats.alert_count,
            stats.uptime
        );
    }
}
