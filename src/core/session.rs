// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/sensordeck

//! Monitoring session state and aggregate counters

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Monitoring session, owned by the engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub is_monitoring: bool,
    /// Kept after stop for display; replaced on the next start
    pub start_time: Option<DateTime<Utc>>,
    pub data_points: u64,
    /// Last uptime string produced by the uptime ticker
    pub uptime: String,
    /// When the last polling tick fired
    pub last_tick: Option<DateTime<Utc>>,
}

impl Session {
    pub fn start(&mut self, now: DateTime<Utc>) {
        self.is_monitoring = true;
        self.start_time = Some(now);
        self.uptime = format_uptime(Duration::ZERO);
    }

    pub fn stop(&mut self) {
        self.is_monitoring = false;
    }

    /// Time elapsed since the recorded start, zero if never started
    pub fn uptime_at(&self, now: DateTime<Utc>) -> Duration {
        self.start_time
            .and_then(|start| (now - start).to_std().ok())
            .unwrap_or(Duration::ZERO)
    }

    /// Recompute the uptime display string
    pub fn refresh_uptime(&mut self, now: DateTime<Utc>) -> &str {
        if self.start_time.is_some() {
            self.uptime = format_uptime(self.uptime_at(now));
        }
        &self.uptime
    }
}

/// `HH:MM:SS`, hours unbounded
pub fn format_uptime(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Aggregate counters for the stats panel and snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub data_points: u64,
    pub alert_count: usize,
    pub uptime: String,
    pub uptime_ms: u64,
    pub total_sensors: usize,
    pub is_monitoring: bool,
    pub last_tick: Option<DateTime<Utc>>,
}
