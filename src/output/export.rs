//! Snapshot export, daily report and trend analysis

use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::alerts::Alert;
use crate::core::Stats;
use crate::sensors::{SensorStatus, SensorView};

/// Point-in-time copy of every sensor, the alert log and the counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    /// `(id, state)` pairs in registry order
    pub sensors: Vec<(String, SensorView)>,
    /// Newest first
    pub alerts: Vec<Alert>,
    pub stats: Stats,
}

impl Snapshot {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| anyhow!("Invalid snapshot: {}", e))
    }

    /// `sensor_data_YYYY-MM-DD.json`
    pub fn file_name(&self) -> String {
        format!("sensor_data_{}.json", self.timestamp.format("%Y-%m-%d"))
    }

    /// Write the snapshot as pretty JSON into `dir`, creating it if needed
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        std::fs::write(&path, self.to_json_pretty()?)?;
        info!("Exported snapshot to {:?}", path);
        Ok(path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub id: String,
    pub name: String,
    pub current_value: f64,
    pub status: SensorStatus,
    pub last_update: Option<DateTime<Utc>>,
}

/// Daily summary of the fleet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub sensors: Vec<ReportEntry>,
    pub total_alerts: usize,
    pub critical_alerts: usize,
    pub data_points: u64,
}

impl DailyReport {
    pub fn build(
        date: NaiveDate,
        sensors: &[SensorView],
        alerts: &[Alert],
        data_points: u64,
    ) -> Self {
        Self {
            date,
            sensors: sensors
                .iter()
                .map(|s| ReportEntry {
                    id: s.definition.id.clone(),
                    name: s.definition.name.clone(),
                    current_value: s.state.value,
                    status: s.state.status,
                    last_update: s.state.last_update,
                })
                .collect(),
            total_alerts: alerts.len(),
            critical_alerts: alerts.iter().filter(|a| a.is_critical()).count(),
            data_points,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// High from 100% of the alert threshold, medium from 80%
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 100.0 {
            RiskLevel::High
        } else if percentage >= 80.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// How close a sensor sits to its alert threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub sensor_id: String,
    pub name: String,
    pub current: f64,
    pub threshold: f64,
    pub status: SensorStatus,
    pub risk: RiskLevel,
}

impl Trend {
    pub fn for_sensor(sensor: &SensorView) -> Self {
        let percentage = sensor.state.value / sensor.definition.alert_threshold * 100.0;
        Self {
            sensor_id: sensor.definition.id.clone(),
            name: sensor.definition.name.clone(),
            current: sensor.state.value,
            threshold: sensor.definition.alert_threshold,
            status: sensor.state.status,
            risk: RiskLevel::from_percentage(percentage),
        }
    }
}
