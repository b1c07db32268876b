// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/sensordeck

//! Sensor definitions, live state and readings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Sensor types in the environmental fleet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorType {
    Temperature,
    Humidity,
    Pressure,
    Co2,
}

impl SensorType {
    /// Display unit used when a definition does not override it
    pub fn default_unit(&self) -> &'static str {
        match self {
            SensorType::Temperature => "°C",
            SensorType::Humidity => "%",
            SensorType::Pressure => "hPa",
            SensorType::Co2 => "ppm",
        }
    }

    /// Type-level advisory check on the raw value.
    ///
    /// Independent of the per-sensor alert and critical thresholds.
    pub fn advisory(&self, value: f64) -> Option<String> {
        match self {
            SensorType::Temperature if value > 35.0 => {
                Some(format!("High temperature: {}°C", value))
            }
            SensorType::Humidity if value > 70.0 => Some(format!("High humidity: {}%", value)),
            SensorType::Pressure if !(980.0..=1030.0).contains(&value) => {
                Some(format!("Abnormal pressure: {} hPa", value))
            }
            SensorType::Co2 if value > 800.0 => Some(format!("High CO2: {} ppm", value)),
            _ => None,
        }
    }
}

impl std::fmt::Display for SensorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SensorType::Temperature => "temperature",
            SensorType::Humidity => "humidity",
            SensorType::Pressure => "pressure",
            SensorType::Co2 => "co2",
        };
        f.write_str(name)
    }
}

/// Classification of a sensor's latest value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorStatus {
    Normal,
    Alert,
    Critical,
}

impl SensorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorStatus::Normal => "normal",
            SensorStatus::Alert => "alert",
            SensorStatus::Critical => "critical",
        }
    }
}

/// Signal quality reported with a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingQuality {
    Good,
    Poor,
}

/// Static sensor configuration, loaded once at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorDefinition {
    pub id: String,
    pub name: String,
    pub sensor_type: SensorType,
    pub unit: String,
    pub min: f64,
    pub max: f64,
    pub alert_threshold: f64,
    pub critical_threshold: f64,
}

impl SensorDefinition {
    pub fn new(
        id: &str,
        name: &str,
        sensor_type: SensorType,
        range: (f64, f64),
        alert_threshold: f64,
        critical_threshold: f64,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            sensor_type,
            unit: sensor_type.default_unit().to_string(),
            min: range.0,
            max: range.1,
            alert_threshold,
            critical_threshold,
        }
    }

    /// Check `min < alert < critical <= max`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id.trim().is_empty() {
            return Err(ConfigError::EmptyId);
        }
        if !(self.min < self.max) {
            return Err(ConfigError::InvalidRange {
                id: self.id.clone(),
                min: self.min,
                max: self.max,
            });
        }
        let ordered = self.min < self.alert_threshold
            && self.alert_threshold < self.critical_threshold
            && self.critical_threshold <= self.max;
        if !ordered {
            return Err(ConfigError::ThresholdOrder {
                id: self.id.clone(),
                min: self.min,
                alert: self.alert_threshold,
                critical: self.critical_threshold,
                max: self.max,
            });
        }
        Ok(())
    }

    /// Alert threshold strictly below the critical threshold
    pub fn thresholds_ordered(&self) -> bool {
        self.alert_threshold < self.critical_threshold
    }

    /// The four sensors of the demo fleet
    pub fn demo_fleet() -> Vec<SensorDefinition> {
        vec![
            SensorDefinition::new(
                "temp1",
                "Outdoor Temperature",
                SensorType::Temperature,
                (-10.0, 50.0),
                40.0,
                45.0,
            ),
            SensorDefinition::new(
                "hum1",
                "Relative Humidity",
                SensorType::Humidity,
                (20.0, 100.0),
                80.0,
                90.0,
            ),
            SensorDefinition::new(
                "press1",
                "Atmospheric Pressure",
                SensorType::Pressure,
                (900.0, 1100.0),
                1050.0,
                1080.0,
            ),
            SensorDefinition::new(
                "co2_1",
                "Indoor CO2",
                SensorType::Co2,
                (300.0, 2000.0),
                1000.0,
                1500.0,
            ),
        ]
    }
}

/// Mutable per-sensor state owned by the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorState {
    pub value: f64,
    pub status: SensorStatus,
    pub last_update: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub quality: ReadingQuality,
    pub battery_level: u8,
}

impl Default for SensorState {
    fn default() -> Self {
        Self {
            value: 0.0,
            status: SensorStatus::Normal,
            last_update: None,
            is_active: true,
            quality: ReadingQuality::Good,
            battery_level: 100,
        }
    }
}

/// Partial update merged into a [`SensorState`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorPatch {
    pub value: Option<f64>,
    pub status: Option<SensorStatus>,
    pub last_update: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
    pub quality: Option<ReadingQuality>,
    pub battery_level: Option<u8>,
}

impl SensorPatch {
    /// Fields a successful reading carries into the sensor state
    pub fn from_reading(reading: &SensorReading, status: SensorStatus) -> Self {
        Self {
            value: Some(reading.value),
            status: Some(status),
            last_update: Some(reading.timestamp),
            quality: Some(reading.quality),
            battery_level: Some(reading.battery_level),
            ..Default::default()
        }
    }

    pub(crate) fn apply(self, state: &mut SensorState) {
        if let Some(value) = self.value {
            state.value = value;
        }
        if let Some(status) = self.status {
            state.status = status;
        }
        if let Some(ts) = self.last_update {
            state.last_update = Some(ts);
        }
        if let Some(active) = self.is_active {
            state.is_active = active;
        }
        if let Some(quality) = self.quality {
            state.quality = quality;
        }
        if let Some(battery) = self.battery_level {
            state.battery_level = battery;
        }
    }
}

/// Definition plus live state, everything needed to render one sensor card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorView {
    #[serde(flatten)]
    pub definition: SensorDefinition,
    #[serde(flatten)]
    pub state: SensorState,
}

impl SensorView {
    pub fn id(&self) -> &str {
        &self.definition.id
    }
}

/// A single simulated reading, consumed once by the evaluator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub sensor_id: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
    pub quality: ReadingQuality,
    pub battery_level: u8,
}

impl SensorReading {
    pub fn new(sensor_id: &str, value: f64) -> Self {
        Self {
            sensor_id: sensor_id.to_string(),
            value,
            timestamp: Utc::now(),
            quality: ReadingQuality::Good,
            battery_level: 100,
        }
    }
}
