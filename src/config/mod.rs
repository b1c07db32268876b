// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/sensordeck

//! Configuration module

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::error::ConfigError;
use crate::sensors::SensorDefinition;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Application name
    pub app_name: String,

    /// Log level used when no CLI override is given
    pub log_level: String,

    /// Directory receiving exported snapshots
    pub export_dir: PathBuf,

    /// Polling and notification timing
    pub monitor: MonitorConfig,

    /// Simulated hardware behaviour
    pub simulation: SimulationConfig,

    /// Sensor fleet
    pub sensors: Vec<SensorDefinition>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "SensorDeck".to_string(),
            log_level: "info".to_string(),
            export_dir: PathBuf::from("./data"),
            monitor: MonitorConfig::default(),
            simulation: SimulationConfig::default(),
            sensors: SensorDefinition::demo_fleet(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load or create default configuration
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            let config = Self::default();

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            config.save(path)?;
            Ok(config)
        }
    }

    /// Reject sensor fleets and simulation parameters that cannot work
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for def in &self.sensors {
            def.validate()?;
            if !seen.insert(def.id.as_str()) {
                return Err(ConfigError::DuplicateId(def.id.clone()));
            }
        }
        self.simulation.validate()?;
        self.monitor.validate()
    }

    /// Get configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("sensordeck"))
            .unwrap_or_else(|| PathBuf::from("./config"))
    }

    /// Get default configuration path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}

/// Polling cadence and notification timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Interval between polling ticks
    pub poll_interval_ms: u64,

    /// Interval between uptime refreshes
    pub uptime_interval_ms: u64,

    /// Maximum entries kept in the alert log
    pub alert_log_capacity: usize,

    /// How long generic notices stay visible
    pub notice_duration_ms: u64,

    /// How long the critical-alert title flash lasts
    pub critical_flash_ms: u64,

    /// Interval of the ambient "system event" roll
    pub ambient_event_interval_ms: u64,

    /// Probability that an ambient roll produces a notice
    pub ambient_event_probability: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 3000,
            uptime_interval_ms: 1000,
            alert_log_capacity: 10,
            notice_duration_ms: 3000,
            critical_flash_ms: 10_000,
            ambient_event_interval_ms: 30_000,
            ambient_event_probability: 0.1,
        }
    }
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn uptime_interval(&self) -> Duration {
        Duration::from_millis(self.uptime_interval_ms)
    }

    pub fn notice_duration(&self) -> Duration {
        Duration::from_millis(self.notice_duration_ms)
    }

    pub fn critical_flash(&self) -> Duration {
        Duration::from_millis(self.critical_flash_ms)
    }

    pub fn ambient_event_interval(&self) -> Duration {
        Duration::from_millis(self.ambient_event_interval_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("poll_interval_ms"));
        }
        if self.uptime_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("uptime_interval_ms"));
        }
        if self.ambient_event_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("ambient_event_interval_ms"));
        }
        if self.alert_log_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        check_probability("ambient_event_probability", self.ambient_event_probability)
    }
}

/// Simulated hardware behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Read latency lower bound (inclusive)
    pub min_latency_ms: u64,

    /// Read latency upper bound (exclusive)
    pub max_latency_ms: u64,

    /// Probability of a simulated communication failure per read
    pub failure_rate: f64,

    /// Probability of a reading being tagged good quality
    pub good_quality_probability: f64,

    /// Fixed RNG seed for reproducible runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Persistence stand-in latency lower bound
    pub save_min_latency_ms: u64,

    /// Persistence stand-in latency upper bound
    pub save_max_latency_ms: u64,

    /// Duration of a simulated maintenance run
    pub maintenance_delay_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            min_latency_ms: 100,
            max_latency_ms: 600,
            failure_rate: 0.05,
            good_quality_probability: 0.9,
            seed: None,
            save_min_latency_ms: 50,
            save_max_latency_ms: 350,
            maintenance_delay_ms: 3000,
        }
    }
}

impl SimulationConfig {
    /// Zero latency, zero failures; used by tests and dry runs
    pub fn instant() -> Self {
        Self {
            min_latency_ms: 0,
            max_latency_ms: 0,
            failure_rate: 0.0,
            save_min_latency_ms: 0,
            save_max_latency_ms: 0,
            maintenance_delay_ms: 0,
            ..Default::default()
        }
    }

    pub fn maintenance_delay(&self) -> Duration {
        Duration::from_millis(self.maintenance_delay_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_probability("failure_rate", self.failure_rate)?;
        check_probability("good_quality_probability", self.good_quality_probability)?;
        if self.min_latency_ms > self.max_latency_ms {
            return Err(ConfigError::LatencyWindow {
                field: "latency",
                low: self.min_latency_ms,
                high: self.max_latency_ms,
            });
        }
        if self.save_min_latency_ms > self.save_max_latency_ms {
            return Err(ConfigError::LatencyWindow {
                field: "save_latency",
                low: self.save_min_latency_ms,
                high: self.save_max_latency_ms,
            });
        }
        Ok(())
    }
}

fn check_probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Probability { field, value })
    }
}
