// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/sensordeck

//! Sensor simulator for demo/testing

use std::f64::consts::PI;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, Timelike, Utc};
use parking_lot::Mutex;
use rand::prelude::*;
use rand::rngs::StdRng;
use tracing::trace;

use super::{ReadingQuality, ReadingSource, SensorDefinition, SensorReading, SensorRegistry, SensorType};
use crate::config::SimulationConfig;
use crate::error::SensorError;

/// Diurnal swing for a sensor type at the given local hour
pub fn diurnal_adjustment(sensor_type: SensorType, hour: u32) -> f64 {
    let phase = (hour as f64 - 6.0) * PI / 12.0;
    match sensor_type {
        SensorType::Temperature => 5.0 * phase.sin(),
        SensorType::Humidity => -10.0 * phase.sin(),
        SensorType::Pressure | SensorType::Co2 => 0.0,
    }
}

/// Map a unit sample in `[0, 1)` onto the sensor range, add the diurnal
/// swing and round to two decimals.
///
/// The result may fall slightly outside `[min, max]` for temperature and
/// humidity.
pub fn simulated_value(def: &SensorDefinition, unit_sample: f64, hour: u32) -> f64 {
    let value = def.min + unit_sample * (def.max - def.min) + diurnal_adjustment(def.sensor_type, hour);
    (value * 100.0).round() / 100.0
}

/// Simulates sensor reads with latency, random failures and diurnal drift
pub struct SensorSimulator {
    registry: Arc<SensorRegistry>,
    config: SimulationConfig,
    rng: Mutex<StdRng>,
}

impl SensorSimulator {
    pub fn new(registry: Arc<SensorRegistry>, config: SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            registry,
            config,
            rng: Mutex::new(rng),
        }
    }

    fn latency(&self) -> Duration {
        let low = self.config.min_latency_ms;
        let high = self.config.max_latency_ms;
        let ms = if high > low {
            self.rng.lock().gen_range(low..high)
        } else {
            low
        };
        Duration::from_millis(ms)
    }
}

#[async_trait]
impl ReadingSource for SensorSimulator {
    async fn read(&self, sensor_id: &str) -> Result<SensorReading, SensorError> {
        let latency = self.latency();
        tokio::time::sleep(latency).await;

        let def = self
            .registry
            .definition(sensor_id)
            .ok_or_else(|| SensorError::NotFound(sensor_id.to_string()))?;

        let mut rng = self.rng.lock();
        if rng.gen_bool(self.config.failure_rate) {
            return Err(SensorError::Communication(sensor_id.to_string()));
        }

        let value = simulated_value(&def, rng.gen::<f64>(), Local::now().hour());
        let quality = if rng.gen_bool(self.config.good_quality_probability) {
            ReadingQuality::Good
        } else {
            ReadingQuality::Poor
        };
        let battery_level = rng.gen_range(1..=100u8);

        trace!("Simulated {} = {} after {:?}", sensor_id, value, latency);

        Ok(SensorReading {
            sensor_id: sensor_id.to_string(),
            value,
            timestamp: Utc::now(),
            quality,
            battery_level,
        })
    }
}
