// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/sensordeck

//! Reading source trait

use async_trait::async_trait;

use super::SensorReading;
use crate::error::SensorError;

/// Produces the next reading for a sensor.
///
/// The simulator is the production implementation; tests plug in
/// deterministic fixtures.
#[async_trait]
pub trait ReadingSource: Send + Sync {
    /// Read the sensor identified by `sensor_id`
    async fn read(&self, sensor_id: &str) -> Result<SensorReading, SensorError>;
}
