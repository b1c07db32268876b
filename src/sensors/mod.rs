//! Sensor module - definitions, registry and simulated reading source

mod registry;
mod simulator;
mod source;
mod types;

pub use registry::SensorRegistry;
pub use simulator::{diurnal_adjustment, simulated_value, SensorSimulator};
pub use source::ReadingSource;
pub use types::{
    ReadingQuality, SensorDefinition, SensorPatch, SensorReading, SensorState, SensorStatus,
    SensorType, SensorView,
};
