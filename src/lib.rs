// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/sensordeck

//! SensorDeck - sensor polling and alerting dashboard core
//!
//! Polls a fixed fleet of sensors on an interval, classifies every reading
//! against per-sensor thresholds, keeps a bounded alert log and session
//! counters, and reports everything through pluggable notice and display
//! surfaces.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                         Engine                            │
//! ├───────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌───────────┐   ┌──────────┐            │
//! │  │ Scheduler │ → │  Reading  │ → │ Evaluate │            │
//! │  │ poll/tick │   │  Source   │   │ status   │            │
//! │  └───────────┘   └───────────┘   └──────────┘            │
//! │        ↓                              ↓                   │
//! │  ┌─────────────────────────────────────────────────────┐  │
//! │  │     EventBus: DataReceived / AlertRaised / Error     │  │
//! │  └─────────────────────────────────────────────────────┘  │
//! │        ↓               ↓                ↓                 │
//! │  ┌──────────┐   ┌────────────┐   ┌──────────────────┐    │
//! │  │ Session  │   │  AlertLog  │   │ Notifier/Display │    │
//! │  └──────────┘   └────────────┘   └──────────────────┘    │
//! └───────────────────────────────────────────────────────────┘
//! ```

pub mod alerts;
pub mod config;
pub mod control;
pub mod core;
pub mod db;
pub mod error;
pub mod output;
pub mod sensors;

// Re-exports for convenience
pub use alerts::{Alert, AlertLog, Severity};
pub use config::Config;
pub use core::{Engine, EngineBuilder, EventBus};
pub use error::{ConfigError, SensorError};
pub use sensors::{SensorDefinition, SensorReading, SensorStatus, SensorType, SensorView};

/// SensorDeck version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// SensorDeck name
pub const NAME: &str = "SensorDeck";
