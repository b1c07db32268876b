// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/sensordeck

//! Sensor registry - sole owner of definitions and live state

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use super::{SensorDefinition, SensorPatch, SensorState, SensorView};
use crate::error::{ConfigError, SensorError};

struct SensorEntry {
    definition: SensorDefinition,
    state: SensorState,
}

/// Holds every sensor in insertion order.
///
/// Other components only ever see cloned [`SensorView`]s; mutation goes
/// through [`SensorRegistry::update`] and friends.
pub struct SensorRegistry {
    entries: RwLock<Vec<SensorEntry>>,
}

impl SensorRegistry {
    /// Build a registry from validated definitions
    pub fn new(definitions: Vec<SensorDefinition>) -> Result<Self, ConfigError> {
        let mut entries: Vec<SensorEntry> = Vec::with_capacity(definitions.len());

        for definition in definitions {
            definition.validate()?;
            if entries.iter().any(|e| e.definition.id == definition.id) {
                return Err(ConfigError::DuplicateId(definition.id));
            }
            debug!("Registered sensor: {} ({})", definition.id, definition.sensor_type);
            entries.push(SensorEntry {
                definition,
                state: SensorState::default(),
            });
        }

        info!("Sensor registry initialized with {} sensors", entries.len());
        Ok(Self {
            entries: RwLock::new(entries),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.read().iter().any(|e| e.definition.id == id)
    }

    pub fn get(&self, id: &str) -> Option<SensorView> {
        self.entries
            .read()
            .iter()
            .find(|e| e.definition.id == id)
            .map(|e| SensorView {
                definition: e.definition.clone(),
                state: e.state.clone(),
            })
    }

    pub fn definition(&self, id: &str) -> Option<SensorDefinition> {
        self.entries
            .read()
            .iter()
            .find(|e| e.definition.id == id)
            .map(|e| e.definition.clone())
    }

    /// Visit every sensor in insertion order.
    ///
    /// The registry lock is held while `f` runs, so `f` must not call back
    /// into the registry.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&SensorDefinition, &SensorState),
    {
        for entry in self.entries.read().iter() {
            f(&entry.definition, &entry.state);
        }
    }

    /// Cloned views of every sensor, in insertion order
    pub fn views(&self) -> Vec<SensorView> {
        let mut views = Vec::with_capacity(self.len());
        self.for_each(|definition, state| {
            views.push(SensorView {
                definition: definition.clone(),
                state: state.clone(),
            })
        });
        views
    }

    pub fn ids(&self) -> Vec<String> {
        let mut ids = Vec::new();
        self.for_each(|definition, _| ids.push(definition.id.clone()));
        ids
    }

    /// Ids of sensors with `is_active` set
    pub fn active_ids(&self) -> Vec<String> {
        let mut ids = Vec::new();
        self.for_each(|definition, state| {
            if state.is_active {
                ids.push(definition.id.clone());
            }
        });
        ids
    }

    /// Merge `patch` into the sensor's state and return the updated view
    pub fn update(&self, id: &str, patch: SensorPatch) -> Result<SensorView, SensorError> {
        let mut entries = self.entries.write();
        let entry = entries
            .iter_mut()
            .find(|e| e.definition.id == id)
            .ok_or_else(|| SensorError::NotFound(id.to_string()))?;

        patch.apply(&mut entry.state);
        Ok(SensorView {
            definition: entry.definition.clone(),
            state: entry.state.clone(),
        })
    }

    /// Apply the same patch to every sensor
    pub fn update_all<F>(&self, mut patch_for: F) -> Vec<SensorView>
    where
        F: FnMut(&SensorDefinition) -> SensorPatch,
    {
        let mut entries = self.entries.write();
        entries
            .iter_mut()
            .map(|entry| {
                patch_for(&entry.definition).apply(&mut entry.state);
                SensorView {
                    definition: entry.definition.clone(),
                    state: entry.state.clone(),
                }
            })
            .collect()
    }

    /// Replace alert and/or critical thresholds. Absent values are kept.
    pub fn set_thresholds(
        &self,
        id: &str,
        alert: Option<f64>,
        critical: Option<f64>,
    ) -> Result<SensorView, SensorError> {
        let mut entries = self.entries.write();
        let entry = entries
            .iter_mut()
            .find(|e| e.definition.id == id)
            .ok_or_else(|| SensorError::NotFound(id.to_string()))?;

        if let Some(alert) = alert {
            entry.definition.alert_threshold = alert;
        }
        if let Some(critical) = critical {
            entry.definition.critical_threshold = critical;
        }
        info!(
            "Thresholds for {} set to alert={} critical={}",
            id, entry.definition.alert_threshold, entry.definition.critical_threshold
        );
        if !entry.definition.thresholds_ordered() {
            warn!(
                "Thresholds for {} are out of order: alert {} is not below critical {}",
                id, entry.definition.alert_threshold, entry.definition.critical_threshold
            );
        }

        Ok(SensorView {
            definition: entry.definition.clone(),
            state: entry.state.clone(),
        })
    }
}
