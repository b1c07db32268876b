// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/sensordeck

//! Snapshot persistence stand-in

use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::Rng;
use tracing::debug;

use crate::output::Snapshot;

/// Accepts snapshots keyed by a timestamp-derived key. Write-only from the
/// engine's point of view.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn put(&self, key: &str, snapshot: &Snapshot) -> Result<()>;
}

/// In-memory store holding serialized snapshots
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    min_latency_ms: u64,
    max_latency_ms: u64,
}

impl MemoryStore {
    pub fn new(min_latency_ms: u64, max_latency_ms: u64) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            min_latency_ms,
            max_latency_ms,
        }
    }

    /// Raw JSON stored under `key`
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn put(&self, key: &str, snapshot: &Snapshot) -> Result<()> {
        let latency = if self.max_latency_ms > self.min_latency_ms {
            rand::thread_rng().gen_range(self.min_latency_ms..self.max_latency_ms)
        } else {
            self.min_latency_ms
        };
        tokio::time::sleep(Duration::from_millis(latency)).await;

        let json = serde_json::to_string(snapshot)?;
        debug!("Stored snapshot {} ({} bytes)", key, json.len());
        self.entries.lock().insert(key.to_string(), json);
        Ok(())
    }
}
