// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/sensordeck

//! Task scheduler for periodic triggers

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

type TaskFn = Arc<dyn Fn() + Send + Sync + 'static>;

struct ScheduledTask {
    name: String,
    interval: Duration,
    task: TaskFn,
}

/// Scheduler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running,
}

/// Runs a fixed set of named periodic tasks while in the Running state.
///
/// Each task first fires one full interval after `start`, never immediately.
pub struct Scheduler {
    tasks: Vec<ScheduledTask>,
    handles: Vec<JoinHandle<()>>,
    state: SchedulerState,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            handles: Vec::new(),
            state: SchedulerState::Stopped,
        }
    }

    /// Register a task. Tasks added while running start on the next `start`.
    pub fn add_task<F>(&mut self, name: &str, interval: Duration, task: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.tasks.push(ScheduledTask {
            name: name.to_string(),
            interval,
            task: Arc::new(task),
        });
        debug!("Scheduled task '{}' with interval {:?}", name, interval);
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state() == SchedulerState::Running
    }

    /// Spawn every task. Returns false when already running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }

        for scheduled in &self.tasks {
            let period = scheduled.interval;
            let task = scheduled.task.clone();
            let name = scheduled.name.clone();
            let first = Instant::now() + period;

            self.handles.push(tokio::spawn(async move {
                let mut ticker = interval_at(first, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    debug!("Task '{}' fired", name);
                    task();
                }
            }));
        }
        self.state = SchedulerState::Running;
        true
    }

    /// Cancel every task. Returns false when already stopped.
    ///
    /// Work a task already spawned elsewhere is not cancelled.
    pub fn stop(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        for handle in self.handles.drain(..) {
            handle.abort();
        }
        self.state = SchedulerState::Stopped;
        true
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }
}
