// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/sensordeck

//! Notification surface

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Fire-and-forget message; the surface dismisses it after `duration`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
    pub duration: Duration,
}

impl Notice {
    pub fn new(message: impl Into<String>, level: NoticeLevel, duration: Duration) -> Self {
        Self {
            message: message.into(),
            level,
            duration,
        }
    }
}

/// Receives notices and critical title flashes. No acknowledgement.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);

    /// One-off title flash for critical alerts
    fn flash_title(&self, title: &str, duration: Duration);
}

/// Writes notices to the tracing log
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info | NoticeLevel::Success => info!("[notice] {}", notice.message),
            NoticeLevel::Warning => warn!("[notice] {}", notice.message),
            NoticeLevel::Error => error!("[notice] {}", notice.message),
        }
    }

    fn flash_title(&self, title: &str, duration: Duration) {
        warn!("[title] {} ({:?})", title, duration);
    }
}
