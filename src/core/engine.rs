// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/sensordeck

//! Monitoring engine - owns the registry, alert log and session, drives the
//! read -> evaluate -> publish pipeline

use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use anyhow::Result;
use chrono::{Local, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::event_bus::{Event, EventBus};
use super::scheduler::Scheduler;
use super::session::{format_uptime, Session, Stats};
use crate::alerts::{evaluate, Alert, AlertLog, AlertRequest};
use crate::config::Config;
use crate::db::{MemoryStore, SnapshotStore};
use crate::error::{ConfigError, SensorError};
use crate::output::{
    DailyReport, DisplaySurface, Notice, NoticeLevel, Notifier, Snapshot, TracingDisplay,
    TracingNotifier, Trend,
};
use crate::sensors::{
    ReadingQuality, ReadingSource, SensorPatch, SensorReading, SensorRegistry, SensorSimulator,
    SensorStatus, SensorView,
};

struct EngineInner {
    config: Config,
    registry: Arc<SensorRegistry>,
    source: Arc<dyn ReadingSource>,
    event_bus: EventBus,
    alerts: Mutex<AlertLog>,
    session: Mutex<Session>,
    scheduler: Mutex<Scheduler>,
    notifier: Arc<dyn Notifier>,
    display: Arc<dyn DisplaySurface>,
    store: Arc<dyn SnapshotStore>,
    rng: Mutex<StdRng>,
}

/// Builder for [`Engine`]; every collaborator defaults to its simulated or
/// tracing-backed implementation.
pub struct EngineBuilder {
    config: Config,
    source: Option<Arc<dyn ReadingSource>>,
    notifier: Option<Arc<dyn Notifier>>,
    display: Option<Arc<dyn DisplaySurface>>,
    store: Option<Arc<dyn SnapshotStore>>,
}

impl EngineBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            source: None,
            notifier: None,
            display: None,
            store: None,
        }
    }

    pub fn source(mut self, source: Arc<dyn ReadingSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn display(mut self, display: Arc<dyn DisplaySurface>) -> Self {
        self.display = Some(display);
        self
    }

    pub fn store(mut self, store: Arc<dyn SnapshotStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Result<Engine, ConfigError> {
        let config = self.config;
        config.validate()?;

        let registry = Arc::new(SensorRegistry::new(config.sensors.clone())?);
        let source: Arc<dyn ReadingSource> = match self.source {
            Some(source) => source,
            None => Arc::new(SensorSimulator::new(registry.clone(), config.simulation.clone())),
        };
        let store: Arc<dyn SnapshotStore> = match self.store {
            Some(store) => store,
            None => Arc::new(MemoryStore::new(
                config.simulation.save_min_latency_ms,
                config.simulation.save_max_latency_ms,
            )),
        };
        let notifier: Arc<dyn Notifier> = match self.notifier {
            Some(notifier) => notifier,
            None => Arc::new(TracingNotifier),
        };
        let display: Arc<dyn DisplaySurface> = match self.display {
            Some(display) => display,
            None => Arc::new(TracingDisplay),
        };
        let rng = match config.simulation.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_entropy(),
        };

        let inner = Arc::new_cyclic(|weak: &Weak<EngineInner>| {
            let event_bus = EventBus::new();
            subscribe_core_handlers(&event_bus, weak);

            let mut scheduler = Scheduler::new();
            let poll = weak.clone();
            scheduler.add_task("poll", config.monitor.poll_interval(), move || {
                if let Some(inner) = poll.upgrade() {
                    Engine { inner }.tick();
                }
            });
            let uptime = weak.clone();
            scheduler.add_task("uptime", config.monitor.uptime_interval(), move || {
                if let Some(inner) = uptime.upgrade() {
                    Engine { inner }.refresh_uptime();
                }
            });

            EngineInner {
                alerts: Mutex::new(AlertLog::new(config.monitor.alert_log_capacity)),
                session: Mutex::new(Session::default()),
                scheduler: Mutex::new(scheduler),
                config,
                registry,
                source,
                event_bus,
                notifier,
                display,
                store,
                rng: Mutex::new(rng),
            }
        });

        info!("Engine initialized with {} sensors", inner.registry.len());
        Ok(Engine { inner })
    }
}

/// Wire the side effects every engine needs: counters and advisories on
/// data, alert log and notices on alerts, notices on read failures.
fn subscribe_core_handlers(event_bus: &EventBus, weak: &Weak<EngineInner>) {
    let w = weak.clone();
    event_bus.on_data_received(move |reading, sensor| {
        if let Some(inner) = w.upgrade() {
            Engine { inner }.on_data_received(reading, sensor);
        }
    });

    let w = weak.clone();
    event_bus.on_alert_raised(move |request| {
        if let Some(inner) = w.upgrade() {
            Engine { inner }.on_alert_raised(request);
        }
    });

    let w = weak.clone();
    event_bus.on_connection_error(move |sensor_id, err| {
        if let Some(inner) = w.upgrade() {
            Engine { inner }.on_connection_error(sensor_id, err);
        }
    });
}

/// Main monitoring engine. Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

impl Engine {
    /// Engine with simulated sensors and tracing-backed surfaces
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        EngineBuilder::new(config).build()
    }

    pub fn builder(config: Config) -> EngineBuilder {
        EngineBuilder::new(config)
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn registry(&self) -> &SensorRegistry {
        &self.inner.registry
    }

    /// Hub for additional subscribers. Core handlers are registered first.
    pub fn event_bus(&self) -> &EventBus {
        &self.inner.event_bus
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Begin polling. No-op returning false when already monitoring.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) -> bool {
        {
            let mut session = self.inner.session.lock();
            if session.is_monitoring {
                return false;
            }
            session.start(Utc::now());
        }
        self.inner.scheduler.lock().start();

        info!(
            "Monitoring started: polling every {:?}",
            self.inner.config.monitor.poll_interval()
        );
        self.notice("Monitoring started", NoticeLevel::Success);
        self.publish_stats();
        true
    }

    /// Stop polling. Reads already in flight still complete and apply.
    pub fn stop(&self) -> bool {
        {
            let mut session = self.inner.session.lock();
            if !session.is_monitoring {
                return false;
            }
            session.stop();
        }
        self.inner.scheduler.lock().stop();

        info!("Monitoring stopped");
        self.notice("Monitoring stopped", NoticeLevel::Warning);
        self.publish_stats();
        true
    }

    /// Start when stopped, stop when running. Returns the new state.
    pub fn toggle(&self) -> bool {
        if self.is_monitoring() {
            self.stop();
            false
        } else {
            self.start();
            true
        }
    }

    pub fn is_monitoring(&self) -> bool {
        self.inner.session.lock().is_monitoring
    }

    // ------------------------------------------------------------------
    // Polling pipeline
    // ------------------------------------------------------------------

    /// One polling tick: spawn a pipeline for every active sensor without
    /// waiting for any of them.
    pub fn tick(&self) -> Vec<JoinHandle<()>> {
        self.inner.session.lock().last_tick = Some(Utc::now());
        let ids = self.inner.registry.active_ids();
        debug!("Tick: polling {} active sensors", ids.len());

        ids.into_iter()
            .map(|id| {
                let engine = self.clone();
                tokio::spawn(async move { engine.poll_sensor(&id).await })
            })
            .collect()
    }

    /// Read, evaluate and publish for one sensor. Failures become a
    /// connection-error event and never propagate.
    pub async fn poll_sensor(&self, sensor_id: &str) {
        match self.read_and_apply(sensor_id).await {
            Ok(view) => self.inner.display.sensor_changed(&view),
            Err(err) => {
                self.inner.event_bus.publish(&Event::ConnectionError {
                    sensor_id: sensor_id.to_string(),
                    error: err,
                });
            }
        }
    }

    async fn read_and_apply(&self, sensor_id: &str) -> Result<SensorView, SensorError> {
        let reading = self.inner.source.read(sensor_id).await?;
        let definition = self
            .inner
            .registry
            .definition(sensor_id)
            .ok_or_else(|| SensorError::NotFound(sensor_id.to_string()))?;

        let evaluation = evaluate(&definition, &reading);
        let view = self
            .inner
            .registry
            .update(sensor_id, SensorPatch::from_reading(&reading, evaluation.status))?;

        self.inner.event_bus.publish(&Event::DataReceived {
            reading,
            sensor: view.clone(),
        });
        if let Some(request) = evaluation.alert {
            self.inner.event_bus.publish(&Event::AlertRaised(request));
        }
        Ok(view)
    }

    /// Recompute the uptime display string
    pub fn refresh_uptime(&self) -> String {
        let uptime = self
            .inner
            .session
            .lock()
            .refresh_uptime(Utc::now())
            .to_string();
        self.publish_stats();
        uptime
    }

    // ------------------------------------------------------------------
    // Core event handlers
    // ------------------------------------------------------------------

    fn on_data_received(&self, reading: &SensorReading, sensor: &SensorView) {
        self.inner.session.lock().data_points += 1;
        self.publish_stats();

        if let Some(message) = sensor.definition.sensor_type.advisory(reading.value) {
            self.notice(message, NoticeLevel::Warning);
        }
    }

    fn on_alert_raised(&self, request: &AlertRequest) {
        let (alert, alerts) = {
            let mut log = self.inner.alerts.lock();
            let alert = log.raise(request.clone(), Utc::now());
            (alert, log.to_vec())
        };
        info!(
            "Alert #{} on {}: {} (threshold {}, {:?})",
            alert.id, alert.sensor_id, alert.value, alert.threshold, alert.severity
        );

        self.inner.display.alerts_changed(&alerts);
        self.publish_stats();
        self.announce_alert(&alert);
    }

    fn on_connection_error(&self, sensor_id: &str, err: &SensorError) {
        error!("Read failed for {}: {}", sensor_id, err);
        self.notice("Sensor connection error", NoticeLevel::Error);
    }

    fn announce_alert(&self, alert: &Alert) {
        let unit = self
            .inner
            .registry
            .definition(&alert.sensor_id)
            .map(|d| d.unit)
            .unwrap_or_default();
        let message = format!("{}: {}{}", alert.sensor_name, alert.value, unit);

        if alert.is_critical() {
            self.notice(format!("CRITICAL: {}", message), NoticeLevel::Error);
            self.inner.notifier.flash_title(
                &format!("CRITICAL ALERT - {}", alert.sensor_name),
                self.inner.config.monitor.critical_flash(),
            );
        } else {
            self.notice(format!("Warning: {}", message), NoticeLevel::Warning);
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn sensor(&self, id: &str) -> Option<SensorView> {
        self.inner.registry.get(id)
    }

    pub fn sensors(&self) -> Vec<SensorView> {
        self.inner.registry.views()
    }

    /// Alert log, newest first
    pub fn alerts(&self) -> Vec<Alert> {
        self.inner.alerts.lock().to_vec()
    }

    pub fn alert_count(&self) -> usize {
        self.inner.alerts.lock().count()
    }

    pub fn session(&self) -> Session {
        self.inner.session.lock().clone()
    }

    pub fn stats(&self) -> Stats {
        let session = self.session();
        let alert_count = self.alert_count();
        let uptime = session.uptime_at(Utc::now());

        Stats {
            data_points: session.data_points,
            alert_count,
            uptime: format_uptime(uptime),
            uptime_ms: u64::try_from(uptime.as_millis()).unwrap_or(u64::MAX),
            total_sensors: self.inner.registry.len(),
            is_monitoring: session.is_monitoring,
            last_tick: session.last_tick,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            timestamp: Utc::now(),
            sensors: self
                .sensors()
                .into_iter()
                .map(|view| (view.id().to_string(), view))
                .collect(),
            alerts: self.alerts(),
            stats: self.stats(),
        }
    }

    pub fn report(&self) -> DailyReport {
        DailyReport::build(
            Local::now().date_naive(),
            &self.sensors(),
            &self.alerts(),
            self.session().data_points,
        )
    }

    pub fn trends(&self) -> Vec<Trend> {
        self.sensors().iter().map(Trend::for_sensor).collect()
    }

    // ------------------------------------------------------------------
    // Control operations
    // ------------------------------------------------------------------

    pub fn clear_alerts(&self) {
        self.inner.alerts.lock().clear();
        self.inner.display.alerts_changed(&[]);
        self.publish_stats();
        info!("Alert log cleared");
        self.notice("Alerts cleared", NoticeLevel::Success);
    }

    /// Replace thresholds; `None` keeps the current value. False for an
    /// unknown sensor.
    pub fn configure_thresholds(&self, id: &str, alert: Option<f64>, critical: Option<f64>) -> bool {
        match self.inner.registry.set_thresholds(id, alert, critical) {
            Ok(view) => {
                self.inner.display.sensor_changed(&view);
                true
            }
            Err(err) => {
                warn!("Threshold update rejected: {}", err);
                false
            }
        }
    }

    /// Include or exclude a sensor from polling ticks
    pub fn set_active(&self, id: &str, active: bool) -> bool {
        let patch = SensorPatch {
            is_active: Some(active),
            ..Default::default()
        };
        match self.inner.registry.update(id, patch) {
            Ok(view) => {
                info!("Sensor {} {}", id, if active { "enabled" } else { "disabled" });
                self.inner.display.sensor_changed(&view);
                true
            }
            Err(err) => {
                warn!("Activation change rejected: {}", err);
                false
            }
        }
    }

    /// Force an alert on a random sensor
    pub fn simulate_alert(&self) -> Option<SensorView> {
        let ids = self.inner.registry.ids();
        if ids.is_empty() {
            return None;
        }
        let index = self.inner.rng.lock().gen_range(0..ids.len());
        self.simulate_alert_on(&ids[index]).ok()
    }

    /// Force `alertThreshold + U[0, 10)` onto a sensor with status alert,
    /// bypassing evaluation, and raise an alert for it.
    pub fn simulate_alert_on(&self, id: &str) -> Result<SensorView, SensorError> {
        let definition = self
            .inner
            .registry
            .definition(id)
            .ok_or_else(|| SensorError::NotFound(id.to_string()))?;

        let value = definition.alert_threshold + self.inner.rng.lock().gen_range(0.0..10.0);
        let view = self.inner.registry.update(
            id,
            SensorPatch {
                value: Some(value),
                status: Some(SensorStatus::Alert),
                last_update: Some(Utc::now()),
                ..Default::default()
            },
        )?;

        self.inner.event_bus.publish(&Event::AlertRaised(AlertRequest {
            sensor_id: definition.id.clone(),
            sensor_name: definition.name.clone(),
            value,
            threshold: definition.alert_threshold,
            sensor_type: definition.sensor_type,
        }));

        self.inner.display.sensor_changed(&view);
        self.notice(format!("Simulated alert on {}", definition.name), NoticeLevel::Warning);
        Ok(view)
    }

    /// Simulated maintenance: after a delay every sensor gets a fresh
    /// battery level in 80..=99 and good quality.
    pub async fn simulate_maintenance(&self) {
        self.notice("Starting scheduled maintenance...", NoticeLevel::Info);
        tokio::time::sleep(self.inner.config.simulation.maintenance_delay()).await;

        let views = {
            let mut rng = self.inner.rng.lock();
            self.inner.registry.update_all(|_| SensorPatch {
                battery_level: Some(rng.gen_range(80..100)),
                quality: Some(ReadingQuality::Good),
                ..Default::default()
            })
        };
        for view in &views {
            self.inner.display.sensor_changed(view);
        }

        info!("Maintenance complete for {} sensors", views.len());
        self.notice("Maintenance complete", NoticeLevel::Success);
    }

    /// Hand a snapshot to the persistence stand-in. Failures are reported
    /// as notices only; returns the storage key on success.
    pub async fn save(&self) -> Option<String> {
        self.notice("Saving data...", NoticeLevel::Info);

        let snapshot = self.snapshot();
        let key = format!("sensor_data_{}", snapshot.timestamp.timestamp_millis());

        match self.inner.store.put(&key, &snapshot).await {
            Ok(()) => {
                info!("Saved snapshot under {}", key);
                self.notice("Data saved", NoticeLevel::Success);
                Some(key)
            }
            Err(err) => {
                error!("Failed to save snapshot: {:#}", err);
                self.notice("Failed to save data", NoticeLevel::Error);
                None
            }
        }
    }

    /// Write a pretty JSON snapshot into `dir`
    pub fn export_to(&self, dir: &Path) -> Result<PathBuf> {
        match self.snapshot().write_to_dir(dir) {
            Ok(path) => {
                self.notice("Data exported", NoticeLevel::Success);
                Ok(path)
            }
            Err(err) => {
                error!("Export failed: {:#}", err);
                self.notice("Failed to export data", NoticeLevel::Error);
                Err(err)
            }
        }
    }

    /// Export into the configured export directory
    pub fn export(&self) -> Result<PathBuf> {
        let dir = self.inner.config.export_dir.clone();
        self.export_to(&dir)
    }

    /// Periodically roll for a simulated system event notice. Runs until
    /// the handle is aborted or the engine is dropped.
    pub fn spawn_ambient_events(&self) -> JoinHandle<()> {
        let weak = Arc::downgrade(&self.inner);
        let period = self.inner.config.monitor.ambient_event_interval();
        let probability = self.inner.config.monitor.ambient_event_probability;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else { break };
                let engine = Engine { inner };
                let fire = engine.inner.rng.lock().gen_bool(probability);
                if fire {
                    engine.notice("Simulated system event", NoticeLevel::Info);
                }
            }
        })
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    /// Generic notice with the configured display duration
    pub fn notice(&self, message: impl Into<String>, level: NoticeLevel) {
        self.inner.notifier.notify(Notice::new(
            message,
            level,
            self.inner.config.monitor.notice_duration(),
        ));
    }

    fn publish_stats(&self) {
        let stats = self.stats();
        self.inner.display.stats_changed(&stats);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::sensors::SensorType;
    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};
    use std::time::Duration;

    /// Serves queued values per sensor, failing when a queue runs dry
    #[derive(Default)]
    struct ScriptedSource {
        values: Mutex<HashMap<String, VecDeque<f64>>>,
        reads: Mutex<Vec<String>>,
    }

    impl ScriptedSource {
        fn push(&self, id: &str, value: f64) {
            self.values.lock().entry(id.to_string()).or_default().push_back(value);
        }
    }

    #[async_trait]
    impl ReadingSource for ScriptedSource {
        async fn read(&self, sensor_id: &str) -> Result<SensorReading, SensorError> {
            self.reads.lock().push(sensor_id.to_string());
            let value = self
                .values
                .lock()
                .get_mut(sensor_id)
                .and_then(|q| q.pop_front())
                .ok_or_else(|| SensorError::Communication(sensor_id.to_string()))?;
            Ok(SensorReading::new(sensor_id, value))
        }
    }

    /// Always returns the same value for every known sensor
    struct ConstantSource(f64);

    #[async_trait]
    impl ReadingSource for ConstantSource {
        async fn read(&self, sensor_id: &str) -> Result<SensorReading, SensorError> {
            Ok(SensorReading::new(sensor_id, self.0))
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        notices: Mutex<Vec<Notice>>,
        titles: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn messages(&self) -> Vec<String> {
            self.notices.lock().iter().map(|n| n.message.clone()).collect()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notice: Notice) {
            self.notices.lock().push(notice);
        }

        fn flash_title(&self, title: &str, _duration: Duration) {
            self.titles.lock().push(title.to_string());
        }
    }

    #[derive(Default)]
    struct RecordingDisplay {
        sensors: Mutex<Vec<SensorView>>,
        alert_panels: Mutex<Vec<usize>>,
    }

    impl DisplaySurface for RecordingDisplay {
        fn sensor_changed(&self, sensor: &SensorView) {
            self.sensors.lock().push(sensor.clone());
        }

        fn alerts_changed(&self, alerts: &[Alert]) {
            self.alert_panels.lock().push(alerts.len());
        }

        fn stats_changed(&self, _stats: &Stats) {}
    }

    struct FailingStore;

    #[async_trait]
    impl SnapshotStore for FailingStore {
        async fn put(&self, _key: &str, _snapshot: &Snapshot) -> Result<()> {
            anyhow::bail!("disk full")
        }
    }

    struct Harness {
        engine: Engine,
        source: Arc<ScriptedSource>,
        notifier: Arc<RecordingNotifier>,
        display: Arc<RecordingDisplay>,
    }

    fn test_config() -> Config {
        Config {
            simulation: SimulationConfig {
                seed: Some(11),
                ..SimulationConfig::instant()
            },
            ..Config::default()
        }
    }

    fn harness() -> Harness {
        let source = Arc::new(ScriptedSource::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let display = Arc::new(RecordingDisplay::default());
        let engine = Engine::builder(test_config())
            .source(source.clone())
            .notifier(notifier.clone())
            .display(display.clone())
            .build()
            .unwrap();
        Harness {
            engine,
            source,
            notifier,
            display,
        }
    }

    #[tokio::test]
    async fn test_status_follows_thresholds() {
        let h = harness();
        for (value, expected) in [
            (39.99, SensorStatus::Normal),
            (40.0, SensorStatus::Alert),
            (44.0, SensorStatus::Alert),
            (45.0, SensorStatus::Critical),
            (12.0, SensorStatus::Normal),
        ] {
            h.source.push("temp1", value);
            h.engine.poll_sensor("temp1").await;
            let view = h.engine.sensor("temp1").unwrap();
            assert_eq!(view.state.value, value);
            assert_eq!(view.state.status, expected, "value {}", value);
            assert!(view.state.last_update.is_some());
        }
        assert_eq!(h.engine.session().data_points, 5);
        assert_eq!(h.engine.alert_count(), 3);
    }

    #[tokio::test]
    async fn test_severity_diverges_from_status() {
        let h = harness();
        h.source.push("temp1", 47.0);
        h.source.push("temp1", 48.5);
        h.engine.poll_sensor("temp1").await;
        h.engine.poll_sensor("temp1").await;

        let alerts = h.engine.alerts();
        assert_eq!(alerts[0].value, 48.5);
        assert_eq!(alerts[0].severity, crate::alerts::Severity::Critical);
        assert_eq!(alerts[1].value, 47.0);
        assert_eq!(alerts[1].severity, crate::alerts::Severity::Warning);
        assert_eq!(h.engine.sensor("temp1").unwrap().state.status, SensorStatus::Critical);

        assert_eq!(*h.notifier.titles.lock(), vec!["CRITICAL ALERT - Outdoor Temperature"]);
        let messages = h.notifier.messages();
        assert!(messages.contains(&"Warning: Outdoor Temperature: 47°C".to_string()));
        assert!(messages.contains(&"CRITICAL: Outdoor Temperature: 48.5°C".to_string()));
    }

    #[tokio::test]
    async fn test_read_failure_publishes_connection_error() {
        let h = harness();
        let errors = Arc::new(Mutex::new(Vec::new()));
        {
            let errors = errors.clone();
            h.engine
                .event_bus()
                .on_connection_error(move |id, err| errors.lock().push((id.to_string(), err.clone())));
        }

        h.source.push("ghost", 1.0);
        h.engine.poll_sensor("hum1").await;
        h.engine.poll_sensor("ghost").await;

        let errors = errors.lock();
        assert_eq!(errors[0], ("hum1".to_string(), SensorError::Communication("hum1".to_string())));
        assert_eq!(errors[1].1, SensorError::NotFound("ghost".to_string()));
        assert_eq!(h.engine.session().data_points, 0);
        assert_eq!(h.engine.sensor("hum1").unwrap().state.last_update, None);
        assert!(h.notifier.messages().contains(&"Sensor connection error".to_string()));
    }

    #[tokio::test]
    async fn test_advisory_without_alert() {
        let h = harness();
        h.source.push("co2_1", 900.0);
        h.engine.poll_sensor("co2_1").await;

        assert_eq!(h.engine.alert_count(), 0);
        assert!(h.notifier.messages().contains(&"High CO2: 900 ppm".to_string()));
    }

    #[tokio::test]
    async fn test_display_sees_updated_card() {
        let h = harness();
        h.source.push("press1", 1090.0);
        h.engine.poll_sensor("press1").await;

        let cards = h.display.sensors.lock();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].definition.id, "press1");
        assert_eq!(cards[0].state.status, SensorStatus::Critical);
        assert_eq!(*h.display.alert_panels.lock(), vec![1]);
    }

    #[tokio::test]
    async fn test_alert_log_is_capped() {
        let h = harness();
        for i in 0..11 {
            h.source.push("hum1", 81.0 + i as f64);
            h.engine.poll_sensor("hum1").await;
        }
        let alerts = h.engine.alerts();
        assert_eq!(alerts.len(), 10);
        assert_eq!(alerts[0].value, 91.0);
        assert_eq!(alerts[9].value, 82.0);

        h.engine.clear_alerts();
        assert_eq!(h.engine.alert_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_poll_every_active_sensor() {
        let engine = Engine::builder(test_config())
            .source(Arc::new(ConstantSource(10.0)))
            .notifier(Arc::new(RecordingNotifier::default()))
            .build()
            .unwrap();
        engine.set_active("press1", false);

        assert!(engine.start());
        assert!(!engine.start());

        tokio::time::sleep(Duration::from_millis(3100)).await;
        assert_eq!(engine.session().data_points, 3);

        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert_eq!(engine.session().data_points, 6);
        assert_eq!(engine.sensor("press1").unwrap().state.last_update, None);

        assert!(engine.stop());
        assert!(!engine.stop());
        tokio::time::sleep(Duration::from_millis(9000)).await;
        assert_eq!(engine.session().data_points, 6);
        assert!(!engine.is_monitoring());
    }

    /// Engine on the built-in simulator with a fixed 500 ms read latency
    fn slow_simulated_engine() -> Engine {
        let config = Config {
            simulation: SimulationConfig {
                min_latency_ms: 500,
                max_latency_ms: 501,
                failure_rate: 0.0,
                seed: Some(3),
                ..SimulationConfig::instant()
            },
            ..Config::default()
        };
        Engine::builder(config)
            .notifier(Arc::new(RecordingNotifier::default()))
            .build()
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_reads_overlap() {
        let engine = slow_simulated_engine();
        engine.tick();

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(engine.session().data_points, 0);

        // Four serial reads would need two seconds
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(engine.session().data_points, 4);
        for view in engine.sensors() {
            assert!(view.state.last_update.is_some());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_lets_in_flight_reads_finish() {
        let engine = slow_simulated_engine();
        engine.start();

        tokio::time::sleep(Duration::from_millis(3100)).await;
        assert_eq!(engine.session().data_points, 0);
        assert!(engine.stop());

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(engine.session().data_points, 4);
        assert!(engine.sensors().iter().all(|v| v.state.last_update.is_some()));

        // No further ticks after stop
        tokio::time::sleep(Duration::from_millis(6000)).await;
        assert_eq!(engine.session().data_points, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_uptime_ticker_runs_while_monitoring() {
        let engine = Engine::builder(test_config())
            .source(Arc::new(ConstantSource(10.0)))
            .notifier(Arc::new(RecordingNotifier::default()))
            .build()
            .unwrap();
        engine.start();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        // Wall clock is not paused, so only the format is checked
        let uptime = engine.session().uptime;
        assert_eq!(uptime.len(), 8);
        assert_eq!(&uptime[2..3], ":");
        engine.stop();
    }

    #[tokio::test]
    async fn test_toggle() {
        let h = harness();
        assert!(h.engine.toggle());
        assert!(h.engine.is_monitoring());
        assert!(!h.engine.toggle());
        assert!(!h.engine.is_monitoring());
        let messages = h.notifier.messages();
        assert_eq!(messages, vec!["Monitoring started", "Monitoring stopped"]);
    }

    #[tokio::test]
    async fn test_simulate_alert_on() {
        let h = harness();
        let view = h.engine.simulate_alert_on("co2_1").unwrap();

        assert_eq!(view.state.status, SensorStatus::Alert);
        assert!((1000.0..1010.0).contains(&view.state.value));
        let alerts = h.engine.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].sensor_id, "co2_1");
        assert_eq!(alerts[0].sensor_type, SensorType::Co2);
        assert!(h.notifier.messages().contains(&"Simulated alert on Indoor CO2".to_string()));

        assert!(h.engine.simulate_alert_on("nope").is_err());
    }

    #[tokio::test]
    async fn test_simulate_alert_picks_a_sensor() {
        let h = harness();
        let view = h.engine.simulate_alert().unwrap();
        assert!(h.engine.registry().contains(view.id()));
        assert_eq!(h.engine.alert_count(), 1);
    }

    #[tokio::test]
    async fn test_simulate_maintenance() {
        let h = harness();
        h.engine.simulate_maintenance().await;

        for view in h.engine.sensors() {
            assert!((80..=99).contains(&view.state.battery_level));
            assert_eq!(view.state.quality, ReadingQuality::Good);
        }
        assert_eq!(
            h.notifier.messages(),
            vec!["Starting scheduled maintenance...", "Maintenance complete"]
        );
    }

    #[tokio::test]
    async fn test_configure_thresholds() {
        let h = harness();
        assert!(h.engine.configure_thresholds("temp1", Some(20.0), Some(30.0)));
        assert!(!h.engine.configure_thresholds("nope", Some(1.0), None));

        h.source.push("temp1", 25.0);
        h.engine.poll_sensor("temp1").await;
        assert_eq!(h.engine.sensor("temp1").unwrap().state.status, SensorStatus::Alert);
        assert_eq!(h.engine.alerts()[0].threshold, 20.0);
    }

    #[tokio::test]
    async fn test_save_stores_snapshot() {
        let store = Arc::new(MemoryStore::default());
        let engine = Engine::builder(test_config())
            .source(Arc::new(ConstantSource(95.0)))
            .notifier(Arc::new(RecordingNotifier::default()))
            .store(store.clone())
            .build()
            .unwrap();
        engine.poll_sensor("hum1").await;

        let key = engine.save().await.unwrap();
        assert!(key.starts_with("sensor_data_"));

        let snapshot = Snapshot::from_json(&store.get(&key).unwrap()).unwrap();
        assert_eq!(snapshot.sensors.len(), 4);
        assert_eq!(snapshot.alerts.len(), 1);
        assert_eq!(snapshot.stats.data_points, 1);
    }

    #[tokio::test]
    async fn test_save_failure_is_only_reported() {
        let notifier = Arc::new(RecordingNotifier::default());
        let engine = Engine::builder(test_config())
            .source(Arc::new(ConstantSource(10.0)))
            .notifier(notifier.clone())
            .store(Arc::new(FailingStore))
            .build()
            .unwrap();
        engine.poll_sensor("temp1").await;

        assert!(engine.save().await.is_none());
        assert!(notifier.messages().contains(&"Failed to save data".to_string()));
        assert_eq!(engine.sensor("temp1").unwrap().state.value, 10.0);
    }

    #[tokio::test]
    async fn test_export_roundtrip() {
        let h = harness();
        h.source.push("temp1", 42.25);
        h.engine.poll_sensor("temp1").await;
        h.engine.simulate_alert_on("hum1").unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = h.engine.export_to(dir.path()).unwrap();
        let restored = Snapshot::from_json(&std::fs::read_to_string(path).unwrap()).unwrap();

        let ids: Vec<String> = restored.sensors.iter().map(|(id, _)| id.clone()).collect();
        assert_eq!(ids, h.engine.registry().ids());
        assert_eq!(restored.sensors[0].1.state.value, 42.25);
        assert_eq!(restored.alerts, h.engine.alerts());
    }

    #[tokio::test]
    async fn test_report_and_trends() {
        let h = harness();
        h.source.push("co2_1", 1600.0);
        h.engine.poll_sensor("co2_1").await;

        let report = h.engine.report();
        assert_eq!(report.total_alerts, 1);
        assert_eq!(report.critical_alerts, 1);
        assert_eq!(report.data_points, 1);

        let trends = h.engine.trends();
        assert_eq!(trends.len(), 4);
        assert_eq!(trends[3].risk, crate::output::RiskLevel::High);
        assert_eq!(trends[0].risk, crate::output::RiskLevel::Low);
    }

    #[tokio::test]
    async fn test_rejects_invalid_config() {
        let mut config = test_config();
        config.sensors[0].critical_threshold = 10.0;
        assert!(Engine::new(config).is_err());
    }
}
