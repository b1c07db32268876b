// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/sensordeck

//! Event hub for inter-component communication
//!
//! Delivery is synchronous: `publish` returns after every matching handler
//! has run, in subscription order, on the caller's task.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::alerts::AlertRequest;
use crate::error::SensorError;
use crate::sensors::{SensorReading, SensorView};

/// Event kinds carried by the hub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    DataReceived,
    AlertRaised,
    ConnectionError,
}

/// Event payloads
#[derive(Debug, Clone)]
pub enum Event {
    /// A read completed and the registry holds the updated state
    DataReceived {
        reading: SensorReading,
        sensor: SensorView,
    },
    /// Evaluation produced a non-normal status
    AlertRaised(AlertRequest),
    /// A read failed
    ConnectionError { sensor_id: String, error: SensorError },
}

impl Event {
    pub fn event_type(&self) -> EventType {
        match self {
            Event::DataReceived { .. } => EventType::DataReceived,
            Event::AlertRaised(_) => EventType::AlertRaised,
            Event::ConnectionError { .. } => EventType::ConnectionError,
        }
    }
}

type DataHandler = Arc<dyn Fn(&SensorReading, &SensorView) + Send + Sync>;
type AlertHandler = Arc<dyn Fn(&AlertRequest) + Send + Sync>;
type ErrorHandler = Arc<dyn Fn(&str, &SensorError) + Send + Sync>;

/// Typed publish/subscribe hub
#[derive(Default)]
pub struct EventBus {
    data_handlers: RwLock<Vec<DataHandler>>,
    alert_handlers: RwLock<Vec<AlertHandler>>,
    error_handlers: RwLock<Vec<ErrorHandler>>,
    event_counter: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_data_received<F>(&self, handler: F)
    where
        F: Fn(&SensorReading, &SensorView) + Send + Sync + 'static,
    {
        self.data_handlers.write().push(Arc::new(handler));
    }

    pub fn on_alert_raised<F>(&self, handler: F)
    where
        F: Fn(&AlertRequest) + Send + Sync + 'static,
    {
        self.alert_handlers.write().push(Arc::new(handler));
    }

    pub fn on_connection_error<F>(&self, handler: F)
    where
        F: Fn(&str, &SensorError) + Send + Sync + 'static,
    {
        self.error_handlers.write().push(Arc::new(handler));
    }

    /// Deliver `event` to every handler of its kind.
    ///
    /// The handler list is copied before delivery, so a handler may publish
    /// or subscribe without deadlocking.
    pub fn publish(&self, event: &Event) {
        let id = self.event_counter.fetch_add(1, Ordering::Relaxed);
        trace!("Publishing event #{} {:?}", id, event.event_type());

        match event {
            Event::DataReceived { reading, sensor } => {
                let handlers = self.data_handlers.read().clone();
                for handler in handlers {
                    handler(reading, sensor);
                }
            }
            Event::AlertRaised(request) => {
                let handlers = self.alert_handlers.read().clone();
                for handler in handlers {
                    handler(request);
                }
            }
            Event::ConnectionError { sensor_id, error } => {
                let handlers = self.error_handlers.read().clone();
                for handler in handlers {
                    handler(sensor_id, error);
                }
            }
        }
    }

    /// Number of events published so far
    pub fn published(&self) -> u64 {
        self.event_counter.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::{SensorDefinition, SensorState, SensorType};
    use parking_lot::Mutex;

    fn view() -> SensorView {
        SensorView {
            definition: SensorDefinition::demo_fleet().remove(0),
            state: SensorState::default(),
        }
    }

    #[test]
    fn test_delivery_in_subscription_order() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let seen = seen.clone();
            bus.on_data_received(move |_, _| seen.lock().push(tag));
        }

        bus.publish(&Event::DataReceived {
            reading: SensorReading::new("temp1", 20.0),
            sensor: view(),
        });

        assert_eq!(*seen.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_kinds_are_routed_separately() {
        let bus = EventBus::new();
        let alerts = Arc::new(Mutex::new(0));
        let errors = Arc::new(Mutex::new(Vec::new()));

        {
            let alerts = alerts.clone();
            bus.on_alert_raised(move |_| *alerts.lock() += 1);
        }
        {
            let errors = errors.clone();
            bus.on_connection_error(move |id, err| errors.lock().push((id.to_string(), err.clone())));
        }

        bus.publish(&Event::ConnectionError {
            sensor_id: "hum1".to_string(),
            error: SensorError::Communication("hum1".to_string()),
        });
        bus.publish(&Event::AlertRaised(AlertRequest {
            sensor_id: "temp1".to_string(),
            sensor_name: "Outdoor Temperature".to_string(),
            value: 41.0,
            threshold: 40.0,
            sensor_type: SensorType::Temperature,
        }));

        assert_eq!(*alerts.lock(), 1);
        assert_eq!(errors.lock().len(), 1);
        assert_eq!(errors.lock()[0].0, "hum1");
        assert_eq!(bus.published(), 2);
    }

    #[test]
    fn test_handler_may_publish_reentrantly() {
        let bus = Arc::new(EventBus::new());
        let errors = Arc::new(Mutex::new(0));

        {
            let errors = errors.clone();
            bus.on_connection_error(move |_, _| *errors.lock() += 1);
        }
        {
            let weak = Arc::downgrade(&bus);
            bus.on_data_received(move |reading, _| {
                if let Some(bus) = weak.upgrade() {
                    bus.publish(&Event::ConnectionError {
                        sensor_id: reading.sensor_id.clone(),
                        error: SensorError::NotFound(reading.sensor_id.clone()),
                    });
                }
            });
        }

        bus.publish(&Event::DataReceived {
            reading: SensorReading::new("temp1", 20.0),
            sensor: view(),
        });
        assert_eq!(*errors.lock(), 1);
    }
}
