//! Core engine module - session, event hub, scheduler and monitoring engine

mod engine;
mod event_bus;
mod scheduler;
mod session;

pub use engine::{Engine, EngineBuilder};
pub use event_bus::{Event, EventBus, EventType};
pub use scheduler::{Scheduler, SchedulerState};
pub use session::{format_uptime, Session, Stats};
