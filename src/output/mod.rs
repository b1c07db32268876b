//! Output surfaces - notifications, display hooks and snapshot export

mod display;
mod export;
mod notify;

pub use display::{DisplaySurface, TracingDisplay};
pub use export::{DailyReport, ReportEntry, RiskLevel, Snapshot, Trend};
pub use notify::{Notice, NoticeLevel, Notifier, TracingNotifier};
