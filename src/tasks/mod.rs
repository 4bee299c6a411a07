//! Background Tasks Module
//!
//! Contains background tasks that run periodically during service operation.
//!
//! # Tasks
//! - Sweep: removes expired cache entries at the configured interval
//! - Monitor: reconciles cached tracked characters against the backing store

mod monitor;
mod sweep;

pub use monitor::{
    spawn_monitor_task, CacheMonitor, CheckOutcome, MonitorSettings, MonitorStatus,
    ReconcileReport,
};
pub use sweep::spawn_sweep_task;
