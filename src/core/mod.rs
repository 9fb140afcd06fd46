// Core agent logic

pub mod agent;
pub mod collectors;
pub mod config;
pub mod dispatch;
pub mod health;
pub mod validation;

// Re-export commonly used items
pub use agent::{Agent, CycleOutcome};
pub use config::AgentConfig;
pub use dispatch::{BackendKind, ReportDispatcher};
pub use health::{evaluate, MetricsSnapshot, NotificationScheduler, ThresholdConfig, Verdict};
