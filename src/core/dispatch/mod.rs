//! Report rendering and delivery.
//!
//! A [`ReportBackend`] turns a snapshot and its verdict into a [`Report`] and
//! delivers it. The set of backends is closed ([`BackendKind`]); the
//! `api_type` configuration value selects one.

mod simulated;
pub mod summary;
mod uptime_kuma;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::config::AgentConfig;
use crate::core::health::{MetricsSnapshot, Verdict};
use crate::error::Result;

pub use simulated::SimulatedBackend;
pub use summary::summarize;
pub use uptime_kuma::UptimeKumaBackend;

/// Overall status carried by a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    Up,
    Down,
}

impl ReportStatus {
    pub fn from_verdict(verdict: &Verdict) -> Self {
        if verdict.ok {
            ReportStatus::Up
        } else {
            ReportStatus::Down
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Up => "up",
            ReportStatus::Down => "down",
        }
    }
}

/// A rendered report, ready for delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub status: ReportStatus,
    /// Backend-specific message body
    pub message: String,
    /// Time spent collecting and evaluating this cycle, in seconds
    pub ping_seconds: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The remote endpoint accepted the report
    Delivered { http_status: u16 },
    /// The report was only logged locally
    Recorded,
}

/// Trait for report backends
///
/// Implementations render the report in the format their endpoint expects
/// and deliver it synchronously. No retries: a failed delivery is reported
/// to the caller and the next cycle tries again with fresh data.
pub trait ReportBackend: Send {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Render the report for this cycle
    fn render(&self, snapshot: &MetricsSnapshot, verdict: &Verdict, latency: Duration) -> Report;

    /// Deliver a rendered report
    fn deliver(&mut self, report: &Report) -> Result<DeliveryOutcome>;
}

/// Known backend identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendKind {
    Simulated,
    UptimeKuma,
}

impl BackendKind {
    /// Parse an `api_type` value. Unknown identifiers map to `Simulated`.
    pub fn from_api_type(api_type: &str) -> Self {
        match Self::parse(api_type) {
            Some(kind) => kind,
            None => {
                log::warn!(
                    "Unknown api_type '{}', falling back to Simulated",
                    api_type
                );
                BackendKind::Simulated
            }
        }
    }

    /// Strict parse, `None` for unknown identifiers
    pub fn parse(api_type: &str) -> Option<Self> {
        let normalized: String = api_type
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "simulated" => Some(BackendKind::Simulated),
            "uptimekuma" | "kuma" | "push" => Some(BackendKind::UptimeKuma),
            _ => None,
        }
    }
}

/// Create the backend selected by the configuration.
///
/// Expects a validated configuration; missing push settings are reported as
/// configuration errors.
pub fn create_backend(config: &AgentConfig) -> Result<Box<dyn ReportBackend>> {
    match config.backend_kind() {
        BackendKind::Simulated => Ok(Box::new(SimulatedBackend::new())),
        BackendKind::UptimeKuma => {
            let (url, key) = config.push_endpoint()?;
            Ok(Box::new(UptimeKumaBackend::new(url, key)?))
        }
    }
}

/// Renders and delivers reports through one backend.
pub struct ReportDispatcher {
    backend: Box<dyn ReportBackend>,
}

impl ReportDispatcher {
    pub fn new(backend: Box<dyn ReportBackend>) -> Self {
        Self { backend }
    }

    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        let backend = create_backend(config)?;
        log::info!("Reporting through the {} backend", backend.name());
        Ok(Self::new(backend))
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Render and deliver. Delivery failures are logged and swallowed.
    ///
    /// Returns the outcome when delivery succeeded.
    pub fn dispatch(
        &mut self,
        snapshot: &MetricsSnapshot,
        verdict: &Verdict,
        latency: Duration,
    ) -> Option<DeliveryOutcome> {
        let report = self.backend.render(snapshot, verdict, latency);

        match self.backend.deliver(&report) {
            Ok(outcome) => {
                log::debug!("{} delivery finished: {:?}", self.backend.name(), outcome);
                Some(outcome)
            }
            Err(e) => {
                log::error!("Failed to send report via {}: {}", self.backend.name(), e);
                None
            }
        }
    }
}
