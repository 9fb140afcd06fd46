use serde_json::json;
use std::time::Duration;

use super::{DeliveryOutcome, Report, ReportBackend, ReportStatus};
use crate::core::health::{MetricsSnapshot, Verdict};
use crate::error::Result;

/// Backend that only logs the report.
///
/// Used when no monitoring endpoint is configured, and as the fallback for
/// unknown `api_type` values.
#[derive(Debug, Default)]
pub struct SimulatedBackend {
    last_report: Option<Report>,
    delivered: usize,
}

impl SimulatedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently delivered report
    pub fn last_report(&self) -> Option<&Report> {
        self.last_report.as_ref()
    }

    /// Number of reports delivered so far
    pub fn delivered(&self) -> usize {
        self.delivered
    }
}

impl ReportBackend for SimulatedBackend {
    fn name(&self) -> &'static str {
        "Simulated"
    }

    fn render(&self, snapshot: &MetricsSnapshot, verdict: &Verdict, latency: Duration) -> Report {
        let status = ReportStatus::from_verdict(verdict);
        let dump = json!({
            "status": status.as_str(),
            "verdict": verdict,
            "ping": latency.as_secs_f64(),
            "metrics": snapshot,
        });

        Report {
            status,
            // Serializing plain data into a Value cannot fail
            message: serde_json::to_string_pretty(&dump).unwrap_or_else(|_| dump.to_string()),
            ping_seconds: latency.as_secs_f64(),
        }
    }

    fn deliver(&mut self, report: &Report) -> Result<DeliveryOutcome> {
        log::info!("Data sent successfully ({}):", report.status.as_str());
        for line in report.message.lines() {
            log::info!("{}", line);
        }

        self.last_report = Some(report.clone());
        self.delivered += 1;
        Ok(DeliveryOutcome::Recorded)
    }
}
