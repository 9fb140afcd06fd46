use reqwest::blocking::Client;
use std::time::Duration;
use url::Url;

use super::summary::summarize;
use super::{DeliveryOutcome, Report, ReportBackend, ReportStatus};
use crate::core::health::{MetricsSnapshot, Verdict};
use crate::error::{AgentError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Push-style monitor backend (Uptime Kuma "Push" monitors).
///
/// Every report is a `GET {api_url}/{api_key}?status=up|down&msg=...&ping=...`.
/// The monitor flags the host as down when pushes stop arriving, which is
/// why the scheduler sends periodic heartbeats.
pub struct UptimeKumaBackend {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl UptimeKumaBackend {
    pub fn new(base_url: Url, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("beacon-agent/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// Full push URL for a report
    pub fn push_url(&self, report: &Report) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&self.api_key);
        }
        url.query_pairs_mut()
            .append_pair("status", report.status.as_str())
            .append_pair("msg", &report.message)
            .append_pair("ping", &format!("{:.3}", report.ping_seconds));
        url
    }
}

impl ReportBackend for UptimeKumaBackend {
    fn name(&self) -> &'static str {
        "UptimeKuma"
    }

    fn render(&self, snapshot: &MetricsSnapshot, verdict: &Verdict, latency: Duration) -> Report {
        Report {
            status: ReportStatus::from_verdict(verdict),
            message: summarize(snapshot, verdict),
            ping_seconds: latency.as_secs_f64(),
        }
    }

    fn deliver(&mut self, report: &Report) -> Result<DeliveryOutcome> {
        let url = self.push_url(report);
        log::debug!("Pushing status '{}' to {}", report.status.as_str(), self.base_url);

        let response = self.client.get(url).send()?;
        let status = response.status();

        if status != reqwest::StatusCode::OK {
            return Err(AgentError::delivery(format!(
                "push endpoint returned status {}: {}",
                status,
                response.text().unwrap_or_default()
            )));
        }

        log::info!(
            "Data sent successfully: {} ({})",
            report.status.as_str(),
            report.message
        );
        Ok(DeliveryOutcome::Delivered {
            http_status: status.as_u16(),
        })
    }
}
