//! Guest liveness from the local Proxmox VE API.

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use std::error::Error as _;
use std::time::Duration;
use sysinfo::System;

use super::find_tool;
use crate::core::health::{GuestState, ProxmoxSection};
use crate::error::Result;

/// The API is only queried on the node itself
const PROXMOX_HOST: &str = "127.0.0.1";
const PROXMOX_PORT: u16 = 8006;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    data: Vec<GuestState>,
}

#[derive(Debug)]
pub struct ProxmoxCollector {
    client: Client,
    base_url: String,
    auth_header: String,
    node_name: String,
}

impl ProxmoxCollector {
    /// `None` when this host is not a Proxmox node
    pub fn new(token_id: &str, token_secret: &str) -> Result<Option<Self>> {
        if find_tool("pveversion").is_none() {
            log::error!("pveversion not found, this is not a Proxmox Node.");
            return Ok(None);
        }

        // Localhost has no certificate matching 127.0.0.1
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .connect_timeout(REQUEST_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let node_name = System::host_name().unwrap_or_else(|| "localhost".to_string());
        log::info!("Enabled Proxmox reader for node {}", node_name);

        Ok(Some(Self {
            client,
            base_url: format!("https://{}:{}/api2/json", PROXMOX_HOST, PROXMOX_PORT),
            auth_header: format!("PVEAPIToken={}={}", token_id, token_secret),
            node_name,
        }))
    }

    /// Query VMs and LXC containers; failures land in the section's `error`
    pub fn collect(&self) -> ProxmoxSection {
        let guests = self
            .list_guests("qemu")
            .and_then(|vms| self.list_guests("lxc").map(|containers| (vms, containers)));

        match guests {
            Ok((vms, containers)) => ProxmoxSection {
                node: Some(self.node_name.clone()),
                vms,
                containers,
                error: None,
            },
            Err(message) => {
                log::error!("Proxmox query failed: {}", message);
                ProxmoxSection {
                    node: Some(self.node_name.clone()),
                    ..ProxmoxSection::failed(message)
                }
            }
        }
    }

    fn list_guests(&self, kind: &str) -> std::result::Result<Vec<GuestState>, String> {
        let url = format!("{}/nodes/{}/{}", self.base_url, self.node_name, kind);
        log::debug!("Getting {} details for node {}", kind, self.node_name);

        let response = self
            .client
            .get(&url)
            .header("Authorization", &self.auth_header)
            .send()
            .map_err(|e| describe_transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(describe_status(status, &url, body.trim()));
        }

        response
            .json::<ApiResponse>()
            .map(|r| r.data)
            .map_err(|e| format!("Invalid response from {}: {}", url, e))
    }
}

/// Human-readable message for a non-success API status
pub fn describe_status(status: StatusCode, url: &str, body: &str) -> String {
    let detail = if body.is_empty() {
        format!("{} for url {}", status, url)
    } else {
        format!("{} for url {}: {}", status, url, body)
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => format!("Unauthorized access: {}", detail),
        StatusCode::NOT_FOUND => format!("Resource not found: {}", detail),
        _ => {
            log::error!("Unexpected HTTP error: {}", detail);
            format!("HTTP error occurred: {}", detail)
        }
    }
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    // reqwest hides the io error text behind its own Display
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    describe_transport(&message, err.is_timeout())
}

/// Human-readable message for a failed connection to the API
pub fn describe_transport(message: &str, timed_out: bool) -> String {
    let lower = message.to_lowercase();
    if timed_out || lower.contains("timed out") {
        format!("Connection to host {} timed out!", PROXMOX_HOST)
    } else if lower.contains("connection refused") {
        format!("Connection refused to host {}!", PROXMOX_HOST)
    } else if lower.contains("name or service not known") || lower.contains("dns error") {
        format!("Unknown host: {}", PROXMOX_HOST)
    } else {
        log::error!("Unexpected error: {}", message);
        format!("An unexpected error occurred: {}", message)
    }
}
