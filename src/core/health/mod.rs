//! Health evaluation and notification debounce.
//!
//! Per cycle: the device gaps are merged into the snapshot, the snapshot is
//! evaluated into a [`Verdict`], and the [`NotificationScheduler`] decides
//! whether that verdict gets sent.

pub mod devices;
pub mod evaluator;
pub mod scheduler;
pub mod snapshot;

pub use devices::find_missing_devices;
pub use evaluator::{evaluate, most_filled_filesystem, Check, ThresholdConfig, Verdict};
pub use scheduler::{AlertState, Decision, NotificationScheduler, NotificationState, SendReason};
pub use snapshot::{
    ContainerState, FilesystemUsage, GuestState, HealthStatus, HostInfo, LoadAverage,
    MetricsSnapshot, MissingDevices, ProxmoxSection, SmartRecord, SmartSection,
};

/// Attach missing-device information derived from the S.M.A.R.T. device list.
///
/// Leaves the snapshot untouched when S.M.A.R.T. collection is disabled.
pub fn enrich_with_missing_devices(mut snapshot: MetricsSnapshot) -> MetricsSnapshot {
    if let Some(ref smart) = snapshot.smart {
        snapshot.missing_disks = find_missing_devices(smart.devices.keys().map(String::as_str));
    }
    snapshot
}

/// Format a percentage with at most one decimal, dropping a trailing `.0`.
pub fn format_percent(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{:.0}", rounded)
    } else {
        format!("{:.1}", rounded)
    }
}
