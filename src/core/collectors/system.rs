use sysinfo::{CpuRefreshKind, Disks, MemoryRefreshKind, RefreshKind, System};

use crate::core::health::{FilesystemUsage, LoadAverage};

/// Pseudo and virtual filesystems that never fill up in a meaningful way
const EXCLUDED_FILESYSTEMS: &[&str] = &[
    "overlay", "tmpfs", "efivarfs", "devtmpfs", "none", "squashfs", "proc", "sysfs",
];

/// CPU, memory, load and filesystem usage for one cycle
#[derive(Debug, Clone, Default)]
pub struct SystemSample {
    pub cpu_load_percent: f64,
    pub num_cpu_cores: usize,
    pub memory_percent: f64,
    pub load_average: LoadAverage,
    pub disk_usage: Vec<FilesystemUsage>,
}

/// Reads OS metrics through sysinfo
pub struct SystemCollector {
    system: System,
    disks: Disks,
    primed: bool,
}

impl SystemCollector {
    pub fn new() -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::nothing().with_cpu_usage())
            .with_memory(MemoryRefreshKind::nothing().with_ram());

        Self {
            system: System::new_with_specifics(refresh_kind),
            disks: Disks::new_with_refreshed_list(),
            primed: false,
        }
    }

    pub fn collect(&mut self) -> SystemSample {
        // CPU usage is a delta between two refreshes
        if !self.primed {
            self.system.refresh_cpu_usage();
            std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
            self.primed = true;
        }
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();
        self.disks.refresh(true);

        let load = System::load_average();
        let cpu_load_percent = f64::from(self.system.global_cpu_usage());
        log::debug!("cpu_load_percent: {:.1}", cpu_load_percent);

        SystemSample {
            cpu_load_percent,
            num_cpu_cores: self.system.cpus().len(),
            memory_percent: memory_percent(
                self.system.total_memory(),
                self.system.available_memory(),
            ),
            load_average: LoadAverage {
                one: load.one,
                five: load.five,
                fifteen: load.fifteen,
            },
            disk_usage: self.collect_disks(),
        }
    }

    fn collect_disks(&self) -> Vec<FilesystemUsage> {
        self.disks
            .iter()
            .filter(|disk| {
                let fs_type = disk.file_system().to_string_lossy();
                disk.total_space() > 0 && !is_excluded_filesystem(&fs_type)
            })
            .map(|disk| {
                FilesystemUsage::new(
                    disk.mount_point().to_string_lossy(),
                    used_percent(disk.total_space(), disk.available_space()),
                )
            })
            .collect()
    }
}

impl Default for SystemCollector {
    fn default() -> Self {
        Self::new()
    }
}

pub fn is_excluded_filesystem(fs_type: &str) -> bool {
    EXCLUDED_FILESYSTEMS.contains(&fs_type)
}

/// Used memory as percent of total, where used = total - available
pub fn memory_percent(total: u64, available: u64) -> f64 {
    used_percent(total, available)
}

/// Used share of a capacity in percent, rounded to one decimal
pub fn used_percent(total: u64, available: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let used = total.saturating_sub(available);
    let percent = used as f64 / total as f64 * 100.0;
    (percent * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_used_percent() {
        assert_eq!(used_percent(1000, 250), 75.0);
        assert_eq!(used_percent(3, 2), 33.3);
        assert_eq!(used_percent(0, 0), 0.0);
        // Available larger than total never goes negative
        assert_eq!(used_percent(100, 200), 0.0);
    }

    #[test]
    fn test_memory_percent_uses_available() {
        assert_eq!(memory_percent(16_000, 4_000), 75.0);
    }

    #[test]
    fn test_excluded_filesystems() {
        assert!(is_excluded_filesystem("tmpfs"));
        assert!(is_excluded_filesystem("overlay"));
        assert!(!is_excluded_filesystem("ext4"));
        assert!(!is_excluded_filesystem("btrfs"));
    }
}
