//! Missing storage device detection.
//!
//! Device nodes of one bus family are expected to be numbered without gaps
//! (`/dev/sata1`, `/dev/sata2`, ...). A hole in the sequence means a disk
//! dropped off the bus, which is worse than a disk that merely reports a
//! degraded S.M.A.R.T. status.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

use super::snapshot::MissingDevices;

static NVME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:/dev/)?nvme(\d+)").expect("valid nvme pattern"));
static SATA_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:/dev/)?sata(\d+)").expect("valid sata pattern"));
static SD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:/dev/)?sd([a-z])\d*$").expect("valid sd pattern"));
static SG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:/dev/)?sg(\d+)").expect("valid sg pattern"));

const NVME_START: u32 = 0;
const SATA_START: u32 = 1;
const SG_START: u32 = 0;

/// Find gaps in the index sequence of every device family.
///
/// Returns `None` when every family that has devices is contiguous. A family
/// with no devices at all is never reported.
pub fn find_missing_devices<'a, I>(device_paths: I) -> Option<MissingDevices>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut nvme = BTreeSet::new();
    let mut sata = BTreeSet::new();
    let mut sd = BTreeSet::new();
    let mut sg = BTreeSet::new();

    for path in device_paths {
        if let Some(index) = numeric_index(&NVME_PATTERN, path) {
            nvme.insert(index);
        } else if let Some(index) = numeric_index(&SATA_PATTERN, path) {
            sata.insert(index);
        } else if let Some(letter) = letter_index(path) {
            sd.insert(letter);
        } else if let Some(index) = numeric_index(&SG_PATTERN, path) {
            sg.insert(index);
        } else {
            log::debug!("Ignoring device {} for gap detection", path);
        }
    }

    let missing = MissingDevices {
        nvme: missing_numeric_indices(&nvme, NVME_START),
        sata: missing_numeric_indices(&sata, SATA_START),
        sd: missing_alpha_indices(&sd),
        sg: missing_numeric_indices(&sg, SG_START),
    };

    if missing.is_empty() {
        None
    } else {
        Some(missing)
    }
}

fn numeric_index(pattern: &Regex, path: &str) -> Option<u32> {
    pattern
        .captures(path)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn letter_index(path: &str) -> Option<char> {
    SD_PATTERN
        .captures(path)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().chars().next())
}

/// Expected range runs from `start` through the highest index seen, or
/// through `start + count - 1` if that is larger.
pub fn missing_numeric_indices(present: &BTreeSet<u32>, start: u32) -> Vec<u32> {
    let Some(&highest) = present.iter().next_back() else {
        return Vec::new();
    };
    let by_count = start.saturating_add(present.len() as u32).saturating_sub(1);
    let upper = highest.max(by_count);

    (start..=upper).filter(|i| !present.contains(i)).collect()
}

pub fn missing_alpha_indices(present: &BTreeSet<char>) -> Vec<char> {
    let numeric: BTreeSet<u32> = present
        .iter()
        .filter(|c| c.is_ascii_lowercase())
        .map(|&c| c as u32 - 'a' as u32)
        .collect();

    missing_numeric_indices(&numeric, 0)
        .into_iter()
        .filter_map(|i| char::from_u32('a' as u32 + i))
        .collect()
}
