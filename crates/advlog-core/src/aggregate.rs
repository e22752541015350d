//! Folding reports into per-device records.
//!
//! Reports are grouped by the value of a key field (the address by
//! default). For every field of an incoming report other than the key:
//!
//! - names in the ignore set are dropped;
//! - names in the merge set replace the device's existing field of that
//!   name, keeping its position;
//! - everything else is appended, so repeated observations accumulate.
//!
//! A name in both sets is ignored.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use advlog_types::{Device, Report};

use crate::error::{Error, Result};

/// Key field used when none is configured.
pub const DEFAULT_KEY_FIELD: &str = "Address";

/// Fields that change with every observation and are not kept.
pub const DEFAULT_IGNORE_FIELDS: &[&str] = &["Num reports", "RSSI", "Data length", "TX power"];

/// Fields where only the latest value is kept.
pub const DEFAULT_MERGE_FIELDS: &[&str] = &[
    "Flags",
    "Event type",
    "Address type",
    "Service Data (UUID 0xfe9f)",
    "16-bit Service UUIDs (complete)",
    "128-bit Service UUIDs (partial)",
    "Company",
    "Name (complete)",
    "Name (short)",
];

/// Grouping and merge policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateOptions {
    pub key_field: String,
    pub ignore_fields: HashSet<String>,
    pub merge_fields: HashSet<String>,
}

impl AggregateOptions {
    /// A policy with no ignored or merged fields.
    pub fn new(key_field: impl Into<String>) -> Self {
        Self {
            key_field: key_field.into(),
            ignore_fields: HashSet::new(),
            merge_fields: HashSet::new(),
        }
    }

    pub fn ignore<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_fields.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn merge<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.merge_fields.extend(names.into_iter().map(Into::into));
        self
    }

    /// Reject a policy that could never match a field.
    pub fn validate(&self) -> Result<()> {
        if self.key_field.trim().is_empty() {
            return Err(Error::Config("key field must not be empty".into()));
        }
        Ok(())
    }
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_FIELD)
            .ignore(DEFAULT_IGNORE_FIELDS.iter().copied())
            .merge(DEFAULT_MERGE_FIELDS.iter().copied())
    }
}

/// Counters collected while aggregating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateStats {
    /// Reports folded into a device.
    pub reports: u64,
    /// Distinct devices seen.
    pub devices: usize,
    /// Reports dropped because they had no key field.
    pub missing_key: u64,
}

/// Incremental device aggregation.
///
/// Devices come out in the order their first report arrived.
#[derive(Debug, Default)]
pub struct DeviceAggregator {
    options: AggregateOptions,
    devices: Vec<Device>,
    index: HashMap<String, usize>,
    stats: AggregateStats,
}

impl DeviceAggregator {
    pub fn new(options: AggregateOptions) -> Self {
        Self {
            options,
            devices: Vec::new(),
            index: HashMap::new(),
            stats: AggregateStats::default(),
        }
    }

    pub fn options(&self) -> &AggregateOptions {
        &self.options
    }

    /// Fold one report into its device.
    pub fn push(&mut self, report: Report) {
        let key_field = self.options.key_field.as_str();
        let Some(key_source) = report.field(key_field).cloned() else {
            warn!(
                timestamp = report.timestamp,
                key_field, "Dropping report without key field"
            );
            self.stats.missing_key += 1;
            return;
        };

        let index = match self.index.get(&key_source.value) {
            Some(&index) => index,
            None => {
                let index = self.devices.len();
                let mut device = Device::new(key_source.value.clone());
                device.fields.upsert(key_source.clone());
                debug!(key = %device.key, "New device");
                self.devices.push(device);
                self.index.insert(key_source.value, index);
                self.stats.devices += 1;
                index
            }
        };

        let device = &mut self.devices[index];
        device.observation_count += 1;
        device.encounter_timestamps.push(report.timestamp);
        self.stats.reports += 1;

        for field in report.fields {
            if field.name == key_field || self.options.ignore_fields.contains(&field.name) {
                continue;
            }
            if self.options.merge_fields.contains(&field.name) {
                device.fields.upsert(field);
            } else {
                device.fields.append(field);
            }
        }
    }

    pub fn extend<I: IntoIterator<Item = Report>>(&mut self, reports: I) {
        for report in reports {
            self.push(report);
        }
    }

    /// Devices aggregated so far.
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn stats(&self) -> AggregateStats {
        self.stats
    }

    /// Consume the aggregator and return the devices.
    pub fn finish(self) -> Vec<Device> {
        info!(
            reports = self.stats.reports,
            devices = self.stats.devices,
            dropped = self.stats.missing_key,
            "Aggregation complete"
        );
        self.devices
    }
}

/// Aggregate `reports` in one call.
///
/// ```
/// use advlog_core::aggregate;
/// use advlog_types::{Field, Report};
///
/// let reports = [1, 2].map(|flags| {
///     let mut r = Report::new(flags);
///     r.insert(Field::new("Address", "A"));
///     r.insert(Field::new("Flags", flags.to_string()));
///     r
/// });
/// let devices = aggregate(reports, "Address", &[], &["Flags"]);
/// assert_eq!(devices.len(), 1);
/// assert_eq!(devices[0].observation_count, 2);
/// assert_eq!(devices[0].fields.get("Flags").unwrap().value, "2");
/// ```
pub fn aggregate(
    reports: impl IntoIterator<Item = Report>,
    key_field: &str,
    ignore_fields: &[&str],
    merge_fields: &[&str],
) -> Vec<Device> {
    let options = AggregateOptions::new(key_field)
        .ignore(ignore_fields.iter().copied())
        .merge(merge_fields.iter().copied());
    let mut aggregator = DeviceAggregator::new(options);
    aggregator.extend(reports);
    aggregator.finish()
}
