//! System property access.
//!
//! The detector never talks to the property service directly; it goes through
//! [`PropertyStore`] so callers can feed it a live device, a `build.prop`
//! dump or a fixed map in tests.

use std::collections::BTreeMap;
use std::process::Command;

use tracing::{debug, warn};

pub const PROP_VNDK_VERSION: &str = "ro.vndk.version";
pub const PROP_VNDK_LITE: &str = "ro.vndk.lite";
pub const PROP_TREBLE_ENABLED: &str = "ro.treble.enabled";
pub const PROP_VENDOR_SKU: &str = "ro.boot.product.vendor.sku";
pub const PROP_HARDWARE_SKU: &str = "ro.boot.product.hardware.sku";
pub const PROP_DYNAMIC_PARTITIONS: &str = "ro.boot.dynamic_partitions";
pub const PROP_SYSTEM_ROOT_IMAGE: &str = "ro.build.system_root_image";

/// Read-only view of system properties.
pub trait PropertyStore: Send + Sync {
    /// Value of `name`, or `None` when the property is not set.
    fn get(&self, name: &str) -> Option<String>;
}

/// Parse a boolean the way Android's `ParseBool` does.
///
/// Returns `None` for values that are neither truthy nor falsy, including `""`.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "y" | "yes" | "on" | "true" => Some(true),
        "0" | "n" | "no" | "off" | "false" => Some(false),
        _ => None,
    }
}

/// A fixed snapshot of properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticProperties {
    values: BTreeMap<String, String>,
}

impl StaticProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parse `build.prop` style text (`key=value`, `#` comments).
    pub fn from_build_prop(text: &str) -> Self {
        let values = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .filter_map(|l| l.split_once('='))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();
        Self { values }
    }

    /// Parse the listing printed by `getprop` (`[key]: [value]`).
    pub fn from_getprop_output(text: &str) -> Self {
        let values = text
            .lines()
            .filter_map(|line| {
                let (key, value) = line.trim().split_once("]: [")?;
                let key = key.strip_prefix('[')?;
                let value = value.strip_suffix(']')?;
                Some((key.to_string(), value.to_string()))
            })
            .collect();
        Self { values }
    }

    /// Snapshot the live property service by running `getprop`.
    ///
    /// Returns an empty snapshot when the tool is unavailable (e.g. off-device).
    pub fn from_getprop() -> Self {
        match Command::new("getprop").output() {
            Ok(output) if output.status.success() => {
                let props = Self::from_getprop_output(&String::from_utf8_lossy(&output.stdout));
                debug!(count = props.len(), "loaded properties from getprop");
                props
            }
            Ok(output) => {
                warn!(status = %output.status, "getprop failed");
                Self::default()
            }
            Err(e) => {
                warn!(error = %e, "getprop unavailable");
                Self::default()
            }
        }
    }
}

impl PropertyStore for StaticProperties {
    fn get(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

impl<K, V> FromIterator<(K, V)> for StaticProperties
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
