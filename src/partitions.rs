//! Partition layout: system-as-root and dynamic partitions.
//!
//! Both are answered from properties when possible. System-as-root falls back
//! to the mount table, read from `/proc/mounts`.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::ErrorContext;
use crate::props::{parse_bool, PropertyStore, PROP_DYNAMIC_PARTITIONS, PROP_SYSTEM_ROOT_IMAGE};
use crate::{Error, Result};

pub const MOUNTS_PATH: &str = "/proc/mounts";

/// One line of `/proc/mounts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MountEntry {
    pub device: String,
    pub mountpoint: String,
    pub fs_type: String,
    pub options: Vec<String>,
    pub dump: i32,
    pub pass: i32,
}

impl MountEntry {
    fn parse(line: &str, line_no: usize) -> Result<Self> {
        let malformed = |details: String| {
            Error::malformed_with_context(
                "Incorrect /proc/mounts format",
                ErrorContext::new()
                    .with_field_path(format!("line {}", line_no))
                    .with_details(details),
            )
        };

        let fields: Vec<&str> = line.split(' ').collect();
        let [device, mountpoint, fs_type, options, dump, pass] = fields[..] else {
            return Err(malformed(format!("expected 6 fields, got {}", fields.len())));
        };
        let dump = dump
            .parse()
            .map_err(|_| malformed(format!("invalid dump field {:?}", dump)))?;
        let pass = pass
            .parse()
            .map_err(|_| malformed(format!("invalid pass field {:?}", pass)))?;

        Ok(Self {
            device: device.to_string(),
            mountpoint: mountpoint.to_string(),
            fs_type: fs_type.to_string(),
            options: options.split(',').map(str::to_string).collect(),
            dump,
            pass,
        })
    }
}

/// Parse a mount table. Blank lines and lines starting with a space are skipped.
pub fn parse_mounts(text: &str) -> Result<Vec<MountEntry>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty() && !line.starts_with(' '))
        .map(|(i, line)| MountEntry::parse(line, i + 1))
        .collect()
}

/// Read and parse a mount table from disk.
pub fn read_mounts(path: impl AsRef<Path>) -> Result<Vec<MountEntry>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| {
        let message = if e.kind() == std::io::ErrorKind::NotFound {
            "The host is not running Linux or procfs is broken"
        } else {
            "Failed to open and read the mount table"
        };
        Error::malformed_with_context(
            message,
            ErrorContext::new()
                .with_source(path.display().to_string())
                .with_details(e.to_string()),
        )
    })?;
    parse_mounts(&text)
}

fn property_true(props: &dyn PropertyStore, name: &str) -> bool {
    props
        .get(name)
        .and_then(|value| parse_bool(&value))
        .unwrap_or(false)
}

/// Whether the system partition is mounted as the root filesystem.
///
/// `mounts` is only called when the properties are not conclusive.
pub fn is_system_as_root<F>(props: &dyn PropertyStore, mounts: F) -> Result<bool>
where
    F: FnOnce() -> Result<Vec<MountEntry>>,
{
    if property_true(props, PROP_DYNAMIC_PARTITIONS) || property_true(props, PROP_SYSTEM_ROOT_IMAGE)
    {
        debug!("system-as-root from properties");
        return Ok(true);
    }

    let mut has_system_partition = false;
    for mount in mounts()? {
        let root_mounted = mount.device == "/dev/root" && mount.mountpoint == "/";
        let system_root = mount.mountpoint == "/system_root" && mount.fs_type != "tmpfs";
        if root_mounted || system_root {
            trace!(?mount, "system-as-root mount");
            return Ok(true);
        }
        has_system_partition |=
            mount.mountpoint == "/system" && mount.fs_type != "tmpfs" && mount.device != "none";
    }
    debug!(has_system_partition, "system-as-root from mounts");
    Ok(!has_system_partition)
}

/// Whether the device uses dynamic partitions. `None` when not reported.
pub fn is_dynamic(props: &dyn PropertyStore) -> Option<bool> {
    let value = props.get(PROP_DYNAMIC_PARTITIONS)?;
    Some(parse_bool(&value).unwrap_or(false))
}
