//! SELinux policy version lookup.
//!
//! `plat_sepolicy_vers.txt` names the platform policy version the vendor
//! policy was built against. Older vendors only carry versioned type
//! attributes such as `init_27_0` inside their `.cil` files.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{trace, warn};

use super::{is_readable, FileLocator, VintfError};
use crate::version::Version;

static VERSIONED_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:init|sepolicy)_([0-9]+)_([0-9]+)\b").expect("valid regex")
});

impl FileLocator {
    /// Vendor SELinux policy version, if one can be found.
    pub fn selinux_version(&self) -> Result<Option<Version>, VintfError> {
        let selinux_dir = self.root().join("vendor/etc/selinux");

        let vers_file = selinux_dir.join("plat_sepolicy_vers.txt");
        if vers_file.exists() {
            return read_vers_file(&vers_file);
        }

        let Ok(entries) = std::fs::read_dir(&selinux_dir) else {
            return Ok(None);
        };
        let mut cil_files: Vec<_> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "cil"))
            .filter(|p| is_readable(p))
            .collect();
        cil_files.sort();

        let mut best: Option<Version> = None;
        for path in &cil_files {
            if let Some(found) = scan_cil(path)? {
                best = best.max(Some(found));
            }
        }
        trace!(files = cil_files.len(), best = ?best, "scanned cil files");
        Ok(best.filter(|v| *v > Version::new(0, 0)))
    }
}

fn read_vers_file(path: &Path) -> Result<Option<Version>, VintfError> {
    let file = File::open(path).map_err(|e| VintfError::read(path, e))?;
    let mut first_line = Vec::new();
    BufReader::new(file)
        .read_until(b'\n', &mut first_line)
        .map_err(|e| VintfError::read(path, e))?;
    let first_line = String::from_utf8_lossy(&first_line);
    let version = Version::parse(&first_line);
    if version.is_none() {
        warn!(path = %path.display(), line = %first_line.trim(), "unparseable sepolicy version file");
    }
    Ok(version)
}

/// Highest versioned attribute mentioned in one policy file.
fn scan_cil(path: &Path) -> Result<Option<Version>, VintfError> {
    let file = File::open(path).map_err(|e| VintfError::read(path, e))?;
    let mut best = None;
    for line in BufReader::new(file).split(b'\n') {
        let line = line.map_err(|e| VintfError::read(path, e))?;
        let line = String::from_utf8_lossy(&line);
        for caps in VERSIONED_ATTRIBUTE.captures_iter(&line) {
            // Numbers too large for u32 cannot be real policy versions.
            let (Ok(major), Ok(minor)) = (caps[1].parse::<u32>(), caps[2].parse::<u32>()) else {
                continue;
            };
            best = best.max(Some(Version::new(major, minor)));
        }
    }
    Ok(best)
}
