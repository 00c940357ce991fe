//! Passthrough HAL compliance.
//!
//! Treble requires every `android.*` HAL to be binderized except a short
//! allow-list. Devices upgraded from Android 7 may keep further passthrough
//! HALs, as long as none of them is on the list that had to be binderized
//! even then. Vendor (non-`android.`) HALs never count.

use std::collections::BTreeSet;

use super::result::PassthroughResult;

/// HALs that may stay passthrough on a fully compliant device.
pub const ALLOWED_PASSTHROUGHS: &[&str] = &[
    "android.hardware.graphics.mapper",
    "android.hardware.renderscript",
];

/// HALs that must be binderized even on upgrading devices.
pub const LEGACY_REQUIRED_BINDERIZED: &[&str] = &[
    "android.hardware.biometrics.fingerprint",
    "android.hardware.configstore",
    "android.hardware.dumpstate",
    "android.hardware.graphics.allocator",
    "android.hardware.radio",
    "android.hardware.usb",
    "android.hardware.wifi",
    "android.hardware.wifi.supplicant",
];

fn is_platform_hal(name: &str) -> bool {
    name.starts_with("android.")
}

pub fn classify_passthroughs(passthroughs: &BTreeSet<String>) -> PassthroughResult {
    let disallowed = passthroughs
        .iter()
        .filter(|name| !ALLOWED_PASSTHROUGHS.contains(&name.as_str()))
        .any(|name| is_platform_hal(name));
    if !disallowed {
        return PassthroughResult::FullyCompliant;
    }

    let required = passthroughs
        .iter()
        .filter(|name| LEGACY_REQUIRED_BINDERIZED.contains(&name.as_str()))
        .any(|name| is_platform_hal(name));
    if !required {
        return PassthroughResult::UpgradeCompliant;
    }

    PassthroughResult::NotCompliant
}
