use serde::Serialize;

use crate::version::Version;

/// Classification of a Treble device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TrebleResult {
    /// Only the pre-Treble `vendor/manifest.xml` was found.
    pub legacy: bool,
    /// The device runs VNDK-lite.
    pub lite: bool,
    /// Passthrough HALs keep the device from full compliance, but none that
    /// must be binderized for an upgrade.
    pub upgrade_compliant: bool,
    pub vndk_version: u32,
    pub vndk_sub_version: u32,
}

impl TrebleResult {
    pub fn version(&self) -> Version {
        Version::new(self.vndk_version, self.vndk_sub_version)
    }
}

impl std::fmt::Display for TrebleResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Treble, VNDK {}", self.version())?;
        if self.lite {
            write!(f, " (lite)")?;
        }
        if self.legacy {
            write!(f, ", legacy manifest")?;
        }
        if self.upgrade_compliant {
            write!(f, ", upgrade compliant")?;
        }
        Ok(())
    }
}

/// How well the declared passthrough HALs fit Treble's binderization rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassthroughResult {
    FullyCompliant,
    UpgradeCompliant,
    NotCompliant,
}
