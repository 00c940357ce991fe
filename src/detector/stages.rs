//! VNDK version resolution.
//!
//! Once Treble support has been weighed, the version is taken from the first
//! source that can answer. Each stage either settles the question or passes
//! it on.

use tracing::{debug, warn};

use crate::error::ErrorContext;
use crate::version::Version;
use crate::vintf::{FileLocator, MatrixFacts};
use crate::{Error, Result};

/// What a stage concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Confirmed(Version),
    /// The device is conclusively not Treble.
    Denied,
    Inconclusive,
}

/// Facts gathered before version resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct Evidence {
    pub supports_treble: bool,
    pub vndk_property: Option<Version>,
    pub manifest_version: Option<Version>,
}

type Stage = fn(&FileLocator, &Evidence) -> Result<Resolution>;

/// Stages in priority order.
const STAGES: &[(&str, Stage)] = &[
    ("vndk property", vndk_property),
    ("manifest sepolicy", manifest_sepolicy),
    ("vendor matrix", vendor_matrix),
    ("selinux", selinux),
];

/// Run every stage until one settles. `Ok(None)` means denied.
pub fn resolve(locator: &FileLocator, evidence: &Evidence) -> Result<Option<Version>> {
    for (name, stage) in STAGES {
        let resolution = stage(locator, evidence)?;
        debug!(stage = name, ?resolution, "version stage");
        match resolution {
            Resolution::Confirmed(version) => return Ok(Some(version)),
            Resolution::Denied => return Ok(None),
            Resolution::Inconclusive => continue,
        }
    }
    Err(Error::inconsistent_with_context(
        "No method to detect version",
        ErrorContext::new().with_details(format!("supports_treble={}", evidence.supports_treble)),
    ))
}

fn vndk_property(_: &FileLocator, evidence: &Evidence) -> Result<Resolution> {
    Ok(evidence
        .vndk_property
        .map_or(Resolution::Inconclusive, Resolution::Confirmed))
}

fn manifest_sepolicy(_: &FileLocator, evidence: &Evidence) -> Result<Resolution> {
    let Some(version) = evidence.manifest_version else {
        return Ok(Resolution::Inconclusive);
    };
    if evidence.supports_treble {
        return Ok(Resolution::Confirmed(version));
    }
    // Without confirmation only a VNDK <= 27 vendor paired with a non-GSI
    // system can still be Treble.
    if version >= Version::new(28, 0) {
        return Ok(Resolution::Denied);
    }
    warn!(%version, "Manifest contains sepolicy version but support unconfirmed");
    Ok(Resolution::Inconclusive)
}

fn vendor_matrix(locator: &FileLocator, evidence: &Evidence) -> Result<Resolution> {
    let Some(path) = locator.locate_vendor_matrix() else {
        return Ok(Resolution::Inconclusive);
    };
    let Some(version) = MatrixFacts::from_file(&path)?.vendor_ndk_version else {
        return Ok(Resolution::Inconclusive);
    };
    debug!(path = %path.display(), %version, "vendor matrix");
    if evidence.supports_treble {
        return Ok(Resolution::Confirmed(version));
    }

    warn!(%version, "Unexpectedly found vendor NDK version without Treble confirmation");
    match evidence.manifest_version {
        Some(manifest) if manifest == version => Ok(Resolution::Confirmed(version)),
        Some(manifest) => Err(Error::inconsistent_with_context(
            format!(
                "Found differing versions in manifest ({}) and matrix ({})",
                manifest, version
            ),
            ErrorContext::new().with_source(path.display().to_string()),
        )),
        None => Ok(Resolution::Inconclusive),
    }
}

fn selinux(locator: &FileLocator, evidence: &Evidence) -> Result<Resolution> {
    if !evidence.supports_treble {
        return Ok(Resolution::Inconclusive);
    }
    Ok(locator
        .selinux_version()?
        .map_or(Resolution::Inconclusive, Resolution::Confirmed))
}
