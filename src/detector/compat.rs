//! Device manifest check against the bundled framework matrices.

use std::path::Path;

use tracing::{debug, warn};

use crate::engine::{CheckOutcome, CompatibilityCheck};
use crate::version::Version;
use crate::vintf::{VintfError, BUILTIN_MATRICES, MAX_BUILTIN_LEVEL};
use crate::Result;

/// Verdict of the framework matrix tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixVerdict {
    /// Some bundled matrix accepts the device.
    Compatible,
    /// No bundled matrix accepts the device.
    Incompatible,
    /// The check could not be performed, or the device is newer than us.
    Indeterminate,
}

pub struct MatrixCheck<'a> {
    pub engine: &'a dyn CompatibilityCheck,
    pub root: &'a Path,
    pub vendor_sku: &'a str,
    pub hardware_sku: &'a str,
    pub target_level: Option<i64>,
}

impl MatrixCheck<'_> {
    /// A device targeting a newer level than we bundle may legitimately fail
    /// every matrix we know.
    fn newer_than_bundled(&self) -> bool {
        self.target_level
            .is_some_and(|level| level > i64::from(MAX_BUILTIN_LEVEL))
    }

    fn failed(&self) -> MatrixVerdict {
        if self.newer_than_bundled() {
            MatrixVerdict::Indeterminate
        } else {
            MatrixVerdict::Incompatible
        }
    }

    pub fn run(&self, sepolicy: Version) -> Result<MatrixVerdict> {
        for matrix in BUILTIN_MATRICES.iter() {
            let xml = match matrix.with_sepolicy(sepolicy) {
                Ok(xml) => xml,
                Err(e @ VintfError::MissingClosingTag { .. }) => {
                    warn!(matrix = matrix.name, error = %e, "Bundled matrix is unusable");
                    return Ok(MatrixVerdict::Indeterminate);
                }
                Err(e) => return Err(e.into()),
            };

            let outcome = self
                .engine
                .check(&xml, self.root, self.vendor_sku, self.hardware_sku)?;
            debug!(matrix = matrix.name, ?outcome, "framework matrix check");

            match outcome {
                CheckOutcome::Mismatch => continue,
                CheckOutcome::Match => return Ok(MatrixVerdict::Compatible),
                CheckOutcome::EngineUnavailable => {
                    warn!("Native library unavailable, skipping framework matrix check");
                    return Ok(MatrixVerdict::Indeterminate);
                }
                CheckOutcome::BuiltinMatrixInvalid => return Ok(MatrixVerdict::Indeterminate),
                CheckOutcome::DeviceManifestInvalid => return Ok(self.failed()),
            }
        }
        Ok(self.failed())
    }
}
