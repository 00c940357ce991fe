//! 兼容性引擎接口：将设备清单与框架兼容性矩阵进行比对的外部原生引擎。
//!
//! # Compatibility Engine
//!
//! The check of a full device manifest against a framework compatibility
//! matrix is delegated to libvintf, compiled into a native library. This
//! module defines the seam ([`CompatibilityCheck`]) and the outcomes the
//! detector understands; [`NativeEngine`] is the libloading-backed
//! implementation used on devices.

mod native;

pub use native::{NativeEngine, CHECK_SYMBOL, DEFAULT_LIBRARY};

use std::path::Path;

/// Result of checking the device against one framework matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckOutcome {
    /// The device manifest does not satisfy the matrix.
    Mismatch,
    /// The device manifest satisfies the matrix.
    Match,
    /// The engine could not be bound in this process.
    EngineUnavailable,
    /// The engine rejected the bundled matrix.
    BuiltinMatrixInvalid,
    /// The engine could not assemble the device manifest.
    DeviceManifestInvalid,
}

impl CheckOutcome {
    /// Map the native status code. Unknown codes are a contract violation.
    pub fn from_status(status: i32) -> Result<Self, EngineError> {
        match status {
            0 => Ok(CheckOutcome::Mismatch),
            1 => Ok(CheckOutcome::Match),
            -1 => Ok(CheckOutcome::BuiltinMatrixInvalid),
            -2 => Ok(CheckOutcome::DeviceManifestInvalid),
            other => Err(EngineError::UnexpectedStatus(other)),
        }
    }
}

/// Contract violations by the engine or its caller.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Unknown return value from check_compatibility_matrix: {0}")]
    UnexpectedStatus(i32),

    #[error("Invalid argument for the native engine: {0}")]
    InvalidArgument(String),

    #[error("Engine handle lock poisoned")]
    Poisoned,
}

/// Validates the device found under `device_root` against a framework matrix.
pub trait CompatibilityCheck: Send + Sync {
    fn check(
        &self,
        matrix_xml: &str,
        device_root: &Path,
        vendor_sku: &str,
        hardware_sku: &str,
    ) -> Result<CheckOutcome, EngineError>;
}

impl<T: CompatibilityCheck + ?Sized> CompatibilityCheck for std::sync::Arc<T> {
    fn check(
        &self,
        matrix_xml: &str,
        device_root: &Path,
        vendor_sku: &str,
        hardware_sku: &str,
    ) -> Result<CheckOutcome, EngineError> {
        (**self).check(matrix_xml, device_root, vendor_sku, hardware_sku)
    }
}
