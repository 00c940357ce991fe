//! libloading binding of the native libvintf wrapper.
//!
//! # Safety
//!
//! The library is trusted to export `check_compatibility_matrix` with the C
//! signature below; all four arguments are NUL-terminated strings that stay
//! alive for the duration of the call.

use std::ffi::{CString, OsStr};
use std::os::raw::{c_char, c_int};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use libloading::Library;
use tracing::{debug, warn};

use super::{CheckOutcome, CompatibilityCheck, EngineError};

/// Exported entry point of the native engine.
pub const CHECK_SYMBOL: &[u8] = b"check_compatibility_matrix\0";

/// Library name used when no explicit path is configured.
pub const DEFAULT_LIBRARY: &str = "libtrebledetector.so";

type CheckFn = unsafe extern "C" fn(
    matrix: *const c_char,
    root: *const c_char,
    vendor_sku: *const c_char,
    hardware_sku: *const c_char,
) -> c_int;

/// The native engine, bound lazily on first use.
///
/// The handle is guarded by a mutex so concurrent first calls bind once. A
/// failed bind is retried on the next call.
pub struct NativeEngine {
    library: PathBuf,
    handle: Mutex<Option<Bound>>,
}

/// A loaded library and its resolved entry point.
#[derive(Clone)]
struct Bound {
    /// Keeps `check` loaded.
    _library: Arc<Library>,
    check: CheckFn,
}

impl NativeEngine {
    pub fn new(library: impl AsRef<OsStr>) -> Self {
        Self {
            library: PathBuf::from(library.as_ref()),
            handle: Mutex::new(None),
        }
    }

    pub fn library(&self) -> &Path {
        &self.library
    }

    pub fn is_bound(&self) -> bool {
        self.handle.lock().map(|h| h.is_some()).unwrap_or(false)
    }

    /// `Ok(None)` when the library or its entry point cannot be found.
    fn bind(&self) -> Result<Option<Bound>, EngineError> {
        let mut handle = self.handle.lock().map_err(|_| EngineError::Poisoned)?;
        if let Some(bound) = handle.as_ref() {
            return Ok(Some(bound.clone()));
        }

        // SAFETY: loading runs the library's initializers; the engine library
        // is a plain libvintf wrapper without global side effects.
        let library = match unsafe { Library::new(&self.library) } {
            Ok(library) => library,
            Err(e) => {
                warn!(library = %self.library.display(), error = %e, "Native library unavailable");
                return Ok(None);
            }
        };
        // SAFETY: the symbol is declared with the engine's C signature, and the
        // copied pointer is only called while `Bound` keeps the library loaded.
        let check = match unsafe { library.get::<CheckFn>(CHECK_SYMBOL) } {
            Ok(symbol) => *symbol,
            Err(e) => {
                warn!(library = %self.library.display(), error = %e, "Native library lacks entry point");
                return Ok(None);
            }
        };

        debug!(library = %self.library.display(), "bound native engine");
        let bound = Bound {
            _library: Arc::new(library),
            check,
        };
        *handle = Some(bound.clone());
        Ok(Some(bound))
    }
}

impl Default for NativeEngine {
    fn default() -> Self {
        Self::new(DEFAULT_LIBRARY)
    }
}

impl std::fmt::Debug for NativeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeEngine")
            .field("library", &self.library)
            .field("bound", &self.is_bound())
            .finish()
    }
}

fn c_string(what: &str, value: &str) -> Result<CString, EngineError> {
    CString::new(value)
        .map_err(|_| EngineError::InvalidArgument(format!("{} contains a NUL byte", what)))
}

impl CompatibilityCheck for NativeEngine {
    fn check(
        &self,
        matrix_xml: &str,
        device_root: &Path,
        vendor_sku: &str,
        hardware_sku: &str,
    ) -> Result<CheckOutcome, EngineError> {
        let Some(bound) = self.bind()? else {
            return Ok(CheckOutcome::EngineUnavailable);
        };

        let matrix = c_string("matrix", matrix_xml)?;
        let root = c_string("device root", &device_root.to_string_lossy())?;
        let vendor_sku = c_string("vendor SKU", vendor_sku)?;
        let hardware_sku = c_string("hardware SKU", hardware_sku)?;

        // SAFETY: the entry point was resolved during bind and `bound` keeps
        // the library loaded for the duration of the call.
        let status = unsafe {
            (bound.check)(
                matrix.as_ptr(),
                root.as_ptr(),
                vendor_sku.as_ptr(),
                hardware_sku.as_ptr(),
            )
        };
        debug!(status, "check_compatibility_matrix returned");
        CheckOutcome::from_status(status)
    }
}
