//! VINTF 数据层：定位并解析设备清单、兼容性矩阵和 SELinux 版本文件。
//!
//! # VINTF Data Layer
//!
//! This module finds and reads the vendor interface (VINTF) objects a device
//! ships: HAL manifests, the vendor compatibility matrix and the SELinux
//! policy version files. Scanning is deliberately shallow: only the handful of
//! fields the detector needs are extracted and every unknown element is
//! skipped.
//!
//! ## Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`locator`] | On-disk search order for manifests and the vendor matrix |
//! | [`manifest`] | Streaming manifest scan (sepolicy version, passthrough HALs, target level) |
//! | [`matrix`] | Streaming matrix scan (vendor NDK version) |
//! | [`selinux`] | SELinux policy version lookup |
//! | [`builtin`] | Bundled framework compatibility matrices |
//! | [`error`] | VINTF-specific error types |

pub mod builtin;
pub mod error;
pub mod locator;
pub mod manifest;
pub mod matrix;
pub mod selinux;

pub use builtin::{BuiltinMatrix, BUILTIN_MATRICES, MAX_BUILTIN_LEVEL};
pub use error::VintfError;
pub use locator::{FileLocator, ManifestSet};
pub use manifest::ManifestFacts;
pub use matrix::MatrixFacts;

use quick_xml::events::BytesStart;
use std::path::Path;

pub(crate) fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

/// Read a VINTF document, honouring UTF-8 and UTF-16LE byte order marks.
///
/// Invalid sequences decode to U+FFFD; only I/O failures are errors.
pub(crate) fn read_document(path: &Path) -> Result<String, VintfError> {
    let bytes = std::fs::read(path).map_err(|e| {
        VintfError::read(path, e).with_hint("Check if the file exists and you have read permissions.")
    })?;

    if bytes.len() >= 2 && bytes[0] == 0xFF && bytes[1] == 0xFE {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Ok(String::from_utf16_lossy(&utf16))
    } else if bytes.len() >= 3 && bytes[0] == 0xEF && bytes[1] == 0xBB && bytes[2] == 0xBF {
        Ok(String::from_utf8_lossy(&bytes[3..]).into_owned())
    } else {
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// True when `path` exists and can be opened for reading.
pub(crate) fn is_readable(path: &Path) -> bool {
    std::fs::File::open(path).is_ok()
}
