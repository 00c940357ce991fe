//! Framework compatibility matrices bundled with the crate.
//!
//! The templates carry no `<sepolicy>` element; the device's sepolicy version
//! is spliced in as text right before the last `</compatibility-matrix>` so
//! the bytes handed to the native engine are otherwise exactly the bundled
//! files.

use super::VintfError;
use crate::version::Version;

const CLOSING_TAG: &str = "</compatibility-matrix>";

/// Highest framework compatibility level known to this build.
pub const MAX_BUILTIN_LEVEL: u32 = 7;

/// A bundled framework compatibility matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinMatrix {
    pub name: &'static str,
    /// FCM level; `legacy` is level 0.
    pub level: u32,
    pub content: &'static str,
}

/// All bundled matrices, in the order they are tried.
pub static BUILTIN_MATRICES: [BuiltinMatrix; 8] = [
    BuiltinMatrix {
        name: "compatibility_matrix.legacy.xml",
        level: 0,
        content: include_str!("../../matrices/compatibility_matrix.legacy.xml"),
    },
    BuiltinMatrix {
        name: "compatibility_matrix.1.xml",
        level: 1,
        content: include_str!("../../matrices/compatibility_matrix.1.xml"),
    },
    BuiltinMatrix {
        name: "compatibility_matrix.2.xml",
        level: 2,
        content: include_str!("../../matrices/compatibility_matrix.2.xml"),
    },
    BuiltinMatrix {
        name: "compatibility_matrix.3.xml",
        level: 3,
        content: include_str!("../../matrices/compatibility_matrix.3.xml"),
    },
    BuiltinMatrix {
        name: "compatibility_matrix.4.xml",
        level: 4,
        content: include_str!("../../matrices/compatibility_matrix.4.xml"),
    },
    BuiltinMatrix {
        name: "compatibility_matrix.5.xml",
        level: 5,
        content: include_str!("../../matrices/compatibility_matrix.5.xml"),
    },
    BuiltinMatrix {
        name: "compatibility_matrix.6.xml",
        level: 6,
        content: include_str!("../../matrices/compatibility_matrix.6.xml"),
    },
    BuiltinMatrix {
        name: "compatibility_matrix.7.xml",
        level: MAX_BUILTIN_LEVEL,
        content: include_str!("../../matrices/compatibility_matrix.7.xml"),
    },
];

impl BuiltinMatrix {
    /// The matrix text with a `<sepolicy>` block for `version` spliced in.
    pub fn with_sepolicy(&self, version: Version) -> Result<String, VintfError> {
        inject_sepolicy(self.content, version).ok_or_else(|| VintfError::MissingClosingTag {
            name: self.name.to_string(),
        })
    }
}

/// Insert a sepolicy block immediately before the last closing
/// `</compatibility-matrix>` tag. Returns `None` when the tag is missing.
pub fn inject_sepolicy(matrix: &str, version: Version) -> Option<String> {
    let index = matrix.rfind(CLOSING_TAG)?;
    let block = format!(
        "<sepolicy><kernel-sepolicy-version>0</kernel-sepolicy-version><sepolicy-version>{}.{}</sepolicy-version></sepolicy>",
        version.major, version.minor
    );

    let mut out = String::with_capacity(matrix.len() + block.len());
    out.push_str(&matrix[..index]);
    out.push_str(&block);
    out.push_str(&matrix[index..]);
    Some(out)
}
