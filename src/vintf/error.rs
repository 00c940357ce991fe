//! VINTF data error types

use std::path::Path;

/// Failures while reading or scanning VINTF files.
#[derive(Debug, thiserror::Error)]
pub enum VintfError {
    #[error("Failed to read {path}: {reason}{}", .hint.as_ref().map(|h| format!("\n Hint: {}", h)).unwrap_or_default())]
    Read {
        path: String,
        reason: String,
        hint: Option<String>,
    },

    #[error("Malformed XML in {path}: {reason}{}", .hint.as_ref().map(|h| format!("\n Hint: {}", h)).unwrap_or_default())]
    Xml {
        path: String,
        reason: String,
        hint: Option<String>,
    },

    #[error("Built-in matrix {name} has no closing </compatibility-matrix> tag")]
    MissingClosingTag { name: String },
}

impl VintfError {
    pub(crate) fn read(path: &Path, err: impl std::fmt::Display) -> Self {
        VintfError::Read {
            path: path.display().to_string(),
            reason: err.to_string(),
            hint: None,
        }
    }

    pub(crate) fn xml(path: &Path, err: impl std::fmt::Display) -> Self {
        VintfError::Xml {
            path: path.display().to_string(),
            reason: err.to_string(),
            hint: None,
        }
    }

    /// Attach an actionable hint to the error
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        let hint_val = Some(hint.into());
        match self {
            VintfError::Read { ref mut hint, .. } => *hint = hint_val,
            VintfError::Xml { ref mut hint, .. } => *hint = hint_val,
            _ => (),
        }
        self
    }
}
