use crate::engine::EngineError;
use crate::vintf::VintfError;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Property name or device path that caused the error (e.g., "ro.vndk.lite", "vendor/etc/vintf/manifest.xml")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., the conflicting values)
    pub details: Option<String>,
    /// Source of the error (e.g., "detector", "partitions")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Terminal errors of a detection run.
///
/// Absent properties, missing or unreadable files and an unavailable native
/// engine are not errors; they only make a tier inconclusive.
#[derive(Debug, Error)]
pub enum Error {
    #[error("VINTF data error: {0}")]
    Vintf(#[from] VintfError),

    #[error("Compatibility engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Malformed input: {message}{}", format_context(.context))]
    Malformed {
        message: String,
        context: ErrorContext,
    },

    #[error("Inconsistent device data: {message}{}", format_context(.context))]
    Inconsistent {
        message: String,
        context: ErrorContext,
    },
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a new malformed-input error with structured context
    pub fn malformed_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Malformed {
            message: msg.into(),
            context,
        }
    }

    /// Create a new inconsistency error with structured context
    pub fn inconsistent_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Inconsistent {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Malformed { context, .. } | Error::Inconsistent { context, .. } => Some(context),
            _ => None,
        }
    }

    /// True for errors caused by device data that contradicts itself.
    pub fn is_inconsistent(&self) -> bool {
        matches!(self, Error::Inconsistent { .. })
    }

    /// True for errors caused by input that could not be read or parsed.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::Malformed { .. } | Error::Vintf(_))
    }
}
