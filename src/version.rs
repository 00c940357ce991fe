//! `major.minor` version tokens as used by VINTF manifests, compatibility
//! matrices, SELinux policy files and the `ro.vndk.version` property.

use std::fmt;

/// A parsed `major.minor` version.
///
/// Ordering is lexicographic on `(major, minor)`. The "no version" sentinel is
/// represented as `Option::<Version>::None`, never as `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parse a version token.
    ///
    /// - components are split on `.` and trimmed of Unicode whitespace (NBSP included)
    /// - a token made only of `"0"` components yields `None`
    /// - one or two components are accepted
    /// - the major component must be plain ASCII digits
    /// - an invalid minor component is treated as absent (`major.0`)
    pub fn parse(text: &str) -> Option<Self> {
        let parts: Vec<&str> = text.split('.').map(str::trim).collect();

        if parts.iter().all(|p| *p == "0") {
            return None;
        }
        if parts.len() != 1 && parts.len() != 2 {
            return None;
        }

        let major = parse_component(parts[0])?;
        let minor = parts.get(1).and_then(|p| parse_component(p)).unwrap_or(0);
        Some(Self { major, minor })
    }

    /// Pick the highest parseable version out of a list of raw tokens.
    pub fn pick_best<I, S>(candidates: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        candidates
            .into_iter()
            .filter_map(|c| Self::parse(c.as_ref()))
            .max()
    }
}

// ASCII only: `u32::from_str` would also accept a leading '+'.
fn parse_component(part: &str) -> Option<u32> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

impl From<(u32, u32)> for Version {
    fn from((major, minor): (u32, u32)) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
