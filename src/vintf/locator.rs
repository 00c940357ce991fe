//! On-disk search order for VINTF manifests and the vendor matrix.
//!
//! Mirrors how libvintf assembles the device manifest:
//! 1. vendor manifest, plus vendor fragments iff it was found
//! 2. ODM manifest, SKU-specific first, then the legacy `odm/etc` location
//! 3. ODM fragments iff the vendor manifest was found
//! 4. the pre-Treble `vendor/manifest.xml` iff nothing else was found

use std::path::{Path, PathBuf};

use tracing::{trace, warn};

use super::is_readable;

/// Ordered manifest candidates for one device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestSet {
    pub files: Vec<PathBuf>,
    /// Only the pre-Treble `vendor/manifest.xml` was found.
    pub legacy: bool,
}

impl ManifestSet {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Resolves VINTF file locations below a device root.
#[derive(Debug, Clone)]
pub struct FileLocator {
    root: PathBuf,
}

impl FileLocator {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Locate every manifest contributing to the device manifest, in merge order.
    pub fn locate_manifests(
        &self,
        vendor_sku: Option<&str>,
        hardware_sku: Option<&str>,
    ) -> ManifestSet {
        let mut files = Vec::new();

        let vendor_manifest = self.locate_vendor_manifest(vendor_sku);
        let found_vendor = vendor_manifest.is_some();
        if let Some(manifest) = vendor_manifest {
            files.push(manifest);
            files.extend(self.vendor_fragments());
        }

        if let Some(manifest) = self.locate_odm_manifest(hardware_sku) {
            files.push(manifest);
        }

        if found_vendor {
            files.extend(self.odm_fragments());
        }

        if files.is_empty() {
            if let Some(legacy) = self.locate_legacy_manifest() {
                return ManifestSet {
                    files: vec![legacy],
                    legacy: true,
                };
            }
        }

        ManifestSet {
            files,
            legacy: false,
        }
    }

    /// `vendor/etc/vintf/compatibility_matrix.xml`, if present and readable.
    ///
    /// `vendor/compatibility_matrix.xml` is not consulted: its `<vndk>` block
    /// always reads `0.0.0`.
    pub fn locate_vendor_matrix(&self) -> Option<PathBuf> {
        let path = self.root.join("vendor/etc/vintf/compatibility_matrix.xml");
        (path.exists() && is_readable(&path)).then_some(path)
    }

    fn locate_vendor_manifest(&self, sku: Option<&str>) -> Option<PathBuf> {
        let relative = match non_empty(sku) {
            Some(sku) => format!("vendor/etc/vintf/manifest_{}.xml", sku),
            None => "vendor/etc/vintf/manifest.xml".to_string(),
        };
        self.candidate(&relative).unwrap_or(None)
    }

    fn locate_odm_manifest(&self, sku: Option<&str>) -> Option<PathBuf> {
        let (vintf, legacy) = match non_empty(sku) {
            Some(sku) => (
                format!("odm/etc/vintf/manifest_{}.xml", sku),
                format!("odm/etc/manifest_{}.xml", sku),
            ),
            None => (
                "odm/etc/vintf/manifest.xml".to_string(),
                "odm/etc/manifest.xml".to_string(),
            ),
        };
        self.candidate(&vintf)
            .or_else(|| self.candidate(&legacy))
            .unwrap_or(None)
    }

    fn locate_legacy_manifest(&self) -> Option<PathBuf> {
        let path = self.root.join("vendor/manifest.xml");
        (path.exists() && is_readable(&path)).then_some(path)
    }

    fn vendor_fragments(&self) -> Vec<PathBuf> {
        list_files(&self.root.join("vendor/etc/vintf/manifest"))
            .into_iter()
            .filter(|p| is_readable(p))
            .collect()
    }

    // Unlike every other lookup, ODM fragments are not filtered on readability.
    fn odm_fragments(&self) -> Vec<PathBuf> {
        list_files(&self.root.join("odm/etc/vintf/manifest"))
    }

    /// `None` when the file does not exist. `Some(None)` when it exists but
    /// cannot be read, which ends the search.
    fn candidate(&self, relative: &str) -> Option<Option<PathBuf>> {
        let path = self.root.join(relative);
        if !path.exists() {
            return None;
        }
        if is_readable(&path) {
            trace!(path = %path.display(), "found manifest");
            Some(Some(path))
        } else {
            warn!(path = %path.display(), "Cannot read manifest");
            Some(None)
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Regular files directly inside `dir`, sorted by name. Missing directory → empty.
fn list_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    files
}
