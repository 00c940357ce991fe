//! Treble 判定引擎：综合系统属性、VINTF 清单、兼容性矩阵和原生引擎得出结论。
//!
//! # Treble Detection
//!
//! [`TrebleDetector::detect`] combines every signal a device exposes into one
//! classification:
//!
//! 1. system properties (`ro.vndk.version`, `ro.treble.enabled`, `ro.vndk.lite`)
//! 2. the device HAL manifests, checked against the bundled framework
//!    compatibility matrices by the native engine
//! 3. passthrough HAL compliance
//! 4. VNDK version resolution (property, manifest, vendor matrix, SELinux)
//!
//! The result is `Ok(Some(_))` for a Treble device, `Ok(None)` for a device
//! that is conclusively not Treble and `Err(_)` when the inputs are missing or
//! contradict each other.
//!
//! ## Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`result`] | `TrebleResult` and `PassthroughResult` |
//! | [`passthrough`] | Passthrough HAL classification |
//! | [`compat`] | Framework matrix check through the native engine |
//! | [`stages`] | Ordered VNDK version resolution |

pub mod compat;
pub mod passthrough;
pub mod result;
pub mod stages;

pub use compat::MatrixVerdict;
pub use passthrough::{classify_passthroughs, ALLOWED_PASSTHROUGHS, LEGACY_REQUIRED_BINDERIZED};
pub use result::{PassthroughResult, TrebleResult};
pub use stages::{Evidence, Resolution};

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::engine::{CompatibilityCheck, NativeEngine, DEFAULT_LIBRARY};
use crate::error::ErrorContext;
use crate::props::{
    parse_bool, PropertyStore, StaticProperties, PROP_HARDWARE_SKU, PROP_TREBLE_ENABLED,
    PROP_VENDOR_SKU, PROP_VNDK_LITE, PROP_VNDK_VERSION,
};
use crate::version::Version;
use crate::vintf::{FileLocator, ManifestFacts};
use crate::{Error, Result};

/// Environment variable overriding the device root.
pub const ENV_ROOT: &str = "TREBLE_CHECK_ROOT";
/// Environment variable overriding the native engine library.
pub const ENV_ENGINE_LIB: &str = "TREBLE_CHECK_ENGINE_LIB";

/// Where the detector looks for device data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorConfig {
    /// Filesystem root the device partitions are mounted under.
    pub root: PathBuf,
    /// Path or soname of the native compatibility engine.
    pub engine_library: PathBuf,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/"),
            engine_library: PathBuf::from(DEFAULT_LIBRARY),
        }
    }
}

impl DetectorConfig {
    /// Defaults, overridden by `TREBLE_CHECK_ROOT` and `TREBLE_CHECK_ENGINE_LIB`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(root) = std::env::var_os(ENV_ROOT).filter(|v| !v.is_empty()) {
            config.root = PathBuf::from(root);
        }
        if let Some(lib) = std::env::var_os(ENV_ENGINE_LIB).filter(|v| !v.is_empty()) {
            config.engine_library = PathBuf::from(lib);
        }
        config
    }
}

/// Builder for [`TrebleDetector`].
#[derive(Default)]
pub struct TrebleDetectorBuilder {
    config: DetectorConfig,
    properties: Option<Arc<dyn PropertyStore>>,
    engine: Option<Arc<dyn CompatibilityCheck>>,
}

impl TrebleDetectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: DetectorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.root = root.into();
        self
    }

    /// Property source. Defaults to a `getprop` snapshot taken at build time.
    pub fn with_properties(mut self, properties: impl PropertyStore + 'static) -> Self {
        self.properties = Some(Arc::new(properties));
        self
    }

    /// Compatibility engine. Defaults to [`NativeEngine`] loading the
    /// configured library.
    pub fn with_engine(mut self, engine: impl CompatibilityCheck + 'static) -> Self {
        self.engine = Some(Arc::new(engine));
        self
    }

    pub fn build(self) -> TrebleDetector {
        let properties = self
            .properties
            .unwrap_or_else(|| Arc::new(StaticProperties::from_getprop()) as Arc<dyn PropertyStore>);
        let engine = self
            .engine
            .unwrap_or_else(|| {
                Arc::new(NativeEngine::new(&self.config.engine_library)) as Arc<dyn CompatibilityCheck>
            });
        TrebleDetector {
            locator: FileLocator::new(&self.config.root),
            config: self.config,
            properties,
            engine,
        }
    }
}

/// Classifies a device's Treble support.
pub struct TrebleDetector {
    config: DetectorConfig,
    locator: FileLocator,
    properties: Arc<dyn PropertyStore>,
    engine: Arc<dyn CompatibilityCheck>,
}

/// Everything the manifests contribute.
#[derive(Debug, Default)]
struct ManifestSummary {
    legacy: bool,
    sepolicy_version: Option<Version>,
    target_level: Option<i64>,
    passthrough_hals: BTreeSet<String>,
}

impl TrebleDetector {
    pub fn builder() -> TrebleDetectorBuilder {
        TrebleDetectorBuilder::new()
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn root(&self) -> &Path {
        self.locator.root()
    }

    pub fn locator(&self) -> &FileLocator {
        &self.locator
    }

    /// Classify the device.
    pub fn detect(&self) -> Result<Option<TrebleResult>> {
        let mut supports_treble = false;

        let vndk_property = self.property(PROP_VNDK_VERSION).and_then(|v| Version::parse(&v));
        if vndk_property.is_some() {
            supports_treble = true;
        }
        debug!(?vndk_property, "vndk property");

        if let Some(enabled) = self.property(PROP_TREBLE_ENABLED) {
            if parse_bool(&enabled) == Some(true) {
                supports_treble = true;
            }
        }

        let Some(lite) = self.property(PROP_VNDK_LITE) else {
            return Err(Error::malformed_with_context(
                "Can't check lite status",
                ErrorContext::new().with_field_path(PROP_VNDK_LITE),
            ));
        };
        let lite = parse_bool(&lite).unwrap_or(false);
        if lite {
            supports_treble = true;
        }
        debug!(supports_treble, lite, "properties read");

        let manifests = self.scan_manifests()?;

        if let Some(sepolicy) = manifests.sepolicy_version {
            match self.check_framework_matrices(sepolicy, manifests.target_level)? {
                MatrixVerdict::Compatible => supports_treble = true,
                MatrixVerdict::Incompatible if supports_treble => {
                    return Err(Error::inconsistent_with_context(
                        "Device claims Treble support but fails compatibility checks with AOSP matrices",
                        ErrorContext::new().with_details(format!("sepolicy version {}", sepolicy)),
                    ));
                }
                MatrixVerdict::Incompatible => return Ok(None),
                MatrixVerdict::Indeterminate => {}
            }
        }

        let upgrade_compliant = match classify_passthroughs(&manifests.passthrough_hals) {
            PassthroughResult::NotCompliant if supports_treble => {
                return Err(Error::inconsistent_with_context(
                    "Device reports Treble compliance but does not meet VNDK requirements",
                    ErrorContext::new().with_details(
                        manifests
                            .passthrough_hals
                            .iter()
                            .cloned()
                            .collect::<Vec<_>>()
                            .join(", "),
                    ),
                ));
            }
            PassthroughResult::NotCompliant => return Ok(None),
            PassthroughResult::UpgradeCompliant => {
                debug!("VNDK upgrade compliant");
                true
            }
            PassthroughResult::FullyCompliant => false,
        };

        let evidence = Evidence {
            supports_treble,
            vndk_property,
            manifest_version: manifests.sepolicy_version,
        };
        let Some(version) = stages::resolve(&self.locator, &evidence)? else {
            return Ok(None);
        };

        Ok(Some(TrebleResult {
            legacy: manifests.legacy,
            lite,
            upgrade_compliant,
            vndk_version: version.major,
            vndk_sub_version: version.minor,
        }))
    }

    fn property(&self, name: &str) -> Option<String> {
        let value = self.properties.get(name);
        trace!(name, ?value, "property");
        value
    }

    fn scan_manifests(&self) -> Result<ManifestSummary> {
        let vendor_sku = self.property(PROP_VENDOR_SKU);
        let hardware_sku = self.property(PROP_HARDWARE_SKU);
        let set = self
            .locator
            .locate_manifests(vendor_sku.as_deref(), hardware_sku.as_deref());
        debug!(files = ?set.files, legacy = set.legacy, "located manifests");

        let mut summary = ManifestSummary {
            legacy: set.legacy,
            ..ManifestSummary::default()
        };
        for path in &set.files {
            let facts = ManifestFacts::from_file(path)?;
            trace!(path = %path.display(), ?facts, "manifest");
            if summary.target_level.is_none() {
                summary.target_level = facts.target_level.as_deref().and_then(|l| l.parse().ok());
            }
            if summary.sepolicy_version.is_none() {
                summary.sepolicy_version = facts.sepolicy_version;
            }
            summary.passthrough_hals.extend(facts.passthrough_hals);
        }
        Ok(summary)
    }

    fn check_framework_matrices(
        &self,
        sepolicy: Version,
        target_level: Option<i64>,
    ) -> Result<MatrixVerdict> {
        let vendor_sku = self.property(PROP_VENDOR_SKU).unwrap_or_default();
        let hardware_sku = self.property(PROP_HARDWARE_SKU).unwrap_or_default();
        compat::MatrixCheck {
            engine: self.engine.as_ref(),
            root: self.locator.root(),
            vendor_sku: &vendor_sku,
            hardware_sku: &hardware_sku,
            target_level,
        }
        .run(sepolicy)
    }
}

impl std::fmt::Debug for TrebleDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrebleDetector")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
