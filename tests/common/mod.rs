//! Shared fixtures for the integration tests: synthetic device trees and a
//! scripted compatibility engine.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tempfile::TempDir;
use treble_check::engine::{CheckOutcome, CompatibilityCheck, EngineError};
use treble_check::props::StaticProperties;
use treble_check::TrebleDetector;

/// A vendor manifest in the shape shipped by an Android 11 device.
pub const VENDOR_MANIFEST_30: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<manifest version="2.0" type="device" target-level="5">
    <hal format="hidl">
        <name>android.hardware.audio</name>
        <transport>hwbinder</transport>
        <version>6.0</version>
        <interface>
            <name>IDevicesFactory</name>
            <instance>default</instance>
        </interface>
    </hal>
    <hal format="hidl">
        <name>android.hardware.graphics.mapper</name>
        <transport arch="32+64">passthrough</transport>
        <version>4.0</version>
        <interface>
            <name>IMapper</name>
            <instance>default</instance>
        </interface>
    </hal>
    <hal format="hidl">
        <name>vendor.qti.hardware.display.mapper</name>
        <transport arch="32+64">passthrough</transport>
        <version>1.1</version>
    </hal>
    <sepolicy>
        <version>30.0</version>
    </sepolicy>
    <kernel target-level="5"/>
</manifest>
"#;

/// A pre-Treble `vendor/manifest.xml`.
pub const LEGACY_MANIFEST_27: &str = r#"<manifest version="1.0" type="device">
    <hal format="hidl">
        <name>android.hardware.wifi</name>
        <transport>hwbinder</transport>
        <version>1.1</version>
    </hal>
    <sepolicy>
        <version>27.0</version>
    </sepolicy>
</manifest>
"#;

pub fn odm_manifest_with_passthrough(name: &str) -> String {
    format!(
        r#"<manifest version="1.0" type="device">
    <hal format="hidl">
        <name>{}</name>
        <transport>passthrough</transport>
        <version>1.0</version>
    </hal>
</manifest>
"#,
        name
    )
}

pub fn device_matrix(vendor_ndk: &str) -> String {
    format!(
        r#"<compatibility-matrix version="1.0" type="device">
    <hal format="hidl" optional="false">
        <name>android.hidl.manager</name>
        <version>1.0</version>
    </hal>
    <vendor-ndk>
        <version>{}</version>
    </vendor-ndk>
</compatibility-matrix>
"#,
        vendor_ndk
    )
}

/// A device root in a temporary directory.
pub struct DeviceTree {
    dir: TempDir,
}

impl DeviceTree {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        self.write_bytes(relative, content.as_bytes())
    }

    pub fn write_bytes(&self, relative: &str, content: &[u8]) -> PathBuf {
        let path = self.dir.path().join(relative);
        fs::create_dir_all(path.parent().expect("relative path has a parent"))
            .expect("create parent dirs");
        fs::write(&path, content).expect("write fixture");
        path
    }

    /// Make `relative` unreadable. Returns false when the permission change
    /// has no effect (e.g. running as root), in which case the caller should
    /// skip its assertions.
    #[cfg(unix)]
    pub fn make_unreadable(&self, relative: &str) -> bool {
        use std::os::unix::fs::PermissionsExt;
        let path = self.dir.path().join(relative);
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).expect("chmod fixture");
        fs::File::open(&path).is_err()
    }

    pub fn detector(&self, props: StaticProperties, engine: FakeEngine) -> TrebleDetector {
        TrebleDetector::builder()
            .with_root(self.root())
            .with_properties(props)
            .with_engine(engine)
            .build()
    }
}

/// Replays the outcome of checking each bundled matrix in turn.
#[derive(Clone)]
pub struct FakeEngine {
    behaviour: Behaviour,
    calls: Arc<AtomicUsize>,
}

#[derive(Clone, Copy)]
enum Behaviour {
    /// Mismatch until the given call index, which matches.
    MatchAt(usize),
    Never,
    Status(i32),
    Unavailable,
}

impl FakeEngine {
    pub fn matching_at(index: usize) -> Self {
        Self::with(Behaviour::MatchAt(index))
    }

    pub fn never_matching() -> Self {
        Self::with(Behaviour::Never)
    }

    /// Returns a raw native status on the first call.
    pub fn status(status: i32) -> Self {
        Self::with(Behaviour::Status(status))
    }

    pub fn unavailable() -> Self {
        Self::with(Behaviour::Unavailable)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn with(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl CompatibilityCheck for FakeEngine {
    fn check(
        &self,
        matrix_xml: &str,
        _device_root: &Path,
        _vendor_sku: &str,
        _hardware_sku: &str,
    ) -> Result<CheckOutcome, EngineError> {
        assert!(matrix_xml.contains("<sepolicy-version>"));
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behaviour {
            Behaviour::MatchAt(index) if call == index => Ok(CheckOutcome::Match),
            Behaviour::MatchAt(_) | Behaviour::Never => Ok(CheckOutcome::Mismatch),
            Behaviour::Status(status) => CheckOutcome::from_status(status),
            Behaviour::Unavailable => Ok(CheckOutcome::EngineUnavailable),
        }
    }
}

pub fn props(treble_enabled: &str, vndk_lite: &str) -> StaticProperties {
    StaticProperties::new()
        .with("ro.treble.enabled", treble_enabled)
        .with("ro.vndk.lite", vndk_lite)
}
