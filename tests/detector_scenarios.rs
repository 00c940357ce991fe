//! End-to-end detection over synthetic device trees.

mod common;

use common::{props, DeviceTree, FakeEngine};
use treble_check::{Error, TrebleResult};

fn treble(legacy: bool, lite: bool, upgrade_compliant: bool, major: u32, minor: u32) -> TrebleResult {
    TrebleResult {
        legacy,
        lite,
        upgrade_compliant,
        vndk_version: major,
        vndk_sub_version: minor,
    }
}

#[test]
fn test_property_only_scenarios() {
    for (enabled, lite) in [("", ""), ("false", ""), ("true", "false")] {
        let device = DeviceTree::new();
        let detector = device.detector(props(enabled, lite), FakeEngine::unavailable());
        let err = detector.detect().unwrap_err();
        assert!(
            matches!(err, Error::Inconsistent { .. }),
            "({enabled:?}, {lite:?}) gave {err}"
        );
    }
}

#[test]
fn test_vndk_property_without_device_data() {
    let device = DeviceTree::new();
    let detector = device.detector(
        props("true", "").with("ro.vndk.version", "30"),
        FakeEngine::unavailable(),
    );
    assert_eq!(detector.detect().unwrap(), Some(treble(false, false, false, 30, 0)));
}

#[test]
fn test_lite_property_absent() {
    let device = DeviceTree::new();
    device.write("vendor/etc/vintf/manifest.xml", common::VENDOR_MANIFEST_30);
    let detector = device.detector(
        treble_check::StaticProperties::new().with("ro.treble.enabled", "true"),
        FakeEngine::matching_at(0),
    );
    assert!(matches!(detector.detect(), Err(Error::Malformed { .. })));
}

#[test]
fn test_manifest_matches_second_matrix() {
    let device = DeviceTree::new();
    device.write("vendor/etc/vintf/manifest.xml", common::VENDOR_MANIFEST_30);
    let engine = FakeEngine::matching_at(1);
    let detector = device.detector(props("true", "false"), engine.clone());

    assert_eq!(detector.detect().unwrap(), Some(treble(false, false, false, 30, 0)));
    assert_eq!(engine.calls(), 2);
}

#[test]
fn test_lite_device() {
    let device = DeviceTree::new();
    device.write("vendor/etc/vintf/manifest.xml", common::VENDOR_MANIFEST_30);
    let detector = device.detector(props("true", "true"), FakeEngine::matching_at(1));
    assert_eq!(detector.detect().unwrap(), Some(treble(false, true, false, 30, 0)));
}

#[test]
fn test_legacy_manifest_confirmed_by_engine() {
    let device = DeviceTree::new();
    device.write("vendor/manifest.xml", common::LEGACY_MANIFEST_27);
    let detector = device.detector(props("false", "false"), FakeEngine::matching_at(0));
    assert_eq!(detector.detect().unwrap(), Some(treble(true, false, false, 27, 0)));
}

#[test]
fn test_no_matrix_matches_unconfirmed_device() {
    let device = DeviceTree::new();
    device.write("vendor/manifest.xml", common::LEGACY_MANIFEST_27);
    let engine = FakeEngine::never_matching();
    let detector = device.detector(props("false", "false"), engine.clone());

    assert_eq!(detector.detect().unwrap(), None);
    assert_eq!(engine.calls(), 8);
}

#[test]
fn test_no_matrix_matches_confirmed_device() {
    let device = DeviceTree::new();
    device.write("vendor/etc/vintf/manifest.xml", common::VENDOR_MANIFEST_30);
    let detector = device.detector(props("true", "false"), FakeEngine::never_matching());
    assert!(detector.detect().unwrap_err().is_inconsistent());
}

#[test]
fn test_newer_target_level_is_not_a_failure() {
    let device = DeviceTree::new();
    device.write(
        "vendor/etc/vintf/manifest.xml",
        &common::VENDOR_MANIFEST_30.replace(r#"target-level="5""#, r#"target-level="8""#),
    );
    let detector = device.detector(props("true", "false"), FakeEngine::never_matching());
    assert_eq!(detector.detect().unwrap(), Some(treble(false, false, false, 30, 0)));
}

#[test]
fn test_engine_unavailable_without_confirmation() {
    let device = DeviceTree::new();
    device.write("vendor/etc/vintf/manifest.xml", common::VENDOR_MANIFEST_30);
    let detector = device.detector(props("false", "false"), FakeEngine::unavailable());
    // 30.0 >= 28.0 without any confirmation cannot be Treble.
    assert_eq!(detector.detect().unwrap(), None);
}

#[test]
fn test_engine_unavailable_old_vendor_needs_more_evidence() {
    let device = DeviceTree::new();
    device.write("vendor/manifest.xml", common::LEGACY_MANIFEST_27);
    let detector = device.detector(props("false", "false"), FakeEngine::unavailable());
    assert!(detector.detect().unwrap_err().is_inconsistent());

    device.write("vendor/etc/vintf/compatibility_matrix.xml", &common::device_matrix("27"));
    let detector = device.detector(props("false", "false"), FakeEngine::unavailable());
    // A vendor NDK version agreeing with the manifest is accepted as proof.
    assert_eq!(detector.detect().unwrap(), Some(treble(true, false, false, 27, 0)));
}

#[test]
fn test_manifest_and_matrix_disagree() {
    let device = DeviceTree::new();
    device.write("vendor/manifest.xml", common::LEGACY_MANIFEST_27);
    device.write("vendor/etc/vintf/compatibility_matrix.xml", &common::device_matrix("26"));
    let detector = device.detector(props("false", "false"), FakeEngine::unavailable());
    assert!(detector.detect().unwrap_err().is_inconsistent());
}

#[test]
fn test_unknown_engine_status_is_terminal() {
    let device = DeviceTree::new();
    device.write("vendor/etc/vintf/manifest.xml", common::VENDOR_MANIFEST_30);
    let detector = device.detector(props("true", "false"), FakeEngine::status(42));
    assert!(matches!(detector.detect(), Err(Error::Engine(_))));
}

#[test]
fn test_device_manifest_invalid() {
    let device = DeviceTree::new();
    device.write("vendor/etc/vintf/manifest.xml", common::VENDOR_MANIFEST_30);
    let detector = device.detector(props("false", "false"), FakeEngine::status(-2));
    assert_eq!(detector.detect().unwrap(), None);
}

#[test]
fn test_passthrough_compliance() {
    let device = DeviceTree::new();
    device.write("vendor/etc/vintf/manifest.xml", common::VENDOR_MANIFEST_30);
    device.write(
        "odm/etc/vintf/manifest.xml",
        &common::odm_manifest_with_passthrough("android.hardware.light"),
    );
    let detector = device.detector(props("true", "false"), FakeEngine::matching_at(0));
    assert_eq!(detector.detect().unwrap(), Some(treble(false, false, true, 30, 0)));

    device.write(
        "odm/etc/vintf/manifest.xml",
        &common::odm_manifest_with_passthrough("android.hardware.radio"),
    );
    let detector = device.detector(props("true", "false"), FakeEngine::matching_at(0));
    assert!(detector.detect().unwrap_err().is_inconsistent());

    let detector = device.detector(props("false", "false"), FakeEngine::unavailable());
    assert_eq!(detector.detect().unwrap(), None);
}

#[test]
fn test_selinux_fallback_when_confirmed() {
    let device = DeviceTree::new();
    device.write("vendor/etc/selinux/plat_sepolicy_vers.txt", "29.0\n");
    let detector = device.detector(props("true", "false"), FakeEngine::unavailable());
    assert_eq!(detector.detect().unwrap(), Some(treble(false, false, false, 29, 0)));
}

#[test]
fn test_malformed_manifest_is_terminal() {
    let device = DeviceTree::new();
    device.write("vendor/etc/vintf/manifest.xml", "<manifest></hal>");
    let detector = device.detector(props("true", "false"), FakeEngine::matching_at(0));
    assert!(matches!(detector.detect(), Err(Error::Vintf(_))));
}

#[test]
fn test_invalid_utf8_in_comment_is_tolerated() {
    let device = DeviceTree::new();
    device.write_bytes(
        "vendor/etc/vintf/manifest.xml",
        b"<manifest version=\"2.0\" type=\"device\"><!-- caf\xE9 --><sepolicy><version>30.0</version></sepolicy></manifest>",
    );
    let detector = device.detector(props("true", "false"), FakeEngine::matching_at(1));
    assert_eq!(detector.detect().unwrap(), Some(treble(false, false, false, 30, 0)));
}
