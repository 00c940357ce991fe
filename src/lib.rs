//! # treble-check
//!
//! 检测 Android 设备是否实现了 Treble 厂商/框架兼容性边界，并给出 VNDK 版本与合规等级。
//!
//! Treble detection for Android devices: decides whether a device implements
//! the vendor/framework compatibility boundary, and if so which VNDK version
//! and compliance tier applies.
//!
//! ## Overview
//!
//! A device exposes its Treble status in many places, none of which is
//! reliable on its own: system properties, VINTF HAL manifests, the vendor
//! compatibility matrix and SELinux policy files. Any of them may be missing,
//! malformed or contradict the others. This crate reads all of them, checks
//! the device manifest against the bundled framework compatibility matrices
//! through the native libvintf engine, and folds everything into one verdict.
//!
//! ## Key Features
//!
//! - **Detector**: [`TrebleDetector`] classifies a device as Treble, not Treble,
//!   or inconsistent
//! - **Tolerant parsing**: streaming VINTF scans that skip unknown elements
//! - **Pluggable inputs**: [`PropertyStore`] and [`CompatibilityCheck`] let
//!   tests and offline tools feed synthetic devices
//! - **Partition layout**: system-as-root and dynamic partition detection
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use treble_check::{StaticProperties, TrebleDetector};
//!
//! fn main() -> treble_check::Result<()> {
//!     let props = StaticProperties::from_build_prop("ro.vndk.version=30\nro.vndk.lite=false\n");
//!     let detector = TrebleDetector::builder()
//!         .with_root("/mnt/device")
//!         .with_properties(props)
//!         .build();
//!
//!     match detector.detect()? {
//!         Some(result) => println!("{}", result),
//!         None => println!("not Treble"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`detector`] | Decision engine and its configuration |
//! | [`vintf`] | Manifest, matrix and SELinux file location and parsing |
//! | [`engine`] | Native compatibility engine binding |
//! | [`props`] | System property access |
//! | [`partitions`] | System-as-root and dynamic partition detection |
//! | [`version`] | `major.minor` version tokens |

pub mod detector;
pub mod engine;
pub mod partitions;
pub mod props;
pub mod version;
pub mod vintf;

// Re-export main types for convenience
pub use detector::{DetectorConfig, PassthroughResult, TrebleDetector, TrebleDetectorBuilder, TrebleResult};
pub use engine::{CheckOutcome, CompatibilityCheck, EngineError, NativeEngine};
pub use partitions::MountEntry;
pub use props::{PropertyStore, StaticProperties};
pub use version::Version;
pub use vintf::{FileLocator, VintfError};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
