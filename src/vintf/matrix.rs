//! Compatibility matrix scanning.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{element_name, read_document, VintfError};
use crate::version::Version;

/// Facts extracted from a compatibility matrix file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatrixFacts {
    /// Highest version inside the first `<vendor-ndk>` block.
    pub vendor_ndk_version: Option<Version>,
}

impl MatrixFacts {
    pub fn from_file(path: &Path) -> Result<Self, VintfError> {
        let content = read_document(path)?;
        scan(&content).map_err(|e| VintfError::xml(path, e))
    }

    pub fn parse(xml: &str) -> Result<Self, VintfError> {
        scan(xml).map_err(|e| VintfError::xml(Path::new("<inline matrix>"), e))
    }
}

#[derive(Debug, Default)]
struct MatrixScanner {
    in_vendor_ndk: bool,
    in_version: bool,
    version_text: String,
    versions: Vec<String>,
    done: bool,
}

impl MatrixScanner {
    fn open(&mut self, e: &BytesStart<'_>) {
        match element_name(e).as_str() {
            "vendor-ndk" => self.in_vendor_ndk = true,
            "version" if self.in_vendor_ndk => self.in_version = true,
            _ => {}
        }
    }

    fn close(&mut self, name: &str) {
        if self.in_version && name == "version" {
            self.in_version = false;
            self.versions.push(std::mem::take(&mut self.version_text));
        } else if self.in_vendor_ndk && name == "vendor-ndk" {
            // Only the first block is consulted.
            self.done = true;
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_version {
            self.version_text.push_str(text.trim());
        }
    }
}

fn scan(xml: &str) -> Result<MatrixFacts, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut scanner = MatrixScanner::default();
    while !scanner.done {
        match reader.read_event()? {
            Event::Start(e) => scanner.open(&e),
            Event::Empty(e) => {
                scanner.open(&e);
                scanner.close(&element_name(&e));
            }
            Event::End(e) => scanner.close(&String::from_utf8_lossy(e.name().as_ref())),
            Event::Text(t) => scanner.text(&t.unescape()?),
            Event::CData(c) => scanner.text(&String::from_utf8_lossy(&c)),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(MatrixFacts {
        vendor_ndk_version: Version::pick_best(&scanner.versions),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_matrix_vendor_ndk() {
        let xml = r#"<compatibility-matrix version="2.0" type="device">
    <hal format="hidl" optional="false">
        <name>android.hidl.manager</name>
        <version>1.0</version>
        <interface><name>IServiceManager</name><instance>default</instance></interface>
    </hal>
    <vendor-ndk>
        <version>30</version>
    </vendor-ndk>
    <system-sdk><version>29</version><version>30</version></system-sdk>
</compatibility-matrix>"#;
        let facts = MatrixFacts::parse(xml).unwrap();
        assert_eq!(facts.vendor_ndk_version, Some(Version::new(30, 0)));
    }

    #[test]
    fn test_versions_outside_vendor_ndk_are_ignored() {
        let xml = r#"<compatibility-matrix version="1.0" type="device">
    <hal><name>x</name><version>99.0</version></hal>
    <system-sdk><version>31</version></system-sdk>
</compatibility-matrix>"#;
        assert_eq!(MatrixFacts::parse(xml).unwrap().vendor_ndk_version, None);
    }

    #[test]
    fn test_only_first_vendor_ndk_block_counts() {
        let xml = r#"<compatibility-matrix>
    <vendor-ndk><version>28</version><version>29</version></vendor-ndk>
    <vendor-ndk><version>33</version></vendor-ndk>
</compatibility-matrix>"#;
        assert_eq!(
            MatrixFacts::parse(xml).unwrap().vendor_ndk_version,
            Some(Version::new(29, 0))
        );
    }

    #[test]
    fn test_scan_stops_before_later_garbage() {
        // Anything after the first vendor-ndk block is never tokenized.
        let xml = "<compatibility-matrix><vendor-ndk><version>30</version></vendor-ndk><oops></compatibility-matrix>";
        assert_eq!(
            MatrixFacts::parse(xml).unwrap().vendor_ndk_version,
            Some(Version::new(30, 0))
        );
    }

    #[test]
    fn test_legacy_zero_vndk_is_absent() {
        let xml = "<compatibility-matrix><vendor-ndk><version>0.0.0</version></vendor-ndk></compatibility-matrix>";
        assert_eq!(MatrixFacts::parse(xml).unwrap().vendor_ndk_version, None);
    }

    #[test]
    fn test_malformed_matrix() {
        let err = MatrixFacts::parse("<compatibility-matrix></vendor-ndk>").unwrap_err();
        assert!(matches!(err, VintfError::Xml { .. }));
    }
}
