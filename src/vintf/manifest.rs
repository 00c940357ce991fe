//! Device HAL manifest scanning.
//!
//! Only three things are pulled out of a manifest: the `<sepolicy><version>`
//! entries, the names of HALs served over the `passthrough` transport and the
//! root `target-level` attribute. Everything else is skipped so newer manifest
//! dialects keep parsing.

use std::collections::BTreeSet;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{element_name, read_document, VintfError};
use crate::version::Version;

/// Facts extracted from a single manifest file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestFacts {
    /// Highest `<sepolicy><version>` declared in the file.
    pub sepolicy_version: Option<Version>,
    /// Names of `<hal>` entries whose transport is `passthrough`.
    pub passthrough_hals: BTreeSet<String>,
    /// Raw `target-level` attribute of the root `<manifest>` element.
    pub target_level: Option<String>,
}

impl ManifestFacts {
    /// Read and scan a manifest file.
    pub fn from_file(path: &Path) -> Result<Self, VintfError> {
        let content = read_document(path)?;
        scan(&content).map_err(|e| VintfError::xml(path, e))
    }

    /// Scan manifest text held in memory.
    pub fn parse(xml: &str) -> Result<Self, VintfError> {
        scan(xml).map_err(|e| VintfError::xml(Path::new("<inline manifest>"), e))
    }

    pub fn is_empty(&self) -> bool {
        self.sepolicy_version.is_none()
            && self.passthrough_hals.is_empty()
            && self.target_level.is_none()
    }
}

#[derive(Debug, Default)]
struct HalEntry {
    name: String,
    transport: String,
}

#[derive(Debug, Default)]
struct ManifestScanner {
    stack: Vec<String>,
    versions: Vec<String>,
    version_text: String,
    hal: Option<HalEntry>,
    passthrough_hals: BTreeSet<String>,
    target_level: Option<String>,
}

impl ManifestScanner {
    fn open(&mut self, e: &BytesStart<'_>) -> Result<(), quick_xml::Error> {
        let name = element_name(e);
        match name.as_str() {
            "manifest" if self.stack.is_empty() && self.target_level.is_none() => {
                if let Some(attr) = e.try_get_attribute("target-level")? {
                    self.target_level = Some(attr.unescape_value()?.into_owned());
                }
            }
            "hal" => self.hal = Some(HalEntry::default()),
            _ => {}
        }
        self.stack.push(name);
        Ok(())
    }

    fn close(&mut self) {
        let Some(name) = self.stack.pop() else {
            return;
        };
        let parent = self.stack.last().map(String::as_str);
        match (parent, name.as_str()) {
            (Some("sepolicy"), "version") => {
                self.versions.push(std::mem::take(&mut self.version_text));
            }
            (_, "hal") => {
                if let Some(hal) = self.hal.take() {
                    if hal.transport == "passthrough" && !hal.name.is_empty() {
                        self.passthrough_hals.insert(hal.name);
                    }
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let depth = self.stack.len();
        let (parent, current) = match depth {
            0 => return,
            1 => (None, self.stack[0].as_str()),
            _ => (
                Some(self.stack[depth - 2].as_str()),
                self.stack[depth - 1].as_str(),
            ),
        };
        match (parent, current) {
            (Some("sepolicy"), "version") => self.version_text.push_str(text),
            (Some("hal"), "name") => {
                if let Some(hal) = self.hal.as_mut() {
                    hal.name.push_str(text);
                }
            }
            (Some("hal"), "transport") => {
                if let Some(hal) = self.hal.as_mut() {
                    hal.transport.push_str(text);
                }
            }
            _ => {}
        }
    }

    fn finish(self) -> ManifestFacts {
        ManifestFacts {
            sepolicy_version: Version::pick_best(&self.versions),
            passthrough_hals: self.passthrough_hals,
            target_level: self.target_level,
        }
    }
}

fn scan(xml: &str) -> Result<ManifestFacts, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut scanner = ManifestScanner::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => scanner.open(&e)?,
            Event::Empty(e) => {
                scanner.open(&e)?;
                scanner.close();
            }
            Event::End(_) => scanner.close(),
            Event::Text(t) => scanner.text(&t.unescape()?),
            Event::CData(c) => scanner.text(&String::from_utf8_lossy(&c)),
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(scanner.finish())
}
