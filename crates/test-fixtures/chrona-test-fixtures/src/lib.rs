//! Shared JSON fixtures for the chrona test suites.
//!
//! Fixtures live in the repository-level `fixtures/` directory and are looked up
//! by name through `fixtures/manifest.json`. Each manifest section maps a name
//! either to a bare relative path or to `{ "path": .., "seed": .. }`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../../../fixtures/manifest.json"))
        .expect("fixtures/manifest.json is malformed")
});

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Manifest {
    timelines: BTreeMap<String, Entry>,
    input_scripts: BTreeMap<String, Entry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Entry {
    Bare(String),
    Seeded { path: String, seed: u64 },
}

/// One named group of fixtures in the manifest.
struct Section {
    label: &'static str,
    entries: &'static BTreeMap<String, Entry>,
}

impl Section {
    fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn entry(&self, name: &str) -> Result<&'static Entry> {
        match self.entries.get(name) {
            Some(entry) => Ok(entry),
            None => bail!("no {} fixture named '{name}'", self.label),
        }
    }

    fn file(&self, name: &str) -> Result<PathBuf> {
        let rel = match self.entry(name)? {
            Entry::Bare(rel) | Entry::Seeded { path: rel, .. } => rel,
        };
        Ok(Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures")
            .join(rel))
    }

    fn text(&self, name: &str) -> Result<String> {
        let file = self.file(name)?;
        fs::read_to_string(&file)
            .with_context(|| format!("reading {} fixture {}", self.label, file.display()))
    }

    fn parse<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let text = self.text(name)?;
        serde_json::from_str(&text)
            .with_context(|| format!("decoding {} fixture '{name}'", self.label))
    }

    fn seed(&self, name: &str) -> Result<Option<u64>> {
        Ok(match self.entry(name)? {
            Entry::Seeded { seed, .. } => Some(*seed),
            Entry::Bare(_) => None,
        })
    }
}

/// Keyframe write scripts with expected samples.
pub mod timelines {
    use super::{Section, MANIFEST};
    use anyhow::Result;
    use serde::de::DeserializeOwned;
    use std::path::PathBuf;

    fn section() -> Section {
        Section {
            label: "timeline",
            entries: &MANIFEST.timelines,
        }
    }

    pub fn keys() -> Vec<String> {
        section().names()
    }

    pub fn json(name: &str) -> Result<String> {
        section().text(name)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        section().parse(name)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        section().file(name)
    }
}

/// Timed player input scripts for replay tests.
pub mod input_scripts {
    use super::{Section, MANIFEST};
    use anyhow::Result;
    use serde::de::DeserializeOwned;
    use std::path::PathBuf;

    fn section() -> Section {
        Section {
            label: "input script",
            entries: &MANIFEST.input_scripts,
        }
    }

    pub fn keys() -> Vec<String> {
        section().names()
    }

    pub fn json(name: &str) -> Result<String> {
        section().text(name)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        section().parse(name)
    }

    /// RNG seed recorded alongside the script, if any.
    pub fn seed(name: &str) -> Result<Option<u64>> {
        section().seed(name)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        section().file(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_entries_resolve() {
        for name in timelines::keys() {
            assert!(timelines::path(&name).unwrap().exists(), "{name}");
        }
        for name in input_scripts::keys() {
            assert!(input_scripts::path(&name).unwrap().exists(), "{name}");
        }
        assert!(timelines::json("no-such-fixture").is_err());
    }

    #[test]
    fn seeds_come_from_detailed_entries() {
        assert_eq!(input_scripts::seed("rally").unwrap(), Some(42));
        assert_eq!(input_scripts::seed("idle").unwrap(), None);
    }
}
