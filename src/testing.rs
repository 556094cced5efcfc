//! # Golden-File Structure Assertions
//!
//! Compares a document's structure tree against a JSON fixture. The fixture
//! directory is an explicit context value, so tests in different crates or
//! directories never share state.
//!
//! ```ignore
//! let fixtures = StructureAssert::new("tests/fixtures");
//! fixtures.assert(&document.structure()).equals("invoice.json");
//! ```
//!
//! Comparison is on parsed JSON values, so whitespace in fixtures does not
//! matter. Numbers must keep their kind: a height of `20.0` is a float and
//! is not equal to the integer `20`.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::Result;
use crate::structure::StructureNode;

#[derive(Debug, Clone)]
pub struct StructureAssert {
    fixture_dir: PathBuf,
}

impl StructureAssert {
    pub fn new(fixture_dir: impl Into<PathBuf>) -> Self {
        Self {
            fixture_dir: fixture_dir.into(),
        }
    }

    pub fn fixture_dir(&self) -> &Path {
        &self.fixture_dir
    }

    pub fn assert<'a>(&'a self, node: &'a StructureNode) -> NodeAssert<'a> {
        NodeAssert { context: self, node }
    }
}

#[derive(Debug)]
pub struct NodeAssert<'a> {
    context: &'a StructureAssert,
    node: &'a StructureNode,
}

impl NodeAssert<'_> {
    fn path(&self, file: &str) -> PathBuf {
        self.context.fixture_dir().join(file)
    }

    /// Whether the node matches the fixture.
    pub fn matches(&self, file: &str) -> Result<bool> {
        let raw = std::fs::read_to_string(self.path(file))?;
        let expected: Value = serde_json::from_str(&raw)?;
        let actual = serde_json::to_value(self.node)?;
        Ok(expected == actual)
    }

    /// # Panics
    ///
    /// If the fixture cannot be read or does not match.
    pub fn equals(&self, file: &str) {
        match self.matches(file) {
            Ok(true) => {}
            Ok(false) => panic!(
                "structure does not match fixture {}\nactual:\n{}",
                self.path(file).display(),
                self.node.to_json()
            ),
            Err(e) => panic!("cannot compare with fixture {}: {}", self.path(file).display(), e),
        }
    }

    /// Write the node as the new fixture.
    pub fn save(&self, file: &str) -> Result<()> {
        std::fs::create_dir_all(&self.context.fixture_dir)?;
        std::fs::write(self.path(file), self.node.to_json())?;
        Ok(())
    }
}
