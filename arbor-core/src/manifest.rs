//! `package.json` reading and atomic writing.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{Error, Result};

pub const MANIFEST_FILE: &str = "package.json";

pub const DEPENDENCIES: &str = "dependencies";
pub const DEV_DEPENDENCIES: &str = "devDependencies";

/// A `package.json` document.
///
/// Field order is preserved across a read/write cycle so that rewriting a
/// manifest only changes what was actually mutated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Manifest {
    doc: Map<String, Value>,
}

impl Manifest {
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(doc) => Some(Self { doc }),
            _ => None,
        }
    }

    /// Reads the manifest at `path`. Each call reflects the current on-disk state.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        trace!(path = %path.display(), "reading manifest");
        let content = fs::read_to_string(path).map_err(|error| Error::ManifestRead {
            path: path.to_path_buf(),
            error,
        })?;
        let value: Value = serde_json::from_str(&content).map_err(|error| Error::ManifestParse {
            path: path.to_path_buf(),
            error,
        })?;
        Self::from_value(value).ok_or_else(|| Error::ManifestParse {
            path: path.to_path_buf(),
            error: serde::de::Error::custom("expected a JSON object"),
        })
    }

    /// Reads `<dir>/package.json`.
    pub fn read_in(dir: impl AsRef<Path>) -> Result<Self> {
        Self::read(dir.as_ref().join(MANIFEST_FILE))
    }

    /// Replaces the file at `path` with this manifest.
    ///
    /// The document is written to a temporary sibling and renamed over the
    /// target, with two-space indentation and a trailing newline.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        trace!(path = %path.display(), "writing manifest");
        let mut content = serde_json::to_string_pretty(&self.doc)?;
        content.push('\n');

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    /// Writes `<dir>/package.json`.
    pub fn write_in(&self, dir: impl AsRef<Path>) -> Result<()> {
        self.write(dir.as_ref().join(MANIFEST_FILE))
    }

    pub fn name(&self) -> Option<&str> {
        self.doc.get("name").and_then(Value::as_str)
    }

    pub fn main(&self) -> Option<&str> {
        self.doc.get("main").and_then(Value::as_str)
    }

    /// Values of the `bin` field. npm accepts either a single path or a map.
    pub fn bin(&self) -> Vec<&str> {
        match self.doc.get("bin") {
            Some(Value::String(s)) => vec![s.as_str()],
            Some(Value::Object(map)) => map.values().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Replacement paths declared by the `browser` field.
    ///
    /// Values that name scoped packages and `false` (module ignored) are skipped.
    pub fn browser(&self) -> Vec<&str> {
        match self.doc.get("browser") {
            Some(Value::String(s)) => vec![s.as_str()],
            Some(Value::Object(map)) => map
                .values()
                .filter_map(Value::as_str)
                .filter(|v| !v.starts_with('@'))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn script(&self, name: &str) -> Option<&str> {
        self.doc
            .get("scripts")
            .and_then(Value::as_object)
            .and_then(|scripts| scripts.get(name))
            .and_then(Value::as_str)
    }

    /// String entries of a dependency map such as `dependencies`.
    pub fn dependency_map(&self, field: &str) -> Vec<(String, String)> {
        self.doc
            .get(field)
            .and_then(Value::as_object)
            .map(|deps| {
                deps.iter()
                    .filter_map(|(name, version)| {
                        version.as_str().map(|v| (name.clone(), v.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn dependencies(&self) -> Vec<(String, String)> {
        self.dependency_map(DEPENDENCIES)
    }

    pub fn dependency(&self, name: &str) -> Option<&str> {
        self.doc
            .get(DEPENDENCIES)
            .and_then(Value::as_object)
            .and_then(|deps| deps.get(name))
            .and_then(Value::as_str)
    }

    /// Replaces a dependency map, keeping the field's position if it already exists.
    pub fn set_dependency_map<I>(&mut self, field: &str, entries: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let map: Map<String, Value> = entries
            .into_iter()
            .map(|(name, version)| (name, Value::String(version)))
            .collect();
        self.doc.insert(field.to_string(), Value::Object(map));
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.doc.shift_remove(field)
    }

    pub fn has(&self, field: &str) -> bool {
        self.doc.contains_key(field)
    }

    pub fn as_value(&self) -> Value {
        Value::Object(self.doc.clone())
    }
}
