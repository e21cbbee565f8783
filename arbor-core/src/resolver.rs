//! Static import resolution for packages.
//!
//! Starting from a package's entry points, every source file is parsed for
//! import specifiers. Relative specifiers are followed into the files they
//! name; everything else is reduced to the package identifier it refers to.

use std::collections::{BTreeSet, HashMap};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, trace};

use crate::adapter::{parse_imports, SourceParser};
use crate::error::{Error, Result};
use crate::manifest::Manifest;
use crate::package::Package;
use crate::path_utils::normalize;

/// Extensions tried, in order, for a specifier without one.
pub const SOURCE_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs"];

pub const TSCONFIG_FILE: &str = "tsconfig.json";

/// Extensions of files that can be imported but hold no import statements.
const NON_SOURCE_EXTENSIONS: &[&str] = &[
    "json", "node", "wasm", "css", "scss", "sass", "less", "html", "svg", "png", "jpg", "jpeg",
    "gif", "webp", "ico", "woff", "woff2", "ttf", "md", "txt",
];

static TEST_FILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\.(test|spec)\.[cm]?[jt]sx?$").expect("test file pattern is valid")
});

enum Visit {
    InProgress,
    Done(BTreeSet<String>),
}

/// Computes the external modules a package imports.
///
/// Files are memoized by absolute path for the lifetime of the resolver, so a
/// module shared by several entry points (or several packages) is parsed once.
pub struct DependencyResolver<'p> {
    root: PathBuf,
    parsers: &'p [Box<dyn SourceParser>],
    visited: HashMap<PathBuf, Visit>,
}

impl<'p> DependencyResolver<'p> {
    pub fn new(root: impl Into<PathBuf>, parsers: &'p [Box<dyn SourceParser>]) -> Self {
        Self {
            root: root.into(),
            parsers,
            visited: HashMap::new(),
        }
    }

    /// Sorted, deduplicated package identifiers imported by `package`.
    pub fn resolve(&mut self, package: &Package) -> Result<Vec<String>> {
        let entry_points = self.entry_points(package)?;
        debug!(package = %package.name, count = entry_points.len(), "walking entry points");

        let mut externals = BTreeSet::new();
        for entry in entry_points {
            externals.extend(self.walk(&entry)?);
        }
        Ok(externals.into_iter().collect())
    }

    /// Absolute paths of the files through which `package` is reached.
    ///
    /// Collected from `main`, `bin` and `browser` in the manifest, then from
    /// the include patterns of `tsconfig.json` when the package has one.
    pub fn entry_points(&self, package: &Package) -> Result<Vec<PathBuf>> {
        let dir = package.absolute_path(&self.root);
        let manifest = Manifest::read_in(&dir)?;

        let mut entries: Vec<PathBuf> = Vec::new();
        let declared = manifest
            .main()
            .into_iter()
            .chain(manifest.bin())
            .chain(manifest.browser());
        for entry in declared {
            push_unique(&mut entries, normalize(&dir.join(entry)));
        }

        let tsconfig = dir.join(TSCONFIG_FILE);
        if tsconfig.is_file() {
            for file in tsconfig_sources(&dir, &tsconfig)? {
                push_unique(&mut entries, file);
            }
        }

        Ok(entries)
    }

    fn walk(&mut self, requested: &Path) -> Result<BTreeSet<String>> {
        let file = locate(requested)?;

        match self.visited.get(&file) {
            Some(Visit::Done(externals)) => {
                trace!(file = %file.display(), "already visited");
                return Ok(externals.clone());
            }
            // Import cycle: the file is still being walked further up the stack.
            Some(Visit::InProgress) => return Ok(BTreeSet::new()),
            None => {}
        }

        self.visited.insert(file.clone(), Visit::InProgress);
        match self.collect(&file) {
            Ok(externals) => {
                self.visited
                    .insert(file, Visit::Done(externals.clone()));
                Ok(externals)
            }
            Err(e) => {
                self.visited.remove(&file);
                Err(e)
            }
        }
    }

    fn collect(&mut self, file: &Path) -> Result<BTreeSet<String>> {
        let mut externals = BTreeSet::new();
        if !is_parseable(file) {
            debug!(file = %file.display(), "not a source file, skipping");
            return Ok(externals);
        }

        trace!(file = %file.display(), "finding imports");
        let source = fs::read_to_string(file)?;
        let specifiers = parse_imports(self.parsers, &source).map_err(|message| Error::Parse {
            path: file.to_path_buf(),
            message,
        })?;

        let dir = file.parent().unwrap_or(Path::new("."));
        for specifier in specifiers {
            if specifier.starts_with('.') {
                trace!(%specifier, "relative import, descending");
                let next = normalize(&dir.join(&specifier));
                externals.extend(self.walk(&next)?);
            } else {
                externals.insert(package_identifier(&specifier));
            }
        }
        Ok(externals)
    }
}

/// Reduces an import specifier to the package it names.
///
/// `@scope/foo/deep/path` becomes `@scope/foo` and `foo/bar` becomes `foo`.
pub fn package_identifier(specifier: &str) -> String {
    let mut segments = specifier.split('/');
    let first = segments.next().unwrap_or_default();
    if first.starts_with('@') {
        if let Some(second) = segments.next() {
            return format!("{}/{}", first, second);
        }
    }
    first.to_string()
}

/// Maps a requested module path to the file on disk.
///
/// Directories resolve to their `index` module; a missing path is retried
/// with each source extension appended.
fn locate(path: &Path) -> Result<PathBuf> {
    if path.is_dir() {
        trace!(path = %path.display(), "is a directory, descending to index");
        return locate(&path.join("index"));
    }
    if path.is_file() {
        return Ok(path.to_path_buf());
    }

    for ext in SOURCE_EXTENSIONS {
        let candidate = with_appended_extension(path, ext);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    debug!(path = %path.display(), "could not find module");
    Err(Error::SourceNotFound(path.to_path_buf()))
}

fn with_appended_extension(path: &Path, ext: &str) -> PathBuf {
    let mut raw: OsString = path.as_os_str().to_owned();
    raw.push(".");
    raw.push(ext);
    PathBuf::from(raw)
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext) || ext == "cjs")
}

/// Whether a reached file is worth parsing. Extensionless files, such as
/// `bin` scripts with a hashbang, are parsed.
fn is_parseable(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => !NON_SOURCE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => true,
    }
}

fn is_test_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| TEST_FILE.is_match(name))
}

fn push_unique(entries: &mut Vec<PathBuf>, path: PathBuf) {
    if !entries.contains(&path) {
        entries.push(path);
    }
}

/// Source files matched by the `include` patterns of a `tsconfig.json`.
fn tsconfig_sources(package_dir: &Path, tsconfig: &Path) -> Result<Vec<PathBuf>> {
    let content = fs::read_to_string(tsconfig)?;
    let value: Value =
        serde_json::from_str(&strip_jsonc(&content)).map_err(|error| Error::ManifestParse {
            path: tsconfig.to_path_buf(),
            error,
        })?;

    let patterns: Vec<&str> = value
        .get("include")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let escaped_dir = glob::Pattern::escape(&package_dir.to_string_lossy());
    let mut files = Vec::new();

    for pattern in patterns {
        let mut pattern = pattern.trim_start_matches("./").trim_end_matches('/').to_string();
        if package_dir.join(&pattern).is_dir() {
            pattern.push_str("/**/*");
        }
        let full = format!("{}/{}", escaped_dir.trim_end_matches('/'), pattern);
        let matches = glob::glob(&full).map_err(|e| Error::Glob {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;

        for path in matches.filter_map(|m| m.ok()) {
            let relative = path.strip_prefix(package_dir).unwrap_or(&path);
            let in_node_modules = relative
                .components()
                .any(|c| c.as_os_str() == "node_modules");
            if in_node_modules || !path.is_file() || !is_source_file(&path) || is_test_file(&path) {
                continue;
            }
            files.push(normalize(&path));
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Drops `//` and `/* */` comments and trailing commas, which `tsconfig.json`
/// permits but JSON does not.
fn strip_jsonc(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' => {
                out.push(c);
                i += 1;
                while i < chars.len() {
                    out.push(chars[i]);
                    if chars[i] == '\\' && i + 1 < chars.len() {
                        out.push(chars[i + 1]);
                        i += 2;
                        continue;
                    }
                    i += 1;
                    if chars[i - 1] == '"' {
                        break;
                    }
                }
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i + 1 < chars.len() && !(chars[i] == '*' && chars[i + 1] == '/') {
                    i += 1;
                }
                i += 2;
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
                let trailing = matches!(next, Some('}') | Some(']'));
                if !trailing {
                    out.push(c);
                }
                i += 1;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_identifier() {
        assert_eq!(package_identifier("lodash"), "lodash");
        assert_eq!(package_identifier("lodash/fp/map"), "lodash");
        assert_eq!(package_identifier("@scope/foo/deep/path"), "@scope/foo");
        assert_eq!(package_identifier("@scope/foo"), "@scope/foo");
    }

    #[test]
    fn test_is_test_file() {
        assert!(is_test_file(Path::new("src/foo.spec.ts")));
        assert!(is_test_file(Path::new("src/foo.test.jsx")));
        assert!(!is_test_file(Path::new("src/spec-helpers.ts")));
        assert!(!is_test_file(Path::new("src/index.ts")));
    }

    #[test]
    fn test_is_parseable() {
        assert!(is_parseable(Path::new("bin/cli")));
        assert!(is_parseable(Path::new("lib/index.cjs")));
        assert!(is_parseable(Path::new("src/App.jsx")));
        assert!(!is_parseable(Path::new("data/config.json")));
        assert!(!is_parseable(Path::new("styles/Main.CSS")));
        assert!(!is_parseable(Path::new("build/Release/addon.node")));
    }

    #[test]
    fn test_strip_jsonc() {
        let input = r#"{
            // compiler settings
            "compilerOptions": { "outDir": "dist/*" }, /* block */
            "include": ["src", "lib/**/*.ts",],
        }"#;
        let value: Value = serde_json::from_str(&strip_jsonc(input)).unwrap();
        assert_eq!(value["compilerOptions"]["outDir"], "dist/*");
        assert_eq!(value["include"][1], "lib/**/*.ts");
    }

    #[test]
    fn test_strip_jsonc_keeps_slashes_inside_strings() {
        let input = r#"{"url": "http://example.com/a", "glob": "src/**/*"}"#;
        let value: Value = serde_json::from_str(&strip_jsonc(input)).unwrap();
        assert_eq!(value["url"], "http://example.com/a");
        assert_eq!(value["glob"], "src/**/*");
    }
}
