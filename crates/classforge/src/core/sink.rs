//! Output sinks for generated source units
//!
//! Generation never touches the filesystem directly. It hands each unit to an
//! [`OutputSink`], keyed by file name, so callers decide where code lands.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use anyhow::Result;
use tracing::{debug, warn};

use super::DiagramError;

/// Destination for generated source units
pub trait OutputSink {
    /// Write one unit. Writing the same name twice replaces the earlier unit.
    fn write_unit(&mut self, file_name: &str, contents: &str) -> Result<()>;
}

/// Writes each unit as a file inside a directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    /// Create a sink rooted at `root`, creating the directory if needed
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| DiagramError::sink_error(&root, e))?;
        Ok(Self { root })
    }

    /// Directory the units are written to
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl OutputSink for DirectorySink {
    fn write_unit(&mut self, file_name: &str, contents: &str) -> Result<()> {
        let path = self.root.join(file_name);
        if !is_plain_file_name(file_name) {
            return Err(DiagramError::sink_error(
                &path,
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "file name must not contain path separators",
                ),
            )
            .into());
        }
        if path.exists() {
            warn!(path = %path.display(), "Overwriting existing source file");
        }
        fs::write(&path, contents).map_err(|e| DiagramError::sink_error(&path, e))?;
        debug!(path = %path.display(), bytes = contents.len(), "Wrote source unit");
        Ok(())
    }
}

/// True when `file_name` names an entry directly inside the sink directory
fn is_plain_file_name(file_name: &str) -> bool {
    let mut components = Path::new(file_name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !file_name.contains(['/', '\\'])
}

/// Keeps units in memory, ordered by file name
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    units: BTreeMap<String, String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, file_name: &str) -> Option<&str> {
        self.units.get(file_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn units(&self) -> impl Iterator<Item = (&str, &str)> {
        self.units.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_units(self) -> BTreeMap<String, String> {
        self.units
    }
}

impl OutputSink for MemorySink {
    fn write_unit(&mut self, file_name: &str, contents: &str) -> Result<()> {
        if self
            .units
            .insert(file_name.to_string(), contents.to_string())
            .is_some()
        {
            warn!(file_name, "Replacing source unit with the same name");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_sink_orders_by_name() {
        let mut sink = MemorySink::new();
        sink.write_unit("Zebra.java", "z").unwrap();
        sink.write_unit("Apple.java", "a").unwrap();

        let names: Vec<_> = sink.units().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Apple.java", "Zebra.java"]);
    }

    #[test]
    fn test_memory_sink_replaces_duplicates() {
        let mut sink = MemorySink::new();
        sink.write_unit("Dup.java", "first").unwrap();
        sink.write_unit("Dup.java", "second").unwrap();

        assert_eq!(sink.len(), 1);
        assert_eq!(sink.get("Dup.java"), Some("second"));

        let units = sink.into_units();
        assert_eq!(units.get("Dup.java").map(String::as_str), Some("second"));
    }

    #[test]
    fn test_directory_sink_writes_files() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("nested/out");
        let mut sink = DirectorySink::create(&root).unwrap();
        sink.write_unit("Person.java", "public class Person {}\n").unwrap();

        let written = fs::read_to_string(root.join("Person.java")).unwrap();
        assert_eq!(written, "public class Person {}\n");
        assert_eq!(sink.root(), root.as_path());
    }

    #[test]
    fn test_directory_sink_stays_inside_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("out");
        let mut sink = DirectorySink::create(&root).unwrap();

        for name in ["../Escaped.java", "a/b.java", "/tmp/Abs.java", "..", "x\\y.java"] {
            let err = sink.write_unit(name, "class X {}").unwrap_err();
            assert!(err.to_string().contains("Sink error"), "{name}: {err}");
        }

        assert!(!dir.path().join("Escaped.java").exists());
        assert!(!root.join("a").exists());
        assert_eq!(fs::read_dir(&root).unwrap().count(), 0);
    }

    #[test]
    fn test_plain_file_names() {
        assert!(is_plain_file_name("Person.java"));
        assert!(is_plain_file_name("..Odd.java"));
        assert!(!is_plain_file_name("../Person.java"));
        assert!(!is_plain_file_name("."));
        assert!(!is_plain_file_name(""));
    }
}
