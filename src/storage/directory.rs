//! Directory listing for load inputs

use eyre::{Context, Result};
use std::path::{Path, PathBuf};

/// List regular files in `dir` with the given extension, sorted by path
///
/// Not recursive. The extension is compared without the leading dot.
///
/// # Errors
/// Returns an error if the directory does not exist or cannot be read.
pub fn list_files(dir: impl AsRef<Path>, extension: &str) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some(extension) {
            files.push(path);
        }
    }
    files.sort();

    log::debug!(
        "Found {} *.{} file(s) in {}",
        files.len(),
        extension,
        dir.display()
    );
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_filters_and_sorts() {
        let temp = TempDir::new().unwrap();
        for name in ["b.json", "a.json", "c.ndjson", "notes.txt"] {
            std::fs::write(temp.path().join(name), "{}").unwrap();
        }
        std::fs::create_dir(temp.path().join("nested.json")).unwrap();

        let files = list_files(temp.path(), "json").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);

        let ndjson = list_files(temp.path(), "ndjson").unwrap();
        assert_eq!(ndjson.len(), 1);
    }

    #[test]
    fn test_missing_directory() {
        let temp = TempDir::new().unwrap();
        assert!(list_files(temp.path().join("missing"), "json").is_err());
    }
}
