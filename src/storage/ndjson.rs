//! NDJSON (Newline Delimited JSON) file operations

use eyre::{Context, Result, eyre};
use serde_json::Value;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::{Path, PathBuf};

/// Read NDJSON from a file
pub struct NdjsonReader {
    path: PathBuf,
}

impl NdjsonReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Read all lines as JSON values
    pub fn read(&self) -> Result<Vec<Value>> {
        self.records()?
            .map(|record| record.map(|(_, value)| value))
            .collect()
    }

    /// Stream records one line at a time
    ///
    /// Blank lines are skipped. Each item carries its 1-based line number.
    pub fn records(&self) -> Result<NdjsonRecords> {
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to read NDJSON file: {}", self.path.display()))?;
        Ok(NdjsonRecords {
            lines: BufReader::new(file).lines(),
            line: 0,
        })
    }
}

/// Line-by-line iterator over an NDJSON file
pub struct NdjsonRecords {
    lines: Lines<BufReader<File>>,
    line: usize,
}

impl Iterator for NdjsonRecords {
    type Item = Result<(usize, Value)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let text = match self.lines.next()? {
                Ok(text) => text,
                Err(e) => return Some(Err(e.into())),
            };
            self.line += 1;
            if text.trim().is_empty() {
                continue;
            }
            let line = self.line;
            return Some(
                serde_json::from_str(&text)
                    .map(|value| (line, value))
                    .with_context(|| format!("Failed to parse JSON line {}: {}", line, text)),
            );
        }
    }
}

/// Fans resources out into one `<resourceType>.ndjson` file per kind
///
/// Writers are opened in append mode on first use and owned by the fanout;
/// [`finish`](Self::finish) flushes and closes all of them.
pub struct ResourceFanout {
    dir: PathBuf,
    writers: BTreeMap<String, (BufWriter<File>, usize)>,
}

impl ResourceFanout {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            writers: BTreeMap::new(),
        }
    }

    /// Append one resource to the file for its kind
    pub fn write(&mut self, resource: &Value) -> Result<()> {
        let kind = resource
            .get("resourceType")
            .and_then(Value::as_str)
            .ok_or_else(|| eyre!("Resource missing 'resourceType' field: {}", resource))?;
        if kind.is_empty() || !kind.chars().all(|c| c.is_ascii_alphanumeric()) {
            eyre::bail!("Invalid resourceType '{}'", kind);
        }

        let (writer, count) = match self.writers.entry(kind.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert((open_append(&self.dir, kind)?, 0)),
        };

        serde_json::to_writer(&mut *writer, resource)?;
        writer.write_all(b"\n")?;
        *count += 1;
        Ok(())
    }

    /// Flush and close every writer, returning resources written per kind
    pub fn finish(self) -> Result<BTreeMap<String, usize>> {
        let mut counts = BTreeMap::new();
        for (kind, (mut writer, count)) in self.writers {
            writer
                .flush()
                .with_context(|| format!("Failed to flush {}.ndjson", kind))?;
            counts.insert(kind, count);
        }
        Ok(counts)
    }
}

fn open_append(dir: &Path, kind: &str) -> Result<BufWriter<File>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    let path = dir.join(format!("{}.ndjson", kind));
    log::debug!("Opening {}", path.display());
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open NDJSON file: {}", path.display()))?;
    Ok(BufWriter::new(file))
}
