// src/ledger.rs
//! Durable deduplication ledger: one identity per line, append-only.
//!
//! The full set is loaded at open; `mark_seen` appends and syncs the file
//! before the identity is reflected in memory, so a crash between collection
//! and publishing never re-emits an item. Entries are never removed.
//! Single-writer access per ledger file is assumed.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct SeenLedger {
    path: PathBuf,
    seen: HashSet<String>,
}

impl SeenLedger {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut seen = HashSet::new();
        match fs::read_to_string(&path) {
            Ok(content) => {
                for line in content.lines() {
                    let id = line.trim();
                    if !id.is_empty() {
                        seen.insert(id.to_string());
                    }
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| format!("reading ledger at {}", path.display()))
            }
        }
        Ok(Self { path, seen })
    }

    pub fn has_seen(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Append the identity to durable storage, then reflect it in memory.
    /// Idempotent for identities already recorded.
    pub fn mark_seen(&mut self, id: &str) -> Result<()> {
        if self.seen.contains(id) {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating ledger dir {}", parent.display()))?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening ledger at {}", self.path.display()))?;
        writeln!(file, "{id}").context("appending to ledger")?;
        file.sync_data().context("syncing ledger")?;
        self.seen.insert(id.to_string());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_empty_ledger() {
        let tmp = tempfile::tempdir().unwrap();
        let ledger = SeenLedger::open(tmp.path().join("seen.txt")).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn mark_seen_survives_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("data").join("seen.txt");

        let mut ledger = SeenLedger::open(&path).unwrap();
        ledger.mark_seen("abc123").unwrap();
        ledger.mark_seen("def456").unwrap();
        assert!(ledger.has_seen("abc123"));

        let reopened = SeenLedger::open(&path).unwrap();
        assert_eq!(reopened.len(), 2);
        assert!(reopened.has_seen("abc123"));
        assert!(reopened.has_seen("def456"));
        assert!(!reopened.has_seen("zzz"));
    }

    #[test]
    fn mark_seen_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("seen.txt");

        let mut ledger = SeenLedger::open(&path).unwrap();
        ledger.mark_seen("same-id").unwrap();
        ledger.mark_seen("same-id").unwrap();
        assert_eq!(ledger.len(), 1);

        let lines = fs::read_to_string(&path).unwrap();
        assert_eq!(lines.lines().count(), 1);
    }
}
