//! Karma counters and their JSON database.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// Item name → karma score, persisted as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KarmaStore {
    db: BTreeMap<String, i64>,
}

impl KarmaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the database at `path`. A missing file gives an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("could not read {}", path.display()))?;
        if data.trim().is_empty() {
            return Ok(Self::new());
        }
        let db = serde_json::from_str(&data)
            .with_context(|| format!("could not decode karma from {}", path.display()))?;
        Ok(Self { db })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("could not create {}", parent.display()))?;
        }
        let data = serde_json::to_string_pretty(&self.db).context("could not encode karma")?;
        std::fs::write(path, data).with_context(|| format!("could not write to {}", path.display()))
    }

    pub fn increment(&mut self, item: &str) -> i64 {
        let score = self.db.entry(item.to_string()).or_insert(0);
        *score += 1;
        *score
    }

    pub fn decrement(&mut self, item: &str) -> i64 {
        let score = self.db.entry(item.to_string()).or_insert(0);
        *score -= 1;
        *score
    }

    pub fn query(&self, item: &str) -> i64 {
        self.db.get(item).copied().unwrap_or(0)
    }

    /// The `n` highest scores, ties in name order.
    pub fn top(&self, n: usize) -> Vec<(&str, i64)> {
        let mut entries = self.entries();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        entries.truncate(n);
        entries
    }

    /// The `n` lowest scores, ties in name order.
    pub fn bottom(&self, n: usize) -> Vec<(&str, i64)> {
        let mut entries = self.entries();
        entries.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(b.0)));
        entries.truncate(n);
        entries
    }

    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    fn entries(&self) -> Vec<(&str, i64)> {
        self.db.iter().map(|(k, v)| (k.as_str(), *v)).collect()
    }
}
