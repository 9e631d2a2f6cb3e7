use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::models::{HistoryEntry, TrendPoint};

/// Persisted history slot: one JSON file holding the whole list
#[derive(Debug, Clone)]
pub struct HistoryFile {
    path: PathBuf,
}

impl HistoryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored list. Missing or unreadable data is an empty history.
    pub fn load(&self) -> Vec<HistoryEntry> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!("Ignoring unreadable history at {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
            Ok(entries) => {
                tracing::info!("Loaded {} history entries", entries.len());
                entries
            }
            Err(e) => {
                tracing::warn!("Discarding malformed history at {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    /// Overwrites the slot with the full list
    pub fn save(&self, entries: &[HistoryEntry]) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating history directory {}", parent.display()))?;
        }

        let raw = serde_json::to_string(entries)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("writing history to {}", self.path.display()))?;
        Ok(())
    }
}

/// Risk series for trend display, oldest assessment first
pub fn trend(history: &[HistoryEntry]) -> Vec<TrendPoint> {
    history
        .iter()
        .rev()
        .enumerate()
        .map(|(i, entry)| TrendPoint {
            label: format!("#{}", i + 1),
            risk_percentage: entry.result.risk_percentage,
            category: entry.result.risk_category,
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/history_tests.rs"]
mod tests;
