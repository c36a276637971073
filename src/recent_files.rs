//! Recently opened diagrams, persisted next to the config file.

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use mmdpad_core::DiagramId;

/// Maximum number of recent diagrams to track
const MAX_RECENT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentDiagram {
    pub id: DiagramId,
    pub title: String,
}

#[derive(Debug, Default)]
pub struct RecentFiles {
    entries: Vec<RecentDiagram>,
    path: PathBuf,
}

impl RecentFiles {
    /// Load from the config directory
    pub fn load() -> Self {
        Self::load_from(crate::config::config_dir().join("recent.json"))
    }

    /// Load from a specific file; a missing or unreadable file gives an empty list
    pub fn load_from(path: PathBuf) -> Self {
        let entries = fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default();
        Self { entries, path }
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    /// Add a diagram (moves to front if already present)
    pub fn add(&mut self, id: DiagramId, title: impl Into<String>) {
        self.entries.retain(|e| e.id != id);
        self.entries.insert(0, RecentDiagram { id, title: title.into() });
        self.entries.truncate(MAX_RECENT);
    }

    pub fn remove(&mut self, id: DiagramId) {
        self.entries.retain(|e| e.id != id);
    }

    pub fn latest(&self) -> Option<&RecentDiagram> {
        self.entries.first()
    }

    pub fn contains(&self, id: DiagramId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecentDiagram> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_moves_to_front_and_caps() {
        let mut recent = RecentFiles::default();
        let ids: Vec<DiagramId> = (0..12).map(|_| DiagramId::new()).collect();
        for (i, id) in ids.iter().enumerate() {
            recent.add(*id, format!("d{i}"));
        }
        assert_eq!(recent.len(), MAX_RECENT);
        assert_eq!(recent.latest().unwrap().id, ids[11]);
        assert!(!recent.contains(ids[0]));

        recent.add(ids[5], "again");
        assert_eq!(recent.latest().unwrap().title, "again");
        assert_eq!(recent.len(), MAX_RECENT);
    }

    #[test]
    fn persists_between_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("recent.json");
        let id = DiagramId::new();

        let mut recent = RecentFiles::load_from(path.clone());
        assert!(recent.is_empty());
        recent.add(id, "Flow");
        recent.save().unwrap();

        let reloaded = RecentFiles::load_from(path);
        assert_eq!(reloaded.iter().next().unwrap().title, "Flow");
        reloaded.iter().for_each(|e| assert_eq!(e.id, id));
    }
}
