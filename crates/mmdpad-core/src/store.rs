//! Local diagram store: one JSON document per diagram in a data directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{info, warn};
use uuid::Uuid;

use crate::diagram::{Diagram, DiagramId};

/// Default data directory (`$XDG_DATA_HOME/mmdpad`, falling back to ~/.local/share)
pub fn default_data_dir() -> PathBuf {
    let data_dir = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".local/share")
        });
    data_dir.join("mmdpad")
}

/// 64 hex chars from 32 random bytes
fn generate_share_token() -> String {
    let mut bytes = [0u8; 32];
    bytes[..16].copy_from_slice(Uuid::new_v4().as_bytes());
    bytes[16..].copy_from_slice(Uuid::new_v4().as_bytes());
    hex::encode(bytes)
}

/// Diagram documents stored under `<data dir>/diagrams`
#[derive(Debug, Clone)]
pub struct DiagramStore {
    dir: PathBuf,
}

impl DiagramStore {
    /// Open (and create if needed) the store rooted at a data directory
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let dir = data_dir.as_ref().join("diagrams");
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create store directory {:?}", dir))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: DiagramId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    fn read(&self, path: &Path) -> Result<Diagram> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
    }

    fn write(&self, diagram: &Diagram) -> Result<()> {
        let path = self.path_for(diagram.id);
        let tmp = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(diagram)?;
        fs::write(&tmp, content).with_context(|| format!("Failed to write {:?}", tmp))?;
        fs::rename(&tmp, &path).with_context(|| format!("Failed to save {:?}", path))?;
        Ok(())
    }

    /// All diagrams, most recently updated first. Unreadable files are skipped.
    pub fn list(&self) -> Result<Vec<Diagram>> {
        let mut diagrams = Vec::new();
        let entries =
            fs::read_dir(&self.dir).with_context(|| format!("Failed to list {:?}", self.dir))?;
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            match self.read(&path) {
                Ok(diagram) => diagrams.push(diagram),
                Err(e) => warn!("skipping {:?}: {:#}", path, e),
            }
        }
        diagrams.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(diagrams)
    }

    pub fn get(&self, id: DiagramId) -> Result<Diagram> {
        let path = self.path_for(id);
        if !path.exists() {
            bail!("Diagram {id} not found");
        }
        self.read(&path)
    }

    /// Store a new diagram. Blank content is refused.
    pub fn create(&self, title: &str, content: &str) -> Result<Diagram> {
        ensure_content(content)?;
        let diagram = Diagram::new(title, content);
        self.write(&diagram)?;
        info!(id = %diagram.id, kind = %diagram.diagram_type, "diagram created");
        Ok(diagram)
    }

    /// Overwrite title and content of an existing diagram. Blank content is refused.
    pub fn update(&self, id: DiagramId, title: &str, content: &str) -> Result<Diagram> {
        ensure_content(content)?;
        let mut diagram = self.get(id)?;
        diagram.edit(title, content);
        self.write(&diagram)?;
        info!(id = %diagram.id, kind = %diagram.diagram_type, "diagram updated");
        Ok(diagram)
    }

    pub fn delete(&self, id: DiagramId) -> Result<()> {
        let path = self.path_for(id);
        fs::remove_file(&path).with_context(|| format!("Failed to delete diagram {id}"))?;
        info!(%id, "diagram deleted");
        Ok(())
    }

    /// Turn public sharing on or off.
    ///
    /// Enabling keeps the current token if there is one and generates one
    /// otherwise. Disabling drops the token, so enabling again later issues a
    /// fresh one.
    pub fn set_sharing(&self, id: DiagramId, public: bool) -> Result<Diagram> {
        let mut diagram = self.get(id)?;
        diagram.is_public = public;
        diagram.share_token = if public {
            Some(diagram.share_token.take().unwrap_or_else(generate_share_token))
        } else {
            None
        };
        diagram.updated_at = chrono::Utc::now();
        self.write(&diagram)?;
        info!(%id, public, "sharing changed");
        Ok(diagram)
    }

    /// Fetch a public diagram by share token, counting the view
    pub fn open_shared(&self, token: &str) -> Result<Diagram> {
        let token = token.trim();
        let Some(mut diagram) = self
            .list()?
            .into_iter()
            .find(|d| d.is_public && d.share_token.as_deref() == Some(token))
        else {
            bail!("Shared diagram not found or not public");
        };
        diagram.view_count += 1;
        self.write(&diagram)?;
        Ok(diagram)
    }
}

fn ensure_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        bail!("Please add some content to your diagram");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::DiagramType;

    fn store() -> (tempfile::TempDir, DiagramStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = DiagramStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn create_get_update_delete() {
        let (_dir, store) = store();
        let created = store.create("Flow", "flowchart TD\n A-->B").unwrap();
        assert_eq!(store.get(created.id).unwrap(), created);

        let updated = store.update(created.id, "Seq", "sequenceDiagram\n A->>B: hi").unwrap();
        assert_eq!(updated.diagram_type, DiagramType::Sequence);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(store.get(created.id).unwrap().title, "Seq");

        store.delete(created.id).unwrap();
        assert!(store.get(created.id).is_err());
        assert!(store.delete(created.id).is_err());
    }

    #[test]
    fn blank_content_is_refused() {
        let (_dir, store) = store();
        assert!(store.create("Empty", "  \n\t").is_err());
        let diagram = store.create("Pie", "pie").unwrap();
        assert!(store.update(diagram.id, "Pie", "").is_err());
        assert_eq!(store.get(diagram.id).unwrap().content, "pie");
    }

    #[test]
    fn list_is_newest_first_and_skips_garbage() {
        let (_dir, store) = store();
        let first = store.create("First", "gantt").unwrap();
        let second = store.create("Second", "pie").unwrap();
        store.update(first.id, "First again", "gantt\n title x").unwrap();
        fs::write(store.dir().join("broken.json"), "{not json").unwrap();
        fs::write(store.dir().join("notes.txt"), "ignored").unwrap();

        let ids: Vec<DiagramId> = store.list().unwrap().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[test]
    fn sharing_keeps_token_until_disabled() {
        let (_dir, store) = store();
        let diagram = store.create("Shared", "mindmap\n root").unwrap();

        let shared = store.set_sharing(diagram.id, true).unwrap();
        let token = shared.share_token.clone().unwrap();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));

        let again = store.set_sharing(diagram.id, true).unwrap();
        assert_eq!(again.share_token.as_deref(), Some(token.as_str()));

        let private = store.set_sharing(diagram.id, false).unwrap();
        assert!(!private.is_public);
        assert!(private.share_token.is_none());
        assert!(store.open_shared(&token).is_err());
    }

    #[test]
    fn open_shared_counts_views() {
        let (_dir, store) = store();
        let diagram = store.create("Shared", "pie").unwrap();
        let token = store.set_sharing(diagram.id, true).unwrap().share_token.unwrap();

        assert_eq!(store.open_shared(&token).unwrap().view_count, 1);
        assert_eq!(store.open_shared(&token).unwrap().view_count, 2);
        assert_eq!(store.get(diagram.id).unwrap().view_count, 2);
        assert!(store.open_shared("nope").is_err());
    }
}
