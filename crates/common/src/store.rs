//! Configuration store interface and the in-memory implementation
//!
//! The store is the only state shared between requests. Implementations are
//! expected to apply a whole mutation tree atomically.

use crate::{ConfigTree, Error, Filter, Result, Uci};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Backend holding the hierarchical router configuration
pub trait ConfigStore: Send + Sync {
    /// Read the subtree described by `filter`
    fn query(&self, filter: &Filter) -> Result<ConfigTree>;

    /// Write an accumulated mutation tree as one atomic change
    fn apply(&self, uci: &Uci) -> Result<()>;
}

/// Store keeping the configuration in memory, optionally mirrored to a JSON snapshot
pub struct MemoryStore {
    tree: RwLock<ConfigTree>,
    snapshot_path: Option<PathBuf>,
}

impl MemoryStore {
    pub fn new(tree: ConfigTree) -> Self {
        Self {
            tree: RwLock::new(tree),
            snapshot_path: None,
        }
    }

    /// Open a snapshot file; a missing file starts an empty store at that path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let tree = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            ConfigTree::new()
        };
        info!("Opened configuration snapshot at {:?}", path);
        Ok(Self {
            tree: RwLock::new(tree),
            snapshot_path: Some(path.to_path_buf()),
        })
    }

    /// Full copy of the current contents
    pub fn snapshot(&self) -> ConfigTree {
        self.tree.read().clone()
    }

    fn persist(&self, tree: &ConfigTree) -> Result<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(tree)?;
        // Snapshot is only ever replaced by rename
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, path)?;
        debug!("Persisted configuration snapshot to {:?}", path);
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(ConfigTree::new())
    }
}

impl ConfigStore for MemoryStore {
    fn query(&self, filter: &Filter) -> Result<ConfigTree> {
        Ok(self.tree.read().filtered(filter))
    }

    fn apply(&self, uci: &Uci) -> Result<()> {
        let mut tree = self.tree.write();
        let mut next = tree.clone();
        next.apply(uci);
        self.persist(&next)
            .map_err(|e| Error::Store(format!("failed to persist snapshot: {}", e)))?;
        *tree = next;
        debug!(configs = uci.configs().count(), "Applied mutation tree");
        Ok(())
    }
}
