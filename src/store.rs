use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::StorageConfig;
use crate::model::entry::Entry;

/// What was found at the primary location.
#[derive(Debug)]
pub enum StoredBatch {
    Missing,
    /// `rejected` counts array items that could not be read as entries.
    Loaded { entries: Vec<Entry>, rejected: usize },
    Malformed(String),
}

impl StoredBatch {
    /// Missing and malformed files both read as an empty batch.
    pub fn into_entries(self) -> Vec<Entry> {
        match self {
            StoredBatch::Loaded { entries, .. } => entries,
            StoredBatch::Missing | StoredBatch::Malformed(_) => Vec::new(),
        }
    }
}

/// JSON batch written to a primary file and mirrored, best-effort, to a
/// second location for the dashboard.
pub struct BatchStore {
    primary: PathBuf,
    mirror: Option<PathBuf>,
}

impl BatchStore {
    pub fn new(primary: PathBuf, mirror: Option<PathBuf>) -> Self {
        Self { primary, mirror }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(
            config.primary.clone(),
            config.mirror_path().map(Path::to_path_buf),
        )
    }

    pub fn primary(&self) -> &Path {
        &self.primary
    }

    pub fn load(&self) -> Result<StoredBatch> {
        let contents = match std::fs::read_to_string(&self.primary) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No existing {} found", self.primary.display());
                return Ok(StoredBatch::Missing);
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read {}", self.primary.display()))
            }
        };

        let items = match serde_json::from_str::<Vec<serde_json::Value>>(&contents) {
            Ok(items) => items,
            Err(e) => {
                warn!("Error parsing {}: {e}", self.primary.display());
                return Ok(StoredBatch::Malformed(e.to_string()));
            }
        };

        let mut entries = Vec::with_capacity(items.len());
        let mut rejected = 0;
        for (index, item) in items.into_iter().enumerate() {
            match serde_json::from_value::<Entry>(item) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    warn!("Skipping unreadable entry {index} in {}: {e}", self.primary.display());
                    rejected += 1;
                }
            }
        }
        info!(
            "Loaded {} existing entries from {}",
            entries.len(),
            self.primary.display()
        );
        Ok(StoredBatch::Loaded { entries, rejected })
    }

    /// Write the primary copy, then the mirror. A mirror failure is logged
    /// and does not touch the primary.
    pub fn save(&self, entries: &[Entry]) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)?;

        write_file(&self.primary, &json)
            .with_context(|| format!("Failed to write {}", self.primary.display()))?;
        info!("Saved {} entries to {}", entries.len(), self.primary.display());

        if let Some(mirror) = &self.mirror {
            match write_file(mirror, &json) {
                Ok(()) => info!("Saved {} entries to {}", entries.len(), mirror.display()),
                Err(e) => warn!("Could not save to {}: {e}", mirror.display()),
            }
        }
        Ok(())
    }
}

fn write_file(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)
}
