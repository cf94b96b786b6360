use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// User-configurable storage locations for the event log and view caches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional custom root directory for all persisted data.
    /// Defaults to `~/Documents/Fincast`.
    pub data_root: Option<PathBuf>,

    #[serde(default = "Config::default_events_file")]
    pub events_file: String,

    #[serde(default = "Config::default_views_dir")]
    pub views_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_root: None,
            events_file: Self::default_events_file(),
            views_dir: Self::default_views_dir(),
        }
    }
}

impl Config {
    pub fn default_events_file() -> String {
        "events.jsonl".into()
    }

    pub fn default_views_dir() -> String {
        "views".into()
    }

    pub fn resolve_data_root(&self) -> PathBuf {
        if let Some(path) = &self.data_root {
            return path.clone();
        }

        let base = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("Fincast")
    }

    /// Full path of the append-only event log file.
    pub fn events_path(&self) -> PathBuf {
        self.resolve_data_root().join(&self.events_file)
    }

    /// Root directory for the materialized view collections.
    pub fn views_root(&self) -> PathBuf {
        self.resolve_data_root().join(&self.views_dir)
    }
}
