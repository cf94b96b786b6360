//! Filesystem JSON backends for the kernel's storage seams.
//!
//! Events live in a JSON-lines file opened in append mode, so the file
//! itself is an ordered, durable append log. Derived views live as one
//! blob per key under a directory per collection, written atomically.

use std::{
    fs::{self, File, OpenOptions},
    io::{BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

use fincast_core::{CoreError, EventStore, ViewCollection, ViewStore};
use fincast_domain::{Event, MonthlyFinances};
use uuid::Uuid;

const VIEW_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

/// Append-only event persistence: one JSON record per line.
pub struct JsonEventStore {
    path: PathBuf,
}

impl JsonEventStore {
    pub fn new(path: PathBuf) -> Result<Self, CoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventStore for JsonEventStore {
    fn append_events(&self, events: &[Event]) -> Result<(), CoreError> {
        if events.is_empty() {
            return Ok(());
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut buffer = String::new();
        for event in events {
            let line = serde_json::to_string(event)
                .map_err(|err| CoreError::Serde(err.to_string()))?;
            buffer.push_str(&line);
            buffer.push('\n');
        }
        file.write_all(buffer.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    fn load_events(&self) -> Result<Vec<Event>, CoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(File::open(&self.path)?);
        let mut events = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            // Unknown event tags fail the load; they are never skipped.
            let event: Event = serde_json::from_str(&line)
                .map_err(|err| CoreError::Serde(err.to_string()))?;
            events.push(event);
        }
        Ok(events)
    }

    fn clear_events(&self) -> Result<(), CoreError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// Keyed blob store for derived views: a directory per collection, one
/// `<uuid>.json` file per key.
#[derive(Clone)]
pub struct JsonViewStore {
    root: PathBuf,
}

impl JsonViewStore {
    pub fn new(root: PathBuf) -> Result<Self, CoreError> {
        for collection in ViewCollection::ALL {
            fs::create_dir_all(root.join(collection.name()))?;
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, collection: ViewCollection, key: Uuid) -> PathBuf {
        self.root
            .join(collection.name())
            .join(format!("{}.{}", key, VIEW_EXTENSION))
    }
}

impl ViewStore for JsonViewStore {
    fn put(
        &self,
        collection: ViewCollection,
        key: Uuid,
        value: &MonthlyFinances,
    ) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|err| CoreError::Serde(err.to_string()))?;
        let path = self.entry_path(collection, key);
        let tmp = tmp_path(&path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn get(
        &self,
        collection: ViewCollection,
        key: Uuid,
    ) -> Result<Option<MonthlyFinances>, CoreError> {
        let path = self.entry_path(collection, key);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&path)?;
        let value =
            serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))?;
        Ok(Some(value))
    }

    fn keys(&self, collection: ViewCollection) -> Result<Vec<Uuid>, CoreError> {
        let dir = self.root.join(collection.name());
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(VIEW_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                if let Ok(key) = stem.parse::<Uuid>() {
                    keys.push(key);
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn clear(&self, collection: ViewCollection) -> Result<(), CoreError> {
        let dir = self.root.join(collection.name());
        if !dir.exists() {
            return Ok(());
        }
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some(VIEW_EXTENSION) {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
