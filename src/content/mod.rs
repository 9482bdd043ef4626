//! Theme packs: named bundles of static content that flavour encounters and reminders.
//!
//! A pack lives under the configured directory either as a single
//! `<name>.json` file or as a `<name>/` folder holding `threats.json`,
//! `bosses.json`, `sidequests.json` and `narrative_snippets.json`. Unknown
//! names fall back to the `default` folder, and a missing `default` yields an
//! empty pack, so loading never fails.

pub mod seed;

pub use seed::*;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::DEFAULT_THEME_PACK;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreatEntry {
    pub name: String,
    pub tag: String,
    pub weight: i64,
    pub stakes: Vec<String>,
}

impl Default for ThreatEntry {
    fn default() -> Self {
        Self {
            name: String::new(),
            tag: "beast".to_string(),
            weight: 1,
            stakes: Vec::new(),
        }
    }
}

impl Weighted for ThreatEntry {
    fn weight(&self) -> i64 {
        self.weight
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemePack {
    pub threats: Vec<ThreatEntry>,
    pub bosses: Vec<Value>,
    pub sidequests: Vec<Value>,
    pub narrative: HashMap<String, Vec<String>>,
    /// Top-level keys of single-file packs that are not one of the sections above
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl ThemePack {
    /// Lines for `key`, preferring a top-level list over the `narrative` map.
    pub fn lines(&self, key: &str) -> Vec<String> {
        let top_level: Vec<String> = self
            .extra
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        if !top_level.is_empty() {
            return top_level;
        }
        self.narrative.get(key).cloned().unwrap_or_default()
    }

    /// A deterministic line for `key`, or `fallback` when the pack has none.
    pub fn narrative_line(&self, key: &str, seed: u64, fallback: &str) -> String {
        let lines = self.lines(key);
        pick_line(&lines, seed).unwrap_or_else(|| fallback.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct ThemePackLoader {
    base_dir: PathBuf,
}

impl ThemePackLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Pack names are plain identifiers; anything else could escape the pack directory.
    pub fn is_valid_name(name: &str) -> bool {
        !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    }

    /// Whether `name` resolves to a pack on disk (without falling back)
    pub fn exists(&self, name: &str) -> bool {
        Self::is_valid_name(name)
            && (self.single_file_path(name).is_file() || self.base_dir.join(name).is_dir())
    }

    pub fn load(&self, name: &str) -> ThemePack {
        let name = name.trim();
        let name = if name.is_empty() { DEFAULT_THEME_PACK } else { name };

        if !Self::is_valid_name(name) {
            tracing::warn!("Rejecting theme pack name {:?}, using default", name);
            return self.load_folder(&self.base_dir.join(DEFAULT_THEME_PACK));
        }

        let single_file = self.single_file_path(name);
        if single_file.is_file() {
            return read_json_or(&single_file, ThemePack::default());
        }

        let mut folder = self.base_dir.join(name);
        if !folder.is_dir() {
            tracing::debug!("Theme pack {} not found, falling back to default", name);
            folder = self.base_dir.join(DEFAULT_THEME_PACK);
        }
        self.load_folder(&folder)
    }

    /// Names of every pack in the directory, sorted
    pub fn list(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        names.insert(DEFAULT_THEME_PACK.to_string());

        let entries = match fs::read_dir(&self.base_dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("Theme pack directory {} unreadable: {}", self.base_dir.display(), e);
                return names.into_iter().collect();
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let name = if path.is_dir() {
                path.file_name().and_then(|n| n.to_str()).map(str::to_string)
            } else if path.extension().and_then(|e| e.to_str()) == Some("json") {
                path.file_stem().and_then(|n| n.to_str()).map(str::to_string)
            } else {
                None
            };

            if let Some(name) = name.filter(|n| Self::is_valid_name(n)) {
                names.insert(name);
            }
        }

        names.into_iter().collect()
    }

    fn single_file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", name))
    }

    fn load_folder(&self, folder: &Path) -> ThemePack {
        ThemePack {
            threats: read_json_or(&folder.join("threats.json"), Vec::new()),
            bosses: read_json_or(&folder.join("bosses.json"), Vec::new()),
            sidequests: read_json_or(&folder.join("sidequests.json"), Vec::new()),
            narrative: read_json_or(&folder.join("narrative_snippets.json"), HashMap::new()),
            extra: HashMap::new(),
        }
    }
}

/// Read a UTF-8 JSON file, tolerating a leading byte-order mark.
pub fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ContentError> {
    let text = fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    serde_json::from_str(text).map_err(|source| ContentError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json_or<T: for<'de> Deserialize<'de>>(path: &Path, fallback: T) -> T {
    if !path.exists() {
        return fallback;
    }
    match read_json(path) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("{}", e);
            fallback
        }
    }
}
