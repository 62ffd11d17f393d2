//! User preference/activity store surface.
//!
//! The store itself is an external collaborator; the core only needs a
//! preference read and an atomic counter increment. A JSON-file
//! implementation is provided for single-node deployments, an in-memory one
//! for tests.

use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::enrich::SummaryStyle;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    pub default_country: String,
    pub default_category: String,
    pub default_language: String,
    pub summary_style: SummaryStyle,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            default_country: "worldwide".to_string(),
            default_category: "general".to_string(),
            default_language: "en".to_string(),
            summary_style: SummaryStyle::Concise,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    SummariesGenerated,
    FactChecksPerformed,
}

impl ActivityKind {
    fn key(self) -> &'static str {
        match self {
            ActivityKind::SummariesGenerated => "summaries_generated",
            ActivityKind::FactChecksPerformed => "fact_checks_performed",
        }
    }
}

/// Read + increment interface the pipelines depend on. Increments must be
/// atomic under concurrent requests.
pub trait ActivityStore: Send + Sync {
    fn preferences(&self, user: &str) -> Preferences;
    fn increment(&self, user: &str, kind: ActivityKind);
    fn count(&self, user: &str, kind: ActivityKind) -> u64;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UserRecord {
    #[serde(default)]
    preferences: Option<Preferences>,
    #[serde(default)]
    activity: HashMap<String, u64>,
}

/// File-backed store. All mutation happens under one mutex; writes go through
/// a temp file + rename so a crash never leaves a torn file.
pub struct JsonFileStore {
    path: PathBuf,
    state: Mutex<HashMap<String, UserRecord>>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = std::fs::read_to_string(&path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();
        Self {
            path,
            state: Mutex::new(state),
        }
    }

    fn persist(path: &Path, state: &HashMap<String, UserRecord>) -> io::Result<()> {
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(state).unwrap_or_else(|_| "{}".to_string());
        let mut f = std::fs::File::create(&tmp)?;
        f.write_all(json.as_bytes())?;
        std::fs::rename(tmp, path)?;
        Ok(())
    }
}

impl ActivityStore for JsonFileStore {
    fn preferences(&self, user: &str) -> Preferences {
        let state = self.state.lock().expect("activity store mutex poisoned");
        state
            .get(user)
            .and_then(|r| r.preferences.clone())
            .unwrap_or_default()
    }

    fn increment(&self, user: &str, kind: ActivityKind) {
        let mut state = self.state.lock().expect("activity store mutex poisoned");
        let record = state.entry(user.to_string()).or_default();
        *record.activity.entry(kind.key().to_string()).or_insert(0) += 1;
        if let Err(e) = Self::persist(&self.path, &state) {
            tracing::warn!(error = %e, path = %self.path.display(), "activity store write failed");
        }
    }

    fn count(&self, user: &str, kind: ActivityKind) -> u64 {
        let state = self.state.lock().expect("activity store mutex poisoned");
        state
            .get(user)
            .and_then(|r| r.activity.get(kind.key()))
            .copied()
            .unwrap_or(0)
    }
}

/// In-memory store for tests and keyless deployments.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<HashMap<String, UserRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ActivityStore for MemoryStore {
    fn preferences(&self, user: &str) -> Preferences {
        let state = self.state.lock().expect("activity store mutex poisoned");
        state
            .get(user)
            .and_then(|r| r.preferences.clone())
            .unwrap_or_default()
    }

    fn increment(&self, user: &str, kind: ActivityKind) {
        let mut state = self.state.lock().expect("activity store mutex poisoned");
        let record = state.entry(user.to_string()).or_default();
        *record.activity.entry(kind.key().to_string()).or_insert(0) += 1;
    }

    fn count(&self, user: &str, kind: ActivityKind) -> u64 {
        let state = self.state.lock().expect("activity store mutex poisoned");
        state
            .get(user)
            .and_then(|r| r.activity.get(kind.key()))
            .copied()
            .unwrap_or(0)
    }
}
