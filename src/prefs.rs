use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context as _;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::formats::{Language, Theme};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UserPreferences {
    pub theme: Theme,
    pub language: Language,
}

/// Where preferences survive between runs. Read once at startup, written on
/// every change.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn load(&self) -> anyhow::Result<UserPreferences>;
    async fn save(&self, prefs: &UserPreferences) -> anyhow::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `preferences.json` inside `data_dir`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join("preferences.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PreferenceStore for FilePreferenceStore {
    async fn load(&self) -> anyhow::Result<UserPreferences> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(UserPreferences::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("read: {}", self.path.display()));
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(prefs) => Ok(prefs),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), ?err, "unreadable preferences; using defaults");
                Ok(UserPreferences::default())
            }
        }
    }

    async fn save(&self, prefs: &UserPreferences) -> anyhow::Result<()> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("create parent dir: {}", parent.display()))?;

        let tmp_path = self
            .path
            .with_extension(format!("tmp.{}", uuid::Uuid::new_v4().simple()));
        let data = serde_json::to_vec_pretty(prefs).context("serialize preferences")?;
        fs::write(&tmp_path, &data)
            .await
            .with_context(|| format!("write tmp: {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .with_context(|| format!("rename tmp to final: {}", self.path.display()))?;
        Ok(())
    }
}

/// Keeps preferences for the lifetime of the process only.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    prefs: Mutex<Option<UserPreferences>>,
}

impl MemoryPreferenceStore {
    pub fn with(prefs: UserPreferences) -> Self {
        Self {
            prefs: Mutex::new(Some(prefs)),
        }
    }

    /// Last saved value, if anything was saved or seeded.
    pub fn saved(&self) -> Option<UserPreferences> {
        *self.prefs.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn load(&self) -> anyhow::Result<UserPreferences> {
        Ok(self.saved().unwrap_or_default())
    }

    async fn save(&self, prefs: &UserPreferences) -> anyhow::Result<()> {
        *self.prefs.lock().unwrap_or_else(|e| e.into_inner()) = Some(*prefs);
        Ok(())
    }
}
