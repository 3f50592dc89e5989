//! Theme persistence.
//!
//! The widget keeps exactly one blob: the serialized theme under a single key.
//! Storage is a collaborator passed into [`ThemeSettings`], so callers choose
//! between the in-memory store and the file store (or bring their own).

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{MarkupError, MarkupResult};
use crate::theme::{ThemeConfig, ThemePatch};

/// Key the serialized theme is stored under
pub const THEME_KEY: &str = "chatbot-theme";

/// Single-key storage for the serialized theme
pub trait ThemeStore {
    /// Returns the stored blob, or `None` if nothing was saved.
    fn load(&self) -> MarkupResult<Option<String>>;
    fn save(&mut self, json: &str) -> MarkupResult<()>;
    fn clear(&mut self) -> MarkupResult<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryThemeStore {
    value: Option<String>,
}

impl MemoryThemeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(json: impl Into<String>) -> Self {
        Self {
            value: Some(json.into()),
        }
    }
}

impl ThemeStore for MemoryThemeStore {
    fn load(&self) -> MarkupResult<Option<String>> {
        Ok(self.value.clone())
    }

    fn save(&mut self, json: &str) -> MarkupResult<()> {
        self.value = Some(json.to_string());
        Ok(())
    }

    fn clear(&mut self) -> MarkupResult<()> {
        self.value = None;
        Ok(())
    }
}

/// Stores the theme as `<dir>/chatbot-theme.json`
#[derive(Debug, Clone)]
pub struct FileThemeStore {
    path: PathBuf,
}

impl FileThemeStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", THEME_KEY)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ThemeStore for FileThemeStore {
    fn load(&self) -> MarkupResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(MarkupError::Storage(format!(
                "failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn save(&mut self, json: &str) -> MarkupResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                MarkupError::Storage(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }
        fs::write(&self.path, json).map_err(|e| {
            MarkupError::Storage(format!("failed to write {}: {}", self.path.display(), e))
        })
    }

    fn clear(&mut self) -> MarkupResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MarkupError::Storage(format!(
                "failed to remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

/// The active theme plus the store it is persisted to
#[derive(Debug)]
pub struct ThemeSettings<S: ThemeStore> {
    store: S,
    theme: ThemeConfig,
}

impl<S: ThemeStore> ThemeSettings<S> {
    /// Start from the stored theme. A missing, unreadable or invalid blob
    /// leaves the default theme in place.
    pub fn load(store: S) -> Self {
        let theme = match store.load() {
            Ok(Some(json)) => ThemeConfig::from_json(&json).unwrap_or_else(|e| {
                warn!(error = %e, "ignoring saved theme");
                ThemeConfig::default()
            }),
            Ok(None) => ThemeConfig::default(),
            Err(e) => {
                warn!(error = %e, "theme store unavailable, using default theme");
                ThemeConfig::default()
            }
        };
        Self { store, theme }
    }

    pub fn theme(&self) -> &ThemeConfig {
        &self.theme
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Apply a partial update and persist the result.
    pub fn update(&mut self, patch: ThemePatch) -> MarkupResult<()> {
        let next = self.theme.apply(patch);
        next.validate()?;
        self.persist(next)
    }

    /// Back to defaults; the stored blob is removed.
    pub fn reset(&mut self) -> MarkupResult<()> {
        self.store.clear()?;
        self.theme = ThemeConfig::default();
        debug!("theme reset to defaults");
        Ok(())
    }

    pub fn export(&self) -> MarkupResult<String> {
        self.theme.to_json_pretty()
    }

    /// Replace the theme with `json` merged over the defaults. On error the
    /// current theme and the store are left untouched.
    pub fn import(&mut self, json: &str) -> MarkupResult<()> {
        let theme = ThemeConfig::from_json(json)?;
        self.persist(theme)
    }

    fn persist(&mut self, theme: ThemeConfig) -> MarkupResult<()> {
        self.store.save(&serde_json::to_string(&theme)?)?;
        self.theme = theme;
        debug!(brand = %self.theme.brand_name, "theme saved");
        Ok(())
    }
}
