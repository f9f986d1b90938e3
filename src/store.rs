//! Locale store: the ordered, write-once set of locale records for a build.
//!
//! The store is an explicitly constructed value passed by reference into
//! every consumer. It is populated exactly once per build, by either the
//! generation path (extraction + translation) or the reuse path (loading
//! persisted per-locale files), and read-only afterward.
//!
//! Two durable artifacts exist on disk: one `<code>.json` per locale (the
//! generation output and the reuse input) and a single cache file holding
//! the full ordered sequence for runtime utilities in later processes.
//! Read failures degrade rather than abort: a bad per-locale file is
//! skipped, a bad cache file yields an empty store.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::warn;

use crate::extract::list_files;
use crate::locale::Locale;

/// Why a persisted locale file could not be turned into a record.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path} as a locale record")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Ordered sequence of locale records, unique by code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocaleStore {
    locales: Vec<Locale>,
}

impl LocaleStore {
    /// Build a store from an already-ordered sequence of records.
    pub fn new(locales: Vec<Locale>) -> LocaleStore {
        LocaleStore { locales }
    }

    /// All records, in configuration order.
    pub fn locales(&self) -> &[Locale] {
        &self.locales
    }

    /// Configured locale codes, in configuration order.
    pub fn codes(&self) -> Vec<&str> {
        self.locales.iter().map(|l| l.code.as_str()).collect()
    }

    /// Look up a record by exact code.
    pub fn get(&self, code: &str) -> Option<&Locale> {
        self.locales.iter().find(|l| l.code == code)
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }

    pub fn len(&self) -> usize {
        self.locales.len()
    }

    /// Persist the store: one pretty-printed `<code>.json` per locale under
    /// `locales_dir`, plus the full ordered sequence at `cache_path`.
    /// Missing directories are created.
    pub fn save(&self, locales_dir: &Path, cache_path: &Path) -> Result<()> {
        fs::create_dir_all(locales_dir).with_context(|| {
            format!("Failed to create locales directory {}", locales_dir.display())
        })?;

        for locale in &self.locales {
            let path = locales_dir.join(format!("{}.json", locale.code));
            let json = serde_json::to_string_pretty(locale)
                .with_context(|| format!("Failed to serialize locale '{}'", locale.code))?;
            fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }

        self.write_cache(cache_path)
    }

    /// Write only the cache file holding the full ordered sequence.
    pub fn write_cache(&self, cache_path: &Path) -> Result<()> {
        if let Some(parent) = cache_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create cache directory {}", parent.display())
            })?;
        }
        let json = serde_json::to_string_pretty(&self.locales)
            .context("Failed to serialize locale store")?;
        fs::write(cache_path, json)
            .with_context(|| format!("Failed to write {}", cache_path.display()))?;
        Ok(())
    }

    /// Reuse phase: load every `.json` file under `locales_dir`.
    ///
    /// Files that cannot be read or parsed are skipped with a warning, so
    /// one corrupt file never aborts the whole load. Records load in file
    /// name order.
    pub fn load_locale_files(locales_dir: &Path) -> Result<LocaleStore> {
        let mut locales = Vec::new();

        for file in list_files(locales_dir)? {
            let path = locales_dir.join(&file);
            match read_locale_file(&path) {
                Ok(locale) => locales.push(locale),
                Err(err) => warn!("Skipping locale file: {:#}", anyhow::Error::new(err)),
            }
        }

        Ok(LocaleStore::new(locales))
    }

    /// Load the cache file, degrading to an empty store when it is missing,
    /// unreadable, or does not match the locale sequence schema.
    pub fn load_cache(cache_path: &Path) -> LocaleStore {
        let raw = match fs::read_to_string(cache_path) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("Locale cache {} unreadable: {}", cache_path.display(), err);
                return LocaleStore::default();
            }
        };

        match serde_json::from_str::<Vec<Locale>>(&raw) {
            Ok(locales) => LocaleStore::new(locales),
            Err(err) => {
                warn!("Locale cache {} malformed: {}", cache_path.display(), err);
                LocaleStore::default()
            }
        }
    }
}

fn read_locale_file(path: &Path) -> std::result::Result<Locale, StoreError> {
    let raw = fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
