//! Asset sources
//! Provide the raw countries/currencies JSON by logical name, either compiled
//! into the binary or read from a data directory.

use crate::config::{Config, DEFAULT_COUNTRIES_ASSET, DEFAULT_CURRENCIES_ASSET};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

const BUNDLED_COUNTRIES: &[u8] = include_bytes!("../assets/com_blongho_country_data_countries.json");
const BUNDLED_CURRENCIES: &[u8] = include_bytes!("../assets/com_blongho_country_data_currencies.json");

/// Errors while fetching an asset
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not determine asset directory")]
    NoDataDir,
}

/// Provides raw asset bytes by logical name (e.g., "com_blongho_country_data_countries")
pub trait AssetSource: Send + Sync {
    fn read(&self, name: &str) -> Result<Cow<'static, [u8]>, AssetError>;
}

/// Assets held in memory, by default the JSON shipped inside the crate.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedAssets {
    assets: HashMap<String, Cow<'static, [u8]>>,
}

impl EmbeddedAssets {
    /// No assets at all; add them with [`EmbeddedAssets::with_asset`].
    pub fn empty() -> Self {
        Self::default()
    }

    /// The country and currency data bundled with this crate, under the
    /// default asset names.
    pub fn bundled() -> Self {
        Self::empty()
            .with_asset(DEFAULT_COUNTRIES_ASSET, BUNDLED_COUNTRIES)
            .with_asset(DEFAULT_CURRENCIES_ASSET, BUNDLED_CURRENCIES)
    }

    pub fn with_asset(mut self, name: impl Into<String>, bytes: impl Into<Cow<'static, [u8]>>) -> Self {
        self.assets.insert(name.into(), bytes.into());
        self
    }
}

impl AssetSource for EmbeddedAssets {
    fn read(&self, name: &str) -> Result<Cow<'static, [u8]>, AssetError> {
        self.assets
            .get(name)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(name.to_string()))
    }
}

/// Reads `<dir>/<name>.json` from disk
#[derive(Debug, Clone)]
pub struct DirAssets {
    dir: PathBuf,
}

impl DirAssets {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Uses the directory selected by [`Config::data_dir`]
    pub fn from_config(config: &Config) -> Result<Self, AssetError> {
        config.data_dir().map(Self::new).ok_or(AssetError::NoDataDir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl AssetSource for DirAssets {
    fn read(&self, name: &str) -> Result<Cow<'static, [u8]>, AssetError> {
        let path = self.dir.join(format!("{name}.json"));
        match fs::read(&path) {
            Ok(bytes) => Ok(Cow::Owned(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(AssetError::NotFound(name.to_string())),
            Err(source) => Err(AssetError::Io { path, source }),
        }
    }
}
