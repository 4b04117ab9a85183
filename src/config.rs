//! Loader configuration
//! Asset names, flag resource naming, alias table and data directory.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_COUNTRIES_ASSET: &str = "com_blongho_country_data_countries";
pub const DEFAULT_CURRENCIES_ASSET: &str = "com_blongho_country_data_currencies";
/// Flag resources are named `<prefix><code>` (e.g., "lang_fr")
pub const DEFAULT_RESOURCE_PREFIX: &str = "lang_";
/// Overrides the directory `DirAssets` reads from
pub const DATA_DIR_ENV: &str = "COUNTRY_DATA_DIR";

const APP_DIR_NAME: &str = "country-data";

/// Errors while loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logical name of the countries asset
    pub countries_asset: String,
    /// Logical name of the currencies asset
    pub currencies_asset: String,
    pub resource_prefix: String,
    /// Country code -> resource key overrides, for codes that cannot be used
    /// as resource names on the host platform
    pub aliases: BTreeMap<String, String>,
    /// Directory holding `<asset name>.json` files
    pub asset_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            countries_asset: DEFAULT_COUNTRIES_ASSET.to_string(),
            currencies_asset: DEFAULT_CURRENCIES_ASSET.to_string(),
            resource_prefix: DEFAULT_RESOURCE_PREFIX.to_string(),
            aliases: default_aliases(),
            asset_dir: None,
        }
    }
}

/// "do" is a reserved word on Android, so the Dominican Republic flag is
/// bundled as "dominican".
pub fn default_aliases() -> BTreeMap<String, String> {
    BTreeMap::from([("do".to_string(), "dominican".to_string())])
}

impl Config {
    /// Reads a JSON configuration file. Missing keys keep their defaults,
    /// except `aliases`, which replaces the default table when given.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&bytes)
    }

    /// Alias keys are kept as written; `FlagResolver` folds their case.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ConfigError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Directory to read assets from: `$COUNTRY_DATA_DIR`, then `asset_dir`,
    /// then `<data dir>/country-data`.
    pub fn data_dir(&self) -> Option<PathBuf> {
        resolve_data_dir(std::env::var_os(DATA_DIR_ENV), self.asset_dir.as_deref())
    }
}

fn resolve_data_dir(env: Option<OsString>, configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(dir) = env.filter(|d| !d.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    if let Some(dir) = configured {
        return Some(dir.to_path_buf());
    }
    dirs::data_dir().map(|p| p.join(APP_DIR_NAME))
}
