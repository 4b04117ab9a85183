//! Flag image resources
//! Maps country codes to bundled image handles through the host's resource
//! lookup, falling back to the globe when no flag is bundled.

use crate::config::Config;
use crate::model::ImageHandle;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Resource name of the globe image in [`BundledResources`]
pub const GLOBE_RESOURCE: &str = "lang_globe";

const IMAGE_EXTENSIONS: &[&str] = &["png", "svg", "webp"];

/// Errors while scanning a resource directory
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("IO error scanning {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Host-side lookup of image resources by name (e.g., "lang_fr").
pub trait ResourceResolver: Send + Sync {
    /// Returns `None` when no resource with this name exists.
    fn lookup_image_id(&self, name: &str) -> Option<ImageHandle>;

    /// Handle of the globe image
    fn globe(&self) -> ImageHandle {
        ImageHandle::GLOBE
    }
}

/// A fixed set of named image resources with sequential handles, the way a
/// resource compiler numbers drawables.
#[derive(Debug, Clone, Default)]
pub struct BundledResources {
    ids: HashMap<String, ImageHandle>,
}

impl BundledResources {
    /// Handles are assigned from 1 in iteration order; [`GLOBE_RESOURCE`]
    /// always maps to [`ImageHandle::GLOBE`]. Names are lower-cased.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ids = HashMap::new();
        let mut next = 1;
        for name in names {
            let name = name.as_ref().to_lowercase();
            if name == GLOBE_RESOURCE {
                ids.insert(name, ImageHandle::GLOBE);
                continue;
            }
            if ids.contains_key(&name) {
                continue;
            }
            ids.insert(name, ImageHandle(next));
            next += 1;
        }
        Self { ids }
    }

    /// Registers every image file (png, svg, webp) in `dir` by file stem.
    /// Files are numbered in name order so handles are stable across runs.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, ResourceError> {
        let dir = dir.as_ref();
        let io_err = |source| ResourceError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            let is_image = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()));
            if !is_image {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();

        tracing::debug!("Found {} image resources in {:?}", names.len(), dir);
        Ok(Self::new(names))
    }

    /// Checks if a resource with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.ids.contains_key(&name.to_lowercase())
    }

    /// Returns the number of registered resources
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl ResourceResolver for BundledResources {
    fn lookup_image_id(&self, name: &str) -> Option<ImageHandle> {
        self.ids.get(&name.to_lowercase()).copied()
    }
}

/// Resolves country codes to flag handles: `<prefix><code>`, with the alias
/// table consulted first for codes the host cannot use as resource names.
#[derive(Clone)]
pub struct FlagResolver {
    resources: Arc<dyn ResourceResolver>,
    prefix: String,
    aliases: BTreeMap<String, String>,
}

impl FlagResolver {
    pub fn new(resources: Arc<dyn ResourceResolver>, config: &Config) -> Self {
        Self {
            resources,
            prefix: config.resource_prefix.clone(),
            aliases: config
                .aliases
                .iter()
                .map(|(code, key)| (code.to_lowercase(), key.to_lowercase()))
                .collect(),
        }
    }

    /// Resource name used for a country code (e.g., "fr" -> "lang_fr",
    /// "do" -> "lang_dominican").
    pub fn resource_name(&self, code: &str) -> String {
        let code = code.to_lowercase();
        let key = self.aliases.get(&code).map(String::as_str).unwrap_or(&code);
        format!("{}{}", self.prefix, key)
    }

    /// Gets the flag handle for a country code.
    /// Returns the globe handle if no resource is bundled for it.
    pub fn resolve(&self, code: &str) -> ImageHandle {
        let name = self.resource_name(code);
        match self.resources.lookup_image_id(&name) {
            Some(handle) => handle,
            None => {
                tracing::debug!("No flag resource {} for {}, using globe", name, code);
                self.globe()
            }
        }
    }

    pub fn globe(&self) -> ImageHandle {
        self.resources.globe()
    }
}
