//! Country Data - bundled country and currency data with flag lookup
//!
//! Features:
//! - Loads the bundled countries/currencies JSON once, off the caller's thread
//! - Maps alpha-2, alpha-3 or numeric codes to a flag image handle
//! - Falls back to a globe image for the world and unknown countries
//! - Looks up the currency used in a country
//!
//! ```no_run
//! use country_data::{BundledResources, EmbeddedAssets, World};
//! use std::sync::Arc;
//!
//! # async fn run() {
//! let flags = BundledResources::from_dir("res/drawable").unwrap_or_default();
//! let world = World::initialize(Arc::new(EmbeddedAssets::bundled()), Arc::new(flags));
//! world.ready().await.ok();
//!
//! let flag = world.flag_for("fr");
//! let euro = world.currency_for("FRA");
//! # let _ = (flag, euro);
//! # }
//! ```

pub mod assets;
pub mod config;
pub mod model;
pub mod parser;
pub mod registry;
pub mod resources;
pub mod world;

pub use crate::assets::{AssetError, AssetSource, DirAssets, EmbeddedAssets};
pub use crate::config::{Config, ConfigError};
pub use crate::model::{Country, Currency, ImageHandle};
pub use crate::parser::{parse_countries, parse_currencies, DecodeError};
pub use crate::registry::Registry;
pub use crate::resources::{BundledResources, FlagResolver, ResourceError, ResourceResolver};
pub use crate::world::{IngestError, LoadState, World};

/// Current library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
