//! World data facade
//! Loads the bundled assets once in the background and answers flag and
//! currency lookups. Until loading finishes every lookup sees an empty
//! registry; `ready()` waits for the outcome.

use crate::assets::{AssetError, AssetSource};
use crate::config::Config;
use crate::model::{Country, Currency, ImageHandle};
use crate::parser::{parse_countries, parse_currencies, DecodeError};
use crate::registry::Registry;
use crate::resources::{FlagResolver, ResourceResolver};
use std::collections::BTreeSet;
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// The process-wide instance created by [`World::initialize`]
static INSTANCE: OnceLock<World> = OnceLock::new();

/// Errors that abort a load. The registry stays empty when one occurs.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read asset: {0}")]
    Asset(#[from] AssetError),
    #[error("Failed to decode asset: {0}")]
    Decode(#[from] DecodeError),
    #[error("Failed to start loader thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("Loader stopped without reporting a result")]
    Interrupted,
}

/// Progress of the one-time load
#[derive(Debug, Clone)]
pub enum LoadState {
    Loading,
    Ready { countries: usize },
    Failed(Arc<IngestError>),
}

impl LoadState {
    fn is_settled(&self) -> bool {
        !matches!(self, LoadState::Loading)
    }
}

struct Inner {
    /// Answers lookups until the loaded registry is published
    empty: Registry,
    loaded: OnceLock<Registry>,
    state: watch::Sender<LoadState>,
}

impl Inner {
    fn ingest(&self, source: &dyn AssetSource, flags: &FlagResolver, config: &Config) {
        let started = Instant::now();
        info!("Loading country data v{}", crate::VERSION);

        match load_registry(source, flags, config) {
            Ok(registry) => {
                let countries = registry.len();
                if self.loaded.set(registry).is_err() {
                    warn!("Country data already loaded, discarding second result");
                }
                debug!("Country data loaded in {:?}", started.elapsed());
                self.state.send_replace(LoadState::Ready { countries });
            }
            Err(e) => {
                error!("Failed to load country data: {}", e);
                self.state.send_replace(LoadState::Failed(Arc::new(e)));
            }
        }
    }
}

/// Reads and decodes both assets before building anything, so a bad asset
/// leaves nothing behind.
fn load_registry(source: &dyn AssetSource, flags: &FlagResolver, config: &Config) -> Result<Registry, IngestError> {
    let countries = parse_countries(&source.read(&config.countries_asset)?)?;
    let currencies = parse_currencies(&source.read(&config.currencies_asset)?)?;
    debug!("Decoded {} countries and {} currencies", countries.len(), currencies.len());
    Ok(Registry::build(countries, currencies, flags))
}

/// Handle to loaded country data. Cheap to clone; clones share one load.
#[derive(Clone)]
pub struct World {
    inner: Arc<Inner>,
}

impl World {
    /// Creates the process-wide instance on first call and starts loading.
    /// Later calls return that same instance and ignore their arguments.
    pub fn initialize(source: Arc<dyn AssetSource>, resources: Arc<dyn ResourceResolver>) -> World {
        Self::initialize_with(source, resources, Config::default())
    }

    /// [`World::initialize`] with an explicit configuration
    pub fn initialize_with(
        source: Arc<dyn AssetSource>,
        resources: Arc<dyn ResourceResolver>,
        config: Config,
    ) -> World {
        INSTANCE
            .get_or_init(|| Self::load(source, resources, config))
            .clone()
    }

    /// The process-wide instance, if [`World::initialize`] has been called
    pub fn get() -> Option<World> {
        INSTANCE.get().cloned()
    }

    /// Starts loading into a new, independent instance without blocking the
    /// caller. Runs on Tokio's blocking pool when called inside a runtime,
    /// otherwise on a dedicated thread.
    pub fn load(source: Arc<dyn AssetSource>, resources: Arc<dyn ResourceResolver>, config: Config) -> World {
        let flags = FlagResolver::new(resources, &config);
        let (state, _) = watch::channel(LoadState::Loading);
        let inner = Arc::new(Inner {
            empty: Registry::empty(flags.globe()),
            loaded: OnceLock::new(),
            state,
        });

        let task_inner = inner.clone();
        let job = move || task_inner.ingest(source.as_ref(), &flags, &config);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(job);
            }
            Err(_) => {
                let spawned = std::thread::Builder::new()
                    .name("country-data-loader".to_string())
                    .spawn(job);
                if let Err(e) = spawned {
                    error!("Failed to start loader thread: {}", e);
                    inner.state.send_replace(LoadState::Failed(Arc::new(IngestError::Spawn(e))));
                }
            }
        }

        World { inner }
    }

    /// The loaded registry, or an empty one while loading (or after a failure)
    pub fn registry(&self) -> &Registry {
        self.inner.loaded.get().unwrap_or(&self.inner.empty)
    }

    pub fn state(&self) -> LoadState {
        self.inner.state.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.inner.loaded.get().is_some()
    }

    /// Waits for loading to finish. Returns the number of countries loaded.
    pub async fn ready(&self) -> Result<usize, Arc<IngestError>> {
        let mut rx = self.inner.state.subscribe();
        let state = match rx.wait_for(LoadState::is_settled).await {
            Ok(state) => state.clone(),
            Err(_) => LoadState::Failed(Arc::new(IngestError::Interrupted)),
        };

        match state {
            LoadState::Ready { countries } => Ok(countries),
            LoadState::Failed(e) => Err(e),
            LoadState::Loading => Err(Arc::new(IngestError::Interrupted)),
        }
    }

    /// Flag of a country by alpha-2, alpha-3 or numeric code.
    /// Never fails: unknown countries get the globe.
    pub fn flag_for(&self, identifier: &str) -> ImageHandle {
        self.registry().lookup_flag(identifier)
    }

    pub fn flags_for<S: AsRef<str>>(&self, identifiers: &[S]) -> Vec<ImageHandle> {
        self.registry().lookup_flags(identifiers)
    }

    pub fn currency_for(&self, identifier: &str) -> Option<&Currency> {
        self.registry().lookup_currency(identifier)
    }

    pub fn country_for(&self, identifier: &str) -> Option<&Country> {
        self.registry().lookup_country(identifier)
    }

    /// Alpha-2 codes of every loaded country
    pub fn countries(&self) -> BTreeSet<String> {
        self.registry().all_country_codes()
    }

    pub fn currencies(&self) -> Vec<&Currency> {
        self.registry().all_currencies()
    }

    pub fn globe(&self) -> ImageHandle {
        self.registry().globe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::EmbeddedAssets;
    use crate::config::{DEFAULT_COUNTRIES_ASSET, DEFAULT_CURRENCIES_ASSET};
    use crate::resources::BundledResources;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Mutex};
    use std::time::Duration;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// A flag for every bundled country, as the packaged drawables provide
    fn bundled_flags() -> Arc<BundledResources> {
        let assets = EmbeddedAssets::bundled();
        let bytes = assets.read(DEFAULT_COUNTRIES_ASSET).unwrap();
        let mut names: Vec<String> = parse_countries(&bytes)
            .unwrap()
            .iter()
            .map(|c| format!("lang_{}", c.alpha2.to_lowercase()))
            .collect();
        names.push("lang_dominican".to_string());
        names.push("lang_globe".to_string());
        Arc::new(BundledResources::new(names))
    }

    fn assets(countries: &[u8], currencies: &[u8]) -> Arc<EmbeddedAssets> {
        Arc::new(
            EmbeddedAssets::empty()
                .with_asset(DEFAULT_COUNTRIES_ASSET, countries.to_vec())
                .with_asset(DEFAULT_CURRENCIES_ASSET, currencies.to_vec()),
        )
    }

    /// Holds back the countries asset until the test releases it
    struct GatedAssets {
        inner: EmbeddedAssets,
        gate: Mutex<mpsc::Receiver<()>>,
    }

    impl AssetSource for GatedAssets {
        fn read(&self, name: &str) -> Result<std::borrow::Cow<'static, [u8]>, AssetError> {
            if name == DEFAULT_COUNTRIES_ASSET {
                let _ = self.gate.lock().unwrap().recv();
            }
            self.inner.read(name)
        }
    }

    /// Counts resource lookups to detect repeated loads
    struct CountingResources {
        inner: BundledResources,
        lookups: AtomicUsize,
    }

    impl ResourceResolver for CountingResources {
        fn lookup_image_id(&self, name: &str) -> Option<ImageHandle> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.lookup_image_id(name)
        }
    }

    #[tokio::test]
    async fn test_load_bundled_assets() {
        init_tracing();
        let world = World::load(Arc::new(EmbeddedAssets::bundled()), bundled_flags(), Config::default());
        let loaded = world.ready().await.unwrap();

        assert!(world.is_ready());
        assert!(matches!(world.state(), LoadState::Ready { countries } if countries == loaded));
        assert_eq!(world.countries().len(), loaded);

        for code in world.countries() {
            if code == "xx" {
                continue;
            }
            assert_ne!(world.flag_for(&code), world.globe(), "{code} should have a flag");
        }
    }

    #[tokio::test]
    async fn test_lookups_after_load() {
        let world = World::load(Arc::new(EmbeddedAssets::bundled()), bundled_flags(), Config::default());
        world.ready().await.unwrap();

        for id in ["xx", "XXX", "world", "Globe"] {
            assert_eq!(world.flag_for(id), world.globe());
        }
        assert_eq!(world.flag_for("zz"), world.globe());
        assert_eq!(world.flag_for("DO"), world.flag_for("do"));
        assert_ne!(world.flag_for("do"), world.globe());

        assert_eq!(
            world.flags_for(&["fr", "de", "zz"]),
            vec![world.flag_for("fr"), world.flag_for("de"), world.flag_for("zz")]
        );

        let euro = world.currency_for("fr").unwrap();
        assert!(euro.country_code.eq_ignore_ascii_case("fr"));
        assert_eq!(euro.currency_code, "EUR");
        assert!(world.currency_for("xx").is_none());
        assert!(world.currencies().iter().any(|c| c.currency_code == "DOP"));

        let france = world.country_for("FRA").unwrap();
        assert_eq!(france.name, "France");
        assert_eq!(france.flag, world.flag_for("fr"));
    }

    #[tokio::test]
    async fn test_lookups_before_ready_see_empty_registry() {
        let (release, gate) = mpsc::channel();
        let source = Arc::new(GatedAssets {
            inner: EmbeddedAssets::bundled(),
            gate: Mutex::new(gate),
        });
        let world = World::load(source, bundled_flags(), Config::default());

        assert!(!world.is_ready());
        assert!(matches!(world.state(), LoadState::Loading));
        assert_eq!(world.flag_for("fr"), world.globe());
        assert!(world.currency_for("fr").is_none());
        assert!(world.countries().is_empty());

        release.send(()).unwrap();
        world.ready().await.unwrap();
        assert_ne!(world.flag_for("fr"), world.globe());
        assert!(world.currency_for("fr").is_some());
    }

    #[tokio::test]
    async fn test_malformed_countries_leave_registry_empty() {
        init_tracing();
        let world = World::load(assets(b"[{\"alpha2\": \"fr\",", b"[]"), bundled_flags(), Config::default());

        let err = world.ready().await.unwrap_err();
        assert!(matches!(*err, IngestError::Decode(_)));
        assert!(matches!(world.state(), LoadState::Failed(_)));
        assert!(!world.is_ready());
        assert!(world.countries().is_empty());
        assert_eq!(world.flag_for("fr"), world.globe());
    }

    #[tokio::test]
    async fn test_malformed_currencies_leave_registry_empty() {
        let countries = br#"[{"alpha2": "fr", "alpha3": "fra"}]"#;
        let world = World::load(assets(countries, b"{oops"), bundled_flags(), Config::default());

        assert!(world.ready().await.is_err());
        assert!(world.countries().is_empty());
        assert!(world.currencies().is_empty());
    }

    #[tokio::test]
    async fn test_missing_asset() {
        let world = World::load(Arc::new(EmbeddedAssets::empty()), bundled_flags(), Config::default());
        let err = world.ready().await.unwrap_err();
        assert!(matches!(*err, IngestError::Asset(AssetError::NotFound(_))));
    }

    #[test]
    fn test_load_without_runtime() {
        let world = World::load(Arc::new(EmbeddedAssets::bundled()), bundled_flags(), Config::default());

        let mut waited = Duration::ZERO;
        while !world.is_ready() && waited < Duration::from_secs(5) {
            std::thread::sleep(Duration::from_millis(10));
            waited += Duration::from_millis(10);
        }
        assert!(world.is_ready());
        assert!(world.countries().contains("fr"));
    }

    #[tokio::test]
    async fn test_initialize_once() {
        let resources = Arc::new(CountingResources {
            inner: BundledResources::new(["lang_fr", "lang_de"]),
            lookups: AtomicUsize::new(0),
        });
        let countries = br#"[
            {"alpha2": "fr", "alpha3": "fra"},
            {"alpha2": "de", "alpha3": "deu"},
            {"alpha2": "xx", "alpha3": "xxx"}
        ]"#;

        let first = World::initialize(assets(countries, b"[]"), resources.clone());
        let second = World::initialize(assets(b"not json", b"[]"), resources.clone());
        assert!(Arc::ptr_eq(&first.inner, &second.inner));
        assert!(World::get().is_some_and(|w| Arc::ptr_eq(&w.inner, &first.inner)));

        assert_eq!(second.ready().await.unwrap(), 3);
        assert_eq!(first.countries().len(), 3);
        // one lookup per country except the world record
        assert_eq!(resources.lookups.load(Ordering::SeqCst), 2);

        let third = World::initialize(assets(countries, b"[]"), resources.clone());
        third.ready().await.unwrap();
        assert_eq!(third.countries().len(), 3);
        assert_eq!(resources.lookups.load(Ordering::SeqCst), 2);
    }
}
