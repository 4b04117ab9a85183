//! Country registry
//! Lookup tables from country code to flag handle and currency, built once
//! from the decoded assets and read-only afterwards.

use crate::model::{Country, Currency, ImageHandle};
use crate::resources::FlagResolver;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info, warn};

/// Identifiers that always resolve to the globe, whatever was loaded
const GLOBE_IDENTIFIERS: &[&str] = &["xx", "xxx", "world", "globe"];

/// Read-only lookup tables keyed by lower-cased alpha-2 code
#[derive(Debug, Clone, Default)]
pub struct Registry {
    globe: ImageHandle,
    flags: HashMap<String, ImageHandle>,
    currencies: HashMap<String, Currency>,
    countries: BTreeMap<String, Country>,
    /// alpha-3 -> alpha-2
    by_alpha3: HashMap<String, String>,
    /// numeric code -> alpha-2
    by_numeric: HashMap<u16, String>,
}

/// Lower-cases an identifier and maps dashes to underscores
fn normalize(identifier: &str) -> String {
    identifier.to_lowercase().replace('-', "_")
}

impl Registry {
    /// A registry with nothing loaded: every flag is the globe.
    pub fn empty(globe: ImageHandle) -> Self {
        Self {
            globe,
            ..Self::default()
        }
    }

    /// Assigns every country its flag and currency and indexes it.
    ///
    /// The world record ("xx") always gets the globe and never a currency.
    /// When two records share an alpha-2 code the later one wins.
    pub fn build(countries: Vec<Country>, currencies: Vec<Currency>, flags: &FlagResolver) -> Self {
        let mut registry = Self::empty(flags.globe());

        let mut currency_by_code: HashMap<String, Currency> = HashMap::with_capacity(currencies.len());
        for currency in currencies {
            currency_by_code.insert(normalize(&currency.country_code), currency);
        }

        for mut country in countries {
            let code = normalize(&country.alpha2);

            if country.is_world() {
                country.flag = registry.globe;
                country.currency = None;
            } else {
                country.flag = flags.resolve(&code);
                country.currency = currency_by_code.get(&code).cloned();
            }

            registry.flags.insert(code.clone(), country.flag);
            match &country.currency {
                Some(currency) => {
                    registry.currencies.insert(code.clone(), currency.clone());
                }
                None => {
                    registry.currencies.remove(&code);
                }
            }
            registry.by_alpha3.insert(normalize(&country.alpha3), code.clone());
            if let Some(id) = country.numeric_id() {
                registry.by_numeric.insert(id, code.clone());
            }

            if let Some(previous) = registry.countries.insert(code.clone(), country) {
                warn!("Duplicate country code {}, replacing {}", code, previous.name);
            }
        }

        let unflagged = registry
            .countries
            .values()
            .filter(|c| !c.is_world() && c.flag == registry.globe)
            .count();
        info!(
            "Registered {} countries ({} with currencies, {} without a flag)",
            registry.countries.len(),
            registry.currencies.len(),
            unflagged
        );

        registry
    }

    /// Alpha-2 key for an identifier given as alpha-2, alpha-3 or numeric code
    fn key_of(&self, identifier: &str) -> Option<&str> {
        let id = normalize(identifier);
        if let Some((key, _)) = self.countries.get_key_value(&id) {
            return Some(key.as_str());
        }
        if let Some(key) = self.by_alpha3.get(&id) {
            return Some(key.as_str());
        }
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        id.parse::<u16>()
            .ok()
            .and_then(|n| self.by_numeric.get(&n))
            .map(String::as_str)
    }

    /// The globe handle
    pub fn globe(&self) -> ImageHandle {
        self.globe
    }

    /// Gets the flag for a country identifier (alpha-2, alpha-3 or numeric code,
    /// any case). Returns the globe for world identifiers and unknown countries.
    pub fn lookup_flag(&self, identifier: &str) -> ImageHandle {
        if GLOBE_IDENTIFIERS.iter().any(|g| identifier.eq_ignore_ascii_case(g)) {
            return self.globe;
        }

        match self.key_of(identifier).and_then(|key| self.flags.get(key)) {
            Some(flag) => *flag,
            None => {
                debug!("No flag registered for {:?}", identifier);
                self.globe
            }
        }
    }

    /// Element-wise [`Registry::lookup_flag`], order preserved
    pub fn lookup_flags<S: AsRef<str>>(&self, identifiers: &[S]) -> Vec<ImageHandle> {
        identifiers.iter().map(|id| self.lookup_flag(id.as_ref())).collect()
    }

    /// Currency of a country, or `None` if it has none (or is unknown)
    pub fn lookup_currency(&self, identifier: &str) -> Option<&Currency> {
        self.key_of(identifier).and_then(|key| self.currencies.get(key))
    }

    /// Full country record, with its flag and currency attached
    pub fn lookup_country(&self, identifier: &str) -> Option<&Country> {
        self.key_of(identifier).and_then(|key| self.countries.get(key))
    }

    /// Every registered alpha-2 code, including the world record
    pub fn all_country_codes(&self) -> BTreeSet<String> {
        self.flags.keys().cloned().collect()
    }

    /// Every registered currency, ordered by country code
    pub fn all_currencies(&self) -> Vec<&Currency> {
        let mut currencies: Vec<(&String, &Currency)> = self.currencies.iter().collect();
        currencies.sort_by(|a, b| a.0.cmp(b.0));
        currencies.into_iter().map(|(_, c)| c).collect()
    }

    /// Every registered country, ordered by alpha-2 code
    pub fn countries(&self) -> impl Iterator<Item = &Country> {
        self.countries.values()
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}
