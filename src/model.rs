//! Country and currency records as they appear in the bundled assets.

use serde::{Deserialize, Serialize};

/// Opaque reference to a bundled image resource (a flag or the globe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ImageHandle(pub u32);

impl ImageHandle {
    /// The globe image, shown when no specific flag applies.
    pub const GLOBE: ImageHandle = ImageHandle(0);

    pub fn is_globe(&self) -> bool {
        *self == Self::GLOBE
    }
}

impl Default for ImageHandle {
    fn default() -> Self {
        Self::GLOBE
    }
}

/// Currency used in a country
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    /// ISO 3166-1 alpha-2 code of the country using this currency (e.g., "FR")
    #[serde(rename = "country")]
    pub country_code: String,
    /// Currency name (e.g., "European euro")
    #[serde(rename = "name", default)]
    pub currency_name: String,
    /// ISO 4217 currency code (e.g., "EUR")
    #[serde(rename = "code", default)]
    pub currency_code: String,
    /// Display symbol (e.g., "€")
    #[serde(default)]
    pub symbol: String,
}

/// A country as loaded from the countries asset.
///
/// The flag and currency are not part of the asset; they are attached when
/// the registry is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// ISO 3166-1 alpha-2 code (e.g., "fr")
    pub alpha2: String,
    /// ISO 3166-1 alpha-3 code (e.g., "fra")
    pub alpha3: String,
    /// English short name
    #[serde(default)]
    pub name: String,
    /// ISO 3166-1 numeric code, zero padded (e.g., "250")
    #[serde(rename = "id", default)]
    pub numeric_code: String,
    #[serde(skip)]
    pub flag: ImageHandle,
    #[serde(skip)]
    pub currency: Option<Currency>,
}

impl Country {
    /// Alpha-2 code of the record standing in for the whole world.
    pub const WORLD_ALPHA2: &'static str = "xx";
    /// Alpha-3 code of the record standing in for the whole world.
    pub const WORLD_ALPHA3: &'static str = "xxx";

    /// Numeric code as a number, if the asset carries a valid one.
    pub fn numeric_id(&self) -> Option<u16> {
        self.numeric_code.trim().parse().ok()
    }

    pub fn is_world(&self) -> bool {
        self.alpha2.eq_ignore_ascii_case(Self::WORLD_ALPHA2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn country(alpha2: &str, id: &str) -> Country {
        Country {
            alpha2: alpha2.to_string(),
            alpha3: String::new(),
            name: String::new(),
            numeric_code: id.to_string(),
            flag: ImageHandle::GLOBE,
            currency: None,
        }
    }

    #[test]
    fn test_numeric_id() {
        assert_eq!(country("ad", "020").numeric_id(), Some(20));
        assert_eq!(country("fr", "250").numeric_id(), Some(250));
        assert_eq!(country("fr", "").numeric_id(), None);
        assert_eq!(country("fr", "n/a").numeric_id(), None);
    }

    #[test]
    fn test_world_detection() {
        assert!(country("xx", "999").is_world());
        assert!(country("XX", "999").is_world());
        assert!(!country("fr", "250").is_world());
    }

    #[test]
    fn test_default_handle_is_globe() {
        assert!(ImageHandle::default().is_globe());
        assert!(!ImageHandle(7).is_globe());
    }
}
