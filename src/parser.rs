//! Asset decoding
//! Turns the raw countries/currencies JSON arrays into records.

use crate::model::{Country, Currency};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Errors raised while decoding an asset. Any of them aborts the whole asset.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("{asset}: invalid JSON array: {source}")]
    Json {
        asset: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{asset}[{index}]: {source}")]
    Element {
        asset: &'static str,
        index: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("{asset}[{index}]: required field `{field}` is empty")]
    EmptyField {
        asset: &'static str,
        index: usize,
        field: &'static str,
    },
}

/// Decodes the countries asset. `alpha2` and `alpha3` must be present and non-blank.
pub fn parse_countries(bytes: &[u8]) -> Result<Vec<Country>, DecodeError> {
    let countries: Vec<Country> = parse_array("countries", bytes)?;
    for (index, country) in countries.iter().enumerate() {
        require("countries", index, "alpha2", &country.alpha2)?;
        require("countries", index, "alpha3", &country.alpha3)?;
    }
    Ok(countries)
}

/// Decodes the currencies asset. `country` must be present and non-blank.
pub fn parse_currencies(bytes: &[u8]) -> Result<Vec<Currency>, DecodeError> {
    let currencies: Vec<Currency> = parse_array("currencies", bytes)?;
    for (index, currency) in currencies.iter().enumerate() {
        require("currencies", index, "country", &currency.country_code)?;
    }
    Ok(currencies)
}

fn parse_array<T: DeserializeOwned>(asset: &'static str, bytes: &[u8]) -> Result<Vec<T>, DecodeError> {
    let elements: Vec<Value> =
        serde_json::from_slice(bytes).map_err(|source| DecodeError::Json { asset, source })?;

    elements
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value(value).map_err(|source| DecodeError::Element { asset, index, source })
        })
        .collect()
}

fn require(asset: &'static str, index: usize, field: &'static str, value: &str) -> Result<(), DecodeError> {
    if value.trim().is_empty() {
        return Err(DecodeError::EmptyField { asset, index, field });
    }
    Ok(())
}
