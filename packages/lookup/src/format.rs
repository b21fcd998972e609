//! On-disk TOML format of the lookup tables.
//!
//! Flat tables (states, countries, street suffixes) are a single
//! `[aliases]` table:
//!
//! ```toml
//! [aliases]
//! PA = "PA"
//! PENNSYLVANIA = "PA"
//! ```
//!
//! The zip code table nests one table per zip code:
//!
//! ```toml
//! [zips."90025"]
//! "LOS ANGELES" = "LOS ANGELES"
//! "WEST LOS ANGELES" = "LOS ANGELES"
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A flat `alias -> standard value` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasTable {
    /// Alias to standard value.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

/// A two-level `zip -> (city variant -> primary city)` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZipTable {
    /// Zip code to its city variants.
    #[serde(default)]
    pub zips: BTreeMap<String, BTreeMap<String, String>>,
}

/// Parses an [`AliasTable`] from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is malformed.
pub fn parse_alias_toml(toml_str: &str) -> Result<AliasTable, toml::de::Error> {
    toml::de::from_str(toml_str)
}

/// Parses a [`ZipTable`] from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is malformed.
pub fn parse_zip_toml(toml_str: &str) -> Result<ZipTable, toml::de::Error> {
    toml::de::from_str(toml_str)
}

/// Serializes an [`AliasTable`] to TOML.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn alias_to_toml(table: &AliasTable) -> Result<String, toml::ser::Error> {
    toml::to_string(table)
}

/// Serializes a [`ZipTable`] to TOML.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn zip_to_toml(table: &ZipTable) -> Result<String, toml::ser::Error> {
    toml::to_string(table)
}
