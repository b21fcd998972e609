#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Static lookup tables consumed by the address canonicalizer.
//!
//! Four read-only mappings:
//!
//! - state/territory names and codes to the USPS two-letter code
//! - country names and ISO codes to the ISO alpha-2 code
//! - street suffix spellings to the USPS standard suffix
//! - zip code to (city variant to primary city)
//!
//! Tables are built offline (see `address_dedupe_table_builder`) and stored
//! as TOML. They are never mutated once constructed, so a single instance
//! can be shared by any number of canonicalizers without locking.

pub mod format;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use format::{AliasTable, ZipTable, parse_alias_toml, parse_zip_toml};

/// File name of the state table inside a tables directory.
pub const STATES_FILE: &str = "states.toml";

/// File name of the country table inside a tables directory.
pub const COUNTRIES_FILE: &str = "countries.toml";

/// File name of the street suffix table inside a tables directory.
pub const STREET_SUFFIXES_FILE: &str = "street_suffixes.toml";

/// File name of the zip code table inside a tables directory.
pub const ZIP_CODES_FILE: &str = "zip_codes.toml";

/// Tables embedded at compile time.
const BUNDLED_STATES: &str = include_str!("../tables/states.toml");
const BUNDLED_COUNTRIES: &str = include_str!("../tables/countries.toml");
const BUNDLED_STREET_SUFFIXES: &str = include_str!("../tables/street_suffixes.toml");
const BUNDLED_ZIP_CODES: &str = include_str!("../tables/zip_codes.toml");

static BUNDLED: LazyLock<LookupTables> = LazyLock::new(|| {
    LookupTables::from_toml_strs(
        BUNDLED_STATES,
        BUNDLED_COUNTRIES,
        BUNDLED_STREET_SUFFIXES,
        BUNDLED_ZIP_CODES,
    )
    .unwrap_or_else(|e| panic!("Failed to parse bundled lookup tables: {e}"))
});

/// Errors that can occur while loading lookup tables.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// A table file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A table file is not valid table TOML.
    #[error("Failed to parse {table} table: {source}")]
    Parse {
        /// Which table failed (`states`, `countries`, ...).
        table: &'static str,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
}

/// The four lookup tables used by canonicalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupTables {
    states: BTreeMap<String, String>,
    countries: BTreeMap<String, String>,
    street_suffixes: BTreeMap<String, String>,
    zip_codes: BTreeMap<String, BTreeMap<String, String>>,
}

impl LookupTables {
    /// Builds tables from already-constructed maps.
    ///
    /// Keys are expected uppercase; lookups are exact string matches.
    #[must_use]
    pub const fn new(
        states: BTreeMap<String, String>,
        countries: BTreeMap<String, String>,
        street_suffixes: BTreeMap<String, String>,
        zip_codes: BTreeMap<String, BTreeMap<String, String>>,
    ) -> Self {
        Self {
            states,
            countries,
            street_suffixes,
            zip_codes,
        }
    }

    /// Returns the tables bundled with this crate, parsed on first use.
    ///
    /// The bundled zip code table is a small sample; build the full
    /// gazetteer with `address_dedupe_table_builder` and load it with
    /// [`LookupTables::load_dir`].
    ///
    /// # Panics
    ///
    /// Panics if a bundled table is malformed (the files are embedded, so
    /// this is covered by this crate's tests).
    #[must_use]
    pub fn bundled() -> &'static Self {
        &BUNDLED
    }

    /// Parses the four tables from their TOML contents.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Parse`] naming the first table that fails.
    pub fn from_toml_strs(
        states: &str,
        countries: &str,
        street_suffixes: &str,
        zip_codes: &str,
    ) -> Result<Self, LookupError> {
        let alias = |table: &'static str, text: &str| {
            parse_alias_toml(text)
                .map(|t: AliasTable| t.aliases)
                .map_err(|source| LookupError::Parse { table, source })
        };

        let tables = Self {
            states: alias("states", states)?,
            countries: alias("countries", countries)?,
            street_suffixes: alias("street suffixes", street_suffixes)?,
            zip_codes: parse_zip_toml(zip_codes)
                .map(|t: ZipTable| t.zips)
                .map_err(|source| LookupError::Parse {
                    table: "zip codes",
                    source,
                })?,
        };

        log::debug!(
            "Loaded lookup tables: {} states, {} countries, {} street suffixes, {} zip codes",
            tables.states.len(),
            tables.countries.len(),
            tables.street_suffixes.len(),
            tables.zip_codes.len(),
        );

        Ok(tables)
    }

    /// Loads the four table files from `dir`.
    ///
    /// All four files must exist; a partial set of tables would silently
    /// change canonical keys.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] if any file is missing, unreadable or
    /// malformed.
    pub fn load_dir(dir: &Path) -> Result<Self, LookupError> {
        log::info!("Loading lookup tables from {}", dir.display());

        let read = |name: &str| {
            let path = dir.join(name);
            std::fs::read_to_string(&path).map_err(|source| LookupError::Io { path, source })
        };

        Self::from_toml_strs(
            &read(STATES_FILE)?,
            &read(COUNTRIES_FILE)?,
            &read(STREET_SUFFIXES_FILE)?,
            &read(ZIP_CODES_FILE)?,
        )
    }

    /// Standard code for a state or territory name/code.
    #[must_use]
    pub fn state(&self, region: &str) -> Option<&str> {
        self.states.get(region).map(String::as_str)
    }

    /// ISO alpha-2 code for a country name/code.
    #[must_use]
    pub fn country(&self, region: &str) -> Option<&str> {
        self.countries.get(region).map(String::as_str)
    }

    /// Standard USPS suffix for a street suffix spelling.
    #[must_use]
    pub fn street_suffix(&self, suffix: &str) -> Option<&str> {
        self.street_suffixes.get(suffix).map(String::as_str)
    }

    /// Primary city for `city` within `zip`, if `city` is a known variant
    /// there.
    #[must_use]
    pub fn city(&self, zip: &str, city: &str) -> Option<&str> {
        self.zip_codes
            .get(zip)
            .and_then(|variants| variants.get(city))
            .map(String::as_str)
    }

    /// The state table.
    #[must_use]
    pub const fn states(&self) -> &BTreeMap<String, String> {
        &self.states
    }

    /// The country table.
    #[must_use]
    pub const fn countries(&self) -> &BTreeMap<String, String> {
        &self.countries
    }

    /// The street suffix table.
    #[must_use]
    pub const fn street_suffixes(&self) -> &BTreeMap<String, String> {
        &self.street_suffixes
    }

    /// The zip code table.
    #[must_use]
    pub const fn zip_codes(&self) -> &BTreeMap<String, BTreeMap<String, String>> {
        &self.zip_codes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_tables_parse() {
        let tables = LookupTables::bundled();
        assert!(!tables.states().is_empty());
        assert!(!tables.countries().is_empty());
        assert!(!tables.street_suffixes().is_empty());
        assert!(!tables.zip_codes().is_empty());
    }

    #[test]
    fn bundled_states_map_names_and_codes() {
        let tables = LookupTables::bundled();
        assert_eq!(tables.state("PENNSYLVANIA"), Some("PA"));
        assert_eq!(tables.state("PA"), Some("PA"));
        assert_eq!(tables.state("DISTRICT OF COLUMBIA"), Some("DC"));
        assert_eq!(tables.state("pennsylvania"), None);
    }

    #[test]
    fn bundled_countries_map_to_alpha2() {
        let tables = LookupTables::bundled();
        assert_eq!(tables.country("FRANCE"), Some("FR"));
        assert_eq!(tables.country("FRA"), Some("FR"));
        assert_eq!(tables.country("FR"), Some("FR"));
    }

    #[test]
    fn bundled_street_suffixes_map_to_standard() {
        let tables = LookupTables::bundled();
        assert_eq!(tables.street_suffix("STREET"), Some("ST"));
        assert_eq!(tables.street_suffix("STR"), Some("ST"));
        assert_eq!(tables.street_suffix("ST"), Some("ST"));
        assert_eq!(tables.street_suffix("AVENUE"), Some("AVE"));
        assert_eq!(tables.street_suffix("DR"), Some("DR"));
        assert_eq!(tables.street_suffix("MAIN"), None);
    }

    #[test]
    fn city_lookup_is_scoped_to_zip() {
        let tables = LookupTables::bundled();
        assert_eq!(tables.city("90025", "WEST LOS ANGELES"), Some("LOS ANGELES"));
        assert_eq!(tables.city("90210", "WEST LOS ANGELES"), None);
        assert_eq!(tables.city("00000", "WEST LOS ANGELES"), None);
    }

    #[test]
    fn spanning_zip_only_knows_its_own_city() {
        let tables = LookupTables::bundled();
        assert_eq!(tables.city("97635", "NEW PINE CREEK"), Some("NEW PINE CREEK"));
        assert_eq!(tables.city("97635", "ADIN"), None);
    }

    #[test]
    fn parse_error_names_the_table() {
        let err = LookupTables::from_toml_strs("", "", "[aliases]\nST = 1\n", "").unwrap_err();
        assert!(err.to_string().contains("street suffixes"), "{err}");
    }

    #[test]
    fn load_dir_reads_all_four_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(STATES_FILE), "[aliases]\nOHIO = \"OH\"\n").unwrap();
        std::fs::write(dir.path().join(COUNTRIES_FILE), "").unwrap();
        std::fs::write(dir.path().join(STREET_SUFFIXES_FILE), "").unwrap();
        std::fs::write(
            dir.path().join(ZIP_CODES_FILE),
            "[zips.\"43004\"]\nBLACKLICK = \"COLUMBUS\"\n",
        )
        .unwrap();

        let tables = LookupTables::load_dir(dir.path()).unwrap();
        assert_eq!(tables.state("OHIO"), Some("OH"));
        assert_eq!(tables.city("43004", "BLACKLICK"), Some("COLUMBUS"));
        assert_eq!(tables.country("FRANCE"), None);
    }

    #[test]
    fn load_dir_fails_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(STATES_FILE), "").unwrap();

        let err = LookupTables::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, LookupError::Io { .. }));
    }
}
