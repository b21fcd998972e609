#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Builds the lookup table files from public reference CSVs.
//!
//! This is a one-time data preparation step. Its output is the TOML table
//! directory read by `address_dedupe_lookup`; nothing here runs while
//! addresses are canonicalized.
//!
//! Inputs (header row required, extra columns ignored):
//!
//! | Table | Columns |
//! |---|---|
//! | states | `state`, `standard_abbr` |
//! | countries | `COUNTRY`, `A2`, `A3` |
//! | street suffixes | `suffix`, `common_suffix`, `standard_suffix` |
//! | zip codes | `zip`, `primary_city`, `acceptable_cities` |
//!
//! All keys and values are trimmed and uppercased. When two rows define
//! different values for the same key the first definition is kept and the
//! conflict is logged and counted.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use address_dedupe_lookup::format::{AliasTable, ZipTable, alias_to_toml, zip_to_toml};
use address_dedupe_lookup::{COUNTRIES_FILE, STATES_FILE, STREET_SUFFIXES_FILE, ZIP_CODES_FILE};
use serde::Deserialize;

/// Errors that can occur while building lookup tables.
#[derive(Debug, thiserror::Error)]
pub enum TableBuildError {
    /// A file could not be read or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A reference CSV is malformed or missing a column.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A table could not be serialized.
    #[error("TOML serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// A built table plus the number of conflicting rows that were dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltTable<T> {
    /// The table.
    pub table: T,
    /// Rows whose value disagreed with an earlier row for the same key.
    pub conflicts: usize,
}

/// Paths of the four reference CSVs.
#[derive(Debug, Clone)]
pub struct RawSources {
    /// USPS state abbreviations.
    pub states: PathBuf,
    /// ISO 3166 country codes.
    pub countries: PathBuf,
    /// USPS Publication 28 street suffixes.
    pub street_suffixes: PathBuf,
    /// Zip code gazetteer.
    pub zip_codes: PathBuf,
}

/// Entry and conflict counts for a full build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Aliases in the state table.
    pub states: usize,
    /// Aliases in the country table.
    pub countries: usize,
    /// Aliases in the street suffix table.
    pub street_suffixes: usize,
    /// Zip codes in the zip code table.
    pub zip_codes: usize,
    /// Conflicting rows dropped across all tables.
    pub conflicts: usize,
}

#[derive(Debug, Deserialize)]
struct StateRow {
    state: Option<String>,
    standard_abbr: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CountryRow {
    #[serde(rename = "COUNTRY")]
    country: Option<String>,
    #[serde(rename = "A2")]
    alpha2: Option<String>,
    #[serde(rename = "A3")]
    alpha3: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreetSuffixRow {
    suffix: Option<String>,
    common_suffix: Option<String>,
    standard_suffix: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ZipRow {
    zip: String,
    primary_city: String,
    acceptable_cities: Option<String>,
}

fn clean(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Returns the cleaned value, or `None` if it is missing or blank.
fn present(value: Option<&str>) -> Option<String> {
    value.map(clean).filter(|v| !v.is_empty())
}

/// Inserts `alias -> standard` unless `alias` is already defined.
///
/// Returns `true` if an earlier, different definition was kept instead.
fn insert_first(
    table: &str,
    aliases: &mut BTreeMap<String, String>,
    alias: &str,
    standard: &str,
) -> bool {
    let alias = clean(alias);
    if alias.is_empty() {
        return false;
    }

    match aliases.entry(alias) {
        Entry::Vacant(entry) => {
            entry.insert(standard.to_string());
            false
        }
        Entry::Occupied(entry) if entry.get() != standard => {
            log::warn!(
                "{table}: '{}' already maps to '{}', ignoring '{standard}'",
                entry.key(),
                entry.get()
            );
            true
        }
        Entry::Occupied(_) => false,
    }
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader)
}

/// Builds the state table: each abbreviation maps to itself and each state
/// name maps to its abbreviation.
///
/// # Errors
///
/// Returns [`TableBuildError::Csv`] if the CSV is malformed.
pub fn build_states<R: Read>(reader: R) -> Result<BuiltTable<AliasTable>, TableBuildError> {
    let mut table = AliasTable::default();
    let mut conflicts = 0;

    for row in csv_reader(reader).deserialize::<StateRow>() {
        let row = row?;
        let Some(abbr) = present(row.standard_abbr.as_deref()) else {
            continue;
        };
        for alias in [Some(abbr.clone()), present(row.state.as_deref())]
            .into_iter()
            .flatten()
        {
            conflicts += usize::from(insert_first("states", &mut table.aliases, &alias, &abbr));
        }
    }

    Ok(BuiltTable { table, conflicts })
}

/// Builds the country table: alpha-2, alpha-3 and country name all map to
/// the alpha-2 code. Rows without an alpha-2 code are skipped.
///
/// # Errors
///
/// Returns [`TableBuildError::Csv`] if the CSV is malformed.
pub fn build_countries<R: Read>(reader: R) -> Result<BuiltTable<AliasTable>, TableBuildError> {
    let mut table = AliasTable::default();
    let mut conflicts = 0;

    for row in csv_reader(reader).deserialize::<CountryRow>() {
        let row = row?;
        let Some(alpha2) = present(row.alpha2.as_deref()) else {
            continue;
        };
        for alias in [
            Some(alpha2.clone()),
            present(row.alpha3.as_deref()),
            present(row.country.as_deref()),
        ]
        .into_iter()
        .flatten()
        {
            conflicts += usize::from(insert_first(
                "countries",
                &mut table.aliases,
                &alias,
                &alpha2,
            ));
        }
    }

    Ok(BuiltTable { table, conflicts })
}

/// Builds the street suffix table: primary name, common abbreviation and
/// standard abbreviation all map to the standard abbreviation. Rows
/// without a standard abbreviation are skipped.
///
/// # Errors
///
/// Returns [`TableBuildError::Csv`] if the CSV is malformed.
pub fn build_street_suffixes<R: Read>(
    reader: R,
) -> Result<BuiltTable<AliasTable>, TableBuildError> {
    let mut table = AliasTable::default();
    let mut conflicts = 0;

    for row in csv_reader(reader).deserialize::<StreetSuffixRow>() {
        let row = row?;
        let Some(standard) = present(row.standard_suffix.as_deref()) else {
            continue;
        };
        for alias in [
            present(row.suffix.as_deref()),
            present(row.common_suffix.as_deref()),
            Some(standard.clone()),
        ]
        .into_iter()
        .flatten()
        {
            conflicts += usize::from(insert_first(
                "street suffixes",
                &mut table.aliases,
                &alias,
                &standard,
            ));
        }
    }

    Ok(BuiltTable { table, conflicts })
}

/// Builds the zip code table: within each zip, the primary city maps to
/// itself and each comma-separated acceptable city maps to the primary
/// city.
///
/// # Errors
///
/// Returns [`TableBuildError::Csv`] if the CSV is malformed.
pub fn build_zip_codes<R: Read>(reader: R) -> Result<BuiltTable<ZipTable>, TableBuildError> {
    let mut table = ZipTable::default();
    let mut conflicts = 0;

    for row in csv_reader(reader).deserialize::<ZipRow>() {
        let row = row?;
        let zip = clean(&row.zip);
        let primary = clean(&row.primary_city);
        if zip.is_empty() || primary.is_empty() {
            continue;
        }

        let label = format!("zip {zip}");
        let cities = table.zips.entry(zip).or_default();
        let acceptable = row.acceptable_cities.unwrap_or_default();

        for city in std::iter::once(primary.as_str()).chain(acceptable.split(',')) {
            conflicts += usize::from(insert_first(&label, cities, city, &primary));
        }
    }

    Ok(BuiltTable { table, conflicts })
}

fn open(path: &Path) -> Result<File, TableBuildError> {
    File::open(path).map_err(|source| TableBuildError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, origin: &Path, body: &str) -> Result<(), TableBuildError> {
    let contents = format!(
        "# Generated by address_dedupe_table_builder from {}\n\n{body}",
        origin.display()
    );
    std::fs::write(path, contents).map_err(|source| TableBuildError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Builds all four tables from `sources` and writes them into `out_dir`.
///
/// # Errors
///
/// Returns [`TableBuildError`] if any input cannot be read or parsed, or
/// any output cannot be written.
pub fn build_all(sources: &RawSources, out_dir: &Path) -> Result<BuildReport, TableBuildError> {
    std::fs::create_dir_all(out_dir).map_err(|source| TableBuildError::Io {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let states = build_states(open(&sources.states)?)?;
    let countries = build_countries(open(&sources.countries)?)?;
    let street_suffixes = build_street_suffixes(open(&sources.street_suffixes)?)?;
    let zip_codes = build_zip_codes(open(&sources.zip_codes)?)?;

    write(
        &out_dir.join(STATES_FILE),
        &sources.states,
        &alias_to_toml(&states.table)?,
    )?;
    write(
        &out_dir.join(COUNTRIES_FILE),
        &sources.countries,
        &alias_to_toml(&countries.table)?,
    )?;
    write(
        &out_dir.join(STREET_SUFFIXES_FILE),
        &sources.street_suffixes,
        &alias_to_toml(&street_suffixes.table)?,
    )?;
    write(
        &out_dir.join(ZIP_CODES_FILE),
        &sources.zip_codes,
        &zip_to_toml(&zip_codes.table)?,
    )?;

    let report = BuildReport {
        states: states.table.aliases.len(),
        countries: countries.table.aliases.len(),
        street_suffixes: street_suffixes.table.aliases.len(),
        zip_codes: zip_codes.table.zips.len(),
        conflicts: states.conflicts
            + countries.conflicts
            + street_suffixes.conflicts
            + zip_codes.conflicts,
    };

    log::info!(
        "Wrote lookup tables to {}: {} states, {} countries, {} street suffixes, {} zip codes ({} conflicts)",
        out_dir.display(),
        report.states,
        report.countries,
        report.street_suffixes,
        report.zip_codes,
        report.conflicts,
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use address_dedupe_lookup::LookupTables;

    use super::*;

    const RAW_STATES: &str = include_str!("../raw/states.csv");
    const RAW_COUNTRIES: &str = include_str!("../raw/countries.csv");
    const RAW_STREET_SUFFIXES: &str = include_str!("../raw/street_suffixes.csv");
    const RAW_ZIP_CODES: &str = include_str!("../raw/zip_codes.csv");

    #[test]
    fn builds_states_from_names_and_codes() {
        let built = build_states("state,standard_abbr\nPennsylvania,PA\n Ohio ,oh\n".as_bytes())
            .unwrap();

        assert_eq!(built.table.aliases.len(), 4);
        assert_eq!(built.table.aliases["PENNSYLVANIA"], "PA");
        assert_eq!(built.table.aliases["OHIO"], "OH");
        assert_eq!(built.table.aliases["OH"], "OH");
        assert_eq!(built.conflicts, 0);
    }

    #[test]
    fn skips_countries_without_alpha2() {
        let built = build_countries("COUNTRY,A2,A3\nFrance,FR,FRA\nKosovo,,\n".as_bytes())
            .unwrap();

        assert_eq!(built.table.aliases.len(), 3);
        assert_eq!(built.table.aliases["FRA"], "FR");
        assert!(!built.table.aliases.contains_key("KOSOVO"));
    }

    #[test]
    fn keeps_first_definition_on_conflict() {
        let csv = "suffix,common_suffix,standard_suffix\n\
                   Meadow,Meadow,Mdw\n\
                   Meadows,Mdw,Mdws\n";
        let built = build_street_suffixes(csv.as_bytes()).unwrap();

        assert_eq!(built.table.aliases["MDW"], "MDW");
        assert_eq!(built.table.aliases["MEADOWS"], "MDWS");
        assert_eq!(built.conflicts, 1);
    }

    #[test]
    fn scopes_city_variants_to_their_zip() {
        let csv = "zip,primary_city,acceptable_cities\n\
                   90025,Los Angeles,\"W Los Angeles, West Los Angeles\"\n\
                   90210,Beverly Hills,\n";
        let built = build_zip_codes(csv.as_bytes()).unwrap();

        assert_eq!(built.table.zips["90025"]["WEST LOS ANGELES"], "LOS ANGELES");
        assert_eq!(built.table.zips["90025"]["LOS ANGELES"], "LOS ANGELES");
        assert_eq!(built.table.zips["90210"].len(), 1);
        assert!(!built.table.zips["90210"].contains_key("WEST LOS ANGELES"));
    }

    #[test]
    fn uppercases_alphanumeric_zip_keys() {
        let csv = "zip,primary_city,acceptable_cities\n\
                   \" k1a 0b1 \",Ottawa,Ottawa Centre\n";
        let built = build_zip_codes(csv.as_bytes()).unwrap();

        assert!(!built.table.zips.contains_key("k1a 0b1"));
        assert_eq!(built.table.zips["K1A 0B1"]["OTTAWA CENTRE"], "OTTAWA");
    }

    #[test]
    fn counts_conflicting_primary_cities_for_one_zip() {
        let csv = "zip,primary_city,acceptable_cities\n\
                   97635,New Pine Creek,Pine Creek\n\
                   97635,Adin,Pine Creek\n";
        let built = build_zip_codes(csv.as_bytes()).unwrap();

        assert_eq!(built.table.zips["97635"]["PINE CREEK"], "NEW PINE CREEK");
        assert_eq!(built.table.zips["97635"]["ADIN"], "ADIN");
        assert_eq!(built.conflicts, 1);
    }

    #[test]
    fn rejects_csv_missing_required_column() {
        assert!(build_zip_codes("zip,city\n12345,X\n".as_bytes()).is_err());
    }

    #[test]
    fn raw_reference_data_reproduces_bundled_tables() {
        let bundled = LookupTables::bundled();

        let states = build_states(RAW_STATES.as_bytes()).unwrap();
        let countries = build_countries(RAW_COUNTRIES.as_bytes()).unwrap();
        let suffixes = build_street_suffixes(RAW_STREET_SUFFIXES.as_bytes()).unwrap();
        let zips = build_zip_codes(RAW_ZIP_CODES.as_bytes()).unwrap();

        assert_eq!(&states.table.aliases, bundled.states());
        assert_eq!(&countries.table.aliases, bundled.countries());
        assert_eq!(&suffixes.table.aliases, bundled.street_suffixes());
        assert_eq!(&zips.table.zips, bundled.zip_codes());
    }

    #[test]
    fn build_all_writes_loadable_tables() {
        let raw = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let sources = RawSources {
            states: raw.path().join("states.csv"),
            countries: raw.path().join("countries.csv"),
            street_suffixes: raw.path().join("street_suffixes.csv"),
            zip_codes: raw.path().join("zip_codes.csv"),
        };
        std::fs::write(&sources.states, RAW_STATES).unwrap();
        std::fs::write(&sources.countries, RAW_COUNTRIES).unwrap();
        std::fs::write(&sources.street_suffixes, RAW_STREET_SUFFIXES).unwrap();
        std::fs::write(&sources.zip_codes, RAW_ZIP_CODES).unwrap();

        let report = build_all(&sources, out.path()).unwrap();
        let loaded = LookupTables::load_dir(out.path()).unwrap();

        assert_eq!(report.states, loaded.states().len());
        assert_eq!(report.zip_codes, loaded.zip_codes().len());
        assert_eq!(&loaded, LookupTables::bundled());
    }

    #[test]
    fn build_all_reports_missing_input() {
        let out = tempfile::tempdir().unwrap();
        let sources = RawSources {
            states: out.path().join("missing.csv"),
            countries: out.path().join("missing.csv"),
            street_suffixes: out.path().join("missing.csv"),
            zip_codes: out.path().join("missing.csv"),
        };

        let err = build_all(&sources, out.path()).unwrap_err();
        assert!(matches!(err, TableBuildError::Io { .. }), "{err}");
    }
}
