#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Address canonicalization.
//!
//! Rewrites each field of a [`RawAddress`] into a standard representation
//! so that two spellings of the same place produce equal
//! [`CanonicalAddress`] values:
//!
//! - **postal code**: uppercased
//! - **region**: uppercased, then state table, then country table
//! - **city**: uppercased, then resolved within the zip code's known
//!   city variants
//! - **street**: uppercased; the last word is treated as the suffix
//!   (punctuation stripped, standardized), every earlier word goes through
//!   [`correct_cardinal`] then [`correct_ordinal`]
//!
//! Canonicalization never fails. A lookup miss keeps the uppercased (or
//! cleaned) input for that field.
//!
//! # Usage
//!
//! ```rust
//! use address_dedupe_address_models::RawAddress;
//! use address_dedupe_canonicalizer::Canonicalizer;
//!
//! let canonical = Canonicalizer::bundled().canonicalize(&RawAddress::new(
//!     "123 1st Street",
//!     "cityburg",
//!     "pennsylvania",
//!     "12345",
//! ));
//! assert_eq!(canonical.street, "123 FIRST ST");
//! assert_eq!(canonical.region, "PA");
//! ```

pub mod cardinal;
pub mod ordinal;

use std::borrow::Cow;
use std::sync::LazyLock;

use address_dedupe_address_models::{CanonicalAddress, RawAddress};
use address_dedupe_lookup::LookupTables;
use regex::Regex;

pub use cardinal::correct_cardinal;
pub use ordinal::{correct_ordinal, ordinal_words};

/// Any ASCII or Unicode punctuation character.
static PUNCTUATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[[:punct:]\p{P}]").expect("valid regex"));

/// Trims `input` and collapses every inner whitespace run to one space.
#[must_use]
pub fn normalize_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes every punctuation character from `input`.
#[must_use]
pub fn strip_punctuation(input: &str) -> Cow<'_, str> {
    PUNCTUATION_RE.replace_all(input, "")
}

/// Maps raw addresses to canonical addresses using a set of lookup tables.
///
/// Holds only a shared reference to the tables, so it is `Copy` and can be
/// used from any number of threads at once.
#[derive(Debug, Clone, Copy)]
pub struct Canonicalizer<'a> {
    tables: &'a LookupTables,
}

impl<'a> Canonicalizer<'a> {
    /// Creates a canonicalizer over `tables`.
    #[must_use]
    pub const fn new(tables: &'a LookupTables) -> Self {
        Self { tables }
    }

    /// Canonicalizes every field of `raw`.
    ///
    /// Each field is uppercased and its whitespace collapsed to single
    /// spaces with no leading or trailing run before any lookup.
    #[must_use]
    pub fn canonicalize(&self, raw: &RawAddress) -> CanonicalAddress {
        let postal_code = normalize_whitespace(&raw.postal_code.to_uppercase());
        let region = self.correct_region(&normalize_whitespace(&raw.region.to_uppercase()));
        let city = self.correct_city(
            &postal_code,
            &normalize_whitespace(&raw.city.to_uppercase()),
        );
        let street = self.correct_street(&raw.street.to_uppercase());

        CanonicalAddress {
            street,
            city,
            region,
            postal_code,
        }
    }

    /// Standardizes an uppercased street line.
    ///
    /// The last word is the suffix, looked up with punctuation stripped;
    /// the leading words are rejoined with single spaces after cardinal then
    /// ordinal correction. A street of one word is all suffix. Trailing
    /// words that are bare punctuation are ignored when picking the suffix,
    /// and leading words that correct to nothing are dropped.
    #[must_use]
    pub fn correct_street(&self, street: &str) -> String {
        let mut words = street.split_whitespace().collect::<Vec<_>>();
        let mut suffix = None;
        while let Some(word) = words.pop() {
            let clean = strip_punctuation(word);
            if !clean.is_empty() {
                suffix = Some(clean);
                break;
            }
        }

        let suffix = suffix.map(|clean| {
            self.tables
                .street_suffix(&clean)
                .map_or_else(|| clean.into_owned(), str::to_string)
        });

        words
            .into_iter()
            .map(|word| correct_ordinal(&correct_cardinal(word)))
            .filter(|word| !word.is_empty())
            .chain(suffix)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Standardizes an uppercased region: state code first, then country
    /// code, else unchanged.
    #[must_use]
    pub fn correct_region(&self, region: &str) -> String {
        self.tables
            .state(region)
            .or_else(|| self.tables.country(region))
            .unwrap_or(region)
            .to_string()
    }

    /// Resolves an uppercased city to the primary city of `postal_code`.
    ///
    /// Only variants listed for that exact zip code are corrected; the same
    /// spelling under another zip code is left alone.
    #[must_use]
    pub fn correct_city(&self, postal_code: &str, city: &str) -> String {
        self.tables
            .city(postal_code, city)
            .unwrap_or(city)
            .to_string()
    }
}

impl Canonicalizer<'static> {
    /// A canonicalizer over [`LookupTables::bundled`].
    #[must_use]
    pub fn bundled() -> Self {
        Self::new(LookupTables::bundled())
    }
}
