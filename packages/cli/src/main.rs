#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI for address canonicalization and duplicate detection.
//!
//! - `dedupe`: reads a delimited record file and prints one line per
//!   duplicate pair, in discovery order
//! - `canonicalize`: prints the canonical form of a single address
//! - `build-tables`: turns the reference CSVs into a lookup table directory
//!
//! Lookup tables come from `--tables` (or `ADDRESS_DEDUPE_TABLES_DIR`),
//! falling back to the bundled tables.

use std::borrow::Cow;
use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};

use address_dedupe_address_models::RawAddress;
use address_dedupe_canonicalizer::Canonicalizer;
use address_dedupe_deduper::{Deduper, SourceOptions};
use address_dedupe_lookup::{LookupError, LookupTables};
use address_dedupe_table_builder::{RawSources, build_all};
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "address_dedupe",
    about = "Address canonicalization and duplicate detection"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report records whose canonical address repeats an earlier record
    Dedupe {
        /// Delimited record file with a header row
        file: PathBuf,

        /// Field delimiter: a single ASCII character, or `tab`
        #[arg(long, default_value = "tab", value_parser = parse_delimiter)]
        delimiter: u8,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Tsv)]
        format: OutputFormat,

        #[command(flatten)]
        tables: TablesArgs,
    },
    /// Print the canonical form of one address as JSON
    Canonicalize {
        /// Street line, number and suffix included
        #[arg(long)]
        street: String,
        /// City name
        #[arg(long)]
        city: String,
        /// State or country, as a code or full name
        #[arg(long)]
        region: String,
        /// Postal (zip) code
        #[arg(long)]
        postal_code: String,

        #[command(flatten)]
        tables: TablesArgs,
    },
    /// Build a lookup table directory from the reference CSVs
    BuildTables {
        /// USPS state abbreviations CSV
        #[arg(long)]
        states: PathBuf,
        /// ISO 3166 country codes CSV
        #[arg(long)]
        countries: PathBuf,
        /// USPS street suffix abbreviations CSV
        #[arg(long)]
        street_suffixes: PathBuf,
        /// Zip code database CSV
        #[arg(long)]
        zip_codes: PathBuf,
        /// Output directory for the TOML tables
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Args)]
struct TablesArgs {
    /// Lookup table directory (defaults to the bundled tables)
    #[arg(long, env = "ADDRESS_DEDUPE_TABLES_DIR")]
    tables: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// `source_id<TAB>duplicate_id` per line
    Tsv,
    /// One JSON object per line
    Json,
}

fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ => {
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii() => {
                    u8::try_from(c).map_err(|e| e.to_string())
                }
                _ => Err(format!(
                    "delimiter must be a single ASCII character or `tab`, got '{value}'"
                )),
            }
        }
    }
}

/// Loads tables from `dir`, or borrows the bundled tables when no directory
/// is configured.
fn load_tables(dir: Option<&Path>) -> Result<Cow<'static, LookupTables>, LookupError> {
    match dir {
        Some(dir) => Ok(Cow::Owned(LookupTables::load_dir(dir)?)),
        None => {
            log::debug!("Using bundled lookup tables");
            Ok(Cow::Borrowed(LookupTables::bundled()))
        }
    }
}

fn dedupe(
    file: &Path,
    delimiter: u8,
    format: OutputFormat,
    tables: &LookupTables,
) -> Result<(), Box<dyn std::error::Error>> {
    let deduper = Deduper::new(Canonicalizer::new(tables));
    let options = SourceOptions::default().with_delimiter(delimiter);
    let duplicates = deduper.dedupe_from(file, &options)?;

    let mut out = BufWriter::new(std::io::stdout().lock());
    for pair in &duplicates {
        match format {
            OutputFormat::Tsv => writeln!(out, "{}\t{}", pair.source_id, pair.duplicate_id)?,
            OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(pair)?)?,
        }
    }
    out.flush()?;

    log::info!("Found {} duplicates in {}", duplicates.len(), file.display());

    Ok(())
}

fn build_tables(sources: &RawSources, out: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let report = build_all(sources, out)?;
    if report.conflicts > 0 {
        log::warn!(
            "{} conflicting rows were dropped; see warnings above",
            report.conflicts
        );
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Dedupe {
            file,
            delimiter,
            format,
            tables,
        } => {
            let tables = load_tables(tables.tables.as_deref())?;
            dedupe(&file, delimiter, format, &tables)?;
        }
        Commands::Canonicalize {
            street,
            city,
            region,
            postal_code,
            tables,
        } => {
            let tables = load_tables(tables.tables.as_deref())?;
            let raw = RawAddress::new(street, city, region, postal_code);
            let canonical = Canonicalizer::new(&tables).canonicalize(&raw);
            println!("{}", serde_json::to_string_pretty(&canonical)?);
        }
        Commands::BuildTables {
            states,
            countries,
            street_suffixes,
            zip_codes,
            out,
        } => {
            let sources = RawSources {
                states,
                countries,
                street_suffixes,
                zip_codes,
            };
            build_tables(&sources, &out)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_tab_delimiter_spellings() {
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter("\\t"), Ok(b'\t'));
        assert_eq!(parse_delimiter("\t"), Ok(b'\t'));
    }

    #[test]
    fn parses_single_ascii_delimiter() {
        assert_eq!(parse_delimiter(","), Ok(b','));
        assert_eq!(parse_delimiter("|"), Ok(b'|'));
    }

    #[test]
    fn rejects_bad_delimiters() {
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter(",,").is_err());
        assert!(parse_delimiter("é").is_err());
    }

    #[test]
    fn falls_back_to_bundled_tables() {
        let tables = load_tables(None).unwrap();
        assert!(matches!(tables, Cow::Borrowed(_)));
        assert_eq!(tables.state("PENNSYLVANIA"), Some("PA"));
    }

    #[test]
    fn missing_tables_dir_is_an_error() {
        assert!(load_tables(Some(Path::new("/nonexistent/address-tables"))).is_err());
    }

    #[test]
    fn dedupe_defaults_to_tab_and_tsv() {
        let cli = Cli::try_parse_from(["address_dedupe", "dedupe", "records.tsv"]).unwrap();
        let Commands::Dedupe {
            delimiter, format, ..
        } = cli.command
        else {
            panic!("expected dedupe command");
        };

        assert_eq!(delimiter, b'\t');
        assert_eq!(format, OutputFormat::Tsv);
    }
}
