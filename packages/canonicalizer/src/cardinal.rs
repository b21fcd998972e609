//! Cardinal direction correction: `"N.W."` becomes `"NORTH WEST"`.

use regex::Regex;
use std::sync::LazyLock;

use crate::strip_punctuation;

/// An optional north/south letter followed by an optional east/west
/// letter. The empty string matches too.
static CARDINAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([NS]?)([EW]?)$").expect("valid regex"));

const CARDINALS: [(&str, &str); 4] = [
    ("N", "NORTH"),
    ("S", "SOUTH"),
    ("E", "EAST"),
    ("W", "WEST"),
];

/// Expands an abbreviated cardinal direction into full words.
///
/// Punctuation is stripped and the word uppercased before matching. Words
/// that do not match are returned exactly as given, punctuation included.
#[must_use]
pub fn correct_cardinal(word: &str) -> String {
    let clean = strip_punctuation(word).to_uppercase();
    let Some(caps) = CARDINAL_RE.captures(&clean) else {
        return word.to_string();
    };

    caps.iter()
        .skip(1)
        .flatten()
        .filter_map(|m| {
            CARDINALS
                .iter()
                .find(|(abbr, _)| *abbr == m.as_str())
                .map(|(_, full)| *full)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_single_directions() {
        assert_eq!(correct_cardinal("N"), "NORTH");
        assert_eq!(correct_cardinal("S"), "SOUTH");
        assert_eq!(correct_cardinal("E"), "EAST");
        assert_eq!(correct_cardinal("W"), "WEST");
    }

    #[test]
    fn expands_combined_directions() {
        assert_eq!(correct_cardinal("NE"), "NORTH EAST");
        assert_eq!(correct_cardinal("NW"), "NORTH WEST");
        assert_eq!(correct_cardinal("SE"), "SOUTH EAST");
        assert_eq!(correct_cardinal("SW"), "SOUTH WEST");
    }

    #[test]
    fn strips_periods() {
        assert_eq!(correct_cardinal("W."), "WEST");
        assert_eq!(correct_cardinal("N.W."), "NORTH WEST");
    }

    #[test]
    fn uppercases_before_matching() {
        assert_eq!(correct_cardinal("s"), "SOUTH");
        assert_eq!(correct_cardinal("n.e"), "NORTH EAST");
    }

    #[test]
    fn requires_north_south_first() {
        assert_eq!(correct_cardinal("WN"), "WN");
        assert_eq!(correct_cardinal("NSE"), "NSE");
    }

    #[test]
    fn returns_unmatched_words_unstripped() {
        assert_eq!(correct_cardinal("EGGS"), "EGGS");
        assert_eq!(correct_cardinal("1"), "1");
        assert_eq!(correct_cardinal("O'NEIL"), "O'NEIL");
        assert_eq!(correct_cardinal("main"), "main");
    }

    #[test]
    fn pure_punctuation_collapses_to_empty() {
        assert_eq!(correct_cardinal("-"), "");
        assert_eq!(correct_cardinal(""), "");
    }
}
