//! Ordinal street-name correction: `"1ST"` and `"1ER"` both become
//! `"FIRST"`.

use regex::Regex;
use std::sync::LazyLock;

/// A digit run followed by letters. The letters are not checked against
/// any language's ordinal suffixes (`1ST`, `1ER`, `3ÈME` all match).
static ORDINAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)\p{Alphabetic}+$").expect("valid regex"));

const ONES: [&str; 20] = [
    "ZERO",
    "ONE",
    "TWO",
    "THREE",
    "FOUR",
    "FIVE",
    "SIX",
    "SEVEN",
    "EIGHT",
    "NINE",
    "TEN",
    "ELEVEN",
    "TWELVE",
    "THIRTEEN",
    "FOURTEEN",
    "FIFTEEN",
    "SIXTEEN",
    "SEVENTEEN",
    "EIGHTEEN",
    "NINETEEN",
];

const TENS: [&str; 10] = [
    "", "", "TWENTY", "THIRTY", "FORTY", "FIFTY", "SIXTY", "SEVENTY", "EIGHTY", "NINETY",
];

/// Powers of one thousand, enough for any `u64`.
const SCALES: [&str; 7] = [
    "",
    "THOUSAND",
    "MILLION",
    "BILLION",
    "TRILLION",
    "QUADRILLION",
    "QUINTILLION",
];

/// Replaces an ordinal-shaped word with the English ordinal word for its
/// number.
///
/// Words that are not a digit run followed by letters are returned
/// unchanged, as are digit runs too large for a `u64`.
#[must_use]
pub fn correct_ordinal(word: &str) -> String {
    let Some(digits) = ORDINAL_RE.captures(word).and_then(|caps| caps.get(1)) else {
        return word.to_string();
    };

    digits
        .as_str()
        .parse::<u64>()
        .map_or_else(|_| word.to_string(), ordinal_words)
}

/// Spells `n` as an uppercase English ordinal.
///
/// Tens and units are hyphenated and no "AND" is inserted:
/// `121 -> "ONE HUNDRED TWENTY-FIRST"`.
#[must_use]
pub fn ordinal_words(n: u64) -> String {
    let cardinal = cardinal_words(n);
    let split = cardinal.rfind([' ', '-']).map_or(0, |idx| idx + 1);
    let (head, last) = cardinal.split_at(split);

    let last = match last {
        "ONE" => "FIRST".to_string(),
        "TWO" => "SECOND".to_string(),
        "THREE" => "THIRD".to_string(),
        "FIVE" => "FIFTH".to_string(),
        "EIGHT" => "EIGHTH".to_string(),
        "NINE" => "NINTH".to_string(),
        "TWELVE" => "TWELFTH".to_string(),
        word => word
            .strip_suffix('Y')
            .map_or_else(|| format!("{word}TH"), |stem| format!("{stem}IETH")),
    };

    format!("{head}{last}")
}

/// Spells `n` as uppercase English cardinal words.
fn cardinal_words(n: u64) -> String {
    if n == 0 {
        return ONES[0].to_string();
    }

    let mut groups = Vec::new();
    let mut rest = n;
    for scale in SCALES {
        if rest == 0 {
            break;
        }
        let chunk = rest % 1000;
        if chunk > 0 {
            let words = below_thousand(chunk);
            groups.push(if scale.is_empty() {
                words
            } else {
                format!("{words} {scale}")
            });
        }
        rest /= 1000;
    }

    groups.reverse();
    groups.join(" ")
}

#[allow(clippy::cast_possible_truncation)]
fn below_thousand(n: u64) -> String {
    // n < 1000, so every index below fits comfortably.
    let hundreds = (n / 100) as usize;
    let rest = (n % 100) as usize;

    let tail = match rest {
        0 => None,
        1..=19 => Some(ONES[rest].to_string()),
        _ if rest % 10 == 0 => Some(TENS[rest / 10].to_string()),
        _ => Some(format!("{}-{}", TENS[rest / 10], ONES[rest % 10])),
    };

    match (hundreds, tail) {
        (0, Some(tail)) => tail,
        (h, None) => format!("{} HUNDRED", ONES[h]),
        (h, Some(tail)) => format!("{} HUNDRED {tail}", ONES[h]),
    }
}
