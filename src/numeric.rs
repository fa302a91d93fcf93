// 🔢 Numeric Normalizer
// Thousands separators and currency glyphs out, exact decimals in

use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::{ExtractionError, Result};

/// Currency glyphs and abbreviations removed before parsing.
/// Longer forms come first so "บาท" is not left as "าท" by the bare "บ".
const CURRENCY_GLYPHS: &[&str] = &["บาท", "บ.", "บ", "฿", "THB", "Baht", "IDR", "Rp"];

static DECIMAL_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+(?:\.\d+)?").unwrap());

/// Remove thousands separators from a whole message.
pub fn strip_thousands(text: &str) -> String {
    text.replace(',', "")
}

/// Normalize an amount token to the bare decimal text `Decimal` expects.
///
/// # Examples:
/// ```
/// use bank_wash::numeric::normalize_amount;
/// assert_eq!(normalize_amount("1,042.00บ"), "1042.00");
/// assert_eq!(normalize_amount("฿ 1,000.00"), "1000.00");
/// ```
pub fn normalize_amount(token: &str) -> String {
    let mut cleaned: String = token
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    for glyph in CURRENCY_GLYPHS {
        cleaned = cleaned.replace(glyph, "");
    }

    match cleaned.strip_prefix('+') {
        Some(rest) => rest.to_string(),
        None => cleaned,
    }
}

/// Parse an amount token. Failure is always `UnparseableAmount`, never zero.
pub fn parse_amount(token: &str) -> Result<Decimal> {
    let cleaned = normalize_amount(token);
    if cleaned.is_empty() {
        return Err(ExtractionError::amount(token));
    }

    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map_err(|_| ExtractionError::amount(token))
}

/// True when the token parses as an amount after normalization.
pub fn is_amount(token: &str) -> bool {
    parse_amount(token).is_ok()
}

/// First decimal number embedded anywhere in the text (separators removed first).
///
/// Used for balance tokens glued to a label, e.g. "ใช้ได้36,447.43บ".
pub fn first_decimal(text: &str) -> Option<Decimal> {
    let cleaned = strip_thousands(text);
    let found = DECIMAL_NUMBER.find(&cleaned)?;
    Decimal::from_str(found.as_str()).ok()
}
