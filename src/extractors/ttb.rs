// TMBThanachart: one grammar behind three routing tags

use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use std::sync::LazyLock;

use super::{reject_markers, token, tokens};
use crate::calendar::{self, Era};
use crate::context::ExtractContext;
use crate::diagnostics::ErrorAccumulator;
use crate::error::{ExtractionError, Result};
use crate::numeric;
use crate::record::Extracted;

const BANK: &str = "TTB";

const NON_DEPOSIT: &[&str] = &["โอนเงิน", "transferred", "เงินออก", "ถอน", "OTP"];

const BALANCE_LABELS: &[&str] = &["เหลือ", "ใช้ได้"];

/// "27-05@16:25" at the start of the message, year omitted
static LEADING_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2}-\d{2})@(\d{2}:\d{2})").unwrap());

/// "18/05/25@14:22" anywhere, two-digit Gregorian year
static DATED_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{2}/\d{2}/\d{2})@(\d{2}:\d{2})").unwrap());

static AMOUNT_BAHT_DOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\d,]+\.\d{2})บ\.").unwrap());

static AMOUNT_INCOMING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"เงินเข้า\s*([\d,]+\.\d{2})\s*บ").unwrap());

static BALANCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:เหลือ|ใช้ได้)\s*([\d,]+\.\d{2})\s*บ").unwrap());

/// Two shapes, both carrying a mandatory time:
///
/// - `27-05@16:25 บชX46746X:เงินเข้า 499.95บ ใช้ได้ 11,871.96บ`
/// - `มีเงินโอนเข้า 1,000.00บ. เข้าบ/ชX1234 18/05/25@14:22 เหลือ 6,000.00บ`
///
/// The amount is tried as `เงินเข้า <n>บ`, then `<n>บ.`, then token [2]
/// (English wording: `Deposit THB 1,000.00 to ...`), all before any balance label.
pub(super) fn extract(raw: &str, ctx: &ExtractContext, notes: &mut ErrorAccumulator) -> Result<Extracted> {
    reject_markers(BANK, raw, NON_DEPOSIT)?;
    let trimmed = raw.trim();

    let occurred_at = message_time(trimmed, ctx)?;
    let amount = message_amount(trimmed)?;

    let balance = BALANCE
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .and_then(|m| notes.balance(Some(m.as_str())));

    Ok(Extracted::new(amount, occurred_at).with_balance(balance))
}

fn message_time(raw: &str, ctx: &ExtractContext) -> Result<DateTime<Utc>> {
    if let Some(caps) = LEADING_SEGMENT.captures(raw) {
        return calendar::parse_day_month_year(&caps[1], &caps[2], Era::Gregorian, '-', ctx);
    }
    if let Some(caps) = DATED_SEGMENT.captures(raw) {
        return calendar::parse_day_month_year(&caps[1], &caps[2], Era::Gregorian, '/', ctx);
    }
    Err(ExtractionError::malformed(BANK, "no DD-MM@HH:MM or DD/MM/YY@HH:MM segment"))
}

fn message_amount(raw: &str) -> Result<Decimal> {
    let head = before_balance(raw);
    for pattern in [&AMOUNT_INCOMING, &AMOUNT_BAHT_DOT] {
        if let Some(found) = pattern.captures(head).and_then(|caps| caps.get(1)) {
            return numeric::parse_amount(found.as_str());
        }
    }

    let t = tokens(head);
    numeric::parse_amount(token(BANK, &t, 2)?)
}

/// Text up to the first balance label; the amount never follows it.
fn before_balance(raw: &str) -> &str {
    BALANCE_LABELS
        .iter()
        .filter_map(|label| raw.find(label))
        .min()
        .map_or(raw, |end| &raw[..end])
}
