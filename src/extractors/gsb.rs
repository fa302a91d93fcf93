// Government Savings Bank: app, read-out, notify and LINE share one grammar

use chrono::{DateTime, Utc};
use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::{reject_markers, token, tokens, unexpected_shape};
use crate::calendar;
use crate::context::ExtractContext;
use crate::diagnostics::ErrorAccumulator;
use crate::error::{ExtractionError, Result};
use crate::numeric;
use crate::record::Extracted;

const BANK: &str = "GSB";

const NON_DEPOSIT: &[&str] = &["เงินออก", "ถอนเงิน", "OTP"];

/// "วันที่ 24 พ.ค. 2568 เวลา 15:04 น."
static DATE_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"วันที่\s+(\d{1,2})\s+(\S+)\s+(\d{2,4})\s+เวลา\s+(\d{1,2})[:.](\d{2})\s*น").unwrap()
});

static BALANCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"คงเหลือ\s*([\d,]+\.\d{2})").unwrap());

/// `คุณได้รับเงิน <amount> ...` or `เงินเข้า: มีการฝาก/โอนเงิน <amount> บาท ...`.
///
/// The date phrase is optional, but once present it must convert.
pub(super) fn extract(raw: &str, ctx: &ExtractContext, notes: &mut ErrorAccumulator) -> Result<Extracted> {
    reject_markers(BANK, raw, NON_DEPOSIT)?;
    let t = tokens(raw);

    let amount_at = match t.first() {
        Some(lead) if *lead == "คุณได้รับเงิน" => 1,
        Some(lead) if lead.starts_with("เงินเข้า") => 2,
        _ => return Err(unexpected_shape(BANK, &t)),
    };
    let amount = numeric::parse_amount(token(BANK, &t, amount_at)?)?;

    let occurred_at = match DATE_PHRASE.captures(raw) {
        Some(caps) => phrase_time(&caps, ctx)?,
        None => ctx.received_at(),
    };

    let balance = BALANCE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|m| notes.balance(Some(m.as_str())));

    Ok(Extracted::new(amount, occurred_at).with_balance(balance))
}

fn phrase_time(caps: &Captures<'_>, ctx: &ExtractContext) -> Result<DateTime<Utc>> {
    let source = &caps[0];
    let bad = || ExtractionError::time(source);

    let day: u32 = caps[1].parse().map_err(|_| bad())?;
    let month = calendar::thai_month_to_number(&caps[2]);
    let year: i32 = caps[3].parse().map_err(|_| bad())?;
    let clock = calendar::parse_clock(&format!("{}:{}", &caps[4], &caps[5])).ok_or_else(bad)?;

    ctx.at(calendar::buddhist_to_gregorian(year), month, day, clock, source)
}
