// Siam Commercial Bank: SMS/app text and the 15-token notify layout

use chrono::{DateTime, Utc};

use super::{or_received, reject_markers, token, tokens, unexpected_shape};
use crate::calendar::{self, Era};
use crate::context::ExtractContext;
use crate::diagnostics::ErrorAccumulator;
use crate::error::{ExtractionError, Result};
use crate::numeric;
use crate::record::Extracted;

const BANK: &str = "SCB";
const NOTIFY: &str = "SCB通知";

/// Withdrawals, outgoing transfers, TrueMoney top-ups and OTPs.
const NON_DEPOSIT: &[&str] = &["ถอน", "โอนเงิน", "True", "OTP"];

/// `เงิน <amount> <account> DD/MM@HH:MM ...`, `Transfer ...` and `Cash/transfer ...`.
pub(super) fn extract(raw: &str, ctx: &ExtractContext, notes: &mut ErrorAccumulator) -> Result<Extracted> {
    reject_markers(BANK, raw, NON_DEPOSIT)?;
    let t = tokens(raw);

    // (amount index, time segment index)
    let (amount_at, segment_at) = match (t.first().copied(), t.len()) {
        (Some("เงิน"), n) if n >= 4 => (1, Some(3)),
        (Some("เงิน"), n) if n >= 2 => (1, None),
        (Some("Transfer"), n) if n >= 12 => (5, Some(11)),
        (Some("Transfer"), n) if n >= 6 => (5, None),
        (Some("Cash/transfer"), n) if n >= 5 => (4, None),
        (Some("Transfer" | "Cash/transfer"), _) => return Err(unexpected_shape(BANK, &t)),
        (Some(_), n) if n >= 2 => (1, None),
        _ => return Err(unexpected_shape(BANK, &t)),
    };

    let amount = numeric::parse_amount(token(BANK, &t, amount_at)?)?;

    let occurred_at = match segment_at.and_then(|i| t.get(i)) {
        Some(segment) => or_received(at_segment(segment, ctx), ctx, notes),
        None => ctx.received_at(),
    };

    let last = t.len() - 1;
    let balance = if last > amount_at && Some(last) != segment_at {
        notes.balance(t.last().copied())
    } else {
        None
    };

    Ok(Extracted::new(amount, occurred_at).with_balance(balance))
}

/// "18/05@14:22" in the assumed year
fn at_segment(segment: &str, ctx: &ExtractContext) -> Result<DateTime<Utc>> {
    match segment.split_once('@') {
        Some((date, clock)) => calendar::parse_day_month_year(date, clock, Era::Gregorian, '/', ctx),
        None => Err(ExtractionError::time(segment)),
    }
}

/// Exactly 15 tokens: amount [1], day [10], Thai month [11], clock [14].
pub(super) fn extract_notify(raw: &str, ctx: &ExtractContext) -> Result<Extracted> {
    reject_markers(NOTIFY, raw, &["OTP"])?;
    let t = tokens(raw);

    let [_, amount, _, _, _, _, _, _, _, _, day, month, _, _, clock] = t.as_slice() else {
        return Err(unexpected_shape(NOTIFY, &t));
    };

    let amount = numeric::parse_amount(amount)?;

    let source = format!("{} {} {}", day, month, clock);
    let day: u32 = day.parse().map_err(|_| ExtractionError::time(&source))?;
    let clock = calendar::parse_clock(clock).ok_or_else(|| ExtractionError::time(&source))?;
    let occurred_at = ctx.at_assumed_year(calendar::thai_month_to_number(month), day, clock, &source)?;

    Ok(Extracted::new(amount, occurred_at))
}
