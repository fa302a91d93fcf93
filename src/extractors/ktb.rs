// Krungthai Bank: SMS, LINE official account and app notify formats

use chrono::{DateTime, Utc};

use super::{or_received, reject_markers, require_any, token, tokens, unexpected_shape};
use crate::calendar::{self, Era};
use crate::context::ExtractContext;
use crate::diagnostics::ErrorAccumulator;
use crate::error::{ExtractionError, Result};
use crate::numeric;
use crate::record::Extracted;

const BANK: &str = "KTB";
const LINE: &str = "KTBLine";
const NOTIFY: &str = "KTB通知";

/// SMS, English or Thai wording.
///
/// - `Deposit acct x1234 18-05@14:22 1,000.00THB Bal 5,000.00THB` (amount [4])
/// - `18-05@14:22 บช.x1234 +2,000.00 ...` (amount [2])
/// - `เงินเข้า บช x1234 18-05@14:22 จำนวน 500.00บ คงเหลือ 3,000.00บ` (amount [5])
pub(super) fn extract(raw: &str, ctx: &ExtractContext, notes: &mut ErrorAccumulator) -> Result<Extracted> {
    reject_markers(BANK, raw, &["OTP", "Withdraw"])?;
    let t = tokens(raw);
    let leading_segment = t.first().is_some_and(|first| first.contains('@'));

    let amount_at = if raw.contains("Deposit") {
        4
    } else if leading_segment {
        2
    } else {
        5
    };
    let amount = numeric::parse_amount(token(BANK, &t, amount_at)?)?;

    let segment = if leading_segment {
        t.first()
    } else {
        t.get(3).filter(|s| s.contains('@'))
    };
    let occurred_at = match segment {
        Some(segment) => or_received(at_segment(segment, ctx), ctx, notes),
        None => ctx.received_at(),
    };

    let balance = match t.len() - 1 {
        last if last > amount_at => notes.balance(t.last().copied()),
        _ => None,
    };

    Ok(Extracted::new(amount, occurred_at).with_balance(balance))
}

/// "18-05@14:22" in the assumed year
fn at_segment(segment: &str, ctx: &ExtractContext) -> Result<DateTime<Utc>> {
    match segment.split_once('@') {
        Some((date, clock)) => calendar::parse_day_month_year(date, clock, Era::Gregorian, '-', ctx),
        None => Err(ExtractionError::time(segment)),
    }
}

/// `เงินเข้า <amount> บาท ... <date> <clock> คงเหลือ <balance>` (≥10 tokens)
/// or a short form with only the amount.
pub(super) fn extract_line(raw: &str, ctx: &ExtractContext, notes: &mut ErrorAccumulator) -> Result<Extracted> {
    reject_markers(LINE, raw, &["OTP"])?;
    require_any(LINE, raw, &["เงินเข้า"])?;
    let t = tokens(raw);

    if t.len() < 2 {
        return Err(unexpected_shape(LINE, &t));
    }
    let amount = numeric::parse_amount(t[1])?;

    if t.len() < 10 {
        return Ok(Extracted::new(amount, ctx.received_at()));
    }

    let parsed = calendar::parse_day_month_year(t[6], t[7], Era::Buddhist, '/', ctx);
    let occurred_at = or_received(parsed, ctx, notes);
    let balance = notes.balance(Some(t[9]));

    Ok(Extracted::new(amount, occurred_at).with_balance(balance))
}

/// `ได้รับ <amount> ...`; the app gives no time of its own.
pub(super) fn extract_notify(raw: &str, ctx: &ExtractContext) -> Result<Extracted> {
    reject_markers(NOTIFY, raw, &["OTP"])?;
    require_any(NOTIFY, raw, &["ได้รับ"])?;
    let t = tokens(raw);

    let amount = numeric::parse_amount(token(NOTIFY, &t, 1)?)?;
    Ok(Extracted::new(amount, ctx.received_at()))
}
