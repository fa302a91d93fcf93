// Bank for Agriculture and Agricultural Co-operatives: PromptPay credits

use chrono::{DateTime, Utc};

use super::{or_received, reject_markers, require_any, tokens, unexpected_shape};
use crate::calendar::{self, Era};
use crate::context::ExtractContext;
use crate::diagnostics::ErrorAccumulator;
use crate::error::{ExtractionError, Result};
use crate::numeric;
use crate::record::Extracted;

const BANK: &str = "BAAC";

/// `18/05/2568 14:22 บช.x1234 รับโอนพร้อมเพย์ จาก x5678 1,000.00 บ. คงเหลือ 5,000.00 บ.`
///
/// The year in the date is not trusted (the bank writes both eras), so only
/// day and month are read. Balance sits at [9] when the message is long enough.
pub(super) fn extract(raw: &str, ctx: &ExtractContext, notes: &mut ErrorAccumulator) -> Result<Extracted> {
    reject_markers(BANK, raw, &["OTP"])?;
    require_any(BANK, raw, &["รับโอนพร้อมเพย์"])?;
    let t = tokens(raw);

    if t.len() < 7 {
        return Err(unexpected_shape(BANK, &t));
    }
    let amount = numeric::parse_amount(t[6])?;

    let occurred_at = or_received(day_month_time(t[0], t[1], ctx), ctx, notes);

    let balance = if t.len() >= 10 { notes.balance(Some(t[9])) } else { None };

    Ok(Extracted::new(amount, occurred_at).with_balance(balance))
}

/// "18/05/2568" or "18/05/2025" + "14:22" in the assumed year
fn day_month_time(date: &str, clock: &str, ctx: &ExtractContext) -> Result<DateTime<Utc>> {
    let mut parts = date.split('/');
    match (parts.next(), parts.next()) {
        (Some(day), Some(month)) => {
            calendar::parse_day_month_year(&format!("{}/{}", day, month), clock, Era::Gregorian, '/', ctx)
        }
        _ => Err(ExtractionError::time(date)),
    }
}
