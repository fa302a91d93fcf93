// Kasikornbank: push notify (Thai date phrase) and the K PLUS read-out SMS

use rust_decimal::Decimal;

use super::{embedded_balance, or_received, reject_markers, tokens, unexpected_shape};
use crate::calendar::{self, Era};
use crate::context::ExtractContext;
use crate::diagnostics::ErrorAccumulator;
use crate::error::{ExtractionError, Result};
use crate::numeric;
use crate::record::Extracted;

const NOTIFY: &str = "KBANK通知";
const READ: &str = "KBANK读取";

/// Outgoing wording. Notify rejects these; read marks the amount negative.
const WITHDRAWAL: &[&str] = &["เงินออก", "หักบช"];

const BALANCE_LABELS: &[&str] = &["คงเหลือ", "ใช้ได้"];

// ============================================================================
// NOTIFY
// ============================================================================

/// `บัญชี x1234 รับโอนจาก x5678 1,500.00 บาท เมื่อ วันที่ 18 พ.ค. 68 เวลา 14:22 น.`
///
/// 14 tokens put the clock at [12], 15 tokens at [14]. The two-digit year is
/// Buddhist era.
pub(super) fn extract_notify(raw: &str, ctx: &ExtractContext) -> Result<Extracted> {
    reject_markers(NOTIFY, raw, &["เงินออก", "หักบช", "ถอน"])?;
    let t = tokens(raw);

    let clock_at = match t.len() {
        14 => 12,
        15 => 14,
        _ => return Err(unexpected_shape(NOTIFY, &t)),
    };

    let amount = numeric::parse_amount(t[4])?;

    let (day, month, year, clock) = (t[8], t[9], t[10], t[clock_at]);
    let source = format!("{} {} {} {}", day, month, year, clock);
    let bad = || ExtractionError::time(&source);

    let day: u32 = day.parse().map_err(|_| bad())?;
    let year: i32 = year.parse().map_err(|_| bad())?;
    let clock = calendar::parse_clock(clock).ok_or_else(bad)?;
    let occurred_at = ctx.at(
        calendar::buddhist_to_gregorian(year),
        calendar::thai_month_to_number(month),
        day,
        clock,
        &source,
    )?;

    Ok(Extracted::new(amount, occurred_at))
}

// ============================================================================
// READ
// ============================================================================

/// K PLUS SMS read back from the handset, optionally prefixed with `KBank:`.
///
/// | tokens | amount | direction from |
/// |---|---|---|
/// | 9, 14 | [5] | any token |
/// | 10 | [6], else [5] | any token |
/// | 4, 5 | [3] | token [3] |
/// | 6 | [4] | token [3] |
///
/// Withdrawals are not rejected: the amount comes back negative.
pub(super) fn extract_read(raw: &str, ctx: &ExtractContext, notes: &mut ErrorAccumulator) -> Result<Extracted> {
    let cleaned = raw.replace("KBank:", "");
    let t = tokens(&cleaned);

    let (amount_token, outgoing) = match t.len() {
        9 | 14 => (t[5], any_withdrawal(&t)),
        10 => {
            let token = if numeric::is_amount(strip_direction(t[6]).as_str()) { t[6] } else { t[5] };
            (token, any_withdrawal(&t))
        }
        4 | 5 => (t[3], is_withdrawal(t[3])),
        6 => (t[4], is_withdrawal(t[3])),
        _ => return Err(unexpected_shape(READ, &t)),
    };

    let amount = numeric::parse_amount(&strip_direction(amount_token))?;
    let amount = if outgoing { -amount } else { amount };

    let parsed = calendar::parse_day_month_year(t[0], t[1], Era::Buddhist, '/', ctx);
    let occurred_at = or_received(parsed, ctx, notes);

    let balance = read_balance(&t, notes);

    Ok(Extracted::new(amount, occurred_at).with_balance(balance))
}

fn is_withdrawal(token: &str) -> bool {
    WITHDRAWAL.iter().any(|m| token.contains(m))
}

fn any_withdrawal(tokens: &[&str]) -> bool {
    tokens.iter().any(|t| is_withdrawal(t))
}

/// "เงินเข้า1,000.00บ" → "1,000.00บ"
fn strip_direction(token: &str) -> String {
    token.replace("เงินออก", "").replace("เงินเข้า", "")
}

/// Labelled balance when present ("คงเหลือ 5,000.00" or "ใช้ได้5,000.00บ"),
/// otherwise the second-to-last token of the long layouts.
fn read_balance(t: &[&str], notes: &mut ErrorAccumulator) -> Option<Decimal> {
    for (i, token) in t.iter().enumerate() {
        for label in BALANCE_LABELS {
            if let Some(rest) = token.strip_prefix(label) {
                return if rest.is_empty() {
                    notes.balance(t.get(i + 1).copied())
                } else {
                    embedded_balance(notes, rest)
                };
            }
        }
    }

    if t.len() >= 9 {
        notes.balance(Some(t[t.len() - 2]))
    } else {
        None
    }
}
