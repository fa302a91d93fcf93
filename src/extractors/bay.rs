// Bank of Ayudhya (Krungsri) app notifications

use regex::Regex;
use std::sync::LazyLock;

use super::{or_received, tokens, unexpected_shape};
use crate::calendar::{self, Era};
use crate::context::ExtractContext;
use crate::diagnostics::ErrorAccumulator;
use crate::error::{ExtractionError, Result};
use crate::numeric;
use crate::record::Extracted;

const BANK: &str = "BAY";

/// "(18/05/25,14:22)"
static STAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d{2}/\d{2}/\d{2}),(\d{2}:\d{2})\)").unwrap());

const OUTGOING_LEADS: &[&str] = &["โอนออก", "ถอนเงิน", "ชำระเงิน"];

/// `โอนเข้า บ/ช XXX1234 1,000.00 บ. จาก X5678 (18/05/25,14:22) ผ่าน Krungsri App ยอดเงินที่ใช้ได้ คือ 5,000.00 บ.`
pub(super) fn extract(raw: &str, ctx: &ExtractContext, notes: &mut ErrorAccumulator) -> Result<Extracted> {
    let t = tokens(raw);
    let lead = t.first().copied().unwrap_or_default();

    if raw.contains("OTP") || OUTGOING_LEADS.contains(&lead) {
        return Err(ExtractionError::non_deposit(BANK, format!("starts with {:?}", lead)));
    }
    if lead != "โอนเข้า" || t.len() < 7 {
        return Err(unexpected_shape(BANK, &t));
    }

    let amount = numeric::parse_amount(t[3])?;

    let occurred_at = match STAMP.captures(raw) {
        Some(caps) => {
            let parsed = calendar::parse_day_month_year(&caps[1], &caps[2], Era::Gregorian, '/', ctx);
            or_received(parsed, ctx, notes)
        }
        None => ctx.received_at(),
    };

    let balance = if t.len() >= 14 { notes.balance(Some(t[13])) } else { None };

    Ok(Extracted::new(amount, occurred_at).with_balance(balance))
}
