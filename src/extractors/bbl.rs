// Bangkok Bank SMS: PromptPay credits and plain deposits

use regex::Regex;
use std::sync::LazyLock;

use super::{embedded_balance, reject_markers, require_any, token, tokens};
use crate::context::ExtractContext;
use crate::diagnostics::ErrorAccumulator;
use crate::error::Result;
use crate::numeric;
use crate::record::Extracted;

const BANK: &str = "BBL";

/// "ผ่านMB 1,042.00 บ" when the deposit layout shifts the amount
static MB_AMOUNT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"MB\s+([\d,]+(?:\.\d+)?)\s+บ").unwrap());

/// Time is never in the text; the received time stands in.
pub(super) fn extract(raw: &str, ctx: &ExtractContext, notes: &mut ErrorAccumulator) -> Result<Extracted> {
    reject_markers(BANK, raw, &["ถอน/โอน", "Money Withdrawal"])?;
    require_any(BANK, raw, &["PromptPay", "Deposit"])?;
    let t = tokens(raw);

    let amount_at = if raw.contains("PromptPay") { 8 } else { 2 };
    let mut amount = numeric::parse_amount(token(BANK, &t, amount_at)?)?;
    if amount.is_zero() && amount_at == 2 {
        if let Some(found) = MB_AMOUNT.captures(raw).and_then(|caps| caps.get(1)) {
            amount = numeric::parse_amount(found.as_str())?;
        }
    }

    // "ใช้ได้36,447.43บ"
    let balance = match t.last() {
        Some(last) if t.len() - 1 > amount_at => embedded_balance(notes, last),
        _ => None,
    };

    Ok(Extracted::new(amount, ctx.received_at()).with_balance(balance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionError;
    use crate::extractors::fixtures::{ctx, received};
    use rust_decimal_macros::dec;

    #[test]
    fn test_bbl_promptpay() {
        let mut notes = ErrorAccumulator::new();
        let raw = "PromptPay x1234 received from x5678 via MB amount 1,500.00บ ใช้ได้36,447.43บ";
        let extracted = extract(raw, &ctx(), &mut notes).unwrap();

        assert_eq!(extracted.amount, dec!(1500.00));
        assert_eq!(extracted.occurred_at, received());
        assert_eq!(extracted.balance, Some(dec!(36447.43)));
    }

    #[test]
    fn test_bbl_deposit() {
        let mut notes = ErrorAccumulator::new();
        let extracted = extract("Deposit x0280 500.00บ ใช้ได้36,947.43บ", &ctx(), &mut notes).unwrap();

        assert_eq!(extracted.amount, dec!(500.00));
        assert_eq!(extracted.balance, Some(dec!(36947.43)));
        assert!(notes.is_empty());
    }

    #[test]
    fn test_bbl_zero_deposit_token_recaptures_mb_amount() {
        let mut notes = ErrorAccumulator::new();
        let raw = "Deposit x0280 0 ผ่านMB 1,042.00 บ ใช้ได้36,447.43บ";
        let extracted = extract(raw, &ctx(), &mut notes).unwrap();

        assert_eq!(extracted.amount, dec!(1042.00));
        assert_eq!(extracted.balance, Some(dec!(36447.43)));
    }

    #[test]
    fn test_bbl_withdrawal_is_non_deposit() {
        let raw = "ถอน/โอน/จ่ายเงินจากบ/ชX0280 ผ่านMB 1,042.00บ ใช้ได้36,447.43บ";
        let err = extract(raw, &ctx(), &mut ErrorAccumulator::new()).unwrap_err();
        assert!(matches!(err, ExtractionError::NonDepositMessage { .. }));
    }

    #[test]
    fn test_bbl_without_deposit_wording_is_non_deposit() {
        let err = extract("บัญชี x0280 500.00บ", &ctx(), &mut ErrorAccumulator::new()).unwrap_err();
        assert!(err.is_non_deposit());
    }

    #[test]
    fn test_bbl_short_promptpay_is_malformed() {
        let err = extract("PromptPay x1234 500.00บ", &ctx(), &mut ErrorAccumulator::new()).unwrap_err();
        assert!(matches!(err, ExtractionError::MalformedMessage { .. }));
    }
}
