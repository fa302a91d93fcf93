// 🏦 Bank Extractors
// One strategy per bank/message type, selected by a closed enum
//
// Each bank module exposes plain functions over (raw, ctx, notes). BankType
// is the only thing that knows which function serves which tag.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::calendar::TimeConvention;
use crate::context::ExtractContext;
use crate::diagnostics::ErrorAccumulator;
use crate::error::{AmountField, ExtractionError, Result};
use crate::numeric;
use crate::payload;
use crate::record::Extracted;

mod baac;
mod bay;
mod bbl;
mod gsb;
mod kbank;
mod ktb;
mod scb;
mod truemoney;
mod ttb;

// ============================================================================
// BANK TYPES
// ============================================================================

/// BankType - every built-in message format
///
/// Several routing tags can share one variant (`TTB`, `TTB读取` and `TTB通知`
/// use the same grammar). Adding a bank means adding a variant here, a row in
/// [`KNOWN_TAGS`] and an arm in [`BankType::extract`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BankType {
    Scb,
    ScbNotify,
    ScbWater,
    Ktb,
    KtbLine,
    KtbNotify,
    KtbWater,
    KbankNotify,
    KbankRead,
    KbankWater,
    Bbl,
    BblWater,
    Baac,
    Ttb,
    Bay,
    Gsb,
    TrueMoneyWater,
    TrueMoneyPush,
    KkrLscli,
    RelayGh,
    ProtocolWater,
}

/// Routing tag → bank type, including aliases. Tags are case-sensitive.
pub static KNOWN_TAGS: &[(&str, BankType)] = &[
    ("SCB", BankType::Scb),
    ("SCB读取", BankType::Scb),
    ("SCB通知", BankType::ScbNotify),
    ("SCB流水", BankType::ScbWater),
    ("KTB", BankType::Ktb),
    ("KTBLine", BankType::KtbLine),
    ("KTB通知", BankType::KtbNotify),
    ("KTB流水", BankType::KtbWater),
    ("KBANK通知", BankType::KbankNotify),
    ("KBANK读取", BankType::KbankRead),
    ("KBANK流水", BankType::KbankWater),
    ("BBL", BankType::Bbl),
    ("BBL流水", BankType::BblWater),
    ("BAAC", BankType::Baac),
    ("TTB", BankType::Ttb),
    ("TTB读取", BankType::Ttb),
    ("TTB通知", BankType::Ttb),
    ("BAY", BankType::Bay),
    ("GSB", BankType::Gsb),
    ("GSB读取", BankType::Gsb),
    ("GSB通知", BankType::Gsb),
    ("GSBLine", BankType::Gsb),
    ("TM流水", BankType::TrueMoneyWater),
    ("TM流水ios", BankType::TrueMoneyWater),
    ("SwooleTM", BankType::TrueMoneyPush),
    ("KKRLSCLI", BankType::KkrLscli),
    ("python-SCBGH", BankType::RelayGh),
    ("python-KTBGH", BankType::RelayGh),
    ("python-Kbankgh", BankType::RelayGh),
    ("python-Ttbgh", BankType::RelayGh),
    ("python-BAYGH", BankType::RelayGh),
    ("tm_protocol_water", BankType::ProtocolWater),
    ("scb_protocol_water", BankType::ProtocolWater),
    ("ttb_protocol_water", BankType::ProtocolWater),
];

impl BankType {
    /// Look up a routing tag. `None` for anything not built in.
    pub fn from_tag(tag: &str) -> Option<&'static BankType> {
        KNOWN_TAGS
            .iter()
            .find(|(known, _)| *known == tag)
            .map(|(_, bank)| bank)
    }

    /// Canonical tag, used in error messages and logs
    pub fn name(&self) -> &'static str {
        match self {
            BankType::Scb => "SCB",
            BankType::ScbNotify => "SCB通知",
            BankType::ScbWater => "SCB流水",
            BankType::Ktb => "KTB",
            BankType::KtbLine => "KTBLine",
            BankType::KtbNotify => "KTB通知",
            BankType::KtbWater => "KTB流水",
            BankType::KbankNotify => "KBANK通知",
            BankType::KbankRead => "KBANK读取",
            BankType::KbankWater => "KBANK流水",
            BankType::Bbl => "BBL",
            BankType::BblWater => "BBL流水",
            BankType::Baac => "BAAC",
            BankType::Ttb => "TTB",
            BankType::Bay => "BAY",
            BankType::Gsb => "GSB",
            BankType::TrueMoneyWater => "TM流水",
            BankType::TrueMoneyPush => "SwooleTM",
            BankType::KkrLscli => "KKRLSCLI",
            BankType::RelayGh => "python-GH",
            BankType::ProtocolWater => "protocol_water",
        }
    }
}

// ============================================================================
// EXTRACTOR TRAIT
// ============================================================================

/// BankExtractor - turns one raw message into an [`Extracted`] value
///
/// Implementations are pure: no I/O, no clock reads, no shared mutable state.
/// Non-fatal problems go into `notes`; the first blocking one is returned.
pub trait BankExtractor: Send + Sync {
    fn extract(&self, raw: &str, ctx: &ExtractContext, notes: &mut ErrorAccumulator) -> Result<Extracted>;

    /// Name for logs and error messages
    fn name(&self) -> &str;
}

impl BankExtractor for BankType {
    fn extract(&self, raw: &str, ctx: &ExtractContext, notes: &mut ErrorAccumulator) -> Result<Extracted> {
        let bank = self.name();
        match self {
            BankType::Scb => scb::extract(raw, ctx, notes),
            BankType::ScbNotify => scb::extract_notify(raw, ctx),
            BankType::Ktb => ktb::extract(raw, ctx, notes),
            BankType::KtbLine => ktb::extract_line(raw, ctx, notes),
            BankType::KtbNotify => ktb::extract_notify(raw, ctx),
            BankType::KbankNotify => kbank::extract_notify(raw, ctx),
            BankType::KbankRead => kbank::extract_read(raw, ctx, notes),
            BankType::Bbl => bbl::extract(raw, ctx, notes),
            BankType::Baac => baac::extract(raw, ctx, notes),
            BankType::Ttb => ttb::extract(raw, ctx, notes),
            BankType::Bay => bay::extract(raw, ctx, notes),
            BankType::Gsb => gsb::extract(raw, ctx, notes),
            BankType::TrueMoneyPush => truemoney::extract_push(raw, ctx),
            BankType::ScbWater => water(bank, raw, TimeConvention::DayMonthYearSlash, ctx, notes),
            BankType::KtbWater => water(bank, raw, TimeConvention::DayMonthYearDash, ctx, notes),
            BankType::KbankWater => water(bank, raw, TimeConvention::ThaiBuddhist, ctx, notes),
            BankType::BblWater => water(bank, raw, TimeConvention::EnglishMonth, ctx, notes),
            BankType::TrueMoneyWater => water(bank, raw, TimeConvention::ThaiBuddhist, ctx, notes),
            BankType::KkrLscli => water(bank, raw, TimeConvention::UnixSeconds, ctx, notes),
            BankType::RelayGh | BankType::ProtocolWater => water(bank, raw, TimeConvention::Iso, ctx, notes),
        }
    }

    fn name(&self) -> &str {
        BankType::name(self)
    }
}

// ============================================================================
// SHARED HELPERS
// ============================================================================

/// JSON relays: decode the embedded object, then map it under the bank's convention.
fn water(
    bank: &str,
    raw: &str,
    convention: TimeConvention,
    ctx: &ExtractContext,
    notes: &mut ErrorAccumulator,
) -> Result<Extracted> {
    payload::decode(bank, raw)?.into_extracted(bank, convention, ctx, notes)
}

pub(crate) fn tokens(raw: &str) -> Vec<&str> {
    raw.split_whitespace().collect()
}

/// `NonDepositMessage` when any marker phrase occurs anywhere in the message.
pub(crate) fn reject_markers(bank: &str, raw: &str, markers: &[&str]) -> Result<()> {
    match markers.iter().find(|m| raw.contains(*m)) {
        Some(marker) => Err(ExtractionError::non_deposit(bank, format!("contains {:?}", marker))),
        None => Ok(()),
    }
}

/// `NonDepositMessage` unless at least one deposit phrase is present.
pub(crate) fn require_any(bank: &str, raw: &str, markers: &[&str]) -> Result<()> {
    if markers.iter().any(|m| raw.contains(*m)) {
        Ok(())
    } else {
        Err(ExtractionError::non_deposit(bank, format!("none of {:?}", markers)))
    }
}

/// Token at `index`, or `MalformedMessage` naming the shape that was expected.
pub(crate) fn token<'a>(bank: &str, tokens: &[&'a str], index: usize) -> Result<&'a str> {
    tokens.get(index).copied().ok_or_else(|| {
        ExtractionError::malformed(bank, format!("expected token {} in {} tokens", index, tokens.len()))
    })
}

pub(crate) fn unexpected_shape(bank: &str, tokens: &[&str]) -> ExtractionError {
    ExtractionError::malformed(bank, format!("unexpected layout ({} tokens)", tokens.len()))
}

/// Resolve an optional embedded time: a failure is noted and the received
/// time is used instead.
pub(crate) fn or_received(
    parsed: Result<DateTime<Utc>>,
    ctx: &ExtractContext,
    notes: &mut ErrorAccumulator,
) -> DateTime<Utc> {
    match parsed {
        Ok(at) => at,
        Err(e) => {
            notes.add(e);
            ctx.received_at()
        }
    }
}

/// Balance glued to a label ("ใช้ได้36,447.43บ"): first decimal in the token.
pub(crate) fn embedded_balance(notes: &mut ErrorAccumulator, token: &str) -> Option<Decimal> {
    let found = numeric::first_decimal(token);
    if found.is_none() {
        notes.add(ExtractionError::UnparseableAmount {
            field: AmountField::Balance,
            value: token.to_string(),
        });
    }
    found
}
