// 🧩 Template Engine - two regexes per bank
// For banks whose notification has exactly one fixed wording

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};
use regex::Regex;
use rust_decimal::Decimal;

use crate::context::{ExtractContext, DEFAULT_UTC_OFFSET_MINUTES};
use crate::diagnostics::ErrorAccumulator;
use crate::error::{ConfigError, ExtractionError, Result};
use crate::extractors::BankExtractor;
use crate::numeric;
use crate::record::Extracted;

pub const DEFAULT_TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

// ============================================================================
// CONFIG
// ============================================================================

/// What to do when the time pattern yields nothing usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimePolicy {
    #[default]
    FallbackToReceived,
    Required,
}

/// ExtractorConfig - one bank's compiled patterns
///
/// Each pattern must have at least one capture group; the first group is
/// the field value. Built once, then shared read-only across threads.
///
/// # Examples:
/// ```
/// use bank_wash::ExtractorConfig;
///
/// let bri = ExtractorConfig::new(
///     "BRI",
///     r"(\d{2}/\d{2}/\d{4} \d{2}:\d{2}:\d{2})",
///     r"Rp(\d+\.\d{3})",
/// ).unwrap();
/// assert_eq!(bri.bank_type(), "BRI");
/// ```
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    bank_type: String,
    pay_time_pattern: Regex,
    pay_coin_pattern: Regex,
    time_format: String,
    utc_offset: FixedOffset,
    time_policy: TimePolicy,
}

impl ExtractorConfig {
    pub fn new(bank_type: &str, pay_time_pattern: &str, pay_coin_pattern: &str) -> std::result::Result<Self, ConfigError> {
        Ok(ExtractorConfig {
            bank_type: bank_type.to_string(),
            pay_time_pattern: compile(bank_type, "pay_time", pay_time_pattern)?,
            pay_coin_pattern: compile(bank_type, "pay_coin", pay_coin_pattern)?,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            utc_offset: default_offset(),
            time_policy: TimePolicy::default(),
        })
    }

    /// Builder pattern: chrono format for the captured time text
    pub fn with_time_format(mut self, time_format: &str) -> Self {
        self.time_format = time_format.to_string();
        self
    }

    /// Builder pattern: wall-clock offset the bank writes times in
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    pub fn with_time_policy(mut self, policy: TimePolicy) -> Self {
        self.time_policy = policy;
        self
    }

    pub fn bank_type(&self) -> &str {
        &self.bank_type
    }

    pub fn time_format(&self) -> &str {
        &self.time_format
    }

    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset
    }

    pub fn time_policy(&self) -> TimePolicy {
        self.time_policy
    }
}

fn compile(bank: &str, which: &'static str, pattern: &str) -> std::result::Result<Regex, ConfigError> {
    let regex = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
        bank: bank.to_string(),
        which,
        source,
    })?;

    // captures_len counts the implicit whole-match group
    if regex.captures_len() < 2 {
        return Err(ConfigError::MissingCaptureGroup {
            bank: bank.to_string(),
            which,
        });
    }
    Ok(regex)
}

pub(crate) fn default_offset() -> FixedOffset {
    FixedOffset::east_opt(DEFAULT_UTC_OFFSET_MINUTES * 60).unwrap_or(Utc.fix())
}

// ============================================================================
// ENGINE
// ============================================================================

/// Result of running both patterns. Either field may be missing;
/// `errors` says why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateExtraction {
    pub pay_time: Option<DateTime<Utc>>,
    pub pay_coin: Option<Decimal>,
    pub errors: ErrorAccumulator,
}

pub struct TemplateEngine;

impl TemplateEngine {
    /// Run a config's two patterns over `raw`.
    ///
    /// A failed pattern leaves its field unset and records an error; the other
    /// field is still attempted. Never panics, never fails outright.
    pub fn extract(config: &ExtractorConfig, raw: &str) -> TemplateExtraction {
        let mut errors = ErrorAccumulator::new();
        let bank = config.bank_type();

        if raw.trim().is_empty() {
            errors.add(ExtractionError::malformed(bank, "empty message"));
            return TemplateExtraction {
                pay_time: None,
                pay_coin: None,
                errors,
            };
        }

        let pay_time = match first_capture(&config.pay_time_pattern, raw) {
            Some(text) => {
                let parsed = NaiveDateTime::parse_from_str(text.trim(), &config.time_format)
                    .ok()
                    .and_then(|local| config.utc_offset.from_local_datetime(&local).single())
                    .map(|dt| dt.with_timezone(&Utc));
                if parsed.is_none() {
                    errors.add(ExtractionError::time(text));
                }
                parsed
            }
            None => {
                errors.add(ExtractionError::malformed(bank, "time pattern did not match"));
                None
            }
        };

        let stripped = numeric::strip_thousands(raw);
        let pay_coin = match first_capture(&config.pay_coin_pattern, &stripped) {
            Some(text) => match numeric::parse_amount(text) {
                Ok(amount) => Some(amount),
                Err(e) => {
                    errors.add(e);
                    None
                }
            },
            None => {
                errors.add(ExtractionError::malformed(bank, "amount pattern did not match"));
                None
            }
        };

        TemplateExtraction {
            pay_time,
            pay_coin,
            errors,
        }
    }
}

fn first_capture<'t>(pattern: &Regex, text: &'t str) -> Option<&'t str> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

impl TemplateExtraction {
    /// Turn the raw template result into an [`Extracted`] value.
    ///
    /// The amount is mandatory. The error reported is the one recorded for
    /// the amount pattern (no match, or a capture that didn't parse).
    pub fn into_extracted(self, policy: TimePolicy, ctx: &ExtractContext) -> Result<Extracted> {
        let amount = match self.pay_coin {
            Some(amount) => amount,
            None => return Err(self.amount_error()),
        };

        let occurred_at = match (self.pay_time, policy) {
            (Some(at), _) => at,
            (None, TimePolicy::FallbackToReceived) => ctx.received_at(),
            (None, TimePolicy::Required) => return Err(self.time_error()),
        };

        Ok(Extracted::new(amount, occurred_at))
    }

    fn amount_error(&self) -> ExtractionError {
        // Time errors come first when both patterns failed
        self.errors
            .errors()
            .iter()
            .rev()
            .find(|e| !matches!(e, ExtractionError::UnparseableTime { .. }))
            .cloned()
            .unwrap_or_else(|| ExtractionError::malformed("template", "amount pattern did not match"))
    }

    fn time_error(&self) -> ExtractionError {
        self.errors
            .errors()
            .iter()
            .find(|e| matches!(e, ExtractionError::UnparseableTime { .. }))
            .cloned()
            .unwrap_or_else(|| ExtractionError::time(""))
    }
}

impl BankExtractor for ExtractorConfig {
    fn extract(&self, raw: &str, ctx: &ExtractContext, notes: &mut ErrorAccumulator) -> Result<Extracted> {
        let ctx = ExtractContext::new(ctx.received_at(), self.utc_offset);
        let extraction = TemplateEngine::extract(self, raw);

        if extraction.pay_coin.is_some() {
            for error in extraction.errors.errors() {
                notes.add(error.clone());
            }
        }
        extraction.into_extracted(self.time_policy, &ctx)
    }

    fn name(&self) -> &str {
        &self.bank_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const BRI_MESSAGE: &str = "11/04/2025 16:26:10 -  Transfer dari XXXXXXXXXXX2504 dengan nomor rekening tujuan XXXXXX0336 sebesar Rp10.012,00 BERHASIL. Info lebih lanjut hubungi Call Center BRI 1500017";

    fn bri() -> ExtractorConfig {
        ExtractorConfig::new("BRI", r"(\d{2}/\d{2}/\d{4} \d{2}:\d{2}:\d{2})", r"Rp(\d+\.\d{3})").unwrap()
    }

    fn ctx() -> ExtractContext {
        let received = Utc.with_ymd_and_hms(2025, 4, 11, 9, 30, 0).unwrap();
        ExtractContext::new(received, default_offset())
    }

    #[test]
    fn test_bri_message_populates_both_fields() {
        let extraction = TemplateEngine::extract(&bri(), BRI_MESSAGE);
        assert_eq!(extraction.pay_coin, Some(dec!(10.012)));
        assert_eq!(extraction.pay_time, Some(Utc.with_ymd_and_hms(2025, 4, 11, 9, 26, 10).unwrap()));
        assert!(!extraction.errors.has_errors());
    }

    #[test]
    fn test_non_matching_message_leaves_fields_absent() {
        let extraction = TemplateEngine::extract(&bri(), "Selamat pagi, saldo anda aman");
        assert_eq!(extraction.pay_coin, None);
        assert_eq!(extraction.pay_time, None);
        assert_eq!(extraction.errors.len(), 2);

        let err = extraction.into_extracted(TimePolicy::FallbackToReceived, &ctx()).unwrap_err();
        assert!(matches!(err, ExtractionError::MalformedMessage { .. }));
    }

    #[test]
    fn test_empty_message_is_recorded() {
        let extraction = TemplateEngine::extract(&bri(), "   ");
        assert!(extraction.errors.has_errors());
        assert!(extraction.pay_coin.is_none());
    }

    #[test]
    fn test_missing_time_falls_back_unless_required() {
        let message = "Transfer sebesar Rp250.000,00 BERHASIL";

        let extracted = TemplateEngine::extract(&bri(), message)
            .into_extracted(TimePolicy::FallbackToReceived, &ctx())
            .unwrap();
        assert_eq!(extracted.amount, dec!(250.000));
        assert_eq!(extracted.occurred_at, ctx().received_at());

        let err = TemplateEngine::extract(&bri(), message)
            .into_extracted(TimePolicy::Required, &ctx())
            .unwrap_err();
        assert!(matches!(err, ExtractionError::UnparseableTime { .. }));
    }

    #[test]
    fn test_wrong_time_format_is_a_time_error() {
        let config = bri().with_time_format("%Y-%m-%d %H:%M:%S");
        let extraction = TemplateEngine::extract(&config, BRI_MESSAGE);
        assert_eq!(extraction.pay_time, None);
        assert_eq!(extraction.pay_coin, Some(dec!(10.012)));
        assert!(matches!(
            extraction.errors.first(),
            Some(ExtractionError::UnparseableTime { .. })
        ));
    }

    #[test]
    fn test_pattern_without_capture_group_is_rejected() {
        let err = ExtractorConfig::new("BRI", r"\d{2}/\d{2}/\d{4}", r"Rp(\d+)").unwrap_err();
        assert!(matches!(err, ConfigError::MissingCaptureGroup { which: "pay_time", .. }));

        let err = ExtractorConfig::new("BRI", r"(\d+)", r"Rp(\d+").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { which: "pay_coin", .. }));
    }

    #[test]
    fn test_config_as_bank_extractor() {
        let mut notes = ErrorAccumulator::new();
        let extracted = bri().extract(BRI_MESSAGE, &ctx(), &mut notes).unwrap();
        assert_eq!(extracted.amount, dec!(10.012));
        assert_eq!(extracted.balance, None);
        assert!(notes.is_empty());
        assert_eq!(BankExtractor::name(&bri()), "BRI");
    }
}
