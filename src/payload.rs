// 📦 JSON Payload Detector
// Relay channels wrap the transaction in a JSON object inside a text envelope
//
// Shape detection (find + decode the object) is split from field mapping so
// every JSON bank shares the same numeric and calendar rules.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::calendar::{self, TimeConvention};
use crate::context::ExtractContext;
use crate::diagnostics::ErrorAccumulator;
use crate::error::{ExtractionError, Result};
use crate::numeric;
use crate::record::Extracted;

/// Keys relays use for the transaction time, in lookup order.
const TIME_KEYS: &[&str] = &["time", "msg_time", "date_time", "datetime"];

/// Keys relays use for the amount, in lookup order.
const AMOUNT_KEYS: &[&str] = &["money", "coin", "amount"];

const BALANCE_KEYS: &[&str] = &["balance"];

// ============================================================================
// NORMALIZED INTERMEDIATE
// ============================================================================

/// Time field as the relay sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadTime {
    Text(String),
    Epoch(i64),
}

/// Payload - the fields every JSON relay carries, whatever their key names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload {
    pub time: Option<PayloadTime>,
    /// Amount as text; JSON numbers keep their literal digits
    pub amount: Option<String>,
    pub balance: Option<String>,
}

/// Locate and decode the JSON object embedded in `raw`.
///
/// Accepts a bare object or one wrapped in envelope text
/// (`"water: {...}"`). Anything else is `MalformedMessage`.
pub fn decode(bank: &str, raw: &str) -> Result<Payload> {
    let (start, end) = match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => (start, end),
        _ => return Err(ExtractionError::malformed(bank, "no JSON object in payload")),
    };

    let object: Map<String, Value> = serde_json::from_str(&raw[start..=end])
        .map_err(|e| ExtractionError::malformed(bank, format!("invalid JSON payload: {}", e)))?;

    Ok(Payload {
        time: lookup(&object, TIME_KEYS).and_then(time_of),
        amount: lookup(&object, AMOUNT_KEYS).and_then(text_of),
        balance: lookup(&object, BALANCE_KEYS).and_then(text_of),
    })
}

fn lookup<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| object.get(*key)).filter(|v| !v.is_null())
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn time_of(value: &Value) -> Option<PayloadTime> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(PayloadTime::Text(s.clone())),
        Value::Number(n) => n.as_i64().map(PayloadTime::Epoch),
        _ => None,
    }
}

// ============================================================================
// FIELD MAPPING
// ============================================================================

impl Payload {
    /// Map decoded fields onto an [`Extracted`] under the bank's time convention.
    ///
    /// Amount is mandatory. A missing (or zero epoch) time falls back to the
    /// received time; a present but unconvertible time is `UnparseableTime`.
    pub fn into_extracted(
        self,
        bank: &str,
        convention: TimeConvention,
        ctx: &ExtractContext,
        notes: &mut ErrorAccumulator,
    ) -> Result<Extracted> {
        let amount_text = self
            .amount
            .ok_or_else(|| ExtractionError::malformed(bank, "payload has no amount field"))?;
        let amount = numeric::parse_amount(&amount_text)?;

        let occurred_at = match self.time {
            None => ctx.received_at(),
            Some(PayloadTime::Epoch(value)) => epoch(value, ctx)?,
            Some(PayloadTime::Text(text)) => match (convention, text.trim().parse::<i64>()) {
                (TimeConvention::UnixSeconds, Ok(value)) => epoch(value, ctx)?,
                _ => convention.parse(&text, ctx)?,
            },
        };

        let balance = notes.balance(self.balance.as_deref());
        Ok(Extracted::new(amount, occurred_at).with_balance(balance))
    }
}

/// Zero means "no time sent", whether it came as a number or as text.
fn epoch(value: i64, ctx: &ExtractContext) -> Result<DateTime<Utc>> {
    if value == 0 {
        return Ok(ctx.received_at());
    }
    calendar::from_epoch(value).ok_or_else(|| ExtractionError::time(&value.to_string()))
}
