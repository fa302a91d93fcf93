// 🩺 Error Accumulator - non-fatal problems collected during one extraction
// A failed balance or a time fallback degrades the record, it doesn't sink it

use rust_decimal::Decimal;

use crate::error::{AmountField, ExtractionError};
use crate::numeric;

/// ErrorAccumulator - per-call list of non-fatal errors
///
/// Created fresh for every dispatch; nothing is shared between calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorAccumulator {
    errors: Vec<ExtractionError>,
}

impl ErrorAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, error: ExtractionError) {
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ExtractionError] {
        &self.errors
    }

    /// First collected error, if any.
    pub fn first(&self) -> Option<&ExtractionError> {
        self.errors.first()
    }

    /// All messages joined with "; " for logging.
    pub fn message(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn into_errors(self) -> Vec<ExtractionError> {
        self.errors
    }

    /// Best-effort balance: parse the token if there is one, otherwise note why not.
    pub fn balance(&mut self, token: Option<&str>) -> Option<Decimal> {
        let token = token?;
        match numeric::parse_amount(token) {
            Ok(balance) => Some(balance),
            Err(_) => {
                self.add(ExtractionError::UnparseableAmount {
                    field: AmountField::Balance,
                    value: token.to_string(),
                });
                None
            }
        }
    }
}
