// 🚨 Error Taxonomy
// Every failure the engine can report is data, never a panic

use thiserror::Error;

// ============================================================================
// EXTRACTION ERRORS
// ============================================================================

/// Which numeric field failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountField {
    Amount,
    Balance,
}

impl std::fmt::Display for AmountField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AmountField::Amount => write!(f, "amount"),
            AmountField::Balance => write!(f, "balance"),
        }
    }
}

/// ExtractionError - why a notification did not become a record
///
/// `NonDepositMessage` is the expected, frequent outcome for withdrawals,
/// outgoing transfers and OTP alerts. Callers usually drop it silently and
/// escalate everything else.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("unsupported bank type: {0}")]
    UnsupportedBankType(String),

    #[error("{bank}: not a deposit notification ({reason})")]
    NonDepositMessage { bank: String, reason: String },

    #[error("{bank}: malformed message: {detail}")]
    MalformedMessage { bank: String, detail: String },

    #[error("unparseable {field}: {value:?}")]
    UnparseableAmount { field: AmountField, value: String },

    #[error("unparseable time: {value:?}")]
    UnparseableTime { value: String },
}

/// Payload-free discriminant of [`ExtractionError`], handy for counting and matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnsupportedBankType,
    NonDepositMessage,
    MalformedMessage,
    UnparseableAmount,
    UnparseableTime,
}

impl ExtractionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractionError::UnsupportedBankType(_) => ErrorKind::UnsupportedBankType,
            ExtractionError::NonDepositMessage { .. } => ErrorKind::NonDepositMessage,
            ExtractionError::MalformedMessage { .. } => ErrorKind::MalformedMessage,
            ExtractionError::UnparseableAmount { .. } => ErrorKind::UnparseableAmount,
            ExtractionError::UnparseableTime { .. } => ErrorKind::UnparseableTime,
        }
    }

    /// True for messages the caller should drop rather than report.
    pub fn is_non_deposit(&self) -> bool {
        self.kind() == ErrorKind::NonDepositMessage
    }

    pub(crate) fn malformed(bank: &str, detail: impl Into<String>) -> Self {
        ExtractionError::MalformedMessage {
            bank: bank.to_string(),
            detail: detail.into(),
        }
    }

    pub(crate) fn non_deposit(bank: &str, reason: impl Into<String>) -> Self {
        ExtractionError::NonDepositMessage {
            bank: bank.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn amount(value: &str) -> Self {
        ExtractionError::UnparseableAmount {
            field: AmountField::Amount,
            value: value.to_string(),
        }
    }

    pub(crate) fn time(value: &str) -> Self {
        ExtractionError::UnparseableTime {
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractionError>;

// ============================================================================
// CONFIGURATION ERRORS
// ============================================================================

/// Raised while building a [`crate::Registry`]; never produced by dispatch.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{bank}: invalid {which} pattern: {source}")]
    InvalidPattern {
        bank: String,
        which: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("{bank}: pattern {which} has no capture group")]
    MissingCaptureGroup { bank: String, which: &'static str },

    #[error("invalid UTC offset: {0} minutes")]
    InvalidOffset(i32),

    #[error("template tag {0:?} shadows a built-in bank type")]
    ShadowsBuiltin(String),

    #[error("template tag {0:?} registered twice")]
    DuplicateTemplate(String),
}
