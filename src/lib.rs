// Bank Wash - Core Library
// Payment-notification extraction engine: tag + raw text + received time → record

pub mod calendar;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod extractors;    // One strategy per bank/message type
pub mod numeric;
pub mod payload;       // JSON relays ("water" feeds)
pub mod record;
pub mod registry;      // Template banks + local offset
pub mod router;        // Sole dispatch point
pub mod template;      // Two-regex banks

// Re-export commonly used types
pub use context::{ExtractContext, DEFAULT_UTC_OFFSET_MINUTES};
pub use diagnostics::ErrorAccumulator;
pub use error::{AmountField, ConfigError, ErrorKind, ExtractionError};
pub use extractors::{BankExtractor, BankType, KNOWN_TAGS};
pub use record::{Extracted, TransactionRecord};
pub use registry::{Registry, RegistryConfig, TemplateConfig};
pub use router::{ExtractionReport, TypeRouter};
pub use template::{ExtractorConfig, TemplateEngine, TemplateExtraction, TimePolicy};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
