// 🧭 Type Router - the engine's only entry point
// Tag in, strategy out: built-in bank types first, then template banks

use chrono::{DateTime, Utc};

use crate::context::ExtractContext;
use crate::diagnostics::ErrorAccumulator;
use crate::error::{ExtractionError, Result};
use crate::extractors::{BankExtractor, BankType, KNOWN_TAGS};
use crate::record::TransactionRecord;
use crate::registry::Registry;

/// Outcome of one dispatch plus the non-fatal notes gathered along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionReport {
    pub result: Result<TransactionRecord>,
    pub notes: ErrorAccumulator,
}

/// TypeRouter - maps a routing tag to its extractor and runs it
///
/// Immutable after construction; share one instance by reference across
/// threads.
///
/// # Examples:
/// ```
/// use bank_wash::{Registry, TypeRouter};
/// use chrono::{TimeZone, Utc};
///
/// let router = TypeRouter::new(Registry::new());
/// let received = Utc.with_ymd_and_hms(2025, 5, 27, 12, 0, 0).unwrap();
///
/// let record = router
///     .dispatch("TTB", "27-05@16:25 บชX46746X:เงินเข้า 499.95บ ใช้ได้ 11,871.96บ", received)
///     .unwrap();
/// assert_eq!(record.amount().to_string(), "499.95");
/// ```
#[derive(Debug, Clone)]
pub struct TypeRouter {
    registry: Registry,
}

impl TypeRouter {
    pub fn new(registry: Registry) -> Self {
        TypeRouter { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Strategy for a tag, or `UnsupportedBankType`.
    pub fn resolve(&self, bank_type: &str) -> Result<&dyn BankExtractor> {
        if let Some(bank) = BankType::from_tag(bank_type) {
            return Ok(bank);
        }
        match self.registry.template(bank_type) {
            Some(template) => Ok(template),
            None => Err(ExtractionError::UnsupportedBankType(bank_type.to_string())),
        }
    }

    /// Extract one notification.
    pub fn dispatch(&self, bank_type: &str, raw_message: &str, received_at: DateTime<Utc>) -> Result<TransactionRecord> {
        self.dispatch_with_notes(bank_type, raw_message, received_at).result
    }

    /// Same as [`TypeRouter::dispatch`], keeping the non-fatal notes.
    pub fn dispatch_with_notes(&self, bank_type: &str, raw_message: &str, received_at: DateTime<Utc>) -> ExtractionReport {
        let mut notes = ErrorAccumulator::new();

        let result = self.resolve(bank_type).and_then(|extractor| {
            tracing::debug!(tag = bank_type, extractor = extractor.name(), "dispatching");
            let ctx = ExtractContext::new(received_at, self.registry.local_offset());
            extractor.extract(raw_message, &ctx, &mut notes)
        });

        match &result {
            Err(e) if e.is_non_deposit() => tracing::debug!(tag = bank_type, "dropped: {e}"),
            Err(e) => tracing::debug!(tag = bank_type, "extraction failed: {e}"),
            Ok(_) if notes.has_errors() => tracing::debug!(tag = bank_type, "degraded: {}", notes.message()),
            Ok(_) => {}
        }

        ExtractionReport {
            result: result.map(|extracted| TransactionRecord::from_extracted(bank_type, raw_message, extracted)),
            notes,
        }
    }

    /// Built-in tags in table order, then template tags.
    pub fn supported_tags(&self) -> Vec<&str> {
        KNOWN_TAGS
            .iter()
            .map(|(tag, _)| *tag)
            .chain(self.registry.template_tags())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::ExtractorConfig;
    use chrono::{FixedOffset, TimeZone};
    use rust_decimal_macros::dec;

    fn received() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 27, 12, 0, 0).unwrap()
    }

    fn bangkok(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        FixedOffset::east_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, mo, d, h, mi, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn router() -> TypeRouter {
        let bri = ExtractorConfig::new("BRI", r"(\d{2}/\d{2}/\d{4} \d{2}:\d{2}:\d{2})", r"Rp(\d+\.\d{3})").unwrap();
        TypeRouter::new(Registry::new().with_template(bri).unwrap())
    }

    /// One well-formed deposit per built-in tag.
    const FIXTURES: &[(&str, &str)] = &[
        ("SCB", "เงิน 500.00บ เข้าบ/ชx123456 18/05@14:22 ใช้ได้ 10,250.00บ"),
        ("SCB读取", "เงิน 500.00บ เข้าบ/ชx123456 18/05@14:22 ใช้ได้ 10,250.00บ"),
        ("SCB通知", "รับเงิน 1,250.00 บาท จาก นาย สมชาย ใจดี เข้าบัญชี x1234 วันที่ 18 พ.ค. 68 เวลา 14:22"),
        ("SCB流水", r#"{"msg_time": "18/05/2025 14:22:00", "coin": "1,000.00"}"#),
        ("KTB", "Deposit acct x1234 18-05@14:22 1,000.00THB Bal 5,000.00THB"),
        ("KTBLine", "เงินเข้า 1,000.00 บาท บัญชี x1234 วันที่ 18/05 14:22 คงเหลือ 5,000.00"),
        ("KTB通知", "ได้รับ 450.00 บาท จาก x9876"),
        ("KTB流水", r#"{"msg_time": "18-05-2025 14:22:00", "amount": "3,000.00"}"#),
        ("KBANK通知", "บัญชี x1234 รับโอนจาก x5678 1,500.00 บาท เมื่อ วันที่ 18 พ.ค. 68 เวลา 14:22 น."),
        ("KBANK读取", "18/05 14:22 บชX1234 รับโอนจาก X5678 1,000.00 คงเหลือ 5,000.00 บ"),
        ("KBANK流水", r#"{"msg_time": "18 พ.ค. 68 14:22", "coin": 800.00}"#),
        ("BBL", "PromptPay x1234 received from x5678 via MB amount 1,500.00บ ใช้ได้36,447.43บ"),
        ("BBL流水", r#"{"msg_time": "18 May 2025 14:22:00", "coin": "1,042.00"}"#),
        ("BAAC", "18/05/2568 14:22 บช.x1234 รับโอนพร้อมเพย์ จาก x5678 1,000.00 บ. คงเหลือ 5,000.00 บ."),
        ("TTB", "27-05@16:25 บชX46746X:เงินเข้า 499.95บ ใช้ได้ 11,871.96บ"),
        ("TTB读取", "27-05@16:25 บชX46746X:เงินเข้า 499.95บ ใช้ได้ 11,871.96บ"),
        ("TTB通知", "Deposit THB 1,000.00 to a/c x1234 on 18/05/25@14:22"),
        ("BAY", "โอนเข้า บ/ช XXX1234 1,000.00 บ. จาก X5678 (18/05/25,14:22) ผ่าน Krungsri App ยอดเงินที่ใช้ได้ คือ 5,000.00 บ."),
        ("GSB", "เงินเข้า: มีการฝาก/โอนเงิน 74.76 บาท จากบัญชี KBNK 0013XXXX1945 เข้าบัญชี GSBA 0204XXXX0743 วันที่ 24 พ.ค. 2568 เวลา 15:04 น. คงเหลือ 2,702.93 บาท"),
        ("GSB读取", "คุณได้รับเงิน 1,200.00 บาท จาก นาย ก"),
        ("GSB通知", "คุณได้รับเงิน 1,200.00 บาท จาก นาย ก"),
        ("GSBLine", "คุณได้รับเงิน 1,200.00 บาท จาก นาย ก"),
        ("TM流水", r#"{"time": "24 พ.ค. 2568 15:04", "money": "1,234.50"}"#),
        ("TM流水ios", r#"{"time": "24 พ.ค. 2568 15:04", "money": "99.00"}"#),
        ("SwooleTM", "฿ 1,234.50"),
        ("KKRLSCLI", r#"{"coin": 300, "time": 1747474020}"#),
        ("python-SCBGH", r#"{"money": "1,500.00", "time": "2025-05-27 14:30"}"#),
        ("python-KTBGH", r#"{"money": "1,500.00", "time": "2025-05-27 14:30"}"#),
        ("python-Kbankgh", r#"{"money": "1,500.00", "time": "2025-05-27 14:30"}"#),
        ("python-Ttbgh", r#"{"money": "1,500.00", "time": "2025-05-27 14:30"}"#),
        ("python-BAYGH", r#"{"money": "1,500.00", "time": "2025-05-27 14:30"}"#),
        ("tm_protocol_water", r#"{"amount": "250.00", "date_time": "2025-05-26 09:05"}"#),
        ("scb_protocol_water", r#"{"amount": "250.00", "date_time": "2025-05-26 09:05"}"#),
        ("ttb_protocol_water", r#"{"amount": "250.00", "date_time": "2025-05-26 09:05"}"#),
    ];

    #[test]
    fn test_every_builtin_tag_has_a_working_fixture() {
        let router = router();
        for (tag, _) in KNOWN_TAGS {
            let (_, raw) = FIXTURES
                .iter()
                .find(|(t, _)| t == tag)
                .unwrap_or_else(|| panic!("no fixture for {}", tag));

            let record = router
                .dispatch(tag, raw, received())
                .unwrap_or_else(|e| panic!("{} failed: {}", tag, e));
            assert!(record.amount() > dec!(0), "{}", tag);
            assert_eq!(record.bank_type(), *tag);
            assert_eq!(record.raw_message(), *raw);
        }
    }

    #[test]
    fn test_scenario_ttb_deposit_with_balance() {
        let record = router()
            .dispatch("TTB", "27-05@16:25 บชX46746X:เงินเข้า 499.95บ ใช้ได้ 11,871.96บ", received())
            .unwrap();

        assert_eq!(record.amount(), dec!(499.95));
        assert_eq!(record.balance(), Some(dec!(11871.96)));
        assert_eq!(record.occurred_at(), bangkok(2025, 5, 27, 16, 25));
    }

    #[test]
    fn test_scenario_bbl_withdrawal_is_dropped() {
        let err = router()
            .dispatch("BBL", "ถอน/โอน/จ่ายเงินจากบ/ชX0280 ผ่านMB 1,042.00บ ใช้ได้36,447.43บ", received())
            .unwrap_err();
        assert!(matches!(err, ExtractionError::NonDepositMessage { .. }));
    }

    #[test]
    fn test_scenario_unknown_tag() {
        let err = router().dispatch("UnknownBankXYZ", "anything", received()).unwrap_err();
        assert_eq!(err, ExtractionError::UnsupportedBankType("UnknownBankXYZ".to_string()));
    }

    #[test]
    fn test_scenario_truemoney_water_json() {
        let record = router()
            .dispatch("TM流水", r#"{"time": "24 พ.ค. 2568 15:04", "money": "1,234.50"}"#, received())
            .unwrap();

        assert_eq!(record.amount(), dec!(1234.50));
        assert_eq!(record.occurred_at(), bangkok(2025, 5, 24, 15, 4));
        assert_eq!(record.balance(), None);
    }

    #[test]
    fn test_scenario_bri_template() {
        let router = router();
        let raw = "11/04/2025 16:26:10 -  Transfer dari XXXXXXXXXXX2504 dengan nomor rekening tujuan XXXXXX0336 sebesar Rp10.012,00 BERHASIL. Info lebih lanjut hubungi Call Center BRI 1500017";
        let record = router.dispatch("BRI", raw, received()).unwrap();
        assert_eq!(record.amount(), dec!(10.012));
        assert_eq!(record.occurred_at(), bangkok(2025, 4, 11, 16, 26) + chrono::Duration::seconds(10));

        let report = router.dispatch_with_notes("BRI", "Saldo anda aman", received());
        assert!(report.result.is_err());
        assert_eq!(report.notes.len(), 0);
    }

    #[test]
    fn test_dispatch_is_idempotent() {
        let router = router();
        let raw = "เงินเข้า: มีการฝาก/โอนเงิน 74.76 บาท จากบัญชี KBNK 0013XXXX1945 เข้าบัญชี GSBA 0204XXXX0743 วันที่ 24 พ.ค. 2568 เวลา 15:04 น. คงเหลือ 2,702.93 บาท";
        let first = router.dispatch("GSB", raw, received());
        let second = router.dispatch("GSB", raw, received());
        assert_eq!(first, second);
        assert_eq!(first.unwrap().amount(), dec!(74.76));
    }

    #[test]
    fn test_notes_surface_degraded_fields() {
        let report = router().dispatch_with_notes("KBANK读取", "วันนี้ 14:22 บชX1234 เงินเข้า1,000.00บ", received());
        let record = report.result.unwrap();
        assert_eq!(record.occurred_at(), received());
        assert!(report.notes.has_errors());
    }

    #[test]
    fn test_resolve_and_supported_tags() {
        let router = router();
        assert_eq!(router.resolve("TTB通知").unwrap().name(), "TTB");
        assert_eq!(router.resolve("BRI").unwrap().name(), "BRI");
        assert!(router.resolve("bri").is_err());

        let tags = router.supported_tags();
        assert_eq!(tags.len(), KNOWN_TAGS.len() + 1);
        assert_eq!(tags.last(), Some(&"BRI"));
    }

    #[test]
    fn test_concurrent_dispatch_through_one_router() {
        let router = router();
        std::thread::scope(|scope| {
            let handles: Vec<_> = FIXTURES
                .iter()
                .map(|(tag, raw)| {
                    let router = &router;
                    scope.spawn(move || router.dispatch(tag, raw, received()).map(|r| r.amount()))
                })
                .collect();

            for handle in handles {
                assert!(handle.join().unwrap().is_ok());
            }
        });
    }
}
