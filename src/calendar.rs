// 📅 Calendar Converter
// Thai month names, Buddhist-era years and the per-bank time conventions
//
// Lookup tables only, no state. A month number of 0 always means
// "not found" and callers must treat it as a parse failure.

use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};

use crate::context::ExtractContext;
use crate::error::{ExtractionError, Result};

// ============================================================================
// MONTH TABLES
// ============================================================================

/// Thai abbreviated month names, January first.
const THAI_MONTHS_SHORT: [&str; 12] = [
    "ม.ค.", "ก.พ.", "มี.ค.", "เม.ย.", "พ.ค.", "มิ.ย.", "ก.ค.", "ส.ค.", "ก.ย.", "ต.ค.", "พ.ย.", "ธ.ค.",
];

const THAI_MONTHS_FULL: [&str; 12] = [
    "มกราคม", "กุมภาพันธ์", "มีนาคม", "เมษายน", "พฤษภาคม", "มิถุนายน",
    "กรกฎาคม", "สิงหาคม", "กันยายน", "ตุลาคม", "พฤศจิกายน", "ธันวาคม",
];

const ENGLISH_MONTHS_SHORT: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

const ENGLISH_MONTHS_FULL: [&str; 12] = [
    "january", "february", "march", "april", "may", "june",
    "july", "august", "september", "october", "november", "december",
];

/// Difference between the Thai solar (Buddhist era) year and the Gregorian year.
pub const BUDDHIST_ERA_OFFSET: i32 = 543;

/// Century prefix assumed for two-digit Buddhist years ("68" → 2568).
pub const BUDDHIST_CENTURY: i32 = 2500;

fn position(table: &[&str; 12], name: &str) -> u32 {
    table
        .iter()
        .position(|m| *m == name)
        .map(|i| i as u32 + 1)
        .unwrap_or(0)
}

/// Thai month name (abbreviated "พ.ค." or full "พฤษภาคม") → 1..=12, or 0.
pub fn thai_month_to_number(name: &str) -> u32 {
    let name = name.trim();
    match position(&THAI_MONTHS_SHORT, name) {
        0 => position(&THAI_MONTHS_FULL, name),
        n => n,
    }
}

/// English month name → 1..=12, or 0.
///
/// Case-insensitive; accepts three-letter abbreviations, "Sept", full names
/// and a trailing dot ("Jan.").
pub fn english_month_to_number(name: &str) -> u32 {
    let lower = name.trim().trim_end_matches('.').to_lowercase();
    if lower == "sept" {
        return 9;
    }
    match position(&ENGLISH_MONTHS_SHORT, &lower) {
        0 => position(&ENGLISH_MONTHS_FULL, &lower),
        n => n,
    }
}

/// Buddhist-era year → Gregorian year.
///
/// Two-digit years get the 2500 century first: 68 → 2568 → 2025.
pub fn buddhist_to_gregorian(year: i32) -> i32 {
    if year < 100 {
        BUDDHIST_CENTURY + year - BUDDHIST_ERA_OFFSET
    } else {
        year - BUDDHIST_ERA_OFFSET
    }
}

/// Two-digit Gregorian year → four digits ("25" → 2025); longer years pass through.
pub fn expand_gregorian(year: i32) -> i32 {
    if year < 100 {
        2000 + year
    } else {
        year
    }
}

// ============================================================================
// FIELD PARSERS
// ============================================================================

/// "14:22", "14:22:05", "14.22" and Thai "14:22น." → wall-clock time.
pub fn parse_clock(text: &str) -> Option<NaiveTime> {
    let text = text.trim().trim_end_matches("น.").trim_end_matches('น').trim();
    let mut parts = text.split([':', '.']);

    let hour: u32 = parts.next()?.parse().ok()?;
    let minute: u32 = parts.next()?.parse().ok()?;
    let second: u32 = match parts.next() {
        Some(s) => s.parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }

    NaiveTime::from_hms_opt(hour, minute, second)
}

/// Which calendar a bank writes its numeric years in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Era {
    Gregorian,
    Buddhist,
}

impl Era {
    pub fn to_gregorian(self, year: i32) -> i32 {
        match self {
            Era::Gregorian => expand_gregorian(year),
            Era::Buddhist => buddhist_to_gregorian(year),
        }
    }
}

/// "DD/MM" (assumed year) or "DD/MM/YY[YY]" (year in `era`) plus a clock.
pub fn parse_day_month_year(
    date: &str,
    clock: &str,
    era: Era,
    separator: char,
    ctx: &ExtractContext,
) -> Result<DateTime<Utc>> {
    let source = format!("{} {}", date, clock);
    let bad = || ExtractionError::time(&source);

    let time = parse_clock(clock).ok_or_else(bad)?;
    let parts: Vec<&str> = date.split(separator).collect();

    match parts.as_slice() {
        [day, month] => {
            let day: u32 = day.parse().map_err(|_| bad())?;
            let month: u32 = month.parse().map_err(|_| bad())?;
            ctx.at_assumed_year(month, day, time, &source)
        }
        [day, month, year] => {
            let day: u32 = day.parse().map_err(|_| bad())?;
            let month: u32 = month.parse().map_err(|_| bad())?;
            let year: i32 = year.parse().map_err(|_| bad())?;
            ctx.at(era.to_gregorian(year), month, day, time, &source)
        }
        _ => Err(bad()),
    }
}

// ============================================================================
// TIME CONVENTIONS
// ============================================================================

/// TimeConvention - how one bank writes timestamps in its payload
///
/// Fixed per bank, never sniffed from content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeConvention {
    /// "24 พ.ค. 2568 15:04" or "24 พ.ค. 68 15:04"
    ThaiBuddhist,
    /// "17 May 2025 16:27" (also "May 17 2025 16:27:51")
    EnglishMonth,
    /// "17/05/2025 16:27[:51]"
    DayMonthYearSlash,
    /// "17-05-2025 16:27[:51]"
    DayMonthYearDash,
    /// "2025-05-17 16:27[:51]"
    Iso,
    /// "1747474020"
    UnixSeconds,
}

impl TimeConvention {
    /// Convert text written under this convention to an absolute instant.
    pub fn parse(self, text: &str, ctx: &ExtractContext) -> Result<DateTime<Utc>> {
        let text = text.trim();
        match self {
            TimeConvention::ThaiBuddhist => parse_thai_buddhist(text, ctx),
            TimeConvention::EnglishMonth => parse_english_month(text, ctx),
            TimeConvention::DayMonthYearSlash => {
                parse_with_formats(text, &["%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M"], ctx)
            }
            TimeConvention::DayMonthYearDash => {
                parse_with_formats(text, &["%d-%m-%Y %H:%M:%S", "%d-%m-%Y %H:%M"], ctx)
            }
            TimeConvention::Iso => parse_with_formats(
                text,
                &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"],
                ctx,
            ),
            TimeConvention::UnixSeconds => {
                let seconds: i64 = text.parse().map_err(|_| ExtractionError::time(text))?;
                from_epoch(seconds).ok_or_else(|| ExtractionError::time(text))
            }
        }
    }
}

/// Unix seconds → instant; values past 10^10 are read as milliseconds.
pub fn from_epoch(value: i64) -> Option<DateTime<Utc>> {
    if value > 10_000_000_000 {
        DateTime::<Utc>::from_timestamp_millis(value)
    } else {
        DateTime::<Utc>::from_timestamp(value, 0)
    }
}

fn parse_with_formats(text: &str, formats: &[&str], ctx: &ExtractContext) -> Result<DateTime<Utc>> {
    formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .and_then(|local| ctx.local_instant(local))
        .ok_or_else(|| ExtractionError::time(text))
}

fn parse_thai_buddhist(text: &str, ctx: &ExtractContext) -> Result<DateTime<Utc>> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    let [day, month, year, clock, ..] = parts.as_slice() else {
        return Err(ExtractionError::time(text));
    };

    let day: u32 = day.parse().map_err(|_| ExtractionError::time(text))?;
    let year: i32 = year.parse().map_err(|_| ExtractionError::time(text))?;
    let clock = parse_clock(clock).ok_or_else(|| ExtractionError::time(text))?;

    ctx.at(buddhist_to_gregorian(year), thai_month_to_number(month), day, clock, text)
}

fn parse_english_month(text: &str, ctx: &ExtractContext) -> Result<DateTime<Utc>> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    let [first, second, year, clock, ..] = parts.as_slice() else {
        return Err(ExtractionError::time(text));
    };

    // "17 May 2025" or "May 17 2025"
    let (day, month) = match first.parse::<u32>() {
        Ok(day) => (day, english_month_to_number(second)),
        Err(_) => {
            let day: u32 = second.trim_end_matches(',').parse().map_err(|_| ExtractionError::time(text))?;
            (day, english_month_to_number(first))
        }
    };
    let year: i32 = year.parse().map_err(|_| ExtractionError::time(text))?;
    let clock = parse_clock(clock).ok_or_else(|| ExtractionError::time(text))?;

    ctx.at(expand_gregorian(year), month, day, clock, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn ctx() -> ExtractContext {
        let received = Utc.with_ymd_and_hms(2025, 5, 27, 12, 0, 0).unwrap();
        ExtractContext::new(received, FixedOffset::east_opt(7 * 3600).unwrap())
    }

    #[test]
    fn test_thai_month_to_number() {
        assert_eq!(thai_month_to_number("ม.ค."), 1);
        assert_eq!(thai_month_to_number("พ.ค."), 5);
        assert_eq!(thai_month_to_number("ธ.ค."), 12);
        assert_eq!(thai_month_to_number("พฤษภาคม"), 5);
        assert_eq!(thai_month_to_number("May"), 0);
        assert_eq!(thai_month_to_number(""), 0);
    }

    #[test]
    fn test_english_month_to_number() {
        assert_eq!(english_month_to_number("Jan"), 1);
        assert_eq!(english_month_to_number("Sept"), 9);
        assert_eq!(english_month_to_number("Sep"), 9);
        assert_eq!(english_month_to_number("DEC"), 12);
        assert_eq!(english_month_to_number("October"), 10);
        assert_eq!(english_month_to_number("Foo"), 0);
    }

    #[test]
    fn test_buddhist_year_conversion() {
        assert_eq!(buddhist_to_gregorian(68), 2025);
        assert_eq!(buddhist_to_gregorian(2568), 2025);
        for yy in 60..80 {
            assert_eq!(buddhist_to_gregorian(yy), 2500 + yy - 543);
        }
    }

    #[test]
    fn test_parse_clock_variants() {
        assert_eq!(parse_clock("14:22"), NaiveTime::from_hms_opt(14, 22, 0));
        assert_eq!(parse_clock("14:22:05"), NaiveTime::from_hms_opt(14, 22, 5));
        assert_eq!(parse_clock("14.22น."), NaiveTime::from_hms_opt(14, 22, 0));
        assert_eq!(parse_clock("25:00"), None);
        assert_eq!(parse_clock("1422"), None);
    }

    #[test]
    fn test_thai_buddhist_convention() {
        let t = TimeConvention::ThaiBuddhist.parse("24 พ.ค. 2568 15:04", &ctx()).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2025, 5, 24, 8, 4, 0).unwrap());

        let t = TimeConvention::ThaiBuddhist.parse("24 พ.ค. 68 15:04", &ctx()).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2025, 5, 24, 8, 4, 0).unwrap());
    }

    #[test]
    fn test_unknown_month_is_a_time_failure() {
        let err = TimeConvention::ThaiBuddhist.parse("24 XYZ 2568 15:04", &ctx()).unwrap_err();
        assert!(matches!(err, ExtractionError::UnparseableTime { .. }));

        let err = TimeConvention::EnglishMonth.parse("17 Mai 2025 16:27", &ctx()).unwrap_err();
        assert!(matches!(err, ExtractionError::UnparseableTime { .. }));
    }

    #[test]
    fn test_english_month_convention_both_orders() {
        let expected = Utc.with_ymd_and_hms(2025, 5, 17, 9, 27, 0).unwrap();
        assert_eq!(TimeConvention::EnglishMonth.parse("17 May 2025 16:27", &ctx()).unwrap(), expected);
        assert_eq!(TimeConvention::EnglishMonth.parse("May 17 2025 16:27", &ctx()).unwrap(), expected);
    }

    #[test]
    fn test_numeric_conventions() {
        let expected = Utc.with_ymd_and_hms(2025, 5, 17, 9, 27, 51).unwrap();
        assert_eq!(TimeConvention::DayMonthYearSlash.parse("17/05/2025 16:27:51", &ctx()).unwrap(), expected);
        assert_eq!(TimeConvention::DayMonthYearDash.parse("17-05-2025 16:27:51", &ctx()).unwrap(), expected);
        assert_eq!(TimeConvention::Iso.parse("2025-05-17 16:27:51", &ctx()).unwrap(), expected);
        assert!(TimeConvention::Iso.parse("17/05/2025", &ctx()).is_err());
    }

    #[test]
    fn test_unix_seconds_and_millis() {
        let expected = Utc.with_ymd_and_hms(2025, 5, 17, 9, 27, 0).unwrap();
        let secs = expected.timestamp();
        assert_eq!(TimeConvention::UnixSeconds.parse(&secs.to_string(), &ctx()).unwrap(), expected);
        assert_eq!(from_epoch(secs * 1000), Some(expected));
    }

    #[test]
    fn test_parse_day_month_year_eras() {
        let t = parse_day_month_year("18/05/68", "14:22", Era::Buddhist, '/', &ctx()).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2025, 5, 18, 7, 22, 0).unwrap());

        let t = parse_day_month_year("18/05", "14:22", Era::Buddhist, '/', &ctx()).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2025, 5, 18, 7, 22, 0).unwrap());

        assert!(parse_day_month_year("18-05", "14:22", Era::Buddhist, '/', &ctx()).is_err());
    }
}
