// 🕰️ Extraction Context - the caller's clock, made explicit
// Bank wall-clock times are local; records store absolute instants

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::error::{ExtractionError, Result};

/// Asia/Bangkok (and Jakarta WIB): UTC+07:00, no daylight saving.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 7 * 60;

/// ExtractContext - everything an extractor may know besides the message
///
/// The engine never reads the system clock. Layouts that omit the year take it
/// from `received_at`, so identical inputs always give identical records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractContext {
    received_at: DateTime<Utc>,
    offset: FixedOffset,
}

impl ExtractContext {
    pub fn new(received_at: DateTime<Utc>, offset: FixedOffset) -> Self {
        ExtractContext { received_at, offset }
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Year of `received_at` on the bank's wall clock.
    pub fn assumed_year(&self) -> i32 {
        self.received_at.with_timezone(&self.offset).year()
    }

    /// Interpret a bank-local wall-clock reading as an absolute instant.
    pub fn local_instant(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        self.offset
            .from_local_datetime(&local)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Build an instant from explicit calendar fields.
    ///
    /// `source` is the text the fields came from; it is echoed in the error.
    /// A zero month (unknown month name) is a failure, never January.
    pub fn at(&self, year: i32, month: u32, day: u32, clock: NaiveTime, source: &str) -> Result<DateTime<Utc>> {
        if month == 0 {
            return Err(ExtractionError::time(source));
        }

        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| self.local_instant(date.and_time(clock)))
            .ok_or_else(|| ExtractionError::time(source))
    }

    /// Same as [`ExtractContext::at`] for layouts that carry no year.
    ///
    /// The assumed year steps back once when the result would land more than
    /// a day after `received_at` (a 31 Dec message received on 1 Jan).
    pub fn at_assumed_year(&self, month: u32, day: u32, clock: NaiveTime, source: &str) -> Result<DateTime<Utc>> {
        let year = self.assumed_year();
        let candidate = self.at(year, month, day, clock, source);

        match candidate {
            Ok(instant) if instant > self.received_at + Duration::days(1) => {
                self.at(year - 1, month, day, clock, source)
            }
            // 29 Feb outside a leap year
            Err(_) => self.at(year - 1, month, day, clock, source),
            other => other,
        }
    }
}
