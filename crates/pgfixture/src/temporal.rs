//! Parsing of textual dates, times and timestamps.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, ParseResult};

/// Number of characters in `yyyy-mm-dd hh:mm:ss`. Shorter timestamp text is read as a date.
pub(crate) const MIN_TIMESTAMP_TEXT_LEN: usize = 19;

/// Parse `yyyy-mm-dd`.
pub(crate) fn parse_date(text: &str) -> ParseResult<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
}

/// Parse `hh:mm:ss` with optional fractional seconds.
pub(crate) fn parse_time(text: &str) -> ParseResult<NaiveTime> {
    NaiveTime::parse_from_str(text.trim(), "%H:%M:%S%.f")
}

/// Parse `yyyy-mm-dd hh:mm:ss[.f]` (or with a `T` separator).
///
/// Text shorter than [`MIN_TIMESTAMP_TEXT_LEN`] is parsed as a date at midnight.
pub(crate) fn parse_timestamp(text: &str) -> ParseResult<NaiveDateTime> {
    let text = text.trim();
    if text.len() >= MIN_TIMESTAMP_TEXT_LEN {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f"))
    } else {
        Ok(parse_date(text)?.and_time(NaiveTime::MIN))
    }
}
