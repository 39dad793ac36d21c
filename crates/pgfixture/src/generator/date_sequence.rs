use super::ValueGenerator;
use crate::error::{SetupError, SetupResult};
use crate::temporal::parse_timestamp;
use chrono::{
    DateTime, Days, FixedOffset, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeDelta, TimeZone,
};
use std::fmt;

/// Unit of a [`DateSequenceValueGenerator`] increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalendarField {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Millisecond,
}

impl fmt::Display for CalendarField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CalendarField::Year => "YEAR",
            CalendarField::Month => "MONTH",
            CalendarField::Day => "DAY",
            CalendarField::Hour => "HOUR",
            CalendarField::Minute => "MINUTE",
            CalendarField::Second => "SECOND",
            CalendarField::Millisecond => "MILLISECOND",
        };
        f.write_str(name)
    }
}

/// Sequence of timestamps.
///
/// Starts today at midnight in the local zone and advances by one day unless
/// reconfigured. Calendar units (years, months, days) keep the wall-clock time
/// of the sequence's zone, across daylight-saving changes too; clamping applies
/// at month ends, so January 31st plus one month is the last day of February.
/// Time units (hours and smaller) add elapsed time.
///
/// A wall-clock time skipped by a forward transition is moved ahead by the
/// length of the gap (02:30 becomes 03:30).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateSequenceValueGenerator {
    next: DateTime<FixedOffset>,
    zone: Zone,
    increment: i64,
    unit: CalendarField,
}

/// Zone the wall-clock time of a sequence is kept in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    Local,
    Fixed(FixedOffset),
}

impl DateSequenceValueGenerator {
    pub(super) fn new() -> Self {
        let today = Local::now().date_naive().and_time(NaiveTime::MIN);
        Self {
            next: in_local_zone(today),
            zone: Zone::Local,
            increment: 1,
            unit: CalendarField::Day,
        }
    }

    /// Restart at `start`. Later values keep its offset.
    pub fn starting_at<Tz: TimeZone>(mut self, start: DateTime<Tz>) -> Self {
        self.zone = Zone::Fixed(start.offset().fix());
        self.next = start.fixed_offset();
        self
    }

    /// Restart at `start`, read in the local zone.
    pub fn starting_at_naive(mut self, start: NaiveDateTime) -> Self {
        self.zone = Zone::Local;
        self.next = in_local_zone(start);
        self
    }

    /// Restart at midnight of `start`, in the local zone.
    pub fn starting_at_date(self, start: NaiveDate) -> Self {
        self.starting_at_naive(start.and_time(NaiveTime::MIN))
    }

    /// Restart at a textual date (`yyyy-mm-dd`) or timestamp
    /// (`yyyy-mm-dd hh:mm:ss[.f]`), in the local zone.
    pub fn starting_at_str(self, start: &str) -> SetupResult<Self> {
        let start = parse_timestamp(start).map_err(|e| {
            SetupError::invalid_argument(format!("invalid start date {start:?}: {e}"))
        })?;
        Ok(self.starting_at_naive(start))
    }

    /// Change the step between two values. `amount` may be negative.
    pub fn incrementing_by(mut self, amount: i64, unit: CalendarField) -> Self {
        self.increment = amount;
        self.unit = unit;
        self
    }

    fn advance(&self) -> Option<DateTime<FixedOffset>> {
        match self.zone {
            Zone::Local => step(&Local, self.next, self.increment, self.unit),
            Zone::Fixed(offset) => step(&offset, self.next, self.increment, self.unit),
        }
    }
}

impl Default for DateSequenceValueGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueGenerator for DateSequenceValueGenerator {
    type Output = DateTime<FixedOffset>;

    fn next_value(&mut self) -> DateTime<FixedOffset> {
        let current = self.next;
        // past the representable range the sequence stays on its last value
        if let Some(next) = self.advance() {
            self.next = next;
        }
        current
    }
}

/// Move `current` by `amount` units, keeping calendar steps on the wall clock of `zone`.
pub(super) fn step<Tz: TimeZone>(
    zone: &Tz,
    current: DateTime<FixedOffset>,
    amount: i64,
    unit: CalendarField,
) -> Option<DateTime<FixedOffset>> {
    let elapsed = match unit {
        CalendarField::Year | CalendarField::Month | CalendarField::Day => None,
        CalendarField::Hour => Some(TimeDelta::try_hours(amount)?),
        CalendarField::Minute => Some(TimeDelta::try_minutes(amount)?),
        CalendarField::Second => Some(TimeDelta::try_seconds(amount)?),
        CalendarField::Millisecond => Some(TimeDelta::try_milliseconds(amount)?),
    };
    if let Some(delta) = elapsed {
        let moved = current.checked_add_signed(delta)?;
        return Some(moved.with_timezone(zone).fixed_offset());
    }

    let wall_clock = current.with_timezone(zone).naive_local();
    let moved = match unit {
        CalendarField::Year => add_months(wall_clock, amount.checked_mul(12)?)?,
        CalendarField::Month => add_months(wall_clock, amount)?,
        _ => {
            let days = Days::new(amount.unsigned_abs());
            if amount < 0 {
                wall_clock.checked_sub_days(days)?
            } else {
                wall_clock.checked_add_days(days)?
            }
        }
    };
    resolve_in(zone, moved)
}

/// The instant showing `wall_clock` in `zone`; the earlier one when it shows twice.
pub(super) fn resolve_in<Tz: TimeZone>(
    zone: &Tz,
    wall_clock: NaiveDateTime,
) -> Option<DateTime<FixedOffset>> {
    if let Some(resolved) = zone.from_local_datetime(&wall_clock).earliest() {
        return Some(resolved.fixed_offset());
    }
    // in a gap: read it with the offset in force before the transition
    let day_before = wall_clock.checked_sub_signed(TimeDelta::try_days(1)?)?;
    let before = zone.offset_from_utc_datetime(&day_before).fix();
    let instant = wall_clock.checked_sub_offset(before)?;
    Some(zone.from_utc_datetime(&instant).fixed_offset())
}

fn add_months(start: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let delta = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months < 0 {
        start.checked_sub_months(delta)
    } else {
        start.checked_add_months(delta)
    }
}

fn in_local_zone(naive: NaiveDateTime) -> DateTime<FixedOffset> {
    resolve_in(&Local, naive).unwrap_or_else(|| Local.from_utc_datetime(&naive).fixed_offset())
}
