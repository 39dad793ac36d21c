//! The standard binders.
//!
//! Each binder recognizes a few value shapes and falls back to a pass-through
//! `set_object` for everything else.

use super::Binder;
use super::param::Parameters;
use crate::error::{SetupError, SetupResult};
use crate::temporal::{parse_date, parse_time, parse_timestamp};
use crate::value::Value;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// The binders shipped with the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardBinder {
    /// Enums by name, temporal values by their natural type, everything else passed through.
    Default,
    /// Text columns.
    String,
    /// `date` columns.
    Date,
    /// `time` columns.
    Time,
    /// `timestamp`/`timestamptz` columns.
    Timestamp,
    /// `numeric` and floating point columns.
    Decimal,
    /// Integer columns.
    Integer,
}

impl StandardBinder {
    /// Wrap into the shared form stored by inserts and returned by configurations.
    pub fn shared(self) -> Arc<dyn Binder> {
        Arc::new(self)
    }
}

impl fmt::Display for StandardBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StandardBinder::Default => "default_binder",
            StandardBinder::String => "string_binder",
            StandardBinder::Date => "date_binder",
            StandardBinder::Time => "time_binder",
            StandardBinder::Timestamp => "timestamp_binder",
            StandardBinder::Decimal => "decimal_binder",
            StandardBinder::Integer => "integer_binder",
        };
        f.write_str(name)
    }
}

impl Binder for StandardBinder {
    fn bind(&self, params: &mut Parameters, index: usize, value: &Value) -> SetupResult<()> {
        match self {
            StandardBinder::Default => bind_default(params, index, value),
            StandardBinder::String => bind_string(params, index, value),
            StandardBinder::Date => bind_date(params, index, value),
            StandardBinder::Time => bind_time(params, index, value),
            StandardBinder::Timestamp => bind_timestamp(params, index, value),
            StandardBinder::Decimal => bind_decimal(params, index, value),
            StandardBinder::Integer => bind_integer(params, index, value),
        }
    }
}

/// Binder used when no metadata is available.
pub fn default_binder() -> StandardBinder {
    StandardBinder::Default
}

pub fn string_binder() -> StandardBinder {
    StandardBinder::String
}

pub fn date_binder() -> StandardBinder {
    StandardBinder::Date
}

pub fn time_binder() -> StandardBinder {
    StandardBinder::Time
}

pub fn timestamp_binder() -> StandardBinder {
    StandardBinder::Timestamp
}

pub fn decimal_binder() -> StandardBinder {
    StandardBinder::Decimal
}

pub fn integer_binder() -> StandardBinder {
    StandardBinder::Integer
}

fn parse_error(index: usize, target: &str, text: &str, err: impl fmt::Display) -> SetupError {
    SetupError::bind(index, format!("cannot read {text:?} as {target}: {err}"))
}

fn bind_default(params: &mut Parameters, index: usize, value: &Value) -> SetupResult<()> {
    match value {
        Value::Enum { name, .. } => params.set_string(index, name.as_str()),
        Value::Date(d) => params.set_date(index, *d),
        Value::Time(t) => params.set_time(index, *t),
        Value::DateTime(dt) => params.set_timestamp(index, *dt),
        Value::Zoned(dt) => params.set_timestamp_tz(index, *dt),
        Value::Instant(dt) => params.set_timestamp_tz(index, dt.fixed_offset()),
        other => params.set_object(index, other.clone()),
    }
}

fn bind_string(params: &mut Parameters, index: usize, value: &Value) -> SetupResult<()> {
    match value {
        Value::Text(s) => params.set_string(index, s.as_str()),
        Value::Enum { name, .. } => params.set_string(index, name.as_str()),
        Value::Null => params.set_object(index, Value::Null),
        other => params.set_string(index, other.to_string()),
    }
}

fn bind_date(params: &mut Parameters, index: usize, value: &Value) -> SetupResult<()> {
    match value {
        Value::Date(d) => params.set_date(index, *d),
        Value::DateTime(dt) => params.set_date(index, dt.date()),
        // the date as seen in the value's own zone
        Value::Zoned(dt) => params.set_date(index, dt.date_naive()),
        Value::Text(s) => {
            let date = parse_date(s).map_err(|e| parse_error(index, "a date", s, e))?;
            params.set_date(index, date)
        }
        other => params.set_object(index, other.clone()),
    }
}

fn bind_time(params: &mut Parameters, index: usize, value: &Value) -> SetupResult<()> {
    match value {
        Value::Time(t) => params.set_time(index, *t),
        Value::DateTime(dt) => params.set_time(index, dt.time()),
        Value::Zoned(dt) => params.set_time(index, dt.time()),
        Value::Text(s) => {
            let time = parse_time(s).map_err(|e| parse_error(index, "a time", s, e))?;
            params.set_time(index, time)
        }
        other => params.set_object(index, other.clone()),
    }
}

fn bind_timestamp(params: &mut Parameters, index: usize, value: &Value) -> SetupResult<()> {
    match value {
        Value::DateTime(dt) => params.set_timestamp(index, *dt),
        Value::Instant(dt) => params.set_timestamp_tz(index, dt.fixed_offset()),
        Value::Zoned(dt) => params.set_timestamp_tz(index, *dt),
        Value::Text(s) => {
            let ts = parse_timestamp(s).map_err(|e| parse_error(index, "a timestamp", s, e))?;
            params.set_timestamp(index, ts)
        }
        other => params.set_object(index, other.clone()),
    }
}

fn bind_decimal(params: &mut Parameters, index: usize, value: &Value) -> SetupResult<()> {
    match value {
        Value::Text(s) => {
            let decimal = Decimal::from_str(s.trim())
                .or_else(|_| Decimal::from_scientific(s.trim()))
                .map_err(|e| parse_error(index, "a decimal", s, e))?;
            params.set_decimal(index, decimal)
        }
        other => params.set_object(index, other.clone()),
    }
}

fn bind_integer(params: &mut Parameters, index: usize, value: &Value) -> SetupResult<()> {
    match value {
        Value::Enum { ordinal, .. } => {
            let ordinal = i32::try_from(*ordinal)
                .map_err(|_| SetupError::bind(index, format!("ordinal {ordinal} overflows int")))?;
            params.set_int(index, ordinal)
        }
        Value::BigInt(v) => params.set_big_int(index, *v),
        Value::Text(s) => {
            let v = s
                .trim()
                .parse::<i128>()
                .map_err(|e| parse_error(index, "an integer", s, e))?;
            params.set_big_int(index, v)
        }
        other => params.set_object(index, other.clone()),
    }
}
