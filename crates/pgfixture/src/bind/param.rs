//! Statement parameters and their wire encoding.
//!
//! A [`Binder`](super::Binder) decides *how* a [`Value`] is presented to the
//! statement by writing a [`SqlParam`] into a [`Parameters`] slot. The [`ToSql`] impl of
//! [`SqlParam`] then converts that choice to the parameter type the server
//! reported when the statement was prepared.

use crate::error::{SetupError, SetupResult};
use crate::temporal::{parse_date, parse_time, parse_timestamp};
use crate::value::Value;
use bytes::BytesMut;
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::error::Error;
use std::str::FromStr;
use tokio_postgres::types::{IsNull, Kind, ToSql, Type};
use uuid::Uuid;

type BoxError = Box<dyn Error + Sync + Send>;

/// What a binder set for one statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    /// 32-bit integer, widened or narrowed to the column's integer type
    Int(i32),
    /// Integer bound with an explicit big-integer hint
    BigInt(i128),
    Decimal(Decimal),
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    /// Timestamp keeping the value's own offset
    TimestampTz(DateTime<FixedOffset>),
    /// Passed through unchanged and encoded from the value's own type
    Object(Value),
}

impl ToSql for SqlParam {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            SqlParam::Int(v) => encode_integer(i128::from(*v), ty, out),
            SqlParam::BigInt(v) => encode_integer(*v, ty, out),
            SqlParam::Decimal(v) => encode_decimal(v, ty, out),
            SqlParam::Text(v) => encode_text(v, ty, out),
            SqlParam::Date(v) => encode_date(*v, ty, out),
            SqlParam::Time(v) => encode_time(*v, ty, out),
            SqlParam::Timestamp(v) => encode_timestamp(*v, ty, out),
            SqlParam::TimestampTz(v) => encode_zoned(v, ty, out),
            SqlParam::Object(v) => encode_value(v, ty, out),
        }
    }

    // Compatibility is decided per value in `to_sql`.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

/// The parameter slots of one statement execution, indexed from 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    slots: Vec<Option<SqlParam>>,
}

impl Parameters {
    /// Create `count` empty slots.
    pub fn with_count(count: usize) -> Self {
        Self {
            slots: vec![None; count],
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Parameter bound at the 1-based `index`, if any.
    pub fn get(&self, index: usize) -> Option<&SqlParam> {
        index
            .checked_sub(1)
            .and_then(|i| self.slots.get(i))
            .and_then(Option::as_ref)
    }

    /// Bind `param` at the 1-based `index`.
    pub fn set(&mut self, index: usize, param: SqlParam) -> SetupResult<()> {
        let count = self.slots.len();
        let slot = index
            .checked_sub(1)
            .and_then(|i| self.slots.get_mut(i))
            .ok_or_else(|| {
                SetupError::bind(index, format!("index out of range (1..={count})"))
            })?;
        *slot = Some(param);
        Ok(())
    }

    pub fn set_int(&mut self, index: usize, value: i32) -> SetupResult<()> {
        self.set(index, SqlParam::Int(value))
    }

    pub fn set_big_int(&mut self, index: usize, value: i128) -> SetupResult<()> {
        self.set(index, SqlParam::BigInt(value))
    }

    pub fn set_decimal(&mut self, index: usize, value: Decimal) -> SetupResult<()> {
        self.set(index, SqlParam::Decimal(value))
    }

    pub fn set_string(&mut self, index: usize, value: impl Into<String>) -> SetupResult<()> {
        self.set(index, SqlParam::Text(value.into()))
    }

    pub fn set_date(&mut self, index: usize, value: NaiveDate) -> SetupResult<()> {
        self.set(index, SqlParam::Date(value))
    }

    pub fn set_time(&mut self, index: usize, value: NaiveTime) -> SetupResult<()> {
        self.set(index, SqlParam::Time(value))
    }

    pub fn set_timestamp(&mut self, index: usize, value: NaiveDateTime) -> SetupResult<()> {
        self.set(index, SqlParam::Timestamp(value))
    }

    pub fn set_timestamp_tz(&mut self, index: usize, value: DateTime<FixedOffset>) -> SetupResult<()> {
        self.set(index, SqlParam::TimestampTz(value))
    }

    pub fn set_object(&mut self, index: usize, value: Value) -> SetupResult<()> {
        self.set(index, SqlParam::Object(value))
    }

    /// Empty every slot, keeping the count.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    /// Get all parameters as references for tokio-postgres.
    ///
    /// Fails if a slot was never bound.
    pub fn as_refs(&self) -> SetupResult<Vec<&(dyn ToSql + Sync)>> {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, slot)| match slot {
                Some(param) => Ok(param as &(dyn ToSql + Sync)),
                None => Err(SetupError::bind(i + 1, "no value bound")),
            })
            .collect()
    }
}

// ─── Encoding ───────────────────────────────────────────────────────────────

fn is_textual(ty: &Type) -> bool {
    matches!(
        *ty,
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN
    )
}

fn is_integral(ty: &Type) -> bool {
    matches!(*ty, Type::INT2 | Type::INT4 | Type::INT8 | Type::OID)
}

fn mismatch(kind: &str, ty: &Type) -> BoxError {
    format!("cannot bind {kind} value to parameter of type {ty}").into()
}

fn in_local_zone(ts: NaiveDateTime) -> Result<DateTime<Local>, BoxError> {
    Local
        .from_local_datetime(&ts)
        .earliest()
        .ok_or_else(|| format!("{ts} does not exist in the local time zone").into())
}

fn encode_value(value: &Value, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match value {
        Value::Null => Ok(IsNull::Yes),
        Value::Bool(v) => encode_bool(*v, ty, out),
        Value::Int(v) => encode_integer(i128::from(*v), ty, out),
        Value::BigInt(v) => encode_integer(*v, ty, out),
        Value::Float(v) => encode_float(*v, ty, out),
        Value::Decimal(v) => encode_decimal(v, ty, out),
        Value::Text(v) => encode_text(v, ty, out),
        Value::Date(v) => encode_date(*v, ty, out),
        Value::Time(v) => encode_time(*v, ty, out),
        Value::DateTime(v) => encode_timestamp(*v, ty, out),
        Value::Zoned(v) => encode_zoned(v, ty, out),
        Value::Instant(v) => encode_zoned(&v.fixed_offset(), ty, out),
        Value::Enum { name, ordinal } => {
            if is_integral(ty) || *ty == Type::NUMERIC {
                encode_integer(i128::from(*ordinal), ty, out)
            } else {
                encode_text(name, ty, out)
            }
        }
        Value::Uuid(v) => match *ty {
            Type::UUID => v.to_sql(ty, out),
            _ if is_textual(ty) => v.to_string().to_sql(ty, out),
            _ => Err(mismatch("uuid", ty)),
        },
        Value::Json(v) => match *ty {
            Type::JSON | Type::JSONB => v.to_sql(ty, out),
            _ if is_textual(ty) => v.to_string().to_sql(ty, out),
            _ => Err(mismatch("json", ty)),
        },
        Value::Bytes(v) => match *ty {
            Type::BYTEA => v.as_slice().to_sql(ty, out),
            _ => Err(mismatch("bytes", ty)),
        },
    }
}

fn encode_bool(value: bool, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::BOOL => value.to_sql(ty, out),
        _ if is_integral(ty) => encode_integer(i128::from(value), ty, out),
        _ if is_textual(ty) => value.to_string().to_sql(ty, out),
        _ => Err(mismatch("bool", ty)),
    }
}

fn encode_integer(value: i128, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 => i16::try_from(value)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(value)?.to_sql(ty, out),
        Type::INT8 => i64::try_from(value)?.to_sql(ty, out),
        Type::OID => u32::try_from(value)?.to_sql(ty, out),
        Type::FLOAT4 => (value as f32).to_sql(ty, out),
        Type::FLOAT8 => (value as f64).to_sql(ty, out),
        Type::NUMERIC => Decimal::try_from_i128_with_scale(value, 0)?.to_sql(ty, out),
        Type::BOOL => match value {
            0 => false.to_sql(ty, out),
            1 => true.to_sql(ty, out),
            _ => Err(format!("integer {value} is not a boolean").into()),
        },
        _ if is_textual(ty) => value.to_string().to_sql(ty, out),
        _ => Err(mismatch("integer", ty)),
    }
}

fn encode_float(value: f64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::FLOAT4 => (value as f32).to_sql(ty, out),
        Type::FLOAT8 => value.to_sql(ty, out),
        Type::NUMERIC => Decimal::try_from(value)?.to_sql(ty, out),
        _ if is_integral(ty) && value.fract() == 0.0 => encode_integer(value as i128, ty, out),
        _ if is_textual(ty) => value.to_string().to_sql(ty, out),
        _ => Err(mismatch("float", ty)),
    }
}

fn encode_decimal(value: &Decimal, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::NUMERIC => value.to_sql(ty, out),
        Type::FLOAT4 => value
            .to_f32()
            .ok_or_else(|| mismatch("decimal", ty))?
            .to_sql(ty, out),
        Type::FLOAT8 => value
            .to_f64()
            .ok_or_else(|| mismatch("decimal", ty))?
            .to_sql(ty, out),
        _ if is_integral(ty) && value.fract().is_zero() => {
            let integral = value.to_i128().ok_or_else(|| mismatch("decimal", ty))?;
            encode_integer(integral, ty, out)
        }
        _ if is_textual(ty) => value.to_string().to_sql(ty, out),
        _ => Err(mismatch("decimal", ty)),
    }
}

/// Text is written as-is to textual parameters and parsed into the target type otherwise.
fn encode_text(value: &str, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    if is_textual(ty) {
        return value.to_sql(ty, out);
    }
    if matches!(ty.kind(), Kind::Enum(_)) {
        out.extend_from_slice(value.as_bytes());
        return Ok(IsNull::No);
    }
    let trimmed = value.trim();
    match *ty {
        Type::INT2 | Type::INT4 | Type::INT8 | Type::OID => {
            encode_integer(trimmed.parse::<i128>()?, ty, out)
        }
        Type::NUMERIC => Decimal::from_str(trimmed)?.to_sql(ty, out),
        Type::FLOAT4 => trimmed.parse::<f32>()?.to_sql(ty, out),
        Type::FLOAT8 => trimmed.parse::<f64>()?.to_sql(ty, out),
        Type::BOOL => match trimmed.to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "on" | "1" => true.to_sql(ty, out),
            "false" | "f" | "no" | "n" | "off" | "0" => false.to_sql(ty, out),
            _ => Err(format!("{value:?} is not a boolean").into()),
        },
        Type::DATE => parse_date(trimmed)?.to_sql(ty, out),
        Type::TIME => parse_time(trimmed)?.to_sql(ty, out),
        Type::TIMESTAMP => parse_timestamp(trimmed)?.to_sql(ty, out),
        Type::TIMESTAMPTZ => match DateTime::parse_from_rfc3339(trimmed) {
            Ok(zoned) => zoned.to_sql(ty, out),
            Err(_) => encode_timestamp(parse_timestamp(trimmed)?, ty, out),
        },
        Type::UUID => Uuid::parse_str(trimmed)?.to_sql(ty, out),
        Type::JSON | Type::JSONB => serde_json::from_str::<serde_json::Value>(value)?.to_sql(ty, out),
        Type::BYTEA => value.as_bytes().to_sql(ty, out),
        _ if <&str as ToSql>::accepts(ty) => value.to_sql(ty, out),
        _ => Err(mismatch("text", ty)),
    }
}

fn encode_date(value: NaiveDate, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::DATE => value.to_sql(ty, out),
        Type::TIMESTAMP => value.and_time(NaiveTime::MIN).to_sql(ty, out),
        Type::TIMESTAMPTZ => in_local_zone(value.and_time(NaiveTime::MIN))?.to_sql(ty, out),
        _ if is_textual(ty) => value.to_string().to_sql(ty, out),
        _ => Err(mismatch("date", ty)),
    }
}

fn encode_time(value: NaiveTime, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::TIME => value.to_sql(ty, out),
        _ if is_textual(ty) => value.to_string().to_sql(ty, out),
        _ => Err(mismatch("time", ty)),
    }
}

fn encode_timestamp(value: NaiveDateTime, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::TIMESTAMP => value.to_sql(ty, out),
        Type::TIMESTAMPTZ => in_local_zone(value)?.to_sql(ty, out),
        Type::DATE => value.date().to_sql(ty, out),
        Type::TIME => value.time().to_sql(ty, out),
        _ if is_textual(ty) => value.to_string().to_sql(ty, out),
        _ => Err(mismatch("timestamp", ty)),
    }
}

/// Zoned values keep their own wall-clock reading when the target has no zone.
fn encode_zoned(
    value: &DateTime<FixedOffset>,
    ty: &Type,
    out: &mut BytesMut,
) -> Result<IsNull, BoxError> {
    match *ty {
        Type::TIMESTAMPTZ => value.to_sql(ty, out),
        Type::TIMESTAMP => value.naive_local().to_sql(ty, out),
        Type::DATE => value.date_naive().to_sql(ty, out),
        Type::TIME => value.time().to_sql(ty, out),
        _ if is_textual(ty) => value.to_rfc3339().to_sql(ty, out),
        _ => Err(mismatch("zoned timestamp", ty)),
    }
}
