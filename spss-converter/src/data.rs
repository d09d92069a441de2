// PSPP - a program for statistical analysis.
// Copyright (C) 2025 Free Software Foundation, Inc.
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later
// version.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program.  If not, see <http://www.gnu.org/licenses/>.

//! Individual pieces of data.
//!
//! [Value] is the type of a cell in a row of data.  [Datum] is the hashable
//! subset of [Value] used as the key of a value label or as a discrete
//! missing value.  [Record] is one row.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    hash::Hash,
};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{Error as DeError, Visitor},
};

use crate::variable::StorageType;

/// Format for serializing dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format for serializing date-times.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Format for serializing times of day.
pub const TIME_FORMAT: &str = "%H:%M:%S%.f";

/// Largest magnitude at which every integer is exactly representable in an
/// `f64`.
const MAX_EXACT_INTEGER: f64 = 9007199254740992.0;

/// One row of data, mapping column names to values in column order.
pub type Record = IndexMap<String, Value>;

/// The value of a single cell.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// Absent or missing.
    #[default]
    Null,
    Number(f64),
    String(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns the storage type that holds this value without conversion, or
    /// `None` for [Value::Null].
    pub fn storage_type(&self) -> Option<StorageType> {
        match self {
            Value::Null => None,
            Value::Number(_) => Some(StorageType::Numeric),
            Value::String(_) => Some(StorageType::String),
            Value::Date(_) => Some(StorageType::Date),
            Value::DateTime(_) => Some(StorageType::DateTime),
            Value::Time(_) => Some(StorageType::Time),
        }
    }

    /// Returns `number` as a [Value], mapping NaN to [Value::Null].
    pub fn from_f64(number: f64) -> Self {
        if number.is_nan() {
            Self::Null
        } else {
            Self::Number(number)
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl From<NaiveTime> for Value {
    fn from(value: NaiveTime) -> Self {
        Self::Time(value)
    }
}

impl From<&Datum> for Value {
    fn from(value: &Datum) -> Self {
        match value {
            Datum::Number(number) => Self::Number(number.into_inner()),
            Datum::String(s) => Self::String(s.clone()),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Value::Null => write!(f, "null"),
            Value::Number(number) => write!(f, "{number}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Date(date) => write!(f, "{}", date.format(DATE_FORMAT)),
            Value::DateTime(date_time) => write!(f, "{}", date_time.format(DATETIME_FORMAT)),
            Value::Time(time) => write!(f, "{}", time.format(TIME_FORMAT)),
        }
    }
}

fn serialize_number<S>(number: f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if number.fract() == 0.0 && number.abs() <= MAX_EXACT_INTEGER {
        serializer.serialize_i64(number as i64)
    } else {
        serializer.serialize_f64(number)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Number(number) => serialize_number(*number, serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Date(date) => serializer.collect_str(&date.format(DATE_FORMAT)),
            Value::DateTime(date_time) => {
                serializer.collect_str(&date_time.format(DATETIME_FORMAT))
            }
            Value::Time(time) => serializer.collect_str(&time.format(TIME_FORMAT)),
        }
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut Formatter) -> FmtResult {
        formatter.write_str("null, a number, a string, or a boolean")
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: DeError,
    {
        Ok(Value::Null)
    }

    fn visit_none<E>(self) -> Result<Self::Value, E>
    where
        E: DeError,
    {
        Ok(Value::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer)
    }

    fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E>
    where
        E: DeError,
    {
        Ok(Value::Number(if v { 1.0 } else { 0.0 }))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: DeError,
    {
        Ok(Value::Number(v as f64))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: DeError,
    {
        Ok(Value::Number(v as f64))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
    where
        E: DeError,
    {
        Ok(Value::from_f64(v))
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: DeError,
    {
        Ok(Value::String(v.into()))
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
    where
        E: DeError,
    {
        Ok(Value::String(v))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

/// A hashable, comparable value: the key of a value label or a discrete
/// missing value.
///
/// Temporal values are keyed by their serialized form, so that a label for
/// `2024-01-31` on a date column matches [Value::Date] for that day.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Datum {
    Number(OrderedFloat<f64>),
    String(String),
}

impl Datum {
    /// Returns the key under which `value` is looked up, or `None` for
    /// [Value::Null] and NaN.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Number(number) if number.is_nan() => None,
            Value::Number(number) => Some(Self::Number(OrderedFloat(*number))),
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Date(_) | Value::DateTime(_) | Value::Time(_) => {
                Some(Self::String(value.to_string()))
            }
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Datum::Number(number) => Some(number.into_inner()),
            Datum::String(_) => None,
        }
    }
}

impl From<f64> for Datum {
    fn from(value: f64) -> Self {
        Self::Number(OrderedFloat(value))
    }
}

impl From<&str> for Datum {
    fn from(value: &str) -> Self {
        Self::String(value.into())
    }
}

impl Display for Datum {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Datum::Number(number) => write!(f, "{number}"),
            Datum::String(s) => write!(f, "{s:?}"),
        }
    }
}

impl Serialize for Datum {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Datum::Number(number) => serialize_number(number.into_inner(), serializer),
            Datum::String(s) => serializer.serialize_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use crate::data::{Datum, Record, Value};

    #[test]
    fn serialize() {
        let record = Record::from_iter([
            (String::from("id"), Value::Number(1.0)),
            (String::from("score"), Value::Number(2.5)),
            (String::from("name"), Value::from("Ann")),
            (String::from("missing"), Value::Null),
            (
                String::from("born"),
                Value::Date(NaiveDate::from_ymd_opt(1990, 4, 1).unwrap()),
            ),
            (
                String::from("seen"),
                Value::DateTime(
                    NaiveDate::from_ymd_opt(2024, 1, 31)
                        .unwrap()
                        .and_hms_opt(13, 5, 0)
                        .unwrap(),
                ),
            ),
            (
                String::from("alarm"),
                Value::Time(NaiveTime::from_hms_milli_opt(6, 30, 0, 250).unwrap()),
            ),
        ]);
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"id":1,"score":2.5,"name":"Ann","missing":null,"born":"1990-04-01","seen":"2024-01-31T13:05:00","alarm":"06:30:00.250"}"#
        );
    }

    #[test]
    fn deserialize() {
        let record: Record =
            serde_json::from_str(r#"{"a": 1, "b": -2.5, "c": "x", "d": null, "e": true}"#)
                .unwrap();
        assert_eq!(record["a"], Value::Number(1.0));
        assert_eq!(record["b"], Value::Number(-2.5));
        assert_eq!(record["c"], Value::from("x"));
        assert_eq!(record["d"], Value::Null);
        assert_eq!(record["e"], Value::Number(1.0));
        assert_eq!(
            record.keys().collect::<Vec<_>>(),
            vec!["a", "b", "c", "d", "e"]
        );

        let record: Record = serde_yaml::from_str("a: 1\nb: ~\nc: hello\n").unwrap();
        assert_eq!(record["a"], Value::Number(1.0));
        assert_eq!(record["b"], Value::Null);
        assert_eq!(record["c"], Value::from("hello"));
    }

    #[test]
    fn datum_keys() {
        assert_eq!(Datum::from_value(&Value::Null), None);
        assert_eq!(Datum::from_value(&Value::Number(f64::NAN)), None);
        assert_eq!(
            Datum::from_value(&Value::Number(1.0)),
            Some(Datum::from(1.0))
        );
        assert_eq!(
            Datum::from_value(&Value::Date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap())),
            Some(Datum::from("2024-01-31"))
        );
        assert_eq!(serde_json::to_string(&Datum::from(3.0)).unwrap(), "3");
        assert_eq!(serde_json::to_string(&Datum::from(0.5)).unwrap(), "0.5");
    }
}
