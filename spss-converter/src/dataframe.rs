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

//! Conversion between rows and [polars] dataframes.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike};
use polars::prelude::*;

use crate::{
    data::{Record, Value},
    dictionary::Metadata,
    error::Result,
    variable::StorageType,
};

fn epoch() -> NaiveDate {
    DateTime::UNIX_EPOCH.date_naive()
}

fn nanoseconds(time: &NaiveTime) -> i64 {
    time.num_seconds_from_midnight() as i64 * 1_000_000_000 + time.nanosecond() as i64
}

/// Builds the series for one column.  A column whose values do not all have
/// its storage type, for example because value labels were applied, becomes
/// a string column.
fn column_series(name: &str, storage_type: StorageType, values: Vec<&Value>) -> PolarsResult<Series> {
    let name = PlSmallStr::from(name);
    let uniform = values
        .iter()
        .all(|value| value.is_null() || value.storage_type() == Some(storage_type));
    if !uniform {
        let data: Vec<Option<String>> = values
            .into_iter()
            .map(|value| (!value.is_null()).then(|| value.to_string()))
            .collect();
        return Ok(Series::new(name, data));
    }
    match storage_type {
        StorageType::Numeric => {
            let data: Vec<Option<f64>> = values.into_iter().map(Value::as_number).collect();
            Ok(Series::new(name, data))
        }
        StorageType::String => {
            let data: Vec<Option<&str>> = values.into_iter().map(Value::as_str).collect();
            Ok(Series::new(name, data))
        }
        StorageType::Date => {
            let data: Vec<Option<i32>> = values
                .into_iter()
                .map(|value| match value {
                    Value::Date(date) => Some((*date - epoch()).num_days() as i32),
                    _ => None,
                })
                .collect();
            Series::new(name, data).cast(&DataType::Date)
        }
        StorageType::DateTime => {
            let data: Vec<Option<i64>> = values
                .into_iter()
                .map(|value| match value {
                    Value::DateTime(date_time) => Some(date_time.and_utc().timestamp_millis()),
                    _ => None,
                })
                .collect();
            Series::new(name, data).cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
        }
        StorageType::Time => {
            let data: Vec<Option<i64>> = values
                .into_iter()
                .map(|value| match value {
                    Value::Time(time) => Some(nanoseconds(time)),
                    _ => None,
                })
                .collect();
            Series::new(name, data).cast(&DataType::Time)
        }
    }
}

/// Returns `rows`, described by `metadata`, as a dataframe with one column
/// per column in `metadata`.
pub fn to_dataframe(rows: &[Record], metadata: &Metadata) -> Result<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(metadata.len());
    for column in metadata.columns() {
        let name = column.name().as_str();
        let values: Vec<&Value> = rows
            .iter()
            .map(|row| row.get(name).unwrap_or(&Value::Null))
            .collect();
        columns.push(column_series(name, column.storage_type(), values)?.into());
    }
    Ok(DataFrame::new(columns)?)
}

fn from_any_value(value: AnyValue) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Number(if b { 1.0 } else { 0.0 }),
        AnyValue::String(s) => Value::String(s.into()),
        AnyValue::StringOwned(s) => Value::String(s.to_string()),
        AnyValue::Date(days) => epoch()
            .checked_add_signed(chrono::Duration::days(days as i64))
            .map_or(Value::Null, Value::Date),
        AnyValue::Datetime(t, unit, _) => {
            let date_time = match unit {
                TimeUnit::Milliseconds => DateTime::from_timestamp_millis(t),
                TimeUnit::Microseconds => DateTime::from_timestamp_micros(t),
                TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(t)),
            };
            date_time.map_or(Value::Null, |date_time| Value::DateTime(date_time.naive_utc()))
        }
        AnyValue::Time(ns) => NaiveTime::from_num_seconds_from_midnight_opt(
            (ns / 1_000_000_000) as u32,
            (ns % 1_000_000_000) as u32,
        )
        .map_or(Value::Null, Value::Time),
        other => match other.extract::<f64>() {
            Some(number) => Value::from_f64(number),
            None => Value::String(other.to_string()),
        },
    }
}

/// Returns the rows in `frame`, one record per row.
pub fn from_dataframe(frame: &DataFrame) -> Result<Vec<Record>> {
    let columns = frame.get_columns();
    let mut rows = Vec::with_capacity(frame.height());
    for index in 0..frame.height() {
        let mut row = Record::with_capacity(columns.len());
        for column in columns {
            row.insert(column.name().to_string(), from_any_value(column.get(index)?));
        }
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use polars::prelude::{AnyValue, DataType};
    use serde_json::json;

    use crate::{
        data::{Record, Value},
        dataframe::{from_any_value, from_dataframe, to_dataframe},
        dictionary::Metadata,
    };

    #[test]
    fn dates_out_of_range() {
        assert_eq!(
            from_any_value(AnyValue::Date(1)),
            Value::Date(NaiveDate::from_ymd_opt(1970, 1, 2).unwrap())
        );
        assert_eq!(from_any_value(AnyValue::Date(i32::MAX)), Value::Null);
        assert_eq!(from_any_value(AnyValue::Date(i32::MIN)), Value::Null);
    }

    #[test]
    fn round_trip() {
        let mut rows: Vec<Record> = serde_json::from_value(json!([
            {"id": 1, "name": "a", "born": "1999-12-31"},
            {"id": null, "name": null, "born": null},
        ]))
        .unwrap();
        rows[0]["born"] = Value::Date(NaiveDate::from_ymd_opt(1999, 12, 31).unwrap());
        let metadata = Metadata::infer(&rows).unwrap();

        let frame = to_dataframe(&rows, &metadata).unwrap();
        assert_eq!(frame.shape(), (2, 3));
        assert_eq!(frame.column("id").unwrap().dtype(), &DataType::Float64);
        assert_eq!(frame.column("born").unwrap().dtype(), &DataType::Date);
        assert_eq!(from_dataframe(&frame).unwrap(), rows);
    }
}
