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

//! Variables.
//!
//! A [ColumnMetadata] describes one variable: its name, label, storage type,
//! display format, value labels, and missing values.  It can only be
//! constructed from an [UncheckedColumn] through [TryFrom], which enforces its
//! invariants, and it cannot be modified afterward.

use std::{
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use unicase::UniCase;

use crate::{
    data::{DATE_FORMAT, DATETIME_FORMAT, Datum, TIME_FORMAT, Value},
    error::{DataFormatError, Result},
    format::Format,
    identifier::{HasIdentifier, Identifier},
};

/// How a variable's values are stored.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    Numeric,
    String,
    Date,
    DateTime,
    Time,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::Numeric => "numeric",
            StorageType::String => "string",
            StorageType::Date => "date",
            StorageType::DateTime => "datetime",
            StorageType::Time => "time",
        }
    }

    pub fn is_numeric(&self) -> bool {
        *self == Self::Numeric
    }

    pub fn is_string(&self) -> bool {
        *self == Self::String
    }

    /// Converts `value` into a value of this storage type, or returns `None`
    /// if that is not possible.
    ///
    /// [Value::Null] converts to itself for every storage type, as does an
    /// empty string for every type except [StorageType::String].
    pub fn coerce(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (_, Value::Null) => Some(Value::Null),
            (storage_type, Value::String(s)) if !storage_type.is_string() && s.trim().is_empty() => {
                Some(Value::Null)
            }

            (StorageType::Numeric, Value::Number(_)) => Some(value.clone()),
            (StorageType::Numeric, Value::String(s)) => {
                s.trim().parse::<f64>().ok().map(Value::from_f64)
            }

            (StorageType::String, Value::String(_)) => Some(value.clone()),
            (StorageType::String, _) => Some(Value::String(match value {
                Value::Number(number) => number.to_string(),
                other => other.to_string(),
            })),

            (StorageType::Date, Value::Date(_)) => Some(value.clone()),
            (StorageType::Date, Value::String(s)) => parse_date(s).map(Value::Date),

            (StorageType::DateTime, Value::DateTime(_)) => Some(value.clone()),
            (StorageType::DateTime, Value::Date(date)) => {
                Some(Value::DateTime(date.and_time(NaiveTime::MIN)))
            }
            (StorageType::DateTime, Value::String(s)) => {
                parse_date_time(s).map(Value::DateTime)
            }

            (StorageType::Time, Value::Time(_)) => Some(value.clone()),
            (StorageType::Time, Value::String(s)) => parse_time(s).map(Value::Time),

            _ => None,
        }
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

fn parse_date_time(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| parse_date(s).map(|date| date.and_time(NaiveTime::MIN)))
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

impl Display for StorageType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StorageType {
    type Err = DataFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for storage_type in [
            Self::Numeric,
            Self::String,
            Self::Date,
            Self::DateTime,
            Self::Time,
        ] {
            if s.eq_ignore_ascii_case(storage_type.as_str()) {
                return Ok(storage_type);
            }
        }
        Err(DataFormatError::UnknownStorageType(s.into()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Right,
    Center,
}

impl Alignment {
    pub fn default_for_type(storage_type: StorageType) -> Self {
        match storage_type {
            StorageType::String => Self::Left,
            _ => Self::Right,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Right => "right",
            Alignment::Center => "center",
        }
    }
}

impl FromStr for Alignment {
    type Err = DataFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Left, Self::Right, Self::Center]
            .into_iter()
            .find(|alignment| s.eq_ignore_ascii_case(alignment.as_str()))
            .ok_or_else(|| DataFormatError::UnknownAlignment(s.into()))
    }
}

/// [Level of measurement](https://en.wikipedia.org/wiki/Level_of_measurement).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    /// Nominal values can only be compared for equality.
    Nominal,

    /// Ordinal values can be meaningfully ordered.
    Ordinal,

    /// Scale values can be meaningfully compared for the degree of difference.
    Scale,
}

impl Measure {
    pub fn default_for_type(storage_type: StorageType) -> Option<Measure> {
        match storage_type {
            StorageType::String => Some(Self::Nominal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Measure::Nominal => "nominal",
            Measure::Ordinal => "ordinal",
            Measure::Scale => "scale",
        }
    }
}

impl FromStr for Measure {
    type Err = DataFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Nominal, Self::Ordinal, Self::Scale]
            .into_iter()
            .find(|measure| s.eq_ignore_ascii_case(measure.as_str()))
            .ok_or_else(|| DataFormatError::UnknownMeasure(s.into()))
    }
}

/// A mapping from values to their human-readable labels, in the order the
/// labels were declared.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ValueLabels(IndexMap<Datum, String>);

impl ValueLabels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, value: &Datum) -> Option<&str> {
        self.0.get(value).map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Datum, &str)> {
        self.0.iter().map(|(value, label)| (value, label.as_str()))
    }
}

impl Debug for ValueLabels {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a ValueLabels {
    type Item = (&'a Datum, &'a String);

    type IntoIter = indexmap::map::Iter<'a, Datum, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// An inclusive range of numeric missing values.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MissingValueRange {
    In { low: f64, high: f64 },
    From { low: f64 },
    To { high: f64 },
}

impl MissingValueRange {
    /// Returns the range from `low` to `high`, where `None` stands for an
    /// open bound.  Returns `None` if both bounds are open or if `low` is
    /// greater than `high`.
    pub fn new(low: Option<f64>, high: Option<f64>) -> Option<Self> {
        match (low, high) {
            (Some(low), Some(high)) if low <= high => Some(Self::In { low, high }),
            (Some(low), None) if !low.is_nan() => Some(Self::From { low }),
            (None, Some(high)) if !high.is_nan() => Some(Self::To { high }),
            _ => None,
        }
    }

    pub fn low(&self) -> Option<f64> {
        match self {
            MissingValueRange::In { low, .. } | MissingValueRange::From { low } => Some(*low),
            MissingValueRange::To { .. } => None,
        }
    }

    pub fn high(&self) -> Option<f64> {
        match self {
            MissingValueRange::In { high, .. } | MissingValueRange::To { high } => Some(*high),
            MissingValueRange::From { .. } => None,
        }
    }

    pub fn contains(&self, number: f64) -> bool {
        match self {
            MissingValueRange::In { low, high } => (*low..=*high).contains(&number),
            MissingValueRange::From { low } => number >= *low,
            MissingValueRange::To { high } => number <= *high,
        }
    }

    /// Returns true if at least one number is in both `self` and `other`.
    pub fn overlaps(&self, other: &MissingValueRange) -> bool {
        let low = |range: &Self| range.low().unwrap_or(f64::NEG_INFINITY);
        let high = |range: &Self| range.high().unwrap_or(f64::INFINITY);
        low(self) <= high(other) && low(other) <= high(self)
    }
}

impl Display for MissingValueRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.low() {
            Some(low) => write!(f, "{low}")?,
            None => write!(f, "LOW")?,
        }

        write!(f, " THRU ")?;

        match self.high() {
            Some(high) => write!(f, "{high}")?,
            None => write!(f, "HIGH")?,
        }
        Ok(())
    }
}

/// One entry in a variable's missing value specification.
#[derive(Clone, Debug, PartialEq)]
pub enum MissingValue {
    Value(Datum),
    Range(MissingValueRange),
}

impl MissingValue {
    pub fn contains(&self, datum: &Datum) -> bool {
        match self {
            MissingValue::Value(value) => value == datum,
            MissingValue::Range(range) => datum.as_number().is_some_and(|n| range.contains(n)),
        }
    }

    pub fn overlaps(&self, other: &MissingValue) -> bool {
        match (self, other) {
            (MissingValue::Value(a), MissingValue::Value(b)) => a == b,
            (MissingValue::Range(range), MissingValue::Value(datum))
            | (MissingValue::Value(datum), MissingValue::Range(range)) => {
                datum.as_number().is_some_and(|n| range.contains(n))
            }
            (MissingValue::Range(a), MissingValue::Range(b)) => a.overlaps(b),
        }
    }
}

impl Display for MissingValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MissingValue::Value(datum) => write!(f, "{datum}"),
            MissingValue::Range(range) => write!(f, "{range}"),
        }
    }
}

/// A variable's missing value specification: an ordered list of entries, no
/// two of which overlap.
#[derive(Clone, Default, PartialEq)]
pub struct MissingValues(Vec<MissingValue>);

impl MissingValues {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MissingValue> {
        self.0.iter()
    }

    pub fn contains(&self, value: &Value) -> bool {
        Datum::from_value(value).is_some_and(|datum| self.0.iter().any(|mv| mv.contains(&datum)))
    }
}

impl Debug for MissingValues {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{self}")
    }
}

impl Display for MissingValues {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", self.0.iter().join("; "))
        }
    }
}

/// An unvalidated missing value entry, as written in a metadata mapping:
/// either a scalar or an object with `low` and `high` bounds, either of which
/// may be null for an open bound.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UncheckedMissing {
    Range { low: Option<f64>, high: Option<f64> },
    Value(Value),
}

impl From<&MissingValue> for UncheckedMissing {
    fn from(value: &MissingValue) -> Self {
        match value {
            MissingValue::Value(datum) => Self::Value(datum.into()),
            MissingValue::Range(range) => Self::Range {
                low: range.low(),
                high: range.high(),
            },
        }
    }
}

/// The fields of a [ColumnMetadata], before validation.
///
/// Fields left as `None` take their usual values for the storage type.
#[derive(Clone, Debug, PartialEq)]
pub struct UncheckedColumn {
    pub name: String,
    pub label: Option<String>,
    pub storage_type: StorageType,
    pub display_format: Option<Format>,
    pub display_width: Option<u32>,
    pub storage_width: Option<u32>,
    pub alignment: Option<Alignment>,
    pub measure: Option<Measure>,
    pub value_labels: Vec<(Value, String)>,
    pub missing: Vec<UncheckedMissing>,
}

impl UncheckedColumn {
    pub fn new(name: impl Into<String>, storage_type: StorageType) -> Self {
        Self {
            name: name.into(),
            label: None,
            storage_type,
            display_format: None,
            display_width: None,
            storage_width: None,
            alignment: None,
            measure: None,
            value_labels: Vec::new(),
            missing: Vec::new(),
        }
    }

    pub fn with_label(self, label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..self
        }
    }

    pub fn with_display_format(self, display_format: Format) -> Self {
        Self {
            display_format: Some(display_format),
            ..self
        }
    }

    pub fn with_display_width(self, display_width: u32) -> Self {
        Self {
            display_width: Some(display_width),
            ..self
        }
    }

    pub fn with_storage_width(self, storage_width: u32) -> Self {
        Self {
            storage_width: Some(storage_width),
            ..self
        }
    }

    pub fn with_alignment(self, alignment: Alignment) -> Self {
        Self {
            alignment: Some(alignment),
            ..self
        }
    }

    pub fn with_measure(self, measure: Measure) -> Self {
        Self {
            measure: Some(measure),
            ..self
        }
    }

    pub fn with_value_label(mut self, value: impl Into<Value>, label: impl Into<String>) -> Self {
        self.value_labels.push((value.into(), label.into()));
        self
    }

    pub fn with_missing_value(mut self, value: impl Into<Value>) -> Self {
        self.missing.push(UncheckedMissing::Value(value.into()));
        self
    }

    pub fn with_missing_range(mut self, low: Option<f64>, high: Option<f64>) -> Self {
        self.missing.push(UncheckedMissing::Range { low, high });
        self
    }

    fn check_missing(&self, name: &str) -> Result<MissingValues, DataFormatError> {
        let mut entries: Vec<MissingValue> = Vec::with_capacity(self.missing.len());
        for unchecked in &self.missing {
            let entry = match unchecked {
                UncheckedMissing::Value(value) => MissingValue::Value(
                    self.storage_type
                        .coerce(value)
                        .as_ref()
                        .and_then(Datum::from_value)
                        .ok_or_else(|| DataFormatError::Coercion {
                            column: name.into(),
                            value: value.clone(),
                            storage_type: self.storage_type,
                        })?,
                ),
                UncheckedMissing::Range { low, high } => {
                    if !self.storage_type.is_numeric() {
                        return Err(DataFormatError::RangeNotNumeric {
                            column: name.into(),
                            storage_type: self.storage_type,
                        });
                    }
                    let bound = |bound: &Option<f64>, open: &str| match bound {
                        Some(number) => number.to_string(),
                        None => open.into(),
                    };
                    MissingValue::Range(MissingValueRange::new(*low, *high).ok_or_else(|| {
                        DataFormatError::InvalidRange {
                            column: name.into(),
                            low: bound(low, "LOW"),
                            high: bound(high, "HIGH"),
                        }
                    })?)
                }
            };
            if let Some(previous) = entries.iter().find(|previous| previous.overlaps(&entry)) {
                return Err(DataFormatError::OverlappingMissing {
                    column: name.into(),
                    first: previous.to_string(),
                    second: entry.to_string(),
                });
            }
            entries.push(entry);
        }
        Ok(MissingValues(entries))
    }

    fn check_value_labels(&self, name: &str) -> Result<ValueLabels, DataFormatError> {
        let mut value_labels = IndexMap::with_capacity(self.value_labels.len());
        for (value, label) in &self.value_labels {
            let datum = self
                .storage_type
                .coerce(value)
                .as_ref()
                .and_then(Datum::from_value)
                .ok_or_else(|| DataFormatError::LabelKey {
                    column: name.into(),
                    value: value.clone(),
                    storage_type: self.storage_type,
                })?;
            value_labels.insert(datum, label.clone());
        }
        Ok(ValueLabels(value_labels))
    }
}

impl TryFrom<UncheckedColumn> for ColumnMetadata {
    type Error = DataFormatError;

    fn try_from(source: UncheckedColumn) -> Result<Self, Self::Error> {
        let name = Identifier::new(source.name.as_str())?;
        let storage_type = source.storage_type;

        let display_format = match source.display_format {
            Some(format) if !format.type_().is_compatible_with(storage_type) => {
                return Err(DataFormatError::IncompatibleFormat {
                    column: source.name,
                    format: format.to_string(),
                    storage_type,
                });
            }
            Some(format) => format,
            None => match (storage_type, source.storage_width) {
                (StorageType::String, Some(width)) => Format::for_string(width as usize),
                _ => Format::default_for_type(storage_type),
            },
        };
        let storage_width = source.storage_width.unwrap_or(match storage_type {
            StorageType::String => display_format.w() as u32,
            _ => 8,
        });

        let value_labels = source.check_value_labels(&source.name)?;
        let missing_values = source.check_missing(&source.name)?;

        Ok(ColumnMetadata {
            name,
            label: source.label.filter(|label| !label.is_empty()),
            storage_type,
            display_format,
            display_width: source
                .display_width
                .unwrap_or(display_format.w().min(64) as u32),
            storage_width,
            alignment: source
                .alignment
                .unwrap_or(Alignment::default_for_type(storage_type)),
            measure: source
                .measure
                .or(Measure::default_for_type(storage_type)),
            value_labels,
            missing_values,
        })
    }
}

/// Metadata for a single variable.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnMetadata {
    name: Identifier,
    label: Option<String>,
    storage_type: StorageType,
    display_format: Format,
    display_width: u32,
    storage_width: u32,
    alignment: Alignment,
    measure: Option<Measure>,
    value_labels: ValueLabels,
    missing_values: MissingValues,
}

impl ColumnMetadata {
    pub fn name(&self) -> &Identifier {
        &self.name
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn storage_type(&self) -> StorageType {
        self.storage_type
    }

    pub fn display_format(&self) -> Format {
        self.display_format
    }

    pub fn display_width(&self) -> u32 {
        self.display_width
    }

    pub fn storage_width(&self) -> u32 {
        self.storage_width
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn measure(&self) -> Option<Measure> {
        self.measure
    }

    pub fn value_labels(&self) -> &ValueLabels {
        &self.value_labels
    }

    pub fn missing_values(&self) -> &MissingValues {
        &self.missing_values
    }

    /// Returns the label for `value`, if it has one.
    pub fn label_for(&self, value: &Value) -> Option<&str> {
        Datum::from_value(value).and_then(|datum| self.value_labels.get(&datum))
    }

    /// Returns true if `value` is one of this variable's missing values.
    pub fn is_missing(&self, value: &Value) -> bool {
        self.missing_values.contains(value)
    }

    /// Returns what a reader should see for `value`: its label if it has one,
    /// otherwise [Value::Null] if it is missing, otherwise `value` itself.
    pub fn resolve(&self, value: &Value) -> Value {
        if let Some(label) = self.label_for(value) {
            Value::String(label.into())
        } else if self.is_missing(value) {
            Value::Null
        } else {
            value.clone()
        }
    }

    /// Converts `value` to this variable's storage type.
    pub fn coerce(&self, value: &Value) -> Result<Value> {
        self.storage_type.coerce(value).ok_or_else(|| {
            DataFormatError::Coercion {
                column: self.name.to_string(),
                value: value.clone(),
                storage_type: self.storage_type,
            }
            .into()
        })
    }

    /// Returns a variable that describes this one's values after
    /// [ColumnMetadata::resolve] or label replacement.  A variable without
    /// value labels is returned unchanged.  Otherwise, the result is a string
    /// variable wide enough for every label, with no value labels or missing
    /// values.
    pub fn labelled(&self) -> Result<Self> {
        if self.value_labels.is_empty() {
            return Ok(self.clone());
        }
        let width = self
            .value_labels
            .iter()
            .map(|(_, label)| label.len())
            .chain([self.display_width as usize, 1])
            .max()
            .unwrap_or(1);
        let mut column = UncheckedColumn::new(self.name.to_string(), StorageType::String)
            .with_storage_width(width as u32);
        column.label = self.label.clone();
        column.measure = self.measure;
        Ok(Self::try_from(column)?)
    }

    /// Returns the fields of this variable in unvalidated form, so that a
    /// modified copy can be built.
    pub fn to_unchecked(&self) -> UncheckedColumn {
        UncheckedColumn {
            name: self.name.to_string(),
            label: self.label.clone(),
            storage_type: self.storage_type,
            display_format: Some(self.display_format),
            display_width: Some(self.display_width),
            storage_width: Some(self.storage_width),
            alignment: Some(self.alignment),
            measure: self.measure,
            value_labels: self
                .value_labels
                .iter()
                .map(|(datum, label)| (Value::from(datum), label.into()))
                .collect(),
            missing: self.missing_values.iter().map(UncheckedMissing::from).collect(),
        }
    }
}

impl HasIdentifier for ColumnMetadata {
    fn identifier(&self) -> &UniCase<String> {
        &self.name.0
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::{
        data::{Datum, Value},
        error::DataFormatError,
        format::Format,
        variable::{
            Alignment, ColumnMetadata, Measure, MissingValueRange, StorageType, UncheckedColumn,
        },
    };

    fn gender() -> ColumnMetadata {
        UncheckedColumn::new("gender", StorageType::Numeric)
            .with_value_label(1, "Male")
            .with_value_label(2, "Female")
            .with_missing_value(9)
            .try_into()
            .unwrap()
    }

    #[test]
    fn resolve() {
        let gender = gender();
        assert_eq!(gender.resolve(&Value::from(1)), Value::from("Male"));
        assert_eq!(gender.resolve(&Value::from(2)), Value::from("Female"));
        assert_eq!(gender.resolve(&Value::from(9)), Value::Null);
        assert_eq!(gender.resolve(&Value::from(3)), Value::from(3));
        assert_eq!(gender.resolve(&Value::Null), Value::Null);
    }

    #[test]
    fn labelled() {
        let gender = UncheckedColumn::new("gender", StorageType::Numeric)
            .with_label("Respondent gender")
            .with_value_label(1, "Male")
            .with_value_label(2, "Nonbinary person")
            .with_missing_value(9)
            .try_into()
            .map(|column: ColumnMetadata| column.labelled().unwrap())
            .unwrap();
        assert_eq!(gender.storage_type(), StorageType::String);
        assert_eq!(gender.storage_width(), 16);
        assert_eq!(gender.label(), Some("Respondent gender"));
        assert!(gender.value_labels().is_empty());
        assert!(gender.missing_values().is_empty());
        assert_eq!(gender.coerce(&Value::from(3)).unwrap(), Value::from("3"));

        let age: ColumnMetadata = UncheckedColumn::new("age", StorageType::Numeric)
            .with_missing_value(999)
            .try_into()
            .unwrap();
        assert_eq!(age.labelled().unwrap(), age);
    }

    #[test]
    fn defaults() {
        let gender = gender();
        assert_eq!(gender.name().as_str(), "gender");
        assert_eq!(gender.label(), None);
        assert_eq!(gender.display_format(), Format::F8_2);
        assert_eq!(gender.display_width(), 8);
        assert_eq!(gender.storage_width(), 8);
        assert_eq!(gender.alignment(), Alignment::Right);
        assert_eq!(gender.measure(), None);

        let city: ColumnMetadata = UncheckedColumn::new("city", StorageType::String)
            .with_storage_width(24)
            .try_into()
            .unwrap();
        assert_eq!(city.display_format().to_string(), "A24");
        assert_eq!(city.storage_width(), 24);
        assert_eq!(city.alignment(), Alignment::Left);
        assert_eq!(city.measure(), Some(Measure::Nominal));
    }

    #[test]
    fn missing_ranges() {
        let income: ColumnMetadata = UncheckedColumn::new("income", StorageType::Numeric)
            .with_missing_range(None, Some(0.0))
            .with_missing_range(Some(999998.0), Some(999999.0))
            .try_into()
            .unwrap();
        assert!(income.is_missing(&Value::from(-5)));
        assert!(income.is_missing(&Value::from(0)));
        assert!(!income.is_missing(&Value::from(0.5)));
        assert!(income.is_missing(&Value::from(999998.0)));
        assert!(income.is_missing(&Value::from(999999.0)));
        assert!(!income.is_missing(&Value::from(1000000.0)));
        assert_eq!(
            income.missing_values().to_string(),
            "LOW THRU 0; 999998 THRU 999999"
        );
    }

    #[test]
    fn overlapping_missing() {
        for column in [
            UncheckedColumn::new("x", StorageType::Numeric)
                .with_missing_range(Some(1.0), Some(5.0))
                .with_missing_range(Some(5.0), Some(9.0)),
            UncheckedColumn::new("x", StorageType::Numeric)
                .with_missing_range(Some(1.0), None)
                .with_missing_value(100),
            UncheckedColumn::new("x", StorageType::Numeric)
                .with_missing_value(7)
                .with_missing_value(7.0),
            UncheckedColumn::new("x", StorageType::Numeric)
                .with_missing_range(None, Some(3.0))
                .with_missing_range(Some(-10.0), Some(-5.0)),
        ] {
            assert!(
                matches!(
                    ColumnMetadata::try_from(column.clone()),
                    Err(DataFormatError::OverlappingMissing { .. })
                ),
                "{column:?}"
            );
        }

        assert!(
            ColumnMetadata::try_from(
                UncheckedColumn::new("x", StorageType::Numeric)
                    .with_missing_range(Some(1.0), Some(5.0))
                    .with_missing_range(Some(5.5), Some(9.0))
                    .with_missing_value(10)
            )
            .is_ok()
        );
    }

    #[test]
    fn invalid_columns() {
        assert!(matches!(
            ColumnMetadata::try_from(UncheckedColumn::new("", StorageType::Numeric)),
            Err(DataFormatError::InvalidName(_))
        ));
        assert!(matches!(
            ColumnMetadata::try_from(
                UncheckedColumn::new("x", StorageType::Numeric).with_value_label("one", "One")
            ),
            Err(DataFormatError::LabelKey { .. })
        ));
        assert!(matches!(
            ColumnMetadata::try_from(
                UncheckedColumn::new("x", StorageType::String).with_missing_range(Some(1.0), None)
            ),
            Err(DataFormatError::RangeNotNumeric { .. })
        ));
        assert!(matches!(
            ColumnMetadata::try_from(
                UncheckedColumn::new("x", StorageType::Numeric)
                    .with_missing_range(Some(5.0), Some(1.0))
            ),
            Err(DataFormatError::InvalidRange { .. })
        ));
        assert!(matches!(
            ColumnMetadata::try_from(
                UncheckedColumn::new("x", StorageType::Date).with_display_format(Format::F8_2)
            ),
            Err(DataFormatError::IncompatibleFormat { .. })
        ));
    }

    #[test]
    fn label_keys_are_coerced() {
        let code: ColumnMetadata = UncheckedColumn::new("code", StorageType::Numeric)
            .with_value_label("1", "One")
            .try_into()
            .unwrap();
        assert_eq!(code.value_labels().get(&Datum::from(1.0)), Some("One"));

        let day: ColumnMetadata = UncheckedColumn::new("day", StorageType::Date)
            .with_value_label("2024-12-25", "Christmas")
            .try_into()
            .unwrap();
        let christmas = Value::Date(NaiveDate::from_ymd_opt(2024, 12, 25).unwrap());
        assert_eq!(day.label_for(&christmas), Some("Christmas"));
    }

    #[test]
    fn coerce() {
        assert_eq!(
            StorageType::Numeric.coerce(&Value::from(" 2.5 ")),
            Some(Value::Number(2.5))
        );
        assert_eq!(
            StorageType::Numeric.coerce(&Value::from("NaN")),
            Some(Value::Null)
        );
        assert_eq!(StorageType::Numeric.coerce(&Value::from("")), Some(Value::Null));
        assert_eq!(StorageType::Numeric.coerce(&Value::from("abc")), None);
        assert_eq!(
            StorageType::String.coerce(&Value::from(3)),
            Some(Value::from("3"))
        );
        assert_eq!(StorageType::String.coerce(&Value::from("")), Some(Value::from("")));
        let date = NaiveDate::from_ymd_opt(2020, 2, 29).unwrap();
        assert_eq!(
            StorageType::Date.coerce(&Value::from("2020-02-29")),
            Some(Value::Date(date))
        );
        assert_eq!(
            StorageType::DateTime.coerce(&Value::Date(date)),
            Some(Value::DateTime(date.and_hms_opt(0, 0, 0).unwrap()))
        );
        assert_eq!(
            StorageType::DateTime.coerce(&Value::from("2020-02-29 10:11:12")),
            Some(Value::DateTime(date.and_hms_opt(10, 11, 12).unwrap()))
        );
        assert_eq!(StorageType::Date.coerce(&Value::from(5)), None);
        assert_eq!(
            StorageType::Time.coerce(&Value::from("07:45")),
            Some(Value::Time(chrono::NaiveTime::from_hms_opt(7, 45, 0).unwrap()))
        );

        let gender = gender();
        assert!(gender.coerce(&Value::from("x")).unwrap_err().is_invalid_data_format());
    }

    #[test]
    fn round_trip_unchecked() {
        let gender = gender();
        let copy = ColumnMetadata::try_from(gender.to_unchecked()).unwrap();
        assert_eq!(gender, copy);
    }

    #[test]
    fn range_display() {
        assert_eq!(
            MissingValueRange::new(Some(1.5), None).unwrap().to_string(),
            "1.5 THRU HIGH"
        );
        assert_eq!(MissingValueRange::new(None, None), None);
    }
}
