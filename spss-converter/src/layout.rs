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

//! Records and table layouts.
//!
//! Rows can be laid out two ways:
//!
//! - [Layout::Records]: a sequence of mappings from column name to value.
//!
//! - [Layout::Table]: a mapping with two keys, `schema`, which is a sequence
//!   of [ColumnDescriptor]s in column order, and `data`, which is a sequence
//!   of records.  Every key in every record must be declared in `schema`.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use clap::ValueEnum;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    data::{Record, Value},
    dictionary::{FileAttributes, Metadata},
    error::{Context, Error, LayoutError, Result},
    mapping::ColumnDescriptor,
    variable::ColumnMetadata,
};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// A sequence of records.
    #[default]
    Records,

    /// A `schema` and `data` envelope.
    Table,
}

impl Layout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Records => "records",
            Layout::Table => "table",
        }
    }
}

impl Display for Layout {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Layout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Layout::Records, Layout::Table]
            .into_iter()
            .find(|layout| s.eq_ignore_ascii_case(layout.as_str()))
            .ok_or_else(|| LayoutError::UnknownLayout(s.into()).into())
    }
}

/// A table-layout envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub schema: Vec<ColumnDescriptor>,
    pub data: Vec<Record>,
}

impl Table {
    /// Validates this envelope and splits it into rows and the metadata that
    /// `schema` describes, with cells coerced to their declared storage
    /// types.
    pub fn into_parts(self) -> Result<(Vec<Record>, Metadata)> {
        let columns = self
            .schema
            .into_iter()
            .map(ColumnMetadata::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let metadata = Metadata::new(columns, self.data.len() as u64, FileAttributes::default())?;

        let mut rows = Vec::with_capacity(self.data.len());
        for (index, record) in self.data.into_iter().enumerate() {
            let mut row = Record::with_capacity(record.len());
            let mut seen = vec![false; metadata.len()];
            for (name, value) in record {
                let Some(position) = metadata.index_of(&name) else {
                    return Err(LayoutError::UndeclaredColumn {
                        row: index,
                        column: name,
                    }
                    .into());
                };
                if std::mem::replace(&mut seen[position], true) {
                    return Err(LayoutError::DuplicateKey {
                        row: index,
                        column: name,
                    }
                    .into());
                }
                let column = metadata.column(&name)?;
                let value = column
                    .coerce(&value)
                    .with_context(|| format!("Row {index}"))?;
                row.insert(name, value);
            }
            rows.push(row);
        }
        Ok((rows, metadata))
    }
}

/// Rows in one of the two layouts.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Records(Vec<Record>),
    Table(Table),
}

impl Payload {
    pub fn layout(&self) -> Layout {
        match self {
            Payload::Records(_) => Layout::Records,
            Payload::Table(_) => Layout::Table,
        }
    }

    /// Splits this payload into rows and, for a table, its metadata.
    pub fn into_parts(self) -> Result<(Vec<Record>, Option<Metadata>)> {
        match self {
            Payload::Records(rows) => Ok((rows, None)),
            Payload::Table(table) => {
                let (rows, metadata) = table.into_parts()?;
                Ok((rows, Some(metadata)))
            }
        }
    }
}

/// Checks that every key in `rows` names a column in `metadata`.
pub fn check_columns(rows: &[Record], metadata: &Metadata) -> Result<()> {
    for row in rows {
        if let Some(name) = row.keys().find(|name| !metadata.contains(name)) {
            return Err(Error::column_not_found(name.as_str()));
        }
    }
    Ok(())
}

/// Rebuilds each of `rows` with one entry per column in `metadata`, in column
/// order and under the column's own name, with each value coerced to the
/// column's storage type.  Absent columns become [Value::Null] and keys that
/// `metadata` does not name are dropped.  Two keys in one row for the same
/// column are an [Error::InvalidLayout].
pub fn coerce_rows(rows: Vec<Record>, metadata: &Metadata) -> Result<Vec<Record>> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            let mut values: Vec<Option<Value>> = vec![None; metadata.len()];
            for (name, value) in row {
                if let Some(column) = metadata.index_of(&name)
                    && values[column].replace(value).is_some()
                {
                    return Err(Error::from(LayoutError::DuplicateKey {
                        row: index,
                        column: name,
                    }));
                }
            }
            metadata
                .columns()
                .zip(values)
                .map(|(column, value)| {
                    let value = value.unwrap_or_default();
                    Ok((column.name().to_string(), column.coerce(&value)?))
                })
                .collect::<Result<Record>>()
                .with_context(|| format!("Row {index}"))
        })
        .collect()
}

/// Lays out `rows`, described by `metadata`, as `layout`.
pub fn to_layout(rows: Vec<Record>, metadata: &Metadata, layout: Layout) -> Result<Payload> {
    check_columns(&rows, metadata)?;
    Ok(match layout {
        Layout::Records => Payload::Records(rows),
        Layout::Table => Payload::Table(Table {
            schema: metadata.schema_descriptor(),
            data: rows,
        }),
    })
}

fn shape(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a sequence",
        serde_json::Value::Object(_) => "a mapping",
    }
}

fn unexpected(expected: &'static str, found: &serde_json::Value) -> Error {
    LayoutError::UnexpectedShape {
        expected,
        found: shape(found),
    }
    .into()
}

fn parse_records(value: serde_json::Value) -> Result<Vec<Record>> {
    let elements = match value {
        serde_json::Value::Array(elements) => elements,
        other => return Err(unexpected("a sequence of records", &other)),
    };
    elements
        .into_iter()
        .map(|element| {
            let fields = match element {
                serde_json::Value::Object(fields) => fields,
                other => return Err(unexpected("a record", &other)),
            };
            fields
                .into_iter()
                .map(|(name, cell)| match cell {
                    serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                        Err(unexpected("a scalar value", &cell))
                    }
                    cell => Ok((name, Value::deserialize(cell)?)),
                })
                .collect::<Result<Record>>()
        })
        .collect()
}

/// Reads rows laid out as `layout` from `payload`.  For [Layout::Table], also
/// returns the metadata reconstructed from the schema, with a row count equal
/// to the number of records.
pub fn from_layout(
    payload: serde_json::Value,
    layout: Layout,
) -> Result<(Vec<Record>, Option<Metadata>)> {
    match layout {
        Layout::Records => {
            let rows = parse_records(payload)?;
            debug!("read {} records", rows.len());
            Ok((rows, None))
        }
        Layout::Table => {
            let mut envelope = match payload {
                serde_json::Value::Object(envelope) => envelope,
                other => return Err(unexpected("a table with schema and data", &other)),
            };
            let schema = envelope
                .remove("schema")
                .ok_or(LayoutError::MissingKey("schema"))?;
            let data = envelope
                .remove("data")
                .ok_or(LayoutError::MissingKey("data"))?;
            if !schema.is_array() {
                return Err(unexpected("a sequence of column descriptors", &schema));
            }
            let schema: Vec<ColumnDescriptor> = serde_json::from_value(schema)
                .map_err(|error| LayoutError::MalformedMapping(error.to_string()))?;
            let data = parse_records(data)?;
            debug!(
                "read table with {} columns and {} records",
                schema.len(),
                data.len()
            );
            let (rows, metadata) = Table { schema, data }.into_parts()?;
            Ok((rows, Some(metadata)))
        }
    }
}
