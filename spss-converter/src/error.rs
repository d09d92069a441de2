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

//! Errors.
//!
//! Every fallible operation in this crate returns [Result], whose error type
//! distinguishes the three kinds of caller-input error (bad data, bad layout,
//! unknown column) from I/O and codec failures, which are passed through
//! unchanged.

use displaydoc::Display;
use thiserror::Error as ThisError;

use crate::{data::Value, identifier, variable::StorageType};

/// Result type for this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error converting data or metadata.
#[derive(Debug, ThisError)]
pub enum Error {
    /// A value or field cannot be coerced to its declared type, or metadata
    /// is internally inconsistent.
    #[error("Invalid data format: {0}")]
    InvalidDataFormat(#[from] DataFormatError),

    /// A layout payload is structurally malformed.
    #[error("Invalid layout: {0}")]
    InvalidLayout(#[from] LayoutError),

    /// An operation named a column that the relevant metadata lacks.
    #[error("Column {name:?} not found.")]
    ColumnNameNotFound { name: String },

    /// Both an include list and an exclude list were given.
    #[error("Columns may be included or excluded, but not both.")]
    ConflictingColumnFilters,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Spreadsheet XML error: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("Spreadsheet has no worksheet named {0:?}.")]
    SheetNotFound(String),

    #[error("Spreadsheet has no worksheets.")]
    NoWorksheets,

    /// A cell lies beyond the last row or column that a worksheet allows.
    #[error("{0} is outside the bounds of a worksheet.")]
    OutsideWorksheet(String),

    #[error("Configuration error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A CSV punctuation option is not a single-byte character.
    #[error("CSV {option} must be an ASCII character, not {value:?}.")]
    CsvOption { option: &'static str, value: char },

    #[cfg(feature = "polars")]
    #[error("Dataframe error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// An error reported by a [SystemFileBackend](crate::backend::SystemFileBackend).
    #[error("System file error: {0}")]
    Backend(Box<dyn std::error::Error + Send + Sync>),

    /// `source`, annotated with the operation or column that produced it.
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn column_not_found(name: impl Into<String>) -> Self {
        Self::ColumnNameNotFound { name: name.into() }
    }

    /// Wraps `error` from an external system-file reader or writer.
    pub fn backend<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(error))
    }

    /// Returns the innermost error, looking through any [Error::Context].
    pub fn root(&self) -> &Error {
        match self {
            Error::Context { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_invalid_data_format(&self) -> bool {
        matches!(self.root(), Error::InvalidDataFormat(_))
    }

    pub fn is_invalid_layout(&self) -> bool {
        matches!(self.root(), Error::InvalidLayout(_))
    }

    pub fn is_column_name_not_found(&self) -> bool {
        matches!(self.root(), Error::ColumnNameNotFound { .. })
    }
}

/// Extension trait for attaching context to a [Result].
pub trait Context<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Into<String>;

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T, E> Context<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Into<String>,
    {
        self.map_err(|error| Error::Context {
            context: context.into(),
            source: Box::new(error.into()),
        })
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|error| Error::Context {
            context: f().into(),
            source: Box::new(error.into()),
        })
    }
}

/// Details of an [Error::InvalidDataFormat].
#[derive(Clone, Debug, ThisError, PartialEq)]
pub enum DataFormatError {
    #[error("Invalid column name: {0}")]
    InvalidName(#[from] identifier::Error),

    #[error("Column name {0:?} appears more than once.")]
    DuplicateColumn(String),

    #[error("{0:?} is not a storage type (expected numeric, string, date, datetime, or time).")]
    UnknownStorageType(String),

    #[error("{0:?} is not an alignment (expected left, center, or right).")]
    UnknownAlignment(String),

    #[error("{0:?} is not a measurement level (expected nominal, ordinal, or scale).")]
    UnknownMeasure(String),

    #[error("{0:?} is not a valid display format.")]
    InvalidFormat(String),

    #[error("Column {column}: display format {format} cannot be used with {storage_type} data.")]
    IncompatibleFormat {
        column: String,
        format: String,
        storage_type: StorageType,
    },

    #[error("{0:?} is not a known character encoding.")]
    UnknownEncoding(String),

    #[error("Column {column}: value {value} cannot be stored as {storage_type} data.")]
    Coercion {
        column: String,
        value: Value,
        storage_type: StorageType,
    },

    #[error("Column {column}: value label key {value} cannot be stored as {storage_type} data.")]
    LabelKey {
        column: String,
        value: Value,
        storage_type: StorageType,
    },

    #[error("Column {column}: missing value specifications {first} and {second} overlap.")]
    OverlappingMissing {
        column: String,
        first: String,
        second: String,
    },

    #[error("Column {column}: missing value ranges require numeric data, not {storage_type}.")]
    RangeNotNumeric {
        column: String,
        storage_type: StorageType,
    },

    #[error("Column {column}: {low} THRU {high} is not a valid missing value range.")]
    InvalidRange {
        column: String,
        low: String,
        high: String,
    },
}

/// Details of an [Error::InvalidLayout].
#[derive(Clone, Debug, Display, ThisError, PartialEq, Eq)]
pub enum LayoutError {
    /// Layout must be either "records" or "table", not {0:?}.
    UnknownLayout(String),

    /// Payload is missing required {0:?} key.
    MissingKey(&'static str),

    /// Expected {expected} but found {found}.
    UnexpectedShape {
        /// What the payload should contain at this point.
        expected: &'static str,
        /// What it contains instead.
        found: &'static str,
    },

    /// Record {row} refers to column {column:?}, which the schema does not declare.
    UndeclaredColumn {
        /// 0-based record index.
        row: usize,
        /// Undeclared column name.
        column: String,
    },

    /// Record {row} has more than one key for column {column:?}.
    DuplicateKey {
        /// 0-based record index.
        row: usize,
        /// The second key, which differs from the first only in case.
        column: String,
    },

    /// Malformed metadata mapping: {0}
    MalformedMapping(String),
}
