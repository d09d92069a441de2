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

//! Reading system files into interchange formats.
//!
//! [ReadOptions] says which rows and columns to read and how to present their
//! values.  Its methods read a system file through a [SystemFileBackend] and
//! return or write the result in one of the supported formats.

use std::path::Path;

use log::debug;

use crate::{
    backend::{BackendOptions, RawFile, Source, SystemFileBackend},
    codec::{
        csv::{self, CsvOptions},
        json::{self, JsonOptions},
        round_numbers,
        xlsx::{self, ExcelOptions},
        yaml::{self, YamlOptions},
    },
    data::{Record, Value},
    dictionary::{ColumnFilter, Metadata},
    error::{Context, Result},
    layout::{Layout, Payload, check_columns, coerce_rows, to_layout},
    util::write_atomically,
    variable::ColumnMetadata,
};

/// Options for reading a system file.
#[derive(Clone, Debug, PartialEq)]
pub struct ReadOptions {
    /// Maximum number of rows to read, or `None` for all of them.
    pub limit: Option<usize>,

    /// Number of rows to skip before the first one read.
    pub offset: usize,

    /// Columns to read.
    pub columns: ColumnFilter,

    /// Read only the metadata, with no rows.
    pub metadata_only: bool,

    /// Replace values that have value labels by their labels.  The columns
    /// that have value labels then become string columns.
    pub apply_labels: bool,

    /// Replace user-missing values by [Value::Null].
    pub missing_as_null: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            limit: None,
            offset: 0,
            columns: ColumnFilter::All,
            metadata_only: false,
            apply_labels: false,
            missing_as_null: true,
        }
    }
}

/// Rows read from a system file, with their metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    /// Rows, each with one entry per column in `metadata`, in column order.
    pub rows: Vec<Record>,

    /// Metadata for the columns that were read.  Its row count is the number
    /// of rows in the file.
    pub metadata: Metadata,
}

impl Dataset {
    pub fn column_names(&self) -> Vec<&str> {
        self.metadata.names().map(|name| name.as_str()).collect()
    }

    /// Lays out the rows as `layout`.
    pub fn into_payload(self, layout: Layout) -> Result<Payload> {
        to_layout(self.rows, &self.metadata, layout)
    }
}

impl ReadOptions {
    /// Constructs a new set of default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `self` with the row limit set to `limit`.
    pub fn with_limit(self, limit: Option<usize>) -> Self {
        Self { limit, ..self }
    }

    /// Returns `self` with the row offset set to `offset`.
    pub fn with_offset(self, offset: usize) -> Self {
        Self { offset, ..self }
    }

    /// Returns `self` with the column filter set to `columns`.
    pub fn with_columns(self, columns: ColumnFilter) -> Self {
        Self { columns, ..self }
    }

    pub fn with_metadata_only(self, metadata_only: bool) -> Self {
        Self {
            metadata_only,
            ..self
        }
    }

    pub fn with_apply_labels(self, apply_labels: bool) -> Self {
        Self {
            apply_labels,
            ..self
        }
    }

    pub fn with_missing_as_null(self, missing_as_null: bool) -> Self {
        Self {
            missing_as_null,
            ..self
        }
    }

    fn backend_options(&self) -> BackendOptions {
        BackendOptions {
            limit: self.limit,
            offset: self.offset,
            columns: self.columns.clone(),
            metadata_only: self.metadata_only,
        }
    }

    fn present(&self, column: &ColumnMetadata, value: Value) -> Value {
        if self.apply_labels
            && let Some(label) = column.label_for(&value)
        {
            Value::String(label.into())
        } else if self.missing_as_null && column.is_missing(&value) {
            Value::Null
        } else {
            value
        }
    }

    /// Reads the system file in `source` with `backend`.
    pub fn open<B>(&self, backend: B, source: Source) -> Result<Dataset>
    where
        B: SystemFileBackend,
    {
        let RawFile { rows, metadata } = backend
            .read(&source, &self.backend_options())
            .context("Reading system file")?;
        let file_metadata = Metadata::from_descriptor(metadata)?;
        check_columns(&rows, &file_metadata)?;
        let metadata = file_metadata.filtered(&self.columns)?;

        let rows: Vec<Record> = if self.metadata_only {
            Vec::new()
        } else {
            let rows: Vec<Record> = rows
                .into_iter()
                .take(self.limit.unwrap_or(usize::MAX))
                .collect();
            coerce_rows(rows, &metadata)?
                .into_iter()
                .map(|row| {
                    metadata
                        .columns()
                        .zip(row)
                        .map(|(column, (name, value))| (name, self.present(column, value)))
                        .collect()
                })
                .collect()
        };
        let (rows, metadata) = if self.apply_labels {
            let metadata = metadata.labelled()?;
            (coerce_rows(rows, &metadata)?, metadata)
        } else {
            (rows, metadata)
        };
        debug!(
            "read {} rows and {} of {} columns",
            rows.len(),
            metadata.len(),
            file_metadata.len()
        );
        Ok(Dataset { rows, metadata })
    }

    /// Reads only the metadata of the system file in `source`.
    pub fn get_metadata<B>(&self, backend: B, source: Source) -> Result<Metadata>
    where
        B: SystemFileBackend,
    {
        let options = self
            .clone()
            .with_metadata_only(true)
            .with_apply_labels(false);
        Ok(options.open(backend, source)?.metadata)
    }

    /// Reads the system file in `source` and lays out its rows as `layout`.
    pub fn to_dict<B>(&self, backend: B, source: Source, layout: Layout) -> Result<Payload>
    where
        B: SystemFileBackend,
    {
        self.open(backend, source)?.into_payload(layout)
    }

    /// Reads the system file in `source` and converts it to delimited text.
    /// If `target` is given, writes the text there and returns `None`;
    /// otherwise, returns the text.
    pub fn to_csv<B>(
        &self,
        backend: B,
        source: Source,
        target: Option<&Path>,
        options: &CsvOptions,
    ) -> Result<Option<String>>
    where
        B: SystemFileBackend,
    {
        let dataset = self.open(backend, source)?;
        let text = csv::to_string(&dataset.rows, &dataset.column_names(), options)?;
        emit_text(text, target)
    }

    /// Reads the system file in `source` and lays it out as `layout`, with
    /// numbers in the data rounded to `precision` digits.
    fn rounded_payload<B>(
        &self,
        backend: B,
        source: Source,
        layout: Layout,
        precision: Option<usize>,
    ) -> Result<Payload>
    where
        B: SystemFileBackend,
    {
        let mut dataset = self.open(backend, source)?;
        if let Some(precision) = precision {
            round_numbers(&mut dataset.rows, precision);
        }
        dataset.into_payload(layout)
    }

    /// Reads the system file in `source` and converts it to JSON laid out as
    /// `layout`.  If `target` is given, writes the JSON there and returns
    /// `None`; otherwise, returns the JSON.
    pub fn to_json<B>(
        &self,
        backend: B,
        source: Source,
        target: Option<&Path>,
        layout: Layout,
        options: &JsonOptions,
    ) -> Result<Option<String>>
    where
        B: SystemFileBackend,
    {
        let payload = self.rounded_payload(backend, source, layout, options.precision)?;
        emit_text(json::to_string(&payload, options)?, target)
    }

    /// Like [ReadOptions::to_json], but for YAML.
    pub fn to_yaml<B>(
        &self,
        backend: B,
        source: Source,
        target: Option<&Path>,
        layout: Layout,
        options: &YamlOptions,
    ) -> Result<Option<String>>
    where
        B: SystemFileBackend,
    {
        let payload = self.rounded_payload(backend, source, layout, options.precision)?;
        emit_text(yaml::to_string(&payload)?, target)
    }

    /// Reads the system file in `source` and converts it to a spreadsheet
    /// with one worksheet.  If `target` is given, writes the spreadsheet
    /// there and returns `None`; otherwise, returns its bytes.
    pub fn to_excel<B>(
        &self,
        backend: B,
        source: Source,
        target: Option<&Path>,
        options: &ExcelOptions,
    ) -> Result<Option<Vec<u8>>>
    where
        B: SystemFileBackend,
    {
        let dataset = self.open(backend, source)?;
        let bytes = xlsx::to_bytes(&dataset.rows, &dataset.column_names(), options)?;
        match target {
            Some(path) => {
                write_atomically(path, &bytes)?;
                Ok(None)
            }
            None => Ok(Some(bytes)),
        }
    }

    /// Reads the system file in `source` into a dataframe.
    #[cfg(feature = "polars")]
    pub fn to_dataframe<B>(&self, backend: B, source: Source) -> Result<polars::frame::DataFrame>
    where
        B: SystemFileBackend,
    {
        let dataset = self.open(backend, source)?;
        crate::dataframe::to_dataframe(&dataset.rows, &dataset.metadata)
    }
}

fn emit_text(text: String, target: Option<&Path>) -> Result<Option<String>> {
    match target {
        Some(path) => {
            write_atomically(path, text.as_bytes())?;
            Ok(None)
        }
        None => Ok(Some(text)),
    }
}
