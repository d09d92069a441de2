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

//! Writing system files from interchange formats.
//!
//! Every conversion validates and coerces all of its input before it opens
//! its destination.  A file destination is written through a temporary file
//! that replaces it only on success.

use std::path::Path;

use log::debug;

use crate::{
    backend::{RawFile, SystemFileBackend},
    codec::{
        csv::{self, CsvOptions},
        json, xlsx, yaml,
    },
    data::{Record, Value},
    dictionary::{Compression, FileAttributes, Metadata, name_unnamed_columns},
    error::{Context, Result},
    layout::{Layout, Payload, check_columns, coerce_rows, from_layout},
    util::write_atomically_with,
};

/// Options for writing a system file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteOptions {
    /// Metadata for the new file.  Without it, metadata comes from a table
    /// layout's schema or, failing that, is inferred from the rows.
    pub metadata: Option<Metadata>,

    /// How to compress the new file.  Without it, the metadata's own setting
    /// applies.
    pub compression: Option<Compression>,
}

impl WriteOptions {
    /// Constructs a new set of default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `self` with the metadata set to `metadata`.
    pub fn with_metadata(self, metadata: Option<Metadata>) -> Self {
        Self { metadata, ..self }
    }

    /// Returns `self` with the compression format set to `compression`.
    pub fn with_compression(self, compression: Option<Compression>) -> Self {
        Self {
            compression,
            ..self
        }
    }

    /// Writes `rows`, described by `schema` if there is no explicit metadata,
    /// as a system file.
    fn write<B>(
        &self,
        backend: B,
        rows: Vec<Record>,
        schema: Option<Metadata>,
        target: Option<&Path>,
    ) -> Result<Option<Vec<u8>>>
    where
        B: SystemFileBackend,
    {
        let (rows, metadata) = match (&self.metadata, schema) {
            (Some(metadata), _) => (rows, metadata.clone()),
            (None, Some(schema)) => (rows, schema),
            (None, None) => {
                let rows = name_unnamed_columns(rows);
                let metadata = Metadata::infer(&rows)?;
                (rows, metadata)
            }
        };
        check_columns(&rows, &metadata)?;

        let rows = coerce_rows(rows, &metadata)?;

        let mut metadata = metadata.with_row_count(rows.len() as u64);
        if let Some(compression) = self.compression {
            metadata = metadata.with_file_attributes(FileAttributes {
                compression: Some(compression),
                ..metadata.file_attributes().clone()
            })?;
        }
        debug!(
            "writing {} rows with {} columns",
            rows.len(),
            metadata.len()
        );

        let file = RawFile::new(rows, &metadata);
        match target {
            Some(path) => {
                write_atomically_with(path, |output| backend.write(&file, output))
                    .context("Writing system file")?;
                Ok(None)
            }
            None => {
                let mut bytes = Vec::new();
                backend
                    .write(&file, &mut bytes)
                    .context("Writing system file")?;
                Ok(Some(bytes))
            }
        }
    }

    /// Writes `rows` as a system file.  If `target` is given, writes the file
    /// there and returns `None`; otherwise, returns its bytes.
    pub fn from_records<B>(
        &self,
        backend: B,
        rows: Vec<Record>,
        target: Option<&Path>,
    ) -> Result<Option<Vec<u8>>>
    where
        B: SystemFileBackend,
    {
        self.write(backend, rows, None, target)
    }

    /// Writes the rows in `payload` as a system file.
    pub fn from_payload<B>(
        &self,
        backend: B,
        payload: Payload,
        target: Option<&Path>,
    ) -> Result<Option<Vec<u8>>>
    where
        B: SystemFileBackend,
    {
        let (rows, schema) = payload.into_parts()?;
        self.write(backend, rows, schema, target)
    }

    /// Writes the rows in `payload`, laid out as `layout`, as a system file.
    pub fn from_dict<B>(
        &self,
        backend: B,
        payload: serde_json::Value,
        layout: Layout,
        target: Option<&Path>,
    ) -> Result<Option<Vec<u8>>>
    where
        B: SystemFileBackend,
    {
        let (rows, schema) = from_layout(payload, layout)?;
        self.write(backend, rows, schema, target)
    }

    /// Writes the rows in JSON `text`, laid out as `layout`, as a system file.
    pub fn from_json<B>(
        &self,
        backend: B,
        text: &str,
        layout: Layout,
        target: Option<&Path>,
    ) -> Result<Option<Vec<u8>>>
    where
        B: SystemFileBackend,
    {
        self.from_dict(backend, json::parse(text)?, layout, target)
    }

    /// Like [WriteOptions::from_json], but for YAML.
    pub fn from_yaml<B>(
        &self,
        backend: B,
        text: &str,
        layout: Layout,
        target: Option<&Path>,
    ) -> Result<Option<Vec<u8>>>
    where
        B: SystemFileBackend,
    {
        self.from_dict(backend, yaml::parse(text)?, layout, target)
    }

    /// Writes the rows in delimited text `input` as a system file.
    pub fn from_csv<B>(
        &self,
        backend: B,
        input: &[u8],
        options: &CsvOptions,
        target: Option<&Path>,
    ) -> Result<Option<Vec<u8>>>
    where
        B: SystemFileBackend,
    {
        self.write(backend, csv::read(input, options)?, None, target)
    }

    /// Writes the rows in worksheet `sheet` (by default, the first worksheet)
    /// of spreadsheet `input` as a system file.
    pub fn from_excel<B>(
        &self,
        backend: B,
        input: &[u8],
        sheet: Option<&str>,
        target: Option<&Path>,
    ) -> Result<Option<Vec<u8>>>
    where
        B: SystemFileBackend,
    {
        self.write(backend, xlsx::read(input, sheet)?, None, target)
    }

    /// Writes the rows in `frame` as a system file.
    #[cfg(feature = "polars")]
    pub fn from_dataframe<B>(
        &self,
        backend: B,
        frame: &polars::frame::DataFrame,
        target: Option<&Path>,
    ) -> Result<Option<Vec<u8>>>
    where
        B: SystemFileBackend,
    {
        self.write(backend, crate::dataframe::from_dataframe(frame)?, None, target)
    }
}

/// Returns a copy of `rows` with each value that has a value label in
/// `metadata` replaced by its label.
///
/// Fails with [Error::ColumnNameNotFound](crate::error::Error::ColumnNameNotFound)
/// if a row has a column that `metadata` lacks.
pub fn apply_metadata(rows: &[Record], metadata: &Metadata) -> Result<Vec<Record>> {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|(name, value)| {
                    let column = metadata.column(name)?;
                    let value = match column.label_for(value) {
                        Some(label) => Value::String(label.into()),
                        None => value.clone(),
                    };
                    Ok((name.clone(), value))
                })
                .collect()
        })
        .collect()
}
