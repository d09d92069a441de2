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

//! Boundary with the system file reader and writer.
//!
//! This crate does not decode or encode the binary system file format
//! itself.  Instead, the conversion functions in [read](crate::read) and
//! [write](crate::write) take an implementation of [SystemFileBackend], which
//! exchanges rows and a [MetadataDescriptor] with them.

use std::{
    fs::File,
    io::{BufReader, Cursor, Read, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    data::Record,
    dictionary::{ColumnFilter, Metadata},
    error::Result,
    mapping::MetadataDescriptor,
};

/// Where a system file comes from.
#[derive(Copy, Clone, Debug)]
pub enum Source<'a> {
    Path(&'a Path),
    Bytes(&'a [u8]),
}

impl<'a> Source<'a> {
    /// Opens this source for reading.
    pub fn open(&self) -> Result<Box<dyn Read + 'a>> {
        Ok(match *self {
            Source::Path(path) => Box::new(BufReader::new(File::open(path)?)),
            Source::Bytes(bytes) => Box::new(Cursor::new(bytes)),
        })
    }
}

impl<'a> From<&'a Path> for Source<'a> {
    fn from(value: &'a Path) -> Self {
        Self::Path(value)
    }
}

impl<'a> From<&'a [u8]> for Source<'a> {
    fn from(value: &'a [u8]) -> Self {
        Self::Bytes(value)
    }
}

/// What a [SystemFileBackend] should read.
///
/// A backend must honor `offset`, `limit`, and `metadata_only`.  The column
/// filter is only a hint: a backend may return every column, in which case
/// the caller drops the unwanted ones.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BackendOptions {
    /// Maximum number of rows to return.
    pub limit: Option<usize>,

    /// Number of rows to skip first.
    pub offset: usize,

    /// Columns to return.
    pub columns: ColumnFilter,

    /// Return only metadata, with no rows.
    pub metadata_only: bool,
}

/// The contents of a system file, as a backend reads or writes it.
///
/// `metadata` describes every column in the file, even when `rows` holds
/// fewer.  Its row count is the number of rows in the file, not in `rows`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawFile {
    pub rows: Vec<Record>,
    pub metadata: MetadataDescriptor,
}

impl RawFile {
    pub fn new(rows: Vec<Record>, metadata: &Metadata) -> Self {
        Self {
            rows,
            metadata: metadata.to_descriptor(),
        }
    }
}

/// A reader and writer for the binary system file format.
pub trait SystemFileBackend {
    /// Reads the system file in `source`.
    ///
    /// Errors should be reported with [Error::Backend](crate::error::Error::Backend)
    /// unless they are I/O errors.
    fn read(&self, source: &Source, options: &BackendOptions) -> Result<RawFile>;

    /// Writes `file` to `output` in system file format.
    fn write(&self, file: &RawFile, output: &mut dyn Write) -> Result<()>;
}

impl<T> SystemFileBackend for &T
where
    T: SystemFileBackend + ?Sized,
{
    fn read(&self, source: &Source, options: &BackendOptions) -> Result<RawFile> {
        (**self).read(source, options)
    }

    fn write(&self, file: &RawFile, output: &mut dyn Write) -> Result<()> {
        (**self).write(file, output)
    }
}
