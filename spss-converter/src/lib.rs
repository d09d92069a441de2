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

//! Conversion of SPSS datasets and their metadata to and from common
//! interchange formats.
//!
//! A dataset is a sequence of rows, each a [Record](data::Record) mapping
//! column names to [Value](data::Value)s, plus [Metadata](dictionary::Metadata)
//! that describes the columns.  [read::ReadOptions] reads a system file and
//! produces records, table layouts, delimited text, JSON, YAML, spreadsheets,
//! or dataframes.  [write::WriteOptions] goes the other way.  Both reach the
//! binary system file format through a
//! [SystemFileBackend](backend::SystemFileBackend).

pub mod backend;
pub mod codec;
pub mod data;
#[cfg(feature = "polars")]
pub mod dataframe;
pub mod dictionary;
pub mod error;
pub mod format;
pub mod identifier;
pub mod layout;
pub mod mapping;
pub mod read;
pub mod settings;
pub mod util;
pub mod variable;
pub mod write;

pub use error::{Error, Result};
