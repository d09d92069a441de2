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

//! Dataset metadata.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use clap::ValueEnum;
use encoding_rs::{Encoding, UTF_8};
use indexmap::{IndexMap, IndexSet};
use log::debug;
use serde::{Deserialize, Serialize, Serializer};
use unicase::UniCase;

use crate::{
    data::{Record, Value},
    error::{DataFormatError, Error, LayoutError, Result},
    format::Format,
    identifier::{ByIdentifier, Identifier},
    mapping::{ColumnDescriptor, MetadataDescriptor},
    variable::{ColumnMetadata, StorageType, UncheckedColumn},
};

/// Type of compression in a system file.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// Simple bytecode-based compression.
    Simple,
    /// [ZLIB] compression.
    ///
    /// [ZLIB]: https://www.zlib.net/
    #[value(name = "zlib", help = "ZLIB space-efficient compression")]
    ZLib,
}

/// Attributes of a file as a whole.
#[derive(Clone, Debug, PartialEq)]
pub struct FileAttributes {
    /// Character encoding for column names and string data.
    pub encoding: &'static Encoding,

    /// How the system file's data is compressed, if at all.
    pub compression: Option<Compression>,

    /// When the file was written.
    pub creation: Option<NaiveDateTime>,

    /// Optional label for the file.
    pub file_label: Option<String>,

    /// Name of the table that the data came from.
    pub table_name: Option<String>,

    /// Free-form documentation lines.
    pub notes: Vec<String>,
}

impl Default for FileAttributes {
    fn default() -> Self {
        Self {
            encoding: UTF_8,
            compression: None,
            creation: None,
            file_label: None,
            table_name: None,
            notes: Vec::new(),
        }
    }
}

/// Which columns to keep when reading.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ColumnFilter {
    /// Keep every column.
    #[default]
    All,

    /// Keep only the named columns.
    Include(Vec<String>),

    /// Keep every column except the named ones.
    Exclude(Vec<String>),
}

impl ColumnFilter {
    /// Builds a filter from optional include and exclude lists, which may not
    /// both be given.
    pub fn new(include: Option<Vec<String>>, exclude: Option<Vec<String>>) -> Result<Self> {
        match (include, exclude) {
            (Some(_), Some(_)) => Err(Error::ConflictingColumnFilters),
            (Some(include), None) => Ok(Self::Include(include)),
            (None, Some(exclude)) => Ok(Self::Exclude(exclude)),
            (None, None) => Ok(Self::All),
        }
    }

    pub fn is_all(&self) -> bool {
        *self == Self::All
    }
}

/// The metadata for a dataset: an ordered collection of columns, plus
/// attributes of the file as a whole.
///
/// A [Metadata] cannot be modified after it is constructed.  Operations that
/// would change it, such as [Metadata::filtered], return a new one instead.
#[derive(Clone, Debug)]
pub struct Metadata {
    columns: IndexSet<ByIdentifier<ColumnMetadata>>,
    row_count: u64,
    file_attributes: FileAttributes,
}

impl PartialEq for Metadata {
    fn eq(&self, other: &Self) -> bool {
        // We have to compare the dereferenced columns.  Otherwise we would
        // just be comparing their names.
        self.columns
            .iter()
            .map(|column| &**column)
            .eq(other.columns.iter().map(|column| &**column))
            && self.row_count == other.row_count
            && self.file_attributes == other.file_attributes
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            columns: IndexSet::new(),
            row_count: 0,
            file_attributes: FileAttributes::default(),
        }
    }
}

impl Serialize for Metadata {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_descriptor().serialize(serializer)
    }
}

impl Metadata {
    /// Creates new metadata from `columns`, which must have distinct names
    /// that are valid in `file_attributes.encoding`.
    pub fn new<I>(columns: I, row_count: u64, file_attributes: FileAttributes) -> Result<Self>
    where
        I: IntoIterator<Item = ColumnMetadata>,
    {
        let mut set = IndexSet::new();
        for column in columns {
            column
                .name()
                .check_encoding(file_attributes.encoding)
                .map_err(DataFormatError::from)?;
            let name = column.name().to_string();
            if !set.insert(ByIdentifier::new(column)) {
                return Err(DataFormatError::DuplicateColumn(name).into());
            }
        }
        Ok(Self {
            columns: set,
            row_count,
            file_attributes,
        })
    }

    pub fn columns(&self) -> impl ExactSizeIterator<Item = &ColumnMetadata> + DoubleEndedIterator {
        self.columns.iter().map(|column| &**column)
    }

    pub fn names(&self) -> impl ExactSizeIterator<Item = &Identifier> {
        self.columns.iter().map(|column| column.name())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    pub fn file_attributes(&self) -> &FileAttributes {
        &self.file_attributes
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.file_attributes.encoding
    }

    /// Looks up the column named `name`, ignoring case.
    pub fn column(&self, name: &str) -> Result<&ColumnMetadata> {
        self.columns
            .get(&UniCase::new(name.to_string()))
            .map(|column| &**column)
            .ok_or_else(|| Error::column_not_found(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains(&UniCase::new(name.to_string()))
    }

    /// Returns the index of the column named `name`, ignoring case.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.get_index_of(&UniCase::new(name.to_string()))
    }

    /// Returns a copy of this metadata restricted by `filter`.  Kept columns
    /// stay in their original relative order.
    ///
    /// Fails with [Error::ColumnNameNotFound] if `filter` names a column that
    /// does not exist.
    pub fn filtered(&self, filter: &ColumnFilter) -> Result<Self> {
        let (names, include) = match filter {
            ColumnFilter::All => return Ok(self.clone()),
            ColumnFilter::Include(names) => (names, true),
            ColumnFilter::Exclude(names) => (names, false),
        };
        let mut named = HashSet::with_capacity(names.len());
        for name in names {
            named.insert(self.index_of(name).ok_or_else(|| Error::column_not_found(name))?);
        }
        let columns: IndexSet<_> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(index, _)| named.contains(index) == include)
            .map(|(_, column)| column.clone())
            .collect();
        debug!(
            "column filter kept {} of {} columns",
            columns.len(),
            self.columns.len()
        );
        Ok(Self {
            columns,
            row_count: self.row_count,
            file_attributes: self.file_attributes.clone(),
        })
    }

    /// Returns a copy of this metadata with `row_count` rows.
    pub fn with_row_count(&self, row_count: u64) -> Self {
        Self {
            row_count,
            ..self.clone()
        }
    }

    /// Returns a copy of this metadata with different file attributes.  Fails
    /// if a column name cannot be represented in the new encoding.
    pub fn with_file_attributes(&self, file_attributes: FileAttributes) -> Result<Self> {
        Self::new(self.columns().cloned(), self.row_count, file_attributes)
    }

    /// Returns a copy of this metadata that describes rows whose values were
    /// replaced by their value labels.  See [ColumnMetadata::labelled].
    pub fn labelled(&self) -> Result<Self> {
        Self::new(
            self.columns()
                .map(ColumnMetadata::labelled)
                .collect::<Result<Vec<_>>>()?,
            self.row_count,
            self.file_attributes.clone(),
        )
    }

    /// Returns one descriptor per column, in column order.
    pub fn schema_descriptor(&self) -> Vec<ColumnDescriptor> {
        self.columns().map(ColumnDescriptor::from).collect()
    }

    pub fn to_descriptor(&self) -> MetadataDescriptor {
        MetadataDescriptor::from(self)
    }

    pub fn from_descriptor(descriptor: MetadataDescriptor) -> Result<Self> {
        descriptor.try_into()
    }

    /// Returns this metadata as a plain nested mapping.
    pub fn to_mapping(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.to_descriptor())?)
    }

    /// Reconstructs metadata from a mapping produced by
    /// [Metadata::to_mapping].
    ///
    /// A mapping with the wrong shape or without a required field is an
    /// [Error::InvalidLayout].  A mapping with the right shape but invalid
    /// field values is an [Error::InvalidDataFormat].
    pub fn from_mapping(mapping: &serde_json::Value) -> Result<Self> {
        let descriptor = MetadataDescriptor::deserialize(mapping)
            .map_err(|error| LayoutError::MalformedMapping(error.to_string()))?;
        Self::from_descriptor(descriptor)
    }

    /// Derives metadata from the values in `rows`.
    ///
    /// Columns appear in the order that they are first seen.  Each column's
    /// storage type is the common type of its non-null values, falling back
    /// to string if they differ and to numeric if there are none.  Columns
    /// whose name is blank are named as by [name_unnamed_columns].
    pub fn infer<'a, I>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let rows: Vec<&Record> = rows.into_iter().collect();
        let names = unnamed_column_names(rows.iter().copied());
        let mut inferences: IndexMap<&str, Inference> = IndexMap::new();
        for row in &rows {
            for (name, value) in row.iter() {
                inferences
                    .entry(name.as_str())
                    .or_default()
                    .add(value);
            }
        }
        let columns = inferences
            .into_iter()
            .map(|(name, inference)| {
                let name = names.get(name).map_or(name, String::as_str);
                ColumnMetadata::try_from(inference.into_column(name))
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            "inferred {} columns from {} rows",
            columns.len(),
            rows.len()
        );
        Self::new(columns, rows.len() as u64, FileAttributes::default())
    }
}

fn is_unnamed(name: &str) -> bool {
    name.trim().is_empty()
}

/// Maps each blank column name in `rows`, in the order first seen, to a
/// generated name `VAR001`, `VAR002`, and so on, skipping generated names
/// that are already in use.
fn unnamed_column_names<'a, I>(rows: I) -> IndexMap<String, String>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut used = HashSet::new();
    let mut unnamed = IndexSet::new();
    for row in rows {
        for name in row.keys() {
            if is_unnamed(name) {
                unnamed.insert(name.clone());
            } else {
                used.insert(UniCase::new(name.clone()));
            }
        }
    }

    let mut n = 0;
    unnamed
        .into_iter()
        .map(|name| loop {
            n += 1;
            let generated = format!("VAR{n:03}");
            if !used.contains(&UniCase::new(generated.clone())) {
                break (name, generated);
            }
        })
        .collect()
}

/// Renames blank column names in `rows` the same way [Metadata::infer] does.
pub fn name_unnamed_columns(rows: Vec<Record>) -> Vec<Record> {
    let names = unnamed_column_names(&rows);
    if names.is_empty() {
        return rows;
    }
    rows.into_iter()
        .map(|row| {
            row.into_iter()
                .map(|(name, value)| match names.get(&name) {
                    Some(generated) => (generated.clone(), value),
                    None => (name, value),
                })
                .collect()
        })
        .collect()
}

struct Inference {
    storage_type: Option<StorageType>,
    mixed: bool,
    integral: bool,
    width: usize,
}

impl Default for Inference {
    fn default() -> Self {
        Self {
            storage_type: None,
            mixed: false,
            integral: true,
            width: 1,
        }
    }
}

impl Inference {
    fn add(&mut self, value: &Value) {
        let Some(storage_type) = value.storage_type() else {
            return;
        };
        self.storage_type = match self.storage_type {
            None => Some(storage_type),
            Some(previous) if previous == storage_type => Some(previous),
            Some(StorageType::Date | StorageType::DateTime)
                if matches!(storage_type, StorageType::Date | StorageType::DateTime) =>
            {
                Some(StorageType::DateTime)
            }
            Some(previous) => {
                self.mixed = true;
                Some(previous)
            }
        };
        let width = match value {
            Value::Number(number) => {
                if number.fract() != 0.0 {
                    self.integral = false;
                }
                number.to_string().len()
            }
            Value::String(s) => s.len(),
            other => other.to_string().len(),
        };
        self.width = self.width.max(width);
    }

    fn into_column(self, name: &str) -> UncheckedColumn {
        let storage_type = match self.storage_type {
            _ if self.mixed => StorageType::String,
            Some(storage_type) => storage_type,
            None => StorageType::Numeric,
        };
        let column = UncheckedColumn::new(name, storage_type);
        match storage_type {
            StorageType::Numeric if self.integral => column.with_display_format(Format::F8_0),
            StorageType::String => column.with_storage_width(self.width as u32),
            _ => column,
        }
    }
}
