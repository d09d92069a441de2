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

//! Plain nested-mapping form of metadata.
//!
//! The types in this module mirror [Metadata] and [ColumnMetadata] field for
//! field, but with every field in its textual form and without any
//! validation.  They are what appears in the `schema` of a table layout, what
//! [Metadata::to_mapping] produces, and what a
//! [SystemFileBackend](crate::backend::SystemFileBackend) exchanges with this
//! crate.
//!
//! Converting a descriptor into the validated type reports bad field values
//! as [Error::InvalidDataFormat].

use chrono::NaiveDateTime;
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

use crate::{
    data::Value,
    dictionary::{Compression, FileAttributes, Metadata},
    error::{DataFormatError, Error},
    format::Format,
    variable::{
        Alignment, ColumnMetadata, Measure, StorageType, UncheckedColumn, UncheckedMissing,
    },
};

/// One value label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueLabelDescriptor {
    pub value: Value,
    pub label: String,
}

/// Unvalidated form of [ColumnMetadata].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,

    #[serde(default)]
    pub label: Option<String>,

    pub storage_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_width: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_width: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measure: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub value_labels: Vec<ValueLabelDescriptor>,

    /// Discrete missing values and `{low, high}` ranges, where a null bound
    /// is open.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_ranges: Vec<UncheckedMissing>,
}

impl ColumnDescriptor {
    /// Returns a descriptor with just a name and storage type.
    pub fn new(name: impl Into<String>, storage_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            storage_type: storage_type.into(),
            display_format: None,
            display_width: None,
            storage_width: None,
            alignment: None,
            measure: None,
            value_labels: Vec::new(),
            missing_ranges: Vec::new(),
        }
    }
}

impl From<&ColumnMetadata> for ColumnDescriptor {
    fn from(column: &ColumnMetadata) -> Self {
        Self {
            name: column.name().to_string(),
            label: column.label().map(String::from),
            storage_type: column.storage_type().to_string(),
            display_format: Some(column.display_format().to_string()),
            display_width: Some(column.display_width()),
            storage_width: Some(column.storage_width()),
            alignment: Some(column.alignment().as_str().into()),
            measure: column.measure().map(|measure| measure.as_str().into()),
            value_labels: column
                .value_labels()
                .iter()
                .map(|(datum, label)| ValueLabelDescriptor {
                    value: datum.into(),
                    label: label.into(),
                })
                .collect(),
            missing_ranges: column
                .missing_values()
                .iter()
                .map(UncheckedMissing::from)
                .collect(),
        }
    }
}

impl TryFrom<ColumnDescriptor> for UncheckedColumn {
    type Error = DataFormatError;

    fn try_from(source: ColumnDescriptor) -> Result<Self, Self::Error> {
        Ok(UncheckedColumn {
            storage_type: source.storage_type.parse::<StorageType>()?,
            display_format: source
                .display_format
                .as_deref()
                .map(str::parse::<Format>)
                .transpose()?,
            alignment: source
                .alignment
                .as_deref()
                .map(str::parse::<Alignment>)
                .transpose()?,
            measure: source
                .measure
                .as_deref()
                .map(str::parse::<Measure>)
                .transpose()?,
            name: source.name,
            label: source.label,
            display_width: source.display_width,
            storage_width: source.storage_width,
            value_labels: source
                .value_labels
                .into_iter()
                .map(|ValueLabelDescriptor { value, label }| (value, label))
                .collect(),
            missing: source.missing_ranges,
        })
    }
}

impl TryFrom<ColumnDescriptor> for ColumnMetadata {
    type Error = DataFormatError;

    fn try_from(source: ColumnDescriptor) -> Result<Self, Self::Error> {
        UncheckedColumn::try_from(source)?.try_into()
    }
}

/// Unvalidated form of [FileAttributes].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FileAttributesDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression: Option<Compression>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation: Option<NaiveDateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl From<&FileAttributes> for FileAttributesDescriptor {
    fn from(source: &FileAttributes) -> Self {
        Self {
            encoding: Some(source.encoding.name().into()),
            compression: source.compression,
            creation: source.creation,
            file_label: source.file_label.clone(),
            table_name: source.table_name.clone(),
            notes: source.notes.clone(),
        }
    }
}

impl TryFrom<FileAttributesDescriptor> for FileAttributes {
    type Error = DataFormatError;

    fn try_from(source: FileAttributesDescriptor) -> Result<Self, Self::Error> {
        let encoding = match source.encoding {
            Some(label) => Encoding::for_label_no_replacement(label.as_bytes())
                .ok_or(DataFormatError::UnknownEncoding(label))?,
            None => FileAttributes::default().encoding,
        };
        Ok(Self {
            encoding,
            compression: source.compression,
            creation: source.creation,
            file_label: source.file_label,
            table_name: source.table_name,
            notes: source.notes,
        })
    }
}

/// Unvalidated form of [Metadata].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetadataDescriptor {
    pub columns: Vec<ColumnDescriptor>,

    #[serde(default)]
    pub row_count: u64,

    #[serde(default)]
    pub file_attributes: FileAttributesDescriptor,
}

impl From<&Metadata> for MetadataDescriptor {
    fn from(metadata: &Metadata) -> Self {
        Self {
            columns: metadata.schema_descriptor(),
            row_count: metadata.row_count(),
            file_attributes: metadata.file_attributes().into(),
        }
    }
}

impl TryFrom<MetadataDescriptor> for Metadata {
    type Error = Error;

    fn try_from(source: MetadataDescriptor) -> Result<Self, Self::Error> {
        let columns = source
            .columns
            .into_iter()
            .map(ColumnMetadata::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Metadata::new(columns, source.row_count, source.file_attributes.try_into()?)
    }
}
