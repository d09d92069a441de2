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

//! Delimited text.

use std::{borrow::Cow, io::Write, iter::repeat};

use ::csv::{ReaderBuilder, Terminator, Writer, WriterBuilder};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    codec::header_names,
    data::{Record, Value},
    error::{Error, Result},
};

/// How lines end in delimited output.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineTerminator {
    /// `\r\n`.
    #[default]
    Crlf,

    /// `\n`.
    Lf,
}

/// Options for reading and writing delimited text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// Whether the first line holds column names.
    pub include_header: bool,

    /// Field separator.
    pub delimiter: char,

    /// Character used to quote fields that contain the delimiter.
    pub quote: char,

    /// Character that escapes a quote inside a quoted field.  If this is the
    /// same as `quote`, quotes are escaped by doubling them.
    pub escape: char,

    /// Text that stands for a null value.  Empty fields are also null.
    pub null_text: String,

    pub line_terminator: LineTerminator,

    /// Decimal point in numbers.
    pub decimal: char,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            include_header: true,
            delimiter: '|',
            quote: '\'',
            escape: '\\',
            null_text: String::from("NaN"),
            line_terminator: LineTerminator::default(),
            decimal: '.',
        }
    }
}

fn ascii(option: &'static str, value: char) -> Result<u8> {
    if value.is_ascii() {
        Ok(value as u8)
    } else {
        Err(Error::CsvOption { option, value })
    }
}

impl CsvOptions {
    pub fn with_delimiter(self, delimiter: char) -> Self {
        Self { delimiter, ..self }
    }

    pub fn with_null_text(self, null_text: impl Into<String>) -> Self {
        Self {
            null_text: null_text.into(),
            ..self
        }
    }

    pub fn with_header(self, include_header: bool) -> Self {
        Self {
            include_header,
            ..self
        }
    }

    pub fn with_quote(self, quote: char) -> Self {
        Self { quote, ..self }
    }

    pub fn with_escape(self, escape: char) -> Self {
        Self { escape, ..self }
    }

    pub fn with_line_terminator(self, line_terminator: LineTerminator) -> Self {
        Self {
            line_terminator,
            ..self
        }
    }

    pub fn with_decimal(self, decimal: char) -> Self {
        Self { decimal, ..self }
    }

    fn writer<W>(&self, output: W) -> Result<Writer<W>>
    where
        W: Write,
    {
        let quote = ascii("quote", self.quote)?;
        let escape = ascii("escape", self.escape)?;
        Ok(WriterBuilder::new()
            .delimiter(ascii("delimiter", self.delimiter)?)
            .quote(quote)
            .double_quote(quote == escape)
            .escape(escape)
            .terminator(match self.line_terminator {
                LineTerminator::Crlf => Terminator::CRLF,
                LineTerminator::Lf => Terminator::Any(b'\n'),
            })
            .from_writer(output))
    }

    fn format_field<'a>(&'a self, value: &'a Value) -> Cow<'a, str> {
        match value {
            Value::Null => Cow::from(self.null_text.as_str()),
            Value::Number(number) if number.is_nan() => Cow::from(self.null_text.as_str()),
            Value::Number(number) => {
                let s = number.to_string();
                if self.decimal != '.' {
                    Cow::from(s.replace('.', self.decimal.encode_utf8(&mut [0; 4])))
                } else {
                    Cow::from(s)
                }
            }
            Value::String(s) => Cow::from(s.as_str()),
            other => Cow::from(other.to_string()),
        }
    }

    fn parse_field(&self, field: &str) -> Value {
        if field.is_empty() || field == self.null_text {
            return Value::Null;
        }
        let number = if self.decimal != '.' {
            Cow::from(field.trim().replace(self.decimal, "."))
        } else {
            Cow::from(field.trim())
        };
        match number.parse::<f64>() {
            Ok(number) if number.is_finite() => Value::Number(number),
            _ => Value::String(field.into()),
        }
    }
}

/// Writes `rows` as delimited text with one field per name in `columns`.  A
/// row without a value for some column gets a null there.
pub fn write<W>(rows: &[Record], columns: &[&str], options: &CsvOptions, output: W) -> Result<()>
where
    W: Write,
{
    let mut writer = options.writer(output)?;
    if options.include_header {
        writer.write_record(columns)?;
    }
    for row in rows {
        for name in columns {
            let value = row.get(*name).unwrap_or(&Value::Null);
            writer.write_field(options.format_field(value).as_bytes())?;
        }
        writer.write_record(None::<&[u8]>)?;
    }
    writer.flush()?;
    Ok(())
}

/// Returns `rows` as delimited text.
pub fn to_string(rows: &[Record], columns: &[&str], options: &CsvOptions) -> Result<String> {
    let mut output = Vec::new();
    write(rows, columns, options, &mut output)?;
    String::from_utf8(output).map_err(|error| {
        Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, error))
    })
}

/// Parses delimited text into rows.  Fields that are empty or equal to the
/// null text become [Value::Null], fields that parse as finite numbers become
/// [Value::Number], and everything else is a string.
///
/// Without a header line, columns are named `VAR001`, `VAR002`, and so on.
/// Blank header names become `VAR` plus the column position, and repeated ones
/// get a suffix such as `.1`.
pub fn read(input: &[u8], options: &CsvOptions) -> Result<Vec<Record>> {
    let quote = ascii("quote", options.quote)?;
    let escape = ascii("escape", options.escape)?;
    let mut reader = ReaderBuilder::new()
        .delimiter(ascii("delimiter", options.delimiter)?)
        .quote(quote)
        .double_quote(quote == escape)
        .escape((quote != escape).then_some(escape))
        .has_headers(options.include_header)
        .terminator(Terminator::CRLF)
        .from_reader(input);

    let header: Vec<String> = if options.include_header {
        reader.headers()?.iter().map(String::from).collect()
    } else {
        Vec::new()
    };
    let mut names = header_names(header.iter().map(String::as_str));

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            warn!("skipping empty CSV record {}", index + 1);
            continue;
        }
        if record.len() > names.len() {
            names = header_names(
                header
                    .iter()
                    .map(String::as_str)
                    .chain(repeat(""))
                    .take(record.len()),
            );
        }
        let row: Record = names
            .iter()
            .cloned()
            .zip(record.iter().map(|field| options.parse_field(field)))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}
