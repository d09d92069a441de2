/* PSPP - a program for statistical analysis.
 * Copyright (C) 2023 Free Software Foundation, Inc.
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see <http://www.gnu.org/licenses/>. */


use std::{
    borrow::Cow,
    fs,
    io::{Write, stdout},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use clap::Args;
use encoding_rs::Encoding;
use log::info;
use spss_converter::{
    codec::{
        csv::{self, CsvOptions},
        json, round_numbers,
        xlsx::{self, ExcelOptions},
        yaml,
    },
    data::Record,
    dictionary::{ColumnFilter, Metadata, name_unnamed_columns},
    layout::{Layout, check_columns, coerce_rows, from_layout, to_layout},
    settings::Settings,
    util::write_atomically,
    write::apply_metadata,
};

use crate::{FileFormat, parse_encoding};

/// Convert between delimited text, JSON, YAML, and spreadsheets.
#[derive(Args, Clone, Debug)]
pub struct Convert {
    /// Input file name.
    input: PathBuf,

    /// Output file name (if omitted, output is written to stdout).
    output: Option<PathBuf>,

    /// Format of the input file (if omitted, it is inferred from the file
    /// extension).
    #[arg(short = 'I')]
    input_format: Option<FileFormat>,

    /// Format for the output file (if omitted, it is inferred from the file
    /// extension, or CSV for stdout).
    #[arg(short = 'O')]
    output_format: Option<FileFormat>,

    /// Layout of JSON or YAML input.
    #[arg(long, value_enum)]
    input_layout: Option<Layout>,

    /// Layout of JSON or YAML output.
    #[arg(long, value_enum)]
    layout: Option<Layout>,

    /// The encoding of text input.
    #[arg(short = 'e', long, value_parser = parse_encoding)]
    encoding: Option<&'static Encoding>,

    /// JSON or YAML file with metadata for the input, as written by `show`.
    ///
    /// Without this, metadata comes from a table layout's schema or is
    /// inferred from the data.
    #[arg(long)]
    metadata: Option<PathBuf>,

    /// Columns to keep, separated by commas.
    #[arg(long, value_delimiter = ',', conflicts_with = "exclude")]
    include: Option<Vec<String>>,

    /// Columns to drop, separated by commas.
    #[arg(long, value_delimiter = ',')]
    exclude: Option<Vec<String>>,

    /// Write value labels instead of values.
    #[arg(long)]
    labels: bool,

    /// Maximum number of rows to write.
    #[arg(short = 'c', long = "cases")]
    max_cases: Option<usize>,

    /// Worksheet to read from spreadsheet input (by default, the first) or
    /// to name in spreadsheet output.
    #[arg(long)]
    sheet: Option<String>,

    /// 0-based row where spreadsheet output begins.
    #[arg(long)]
    start_row: Option<usize>,

    /// 0-based column where spreadsheet output begins.
    #[arg(long)]
    start_column: Option<usize>,

    #[command(flatten, next_help_heading = "Options for CSV and spreadsheets")]
    csv_options: CsvArgs,
}

#[derive(Args, Clone, Debug)]
struct CsvArgs {
    /// Omit column names from the first line of output, or do not expect them
    /// in the first line of input.
    #[arg(long)]
    no_var_names: bool,

    /// Field delimiter.
    #[arg(long)]
    delimiter: Option<char>,

    /// Character used to quote fields.
    #[arg(long)]
    qualifier: Option<char>,

    /// Text for missing values.
    #[arg(long)]
    null_text: Option<String>,

    /// Decimal point.
    #[arg(long)]
    decimal: Option<char>,
}

impl CsvArgs {
    fn apply(&self, mut options: CsvOptions) -> CsvOptions {
        if self.no_var_names {
            options = options.with_header(false);
        }
        if let Some(delimiter) = self.delimiter {
            options = options.with_delimiter(delimiter);
        }
        if let Some(qualifier) = self.qualifier {
            options = options.with_quote(qualifier);
        }
        if let Some(null_text) = &self.null_text {
            options = options.with_null_text(null_text.as_str());
        }
        if let Some(decimal) = self.decimal {
            options = options.with_decimal(decimal);
        }
        options
    }

    fn apply_excel(&self, mut options: ExcelOptions) -> ExcelOptions {
        if self.no_var_names {
            options = options.with_header(false);
        }
        if let Some(null_text) = &self.null_text {
            options = options.with_null_text(null_text.as_str());
        }
        options
    }
}

fn read_metadata(path: &Path) -> Result<Metadata> {
    let text = fs::read_to_string(path)?;
    let mapping = match FileFormat::try_from(path)? {
        FileFormat::Json => json::parse(&text)?,
        FileFormat::Yaml => yaml::parse(&text)?,
        _ => bail!("{}: metadata must be JSON or YAML", path.display()),
    };
    Ok(Metadata::from_mapping(&mapping)?)
}

fn emit(output: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match output {
        Some(path) => write_atomically(path, bytes)?,
        None => stdout().write_all(bytes)?,
    }
    Ok(())
}

impl Convert {
    fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        let encoding = self.encoding.unwrap_or(encoding_rs::UTF_8);
        encoding.decode_with_bom_removal(bytes).0
    }

    /// Reads the input file into rows and, for table layouts, metadata.
    fn read_input(&self, settings: &Settings) -> Result<(Vec<Record>, Option<Metadata>)> {
        let format = match self.input_format {
            Some(format) => format,
            None => self.input.as_path().try_into()?,
        };
        let bytes = fs::read(&self.input)?;
        Ok(match format {
            FileFormat::Csv => {
                let text = self.decode(&bytes);
                let options = self.csv_options.apply(settings.csv.clone());
                (csv::read(text.as_bytes(), &options)?, None)
            }
            FileFormat::Xlsx => (xlsx::read(&bytes, self.sheet.as_deref())?, None),
            FileFormat::Json | FileFormat::Yaml => {
                let text = self.decode(&bytes);
                let payload = if format == FileFormat::Json {
                    json::parse(&text)?
                } else {
                    yaml::parse(&text)?
                };
                from_layout(payload, self.input_layout.unwrap_or(settings.layout))?
            }
        })
    }

    pub fn run(self) -> Result<()> {
        let settings = Settings::global();
        let output_format = match self.output_format {
            Some(format) => format,
            None => match &self.output {
                Some(output) => output.as_path().try_into()?,
                None => FileFormat::Csv,
            },
        };

        let (rows, schema) = self
            .read_input(settings)
            .with_context(|| format!("{}", self.input.display()))?;
        let (rows, metadata) = match self.metadata.as_deref() {
            Some(path) => (
                rows,
                read_metadata(path).with_context(|| format!("{}", path.display()))?,
            ),
            None => match schema {
                Some(schema) => (rows, schema),
                None => {
                    let rows = name_unnamed_columns(rows);
                    let metadata = Metadata::infer(&rows)?;
                    (rows, metadata)
                }
            },
        };
        check_columns(&rows, &metadata)?;

        let filter = ColumnFilter::new(self.include.clone(), self.exclude.clone())?;
        let metadata = metadata.filtered(&filter)?;
        let rows: Vec<Record> = rows
            .into_iter()
            .take(self.max_cases.unwrap_or(usize::MAX))
            .collect();
        let rows = coerce_rows(rows, &metadata)?;
        let (mut rows, metadata) = if self.labels {
            let rows = apply_metadata(&rows, &metadata)?;
            let metadata = metadata.labelled()?;
            (coerce_rows(rows, &metadata)?, metadata)
        } else {
            (rows, metadata)
        };
        info!(
            "converting {} rows with {} columns to {output_format:?}",
            rows.len(),
            metadata.len()
        );

        let names: Vec<&str> = metadata.names().map(|name| name.as_str()).collect();
        let output = self.output.as_deref();
        match output_format {
            FileFormat::Csv => {
                let options = self.csv_options.apply(settings.csv.clone());
                emit(output, csv::to_string(&rows, &names, &options)?.as_bytes())?;
            }
            FileFormat::Json => {
                if let Some(precision) = settings.json.precision {
                    round_numbers(&mut rows, precision);
                }
                let payload = to_layout(rows, &metadata, self.layout.unwrap_or(settings.layout))?;
                emit(output, json::to_string(&payload, &settings.json)?.as_bytes())?;
            }
            FileFormat::Yaml => {
                if let Some(precision) = settings.yaml.precision {
                    round_numbers(&mut rows, precision);
                }
                let payload = to_layout(rows, &metadata, self.layout.unwrap_or(settings.layout))?;
                emit(output, yaml::to_string(&payload)?.as_bytes())?;
            }
            FileFormat::Xlsx => {
                let Some(output) = output else {
                    bail!("output file name must be specified for output to a spreadsheet")
                };
                let mut options = self.csv_options.apply_excel(settings.excel.clone());
                if let Some(sheet) = &self.sheet {
                    options = options.with_sheet(sheet.as_str());
                }
                let start_row = self.start_row.unwrap_or(options.start_row);
                let start_column = self.start_column.unwrap_or(options.start_column);
                let options = options.with_start(start_row, start_column);
                write_atomically(output, &xlsx::to_bytes(&rows, &names, &options)?)?;
            }
        }
        Ok(())
    }
}
