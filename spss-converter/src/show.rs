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
    fs,
    io::{Write, stdout},
    path::PathBuf,
};

use anyhow::{Result, anyhow, bail};
use clap::{Args, ValueEnum};
use spss_converter::{
    codec::{json, yaml},
    dictionary::Metadata,
    layout::{Layout, from_layout},
    settings::Settings,
    util::write_atomically,
};

use crate::FileFormat;

/// Show the metadata in a table-layout document or a metadata file.
#[derive(Args, Clone, Debug)]
pub struct Show {
    /// JSON or YAML file to show.
    input: PathBuf,

    /// Output file name.  If omitted, output is written to stdout.
    output: Option<PathBuf>,

    /// Output format.
    #[arg(long, short = 'f')]
    format: Option<ShowFormat>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ShowFormat {
    /// Pretty-printed JSON.
    Json,

    /// YAML.
    Yaml,
}

/// Interprets `document` as a table with `schema` and `data`, if it has a
/// `schema` key, or otherwise as a metadata mapping.
fn metadata(document: serde_json::Value) -> Result<Metadata> {
    if document.get("schema").is_some() {
        let (_, metadata) = from_layout(document, Layout::Table)?;
        metadata.ok_or_else(|| anyhow!("table has no schema"))
    } else {
        Ok(Metadata::from_mapping(&document)?)
    }
}

impl Show {
    pub fn run(self) -> Result<()> {
        let format = if let Some(format) = self.format {
            format
        } else if let Some(output) = &self.output {
            match FileFormat::try_from(output.as_path()) {
                Ok(FileFormat::Yaml) => ShowFormat::Yaml,
                _ => ShowFormat::Json,
            }
        } else {
            ShowFormat::Json
        };

        let text = fs::read_to_string(&self.input)?;
        let document = match FileFormat::try_from(self.input.as_path())? {
            FileFormat::Json => json::parse(&text)?,
            FileFormat::Yaml => yaml::parse(&text)?,
            _ => bail!("{}: input must be JSON or YAML", self.input.display()),
        };
        let mapping = metadata(document)?.to_mapping()?;

        let mut text = match format {
            ShowFormat::Json => json::to_string(&mapping, &Settings::global().json)?,
            ShowFormat::Yaml => yaml::to_string(&mapping)?,
        };
        if !text.ends_with('\n') {
            text.push('\n');
        }
        match &self.output {
            Some(output) => write_atomically(output, text.as_bytes())?,
            None => stdout().write_all(text.as_bytes())?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::show::metadata;

    #[test]
    fn table_or_mapping() {
        let table = json!({
            "schema": [{"name": "x", "storage_type": "numeric"}],
            "data": [{"x": 1}, {"x": 2}]
        });
        let from_table = metadata(table).unwrap();
        assert_eq!(from_table.row_count(), 2);

        let mapping = from_table.to_mapping().unwrap();
        assert_eq!(metadata(mapping).unwrap(), from_table);

        assert!(metadata(json!({"rows": []})).is_err());
    }
}
