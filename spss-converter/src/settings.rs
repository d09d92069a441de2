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

//! Process-wide defaults for conversions.
//!
//! The defaults may be loaded from a TOML file such as:
//!
//! ```toml
//! layout = "table"
//!
//! [csv]
//! delimiter = ","
//! null_text = ""
//!
//! [json]
//! pretty = false
//!
//! [excel]
//! sheet = "Data"
//! start_row = 2
//! ```
//!
//! Keys that are omitted keep their built-in values.

use std::{fs, path::Path, sync::OnceLock};

use serde::{Deserialize, Serialize};

use crate::{
    codec::{csv::CsvOptions, json::JsonOptions, xlsx::ExcelOptions, yaml::YamlOptions},
    error::{Context, Result},
    layout::Layout,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Options for delimited text.
    pub csv: CsvOptions,

    /// Options for JSON output.
    pub json: JsonOptions,

    /// Options for YAML output.
    pub yaml: YamlOptions,

    /// Options for spreadsheet output.
    pub excel: ExcelOptions,

    /// Layout for JSON and YAML.
    pub layout: Layout,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            csv: CsvOptions::default(),
            json: JsonOptions::default(),
            yaml: YamlOptions::default(),
            excel: ExcelOptions::default(),
            layout: Layout::default(),
        }
    }
}

static GLOBAL: OnceLock<Settings> = OnceLock::new();

impl Settings {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads settings from the TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_context(|| path.display().to_string())?;
        Self::from_toml(&text).with_context(|| path.display().to_string())
    }

    /// Returns the process-wide settings, which are the defaults unless
    /// [Settings::init] was called first.
    pub fn global() -> &'static Settings {
        GLOBAL.get_or_init(Settings::default)
    }

    /// Makes `self` the process-wide settings.  Fails, returning `self`, if
    /// they were already set or already used.
    pub fn init(self) -> Result<(), Self> {
        GLOBAL.set(self)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        codec::{
            csv::{CsvOptions, LineTerminator},
            xlsx::ExcelOptions,
        },
        layout::Layout,
        settings::Settings,
    };

    #[test]
    fn defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.csv.delimiter, '|');
        assert_eq!(settings.csv.null_text, "NaN");
        assert_eq!(settings.json.precision, Some(10));
        assert_eq!(settings.layout, Layout::Records);
    }

    #[test]
    fn partial() {
        let settings = Settings::from_toml(
            r#"
layout = "table"

[csv]
delimiter = ","
line_terminator = "lf"

[excel]
sheet = "Data"
start_column = 1
"#,
        )
        .unwrap();
        assert_eq!(settings.layout, Layout::Table);
        assert_eq!(
            settings.csv,
            CsvOptions::default()
                .with_delimiter(',')
                .with_line_terminator(LineTerminator::Lf)
        );
        assert_eq!(
            settings.excel,
            ExcelOptions::default().with_sheet("Data").with_start(0, 1)
        );
        assert_eq!(settings.yaml.precision, Some(10));
    }

    #[test]
    fn invalid() {
        let error = Settings::from_toml("layout = \"split\"").unwrap_err();
        assert!(error.to_string().starts_with("Configuration error"));
    }
}
