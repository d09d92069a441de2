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

//! YAML text.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Options for writing YAML.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YamlOptions {
    /// Round numbers in the data to this many digits after the decimal point.
    pub precision: Option<usize>,
}

impl Default for YamlOptions {
    fn default() -> Self {
        Self {
            precision: Some(10),
        }
    }
}

impl YamlOptions {
    pub fn with_precision(self, precision: Option<usize>) -> Self {
        Self { precision }
    }
}

pub fn to_string<T>(value: &T) -> Result<String>
where
    T: Serialize + ?Sized,
{
    Ok(serde_yaml::to_string(value)?)
}

/// Parses YAML text into the same generic tree that
/// [json::parse](super::json::parse) produces, so that both go through the
/// same layout code.
pub fn parse(text: &str) -> Result<serde_json::Value> {
    Ok(serde_yaml::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::codec::yaml::{parse, to_string};

    #[test]
    fn records() {
        let value = json!([{"id": 1, "name": "Ann", "score": null}]);
        let text = to_string(&value).unwrap();
        assert_eq!(text, "- id: 1\n  name: Ann\n  score: null\n");
        assert_eq!(parse(&text).unwrap(), value);
    }
}
