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

//! JSON text.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::Result;

/// Options for writing JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonOptions {
    /// Indent nested structures on separate lines.
    pub pretty: bool,

    /// Round numbers in the data to this many digits after the decimal point.
    pub precision: Option<usize>,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            precision: Some(10),
        }
    }
}

impl JsonOptions {
    pub fn with_pretty(self, pretty: bool) -> Self {
        Self { pretty, ..self }
    }

    pub fn with_precision(self, precision: Option<usize>) -> Self {
        Self { precision, ..self }
    }
}

/// Serializes `value` as JSON text.
///
/// This ignores [JsonOptions::precision], which callers apply to the data
/// alone with [round_numbers](super::round_numbers).
pub fn to_string<T>(value: &T, options: &JsonOptions) -> Result<String>
where
    T: Serialize + ?Sized,
{
    Ok(if options.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

/// Parses JSON text into a generic tree.
pub fn parse(text: &str) -> Result<JsonValue> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::codec::json::{JsonOptions, parse, to_string};

    #[test]
    fn compact() {
        let value = json!([{"x": 0.5, "n": 7, "s": "a"}]);
        let options = JsonOptions::default().with_pretty(false);
        assert_eq!(
            to_string(&value, &options).unwrap(),
            r#"[{"x":0.5,"n":7,"s":"a"}]"#
        );
    }

    #[test]
    fn pretty() {
        let text = to_string(&json!({"a": [1]}), &JsonOptions::default()).unwrap();
        assert_eq!(text, "{\n  \"a\": [\n    1\n  ]\n}");
        assert!(parse("{").unwrap_err().to_string().starts_with("JSON error"));
    }
}
