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

//! Readers and writers for interchange formats.

use std::collections::HashSet;

use unicase::UniCase;

use crate::data::{Record, Value};

pub mod csv;
pub mod json;
pub mod xlsx;
pub mod yaml;
/// Turns the names in a header line into distinct column names.
///
/// A blank name becomes `VAR` followed by the column's 1-based position, as
/// in `VAR003`.  A name that repeats an earlier one, ignoring case, gets a
/// suffix `.1`, `.2`, and so on.  Generated names never collide with any
/// name in the header.
pub(crate) fn header_names<I, S>(header: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let header: Vec<String> = header.into_iter().map(Into::into).collect();
    let mut taken: HashSet<UniCase<String>> = header
        .iter()
        .filter(|name| !name.trim().is_empty())
        .map(|name| UniCase::new(name.clone()))
        .collect();
    let mut assigned = HashSet::new();
    header
        .into_iter()
        .enumerate()
        .map(|(index, name)| {
            let name = if name.trim().is_empty() {
                (index + 1..)
                    .map(|n| format!("VAR{n:03}"))
                    .find(|candidate| !taken.contains(&UniCase::new(candidate.clone())))
                    .unwrap_or_default()
            } else if assigned.contains(&UniCase::new(name.clone())) {
                (1..)
                    .map(|n| format!("{name}.{n}"))
                    .find(|candidate| !taken.contains(&UniCase::new(candidate.clone())))
                    .unwrap_or_default()
            } else {
                name
            };
            taken.insert(UniCase::new(name.clone()));
            assigned.insert(UniCase::new(name.clone()));
            name
        })
        .collect()
}

/// Rounds each number in `rows` to `precision` digits after the decimal
/// point.
pub fn round_numbers(rows: &mut [Record], precision: usize) {
    for value in rows.iter_mut().flat_map(|row| row.values_mut()) {
        if let Value::Number(number) = value
            && number.is_finite()
            && let Ok(rounded) = format!("{number:.precision$}").parse::<f64>()
        {
            *number = rounded;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        codec::{header_names, round_numbers},
        data::{Record, Value},
    };

    #[test]
    fn rounding() {
        let mut rows = vec![Record::from_iter([
            (String::from("x"), Value::Number(1.0 / 3.0)),
            (String::from("n"), Value::Number(7.0)),
            (String::from("s"), Value::from("0.123456")),
        ])];
        round_numbers(&mut rows, 3);
        assert_eq!(rows[0]["x"], Value::Number(0.333));
        assert_eq!(rows[0]["n"], Value::Number(7.0));
        assert_eq!(rows[0]["s"], Value::from("0.123456"));
    }

    #[test]
    fn distinct_header_names() {
        assert_eq!(header_names(["a", "b"]), ["a", "b"]);
        assert_eq!(header_names(["a", "A", "a", "b"]), ["a", "A.1", "a.2", "b"]);
        assert_eq!(header_names(["", "x", " "]), ["VAR001", "x", "VAR003"]);
        // Generated names step around names the header already uses.
        assert_eq!(
            header_names(["", "VAR001", "a", "a", "a.1"]),
            ["VAR002", "VAR001", "a", "a.2", "a.1"]
        );
    }
}
