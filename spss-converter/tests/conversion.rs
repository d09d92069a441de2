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

use std::{fmt::Display, fs, io::Write};

use serde_json::json;
use spss_converter::{
    Error, Result,
    backend::{BackendOptions, RawFile, Source, SystemFileBackend},
    codec::{csv::CsvOptions, json::JsonOptions, xlsx::ExcelOptions, yaml::YamlOptions},
    data::Record,
    dictionary::{ColumnFilter, FileAttributes, Metadata},
    layout::Layout,
    read::ReadOptions,
    variable::{StorageType, UncheckedColumn},
    write::WriteOptions,
};
use tempfile::tempdir;

/// Stores a [RawFile] as JSON in place of the binary system file format.
struct JsonBackend;

impl SystemFileBackend for JsonBackend {
    fn read(&self, source: &Source, options: &BackendOptions) -> Result<RawFile> {
        let mut file: RawFile = serde_json::from_reader(source.open()?)?;
        file.rows = if options.metadata_only {
            Vec::new()
        } else {
            file.rows
                .into_iter()
                .skip(options.offset)
                .take(options.limit.unwrap_or(usize::MAX))
                .collect()
        };
        Ok(file)
    }

    fn write(&self, file: &RawFile, output: &mut dyn Write) -> Result<()> {
        serde_json::to_writer(output, file)?;
        Ok(())
    }
}

#[track_caller]
fn assert_lines_eq<E, A>(expected: &str, expected_name: E, actual: &str, actual_name: A)
where
    E: Display,
    A: Display,
{
    if expected != actual {
        eprintln!("Unexpected output:\n--- {expected_name}\n+++ {actual_name}");
        for result in diff::lines(expected, actual) {
            let (prefix, line) = match result {
                diff::Result::Left(line) => ('-', line),
                diff::Result::Both(line, _) => (' ', line),
                diff::Result::Right(line) => ('+', line),
            };
            eprintln!("{prefix}{line}");
        }
        panic!();
    }
}

fn survey() -> Metadata {
    Metadata::new(
        [
            UncheckedColumn::new("id", StorageType::Numeric)
                .try_into()
                .unwrap(),
            UncheckedColumn::new("gender", StorageType::Numeric)
                .with_label("Respondent gender")
                .with_value_label(1, "Male")
                .with_value_label(2, "Female")
                .with_missing_value(9)
                .try_into()
                .unwrap(),
            UncheckedColumn::new("age", StorageType::Numeric)
                .with_missing_range(Some(998.0), None)
                .try_into()
                .unwrap(),
        ],
        0,
        FileAttributes::default(),
    )
    .unwrap()
}

#[test]
fn csv_through_system_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("survey.sav");
    let result = WriteOptions::new()
        .with_metadata(Some(survey()))
        .from_csv(
            JsonBackend,
            b"id|gender|age\r\n1|1|30\r\n2|9|999\r\n3|3|41\r\n4|2|NaN\r\n",
            &CsvOptions::default(),
            Some(&path),
        )
        .unwrap();
    assert_eq!(result, None);

    let source = Source::Path(&path);
    assert_eq!(
        ReadOptions::new().get_metadata(JsonBackend, source).unwrap(),
        survey().with_row_count(4)
    );

    let csv = ReadOptions::new()
        .with_apply_labels(true)
        .to_csv(JsonBackend, source, None, &CsvOptions::default())
        .unwrap()
        .unwrap();
    assert_lines_eq(
        "id|gender|age\r\n1|Male|30\r\n2|NaN|NaN\r\n3|3|41\r\n4|Female|NaN\r\n",
        "expected",
        &csv,
        "actual",
    );

    let csv = ReadOptions::new()
        .with_missing_as_null(false)
        .with_offset(1)
        .with_limit(Some(2))
        .with_columns(ColumnFilter::Exclude(vec![String::from("id")]))
        .to_csv(
            JsonBackend,
            source,
            None,
            &CsvOptions::default().with_delimiter(','),
        )
        .unwrap()
        .unwrap();
    assert_lines_eq("gender,age\r\n9,999\r\n3,41\r\n", "expected", &csv, "actual");
}

#[test]
fn table_through_system_file() {
    let metadata = survey();
    let table = json!({
        "schema": metadata.schema_descriptor(),
        "data": [
            {"id": 1, "gender": 2, "age": 25},
            {"id": 2, "gender": null, "age": 998},
        ]
    });
    let bytes = WriteOptions::new()
        .from_json(JsonBackend, &table.to_string(), Layout::Table, None)
        .unwrap()
        .unwrap();

    let text = ReadOptions::new()
        .with_missing_as_null(false)
        .to_json(
            JsonBackend,
            Source::Bytes(&bytes),
            None,
            Layout::Table,
            &JsonOptions::default(),
        )
        .unwrap()
        .unwrap();
    let round_trip: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(round_trip, table);

    let records = ReadOptions::new()
        .to_dict(JsonBackend, Source::Bytes(&bytes), Layout::Records)
        .unwrap();
    assert_eq!(
        serde_json::to_value(&records).unwrap(),
        json!([
            {"id": 1, "gender": 2, "age": 25},
            {"id": 2, "gender": null, "age": null},
        ])
    );
}

#[test]
fn yaml_records() {
    let yaml = "- name: Ann\n  score: 1.5\n- name: Bo\n  score: null\n";
    let bytes = WriteOptions::new()
        .from_yaml(JsonBackend, yaml, Layout::Records, None)
        .unwrap()
        .unwrap();
    let metadata = ReadOptions::new()
        .get_metadata(JsonBackend, Source::Bytes(&bytes))
        .unwrap();
    assert_eq!(metadata.column("name").unwrap().storage_type(), StorageType::String);
    assert_eq!(metadata.column("SCORE").unwrap().storage_type(), StorageType::Numeric);

    let text = ReadOptions::new()
        .to_yaml(
            JsonBackend,
            Source::Bytes(&bytes),
            None,
            Layout::Records,
            &YamlOptions::default(),
        )
        .unwrap()
        .unwrap();
    assert_lines_eq(yaml, "expected", &text, "actual");
}

#[test]
fn spreadsheet_through_system_file() {
    let rows: Vec<Record> = serde_json::from_value(json!([
        {"id": 1, "gender": 1, "age": 30},
        {"id": 2, "gender": 2, "age": null},
    ]))
    .unwrap();
    let bytes = WriteOptions::new()
        .with_metadata(Some(survey()))
        .from_records(JsonBackend, rows.clone(), None)
        .unwrap()
        .unwrap();
    let workbook = ReadOptions::new()
        .to_excel(
            JsonBackend,
            Source::Bytes(&bytes),
            None,
            &ExcelOptions::default().with_sheet("Survey"),
        )
        .unwrap()
        .unwrap();

    let bytes = WriteOptions::new()
        .with_metadata(Some(survey()))
        .from_excel(JsonBackend, &workbook, Some("Survey"), None)
        .unwrap()
        .unwrap();
    let dataset = ReadOptions::new()
        .open(JsonBackend, Source::Bytes(&bytes))
        .unwrap();
    assert_eq!(dataset.rows, rows);
    assert_eq!(dataset.metadata, survey().with_row_count(2));
}

#[test]
fn column_filters() {
    let rows: Vec<Record> = serde_json::from_value(json!([{"id": 1, "gender": 1, "age": 30}])).unwrap();
    let bytes = WriteOptions::new()
        .with_metadata(Some(survey()))
        .from_records(JsonBackend, rows, None)
        .unwrap()
        .unwrap();
    let source = Source::Bytes(&bytes);

    let error = ReadOptions::new()
        .with_columns(ColumnFilter::Include(vec![
            String::from("age"),
            String::from("weight"),
        ]))
        .open(JsonBackend, source)
        .unwrap_err();
    assert!(matches!(error, Error::ColumnNameNotFound { name } if name == "weight"));

    let dataset = ReadOptions::new()
        .with_columns(ColumnFilter::Include(vec![
            String::from("age"),
            String::from("id"),
        ]))
        .open(JsonBackend, source)
        .unwrap();
    assert_eq!(dataset.column_names(), ["id", "age"]);

    assert!(matches!(
        ColumnFilter::new(Some(vec![String::from("id")]), Some(vec![String::from("age")])),
        Err(Error::ConflictingColumnFilters)
    ));
}

#[test]
fn bad_input_leaves_target_alone() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.sav");
    fs::write(&path, b"original").unwrap();

    let error = WriteOptions::new()
        .from_json(
            JsonBackend,
            r#"{"schema": [{"name": "x", "storage_type": "numeric"}], "data": [{"y": 1}]}"#,
            Layout::Table,
            Some(&path),
        )
        .unwrap_err();
    assert!(error.is_invalid_layout());

    let error = WriteOptions::new()
        .from_json(JsonBackend, r#"{"x": 1}"#, Layout::Records, Some(&path))
        .unwrap_err();
    assert!(error.is_invalid_layout());

    assert_eq!(fs::read(&path).unwrap(), b"original");
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}
