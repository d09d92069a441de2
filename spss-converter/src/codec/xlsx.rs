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

//! Spreadsheets in Office Open XML (`.xlsx`) format.
//!
//! Only a single worksheet is supported.  Its first row holds column names
//! and each later row is one record.  Numbers are written as numeric cells
//! and everything else, including dates, as inline strings.  Output may start
//! at any cell and may omit the row of names.

use std::{
    borrow::Cow,
    io::{Cursor, Read, Seek, Write},
};

use log::warn;
use quick_xml::{DeError, de::from_str, events::BytesText, writer::Writer as XmlWriter};
use serde::{Deserialize, Serialize};
use zip::{ZipArchive, ZipWriter, result::ZipError, write::SimpleFileOptions};

use crate::{
    codec::header_names,
    data::{Record, Value},
    error::{Error, Result},
};

/// Number of columns in a worksheet.
const MAX_COLUMNS: usize = 16_384;

/// Number of rows in a worksheet.
const MAX_ROWS: usize = 1_048_576;

const XML_DECLARATION: &[u8] =
    b"<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n";

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PACKAGE_RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships";

/// Returns the spreadsheet name of the 0-based column `index`: `A`, `B`, ...,
/// `Z`, `AA`, `AB`, ...
fn column_name(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(char::from(b'A' + (index % 26) as u8));
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.into_iter().rev().collect()
}

/// Returns the 0-based column index of a cell reference such as `AB12`, or
/// `None` if `reference` does not start with a column name.
fn column_index(reference: &str) -> Result<Option<usize>> {
    let mut index: Option<usize> = None;
    for c in reference.bytes().take_while(u8::is_ascii_alphabetic) {
        let digit = (c.to_ascii_uppercase() - b'A') as usize + 1;
        index = index
            .unwrap_or(0)
            .checked_mul(26)
            .and_then(|n| n.checked_add(digit))
            .filter(|n| *n <= MAX_COLUMNS);
        if index.is_none() {
            return Err(Error::OutsideWorksheet(format!("Cell {reference}")));
        }
    }
    Ok(index.map(|n| n - 1))
}

/// How to lay out spreadsheet output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExcelOptions {
    /// Name of the worksheet.
    pub sheet: String,

    /// 0-based row of the first row of output.
    pub start_row: usize,

    /// 0-based column of the first column of output.
    pub start_column: usize,

    /// Text written for a null value.  If it is empty, null cells are left
    /// blank.
    pub null_text: String,

    /// Whether the first row of output holds column names.
    pub include_header: bool,
}

impl Default for ExcelOptions {
    fn default() -> Self {
        Self {
            sheet: String::from("Sheet1"),
            start_row: 0,
            start_column: 0,
            null_text: String::new(),
            include_header: true,
        }
    }
}

impl ExcelOptions {
    pub fn with_sheet(self, sheet: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
            ..self
        }
    }

    pub fn with_start(self, start_row: usize, start_column: usize) -> Self {
        Self {
            start_row,
            start_column,
            ..self
        }
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

    fn null_cell(&self) -> Option<Value> {
        (!self.null_text.is_empty()).then(|| Value::from(self.null_text.as_str()))
    }
}

fn write_part<W, F>(zip: &mut ZipWriter<W>, name: &str, content: F) -> Result<()>
where
    W: Write + Seek,
    F: FnOnce(&mut XmlWriter<&mut ZipWriter<W>>) -> std::io::Result<()>,
{
    zip.start_file(name, SimpleFileOptions::default())?;
    zip.write_all(XML_DECLARATION)?;
    content(&mut XmlWriter::new(&mut *zip))?;
    Ok(())
}

fn write_cell<X>(writer: &mut XmlWriter<X>, reference: &str, value: &Value) -> std::io::Result<()>
where
    X: Write,
{
    let text = match value {
        Value::Null => return Ok(()),
        Value::Number(number) if !number.is_finite() => return Ok(()),
        Value::Number(number) => {
            writer
                .create_element("c")
                .with_attribute(("r", reference))
                .write_inner_content(|w| {
                    w.create_element("v")
                        .write_text_content(BytesText::new(&number.to_string()))?;
                    Ok(())
                })?;
            return Ok(());
        }
        Value::String(s) => Cow::from(s.as_str()),
        other => Cow::from(other.to_string()),
    };
    writer
        .create_element("c")
        .with_attribute(("r", reference))
        .with_attribute(("t", "inlineStr"))
        .write_inner_content(|w| {
            w.create_element("is").write_inner_content(|w| {
                w.create_element("t")
                    .with_attribute(("xml:space", "preserve"))
                    .write_text_content(BytesText::new(&text))?;
                Ok(())
            })?;
            Ok(())
        })?;
    Ok(())
}

/// Writes `rows` to `output` as a workbook with one worksheet, with one
/// column per name in `columns`.
pub fn write<W>(rows: &[Record], columns: &[&str], options: &ExcelOptions, output: W) -> Result<W>
where
    W: Write + Seek,
{
    let first_data_row = options.start_row + usize::from(options.include_header);
    if options.start_column + columns.len() > MAX_COLUMNS {
        return Err(Error::OutsideWorksheet(format!(
            "Column {}",
            options.start_column + columns.len()
        )));
    }
    if first_data_row + rows.len() > MAX_ROWS {
        return Err(Error::OutsideWorksheet(format!(
            "Row {}",
            first_data_row + rows.len()
        )));
    }
    let null_cell = options.null_cell();

    let mut zip = ZipWriter::new(output);

    write_part(&mut zip, "[Content_Types].xml", |w| {
        w.create_element("Types")
            .with_attribute((
                "xmlns",
                "http://schemas.openxmlformats.org/package/2006/content-types",
            ))
            .write_inner_content(|w| {
                w.create_element("Default")
                    .with_attribute(("Extension", "rels"))
                    .with_attribute((
                        "ContentType",
                        "application/vnd.openxmlformats-package.relationships+xml",
                    ))
                    .write_empty()?;
                w.create_element("Default")
                    .with_attribute(("Extension", "xml"))
                    .with_attribute(("ContentType", "application/xml"))
                    .write_empty()?;
                w.create_element("Override")
                    .with_attribute(("PartName", "/xl/workbook.xml"))
                    .with_attribute((
                        "ContentType",
                        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml",
                    ))
                    .write_empty()?;
                w.create_element("Override")
                    .with_attribute(("PartName", "/xl/worksheets/sheet1.xml"))
                    .with_attribute((
                        "ContentType",
                        "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml",
                    ))
                    .write_empty()?;
                Ok(())
            })?;
        Ok(())
    })?;

    write_part(&mut zip, "_rels/.rels", |w| {
        w.create_element("Relationships")
            .with_attribute(("xmlns", PACKAGE_RELATIONSHIPS_NS))
            .write_inner_content(|w| {
                w.create_element("Relationship")
                    .with_attribute(("Id", "rId1"))
                    .with_attribute((
                        "Type",
                        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument",
                    ))
                    .with_attribute(("Target", "xl/workbook.xml"))
                    .write_empty()?;
                Ok(())
            })?;
        Ok(())
    })?;

    write_part(&mut zip, "xl/workbook.xml", |w| {
        w.create_element("workbook")
            .with_attribute(("xmlns", MAIN_NS))
            .with_attribute(("xmlns:r", RELATIONSHIPS_NS))
            .write_inner_content(|w| {
                w.create_element("sheets").write_inner_content(|w| {
                    w.create_element("sheet")
                        .with_attribute(("name", options.sheet.as_str()))
                        .with_attribute(("sheetId", "1"))
                        .with_attribute(("r:id", "rId1"))
                        .write_empty()?;
                    Ok(())
                })?;
                Ok(())
            })?;
        Ok(())
    })?;

    write_part(&mut zip, "xl/_rels/workbook.xml.rels", |w| {
        w.create_element("Relationships")
            .with_attribute(("xmlns", PACKAGE_RELATIONSHIPS_NS))
            .write_inner_content(|w| {
                w.create_element("Relationship")
                    .with_attribute(("Id", "rId1"))
                    .with_attribute((
                        "Type",
                        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet",
                    ))
                    .with_attribute(("Target", "worksheets/sheet1.xml"))
                    .write_empty()?;
                Ok(())
            })?;
        Ok(())
    })?;

    let column_names: Vec<String> = (0..columns.len())
        .map(|index| column_name(options.start_column + index))
        .collect();
    write_part(&mut zip, "xl/worksheets/sheet1.xml", |w| {
        w.create_element("worksheet")
            .with_attribute(("xmlns", MAIN_NS))
            .write_inner_content(|w| {
                w.create_element("sheetData").write_inner_content(|w| {
                    if options.include_header {
                        let r = (options.start_row + 1).to_string();
                        w.create_element("row")
                            .with_attribute(("r", r.as_str()))
                            .write_inner_content(|w| {
                                for (name, column) in columns.iter().zip(&column_names) {
                                    write_cell(w, &format!("{column}{r}"), &Value::from(*name))?;
                                }
                                Ok(())
                            })?;
                    }
                    for (index, row) in rows.iter().enumerate() {
                        let r = (first_data_row + index + 1).to_string();
                        w.create_element("row")
                            .with_attribute(("r", r.as_str()))
                            .write_inner_content(|w| {
                                for (name, column) in columns.iter().zip(&column_names) {
                                    let value = match row.get(*name) {
                                        Some(Value::Number(number)) if !number.is_finite() => None,
                                        Some(Value::Null) | None => None,
                                        Some(value) => Some(value),
                                    };
                                    if let Some(value) = value.or(null_cell.as_ref()) {
                                        write_cell(w, &format!("{column}{r}"), value)?;
                                    }
                                }
                                Ok(())
                            })?;
                    }
                    Ok(())
                })?;
                Ok(())
            })?;
        Ok(())
    })?;

    Ok(zip.finish()?)
}

/// Returns `rows` as the bytes of a workbook.
pub fn to_bytes(rows: &[Record], columns: &[&str], options: &ExcelOptions) -> Result<Vec<u8>> {
    Ok(write(rows, columns, options, Cursor::new(Vec::new()))?.into_inner())
}

#[derive(Deserialize)]
struct Workbook {
    sheets: Sheets,
}

#[derive(Deserialize)]
struct Sheets {
    #[serde(rename = "sheet", default)]
    entries: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct SheetEntry {
    #[serde(rename = "@name")]
    name: String,

    /// The `r:id` attribute.
    #[serde(rename = "@id", default)]
    id: Option<String>,
}

#[derive(Deserialize)]
struct Relationships {
    #[serde(rename = "Relationship", default)]
    entries: Vec<Relationship>,
}

#[derive(Deserialize)]
struct Relationship {
    #[serde(rename = "@Id")]
    id: String,

    #[serde(rename = "@Target")]
    target: String,
}

#[derive(Deserialize)]
struct SharedStrings {
    #[serde(rename = "si", default)]
    items: Vec<RichText>,
}

#[derive(Deserialize)]
struct Text {
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Deserialize)]
struct Run {
    t: Option<Text>,
}

/// Either plain text in `t` or a sequence of formatted runs in `r`.
#[derive(Deserialize)]
struct RichText {
    t: Option<Text>,

    #[serde(rename = "r", default)]
    runs: Vec<Run>,
}

impl RichText {
    fn into_string(self) -> String {
        let mut s = self.t.map(|t| t.value).unwrap_or_default();
        for run in self.runs {
            if let Some(t) = run.t {
                s.push_str(&t.value);
            }
        }
        s
    }
}

#[derive(Deserialize)]
struct Worksheet {
    #[serde(rename = "sheetData")]
    sheet_data: SheetData,
}

#[derive(Deserialize)]
struct SheetData {
    #[serde(rename = "row", default)]
    rows: Vec<Row>,
}

#[derive(Deserialize)]
struct Row {
    #[serde(rename = "c", default)]
    cells: Vec<Cell>,
}

#[derive(Deserialize)]
struct Cell {
    #[serde(rename = "@r", default)]
    reference: Option<String>,

    #[serde(rename = "@t", default)]
    type_: Option<String>,

    v: Option<String>,

    is: Option<RichText>,
}

impl Cell {
    fn into_value(self, shared_strings: &[String]) -> Result<Value> {
        let Some(v) = self.v else {
            return Ok(match self.is {
                Some(is) if self.type_.as_deref() == Some("inlineStr") => {
                    Value::String(is.into_string())
                }
                _ => Value::Null,
            });
        };
        Ok(match self.type_.as_deref() {
            Some("s") => {
                let string = v
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| shared_strings.get(index))
                    .ok_or_else(|| DeError::Custom(format!("invalid shared string index {v:?}")))?;
                Value::String(string.clone())
            }
            Some("str" | "d" | "inlineStr") => Value::String(v),
            Some("b") => Value::Number(if v.trim() == "1" { 1.0 } else { 0.0 }),
            Some("e") => Value::Null,
            _ => match v.trim().parse::<f64>() {
                Ok(number) => Value::from_f64(number),
                Err(_) => Value::String(v),
            },
        })
    }
}

fn read_part<R>(archive: &mut ZipArchive<R>, name: &str) -> Result<String>
where
    R: Read + Seek,
{
    let mut text = String::new();
    archive.by_name(name)?.read_to_string(&mut text)?;
    Ok(text)
}

/// Returns the archive path of the worksheet named `sheet`, or of the first
/// worksheet if `sheet` is `None`.
fn sheet_path<R>(archive: &mut ZipArchive<R>, sheet: Option<&str>) -> Result<String>
where
    R: Read + Seek,
{
    let workbook: Workbook = from_str(&read_part(archive, "xl/workbook.xml")?)?;
    let (index, entry) = match sheet {
        Some(name) => workbook
            .sheets
            .entries
            .iter()
            .enumerate()
            .find(|(_, entry)| entry.name == name)
            .ok_or_else(|| Error::SheetNotFound(name.into()))?,
        None => workbook
            .sheets
            .entries
            .iter()
            .enumerate()
            .next()
            .ok_or(Error::NoWorksheets)?,
    };
    if let Some(id) = &entry.id
        && let Ok(text) = read_part(archive, "xl/_rels/workbook.xml.rels")
    {
        let relationships: Relationships = from_str(&text)?;
        if let Some(relationship) = relationships.entries.iter().find(|r| &r.id == id) {
            return Ok(match relationship.target.strip_prefix('/') {
                Some(absolute) => absolute.into(),
                None => format!("xl/{}", relationship.target),
            });
        }
    }
    Ok(format!("xl/worksheets/sheet{}.xml", index + 1))
}

/// Returns the cells in `row` paired with their 0-based column indexes.
fn row_values(row: Row, shared_strings: &[String]) -> Result<Vec<(usize, Value)>> {
    let mut next = 0;
    row.cells
        .into_iter()
        .map(|cell| {
            let column = match cell.reference.as_deref() {
                Some(reference) => column_index(reference)?,
                None => None,
            }
            .unwrap_or(next);
            if column >= MAX_COLUMNS {
                return Err(Error::OutsideWorksheet(format!("Column {}", column + 1)));
            }
            next = column + 1;
            Ok((column, cell.into_value(shared_strings)?))
        })
        .collect()
}

/// Reads the rows of worksheet `sheet`, or of the first worksheet if `sheet`
/// is `None`, from the workbook in `input`.
///
/// Header cells that are empty name their column `VAR` followed by its
/// 1-based index, e.g. `VAR003`.  A header that repeats an earlier one gets a
/// suffix such as `.1`.
pub fn read(input: &[u8], sheet: Option<&str>) -> Result<Vec<Record>> {
    let mut archive = ZipArchive::new(Cursor::new(input))?;
    let path = sheet_path(&mut archive, sheet)?;
    let shared_strings: Vec<String> = match read_part(&mut archive, "xl/sharedStrings.xml") {
        Ok(text) => from_str::<SharedStrings>(&text)?
            .items
            .into_iter()
            .map(RichText::into_string)
            .collect(),
        Err(Error::Zip(ZipError::FileNotFound)) => Vec::new(),
        Err(error) => return Err(error),
    };
    let worksheet: Worksheet = from_str(&read_part(&mut archive, &path)?)?;

    let mut rows = worksheet.sheet_data.rows.into_iter();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let header = row_values(header, &shared_strings)?;
    let width = header.iter().map(|(column, _)| column + 1).max().unwrap_or(0);
    let mut header_text = vec![String::new(); width];
    for (column, value) in header {
        header_text[column] = match value {
            Value::Null => String::new(),
            Value::String(s) => s,
            other => other.to_string(),
        };
    }
    let names = header_names(header_text);

    let mut records = Vec::new();
    for (index, row) in rows.enumerate() {
        let values = row_values(row, &shared_strings)?;
        if values.iter().all(|(_, value)| value.is_null()) {
            warn!("skipping empty spreadsheet row {}", index + 2);
            continue;
        }
        let mut record: Record = names
            .iter()
            .map(|name| (name.clone(), Value::Null))
            .collect();
        for (column, value) in values {
            match names.get(column) {
                Some(name) => {
                    record.insert(name.clone(), value);
                }
                None => warn!(
                    "ignoring spreadsheet cell {}{} outside the header's columns",
                    column_name(column),
                    index + 2
                ),
            }
        }
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read, Write};

    use zip::{ZipArchive, ZipWriter, write::SimpleFileOptions};

    use crate::{
        codec::xlsx::{ExcelOptions, column_index, column_name, read, to_bytes},
        data::{Record, Value},
        error::Error,
    };

    #[test]
    fn column_names() {
        for (index, name) in [
            (0, "A"),
            (25, "Z"),
            (26, "AA"),
            (27, "AB"),
            (701, "ZZ"),
            (702, "AAA"),
            (16383, "XFD"),
        ] {
            assert_eq!(column_name(index), name);
            assert_eq!(column_index(&format!("{name}17")).unwrap(), Some(index));
        }
        assert_eq!(column_index("17").unwrap(), None);
        for reference in ["XFE1", "ZZZZZZZZZZZZZZ1"] {
            assert!(matches!(
                column_index(reference),
                Err(Error::OutsideWorksheet(_))
            ));
        }
    }

    fn sample() -> Vec<Record> {
        vec![
            Record::from_iter([
                (String::from("id"), Value::Number(1.0)),
                (String::from("name"), Value::from("Ann & <Bob>")),
                (String::from("score"), Value::Number(2.5)),
            ]),
            Record::from_iter([
                (String::from("id"), Value::Number(2.0)),
                (String::from("name"), Value::from("two words")),
                (String::from("score"), Value::Null),
            ]),
        ]
    }

    /// Builds a workbook from `parts`, each a file name and its contents.
    fn workbook(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in parts {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    fn worksheet_xml(bytes: &[u8]) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut text = String::new();
        archive
            .by_name("xl/worksheets/sheet1.xml")
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        text
    }

    const WORKBOOK: &str = r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheets><sheet name="Sheet1" sheetId="1"/></sheets></workbook>"#;

    #[test]
    fn write_and_read() {
        let rows = sample();
        let options = ExcelOptions::default().with_sheet("Data");
        let bytes = to_bytes(&rows, &["id", "name", "score"], &options).unwrap();
        assert_eq!(read(&bytes, None).unwrap(), rows);
        assert_eq!(read(&bytes, Some("Data")).unwrap(), rows);
        assert!(matches!(
            read(&bytes, Some("Other")),
            Err(Error::SheetNotFound(name)) if name == "Other"
        ));
    }

    #[test]
    fn start_cell() {
        let options = ExcelOptions::default().with_start(2, 1);
        let bytes = to_bytes(&sample(), &["id", "name", "score"], &options).unwrap();
        let xml = worksheet_xml(&bytes);
        assert!(xml.contains(r#"<row r="3"><c r="B3" t="inlineStr">"#), "{xml}");
        assert!(xml.contains(r#"<c r="B4"><v>1</v></c>"#), "{xml}");
        assert!(xml.contains(r#"<c r="D4"><v>2.5</v></c>"#), "{xml}");
        assert!(!xml.contains(r#"r="A"#), "{xml}");

        let rows = read(&bytes, None).unwrap();
        assert_eq!(rows[0].keys().collect::<Vec<_>>(), ["VAR001", "id", "name", "score"]);
        assert_eq!(rows[1]["name"], Value::from("two words"));
    }

    #[test]
    fn null_text() {
        let columns = ["id", "name", "score"];
        let bytes = to_bytes(&sample(), &columns, &ExcelOptions::default()).unwrap();
        assert!(!worksheet_xml(&bytes).contains("C3"));

        let options = ExcelOptions::default().with_null_text("NaN");
        let bytes = to_bytes(&sample(), &columns, &options).unwrap();
        let rows = read(&bytes, None).unwrap();
        assert_eq!(rows[1]["score"], Value::from("NaN"));
    }

    #[test]
    fn without_header() {
        let options = ExcelOptions::default().with_header(false);
        let bytes = to_bytes(&sample(), &["id", "name"], &options).unwrap();
        let xml = worksheet_xml(&bytes);
        assert!(!xml.contains(">id<"), "{xml}");
        assert!(xml.contains(r#"<row r="1"><c r="A1"><v>1</v></c>"#), "{xml}");
        assert!(xml.contains(r#"<row r="2"><c r="A2"><v>2</v></c>"#), "{xml}");
    }

    #[test]
    fn outside_worksheet() {
        let options = ExcelOptions::default().with_start(0, 16_383);
        assert!(matches!(
            to_bytes(&sample(), &["id", "name"], &options),
            Err(Error::OutsideWorksheet(_))
        ));

        let bytes = workbook(&[
            ("xl/workbook.xml", WORKBOOK),
            (
                "xl/worksheets/sheet1.xml",
                r#"<worksheet><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>a</t></is></c><c r="ZZZZZZZZZZZZZZ1"><v>1</v></c></row></sheetData></worksheet>"#,
            ),
        ]);
        assert!(matches!(read(&bytes, None), Err(Error::OutsideWorksheet(_))));
    }

    #[test]
    fn repeated_and_blank_headers() {
        let bytes = workbook(&[
            ("xl/workbook.xml", WORKBOOK),
            (
                "xl/worksheets/sheet1.xml",
                r#"<worksheet><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>a</t></is></c><c r="B1" t="inlineStr"><is><t>a</t></is></c><c r="C1" t="inlineStr"><is><t> </t></is></c><c r="E1" t="inlineStr"><is><t>b</t></is></c></row><row r="2"><c r="A2"><v>1</v></c><c r="B2"><v>2</v></c><c r="C2"><v>3</v></c><c r="D2"><v>4</v></c><c r="E2"><v>5</v></c></row></sheetData></worksheet>"#,
            ),
        ]);
        let rows = read(&bytes, None).unwrap();
        assert_eq!(
            rows[0],
            Record::from_iter([
                (String::from("a"), Value::Number(1.0)),
                (String::from("a.1"), Value::Number(2.0)),
                (String::from("VAR003"), Value::Number(3.0)),
                (String::from("VAR004"), Value::Number(4.0)),
                (String::from("b"), Value::Number(5.0)),
            ])
        );
    }

    /// Reads a worksheet laid out the way spreadsheet applications usually
    /// write them, with shared strings, rich text, and skipped cells.
    #[test]
    fn read_shared_strings() {
        let bytes = workbook(&[
            ("xl/workbook.xml", WORKBOOK),
            (
                "xl/sharedStrings.xml",
                r#"<sst count="3" uniqueCount="3"><si><t>city</t></si><si><t>n</t></si><si><r><rPr><b/></rPr><t>Ber</t></r><r><t>lin</t></r></si></sst>"#,
            ),
            (
                "xl/worksheets/sheet1.xml",
                r#"<worksheet><dimension ref="A1:C3"/><sheetData><row r="1"><c r="A1" t="s"><v>0</v></c><c r="C1" t="s"><v>1</v></c></row><row r="2"><c r="A2" t="s"><v>2</v></c><c r="C2"><v>12</v></c></row><row r="3"/><row r="4"><c r="B4" t="b"><v>1</v></c></row></sheetData></worksheet>"#,
            ),
        ]);

        let rows = read(&bytes, None).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].keys().collect::<Vec<_>>(),
            ["city", "VAR002", "n"]
        );
        assert_eq!(rows[0]["city"], Value::from("Berlin"));
        assert_eq!(rows[0]["VAR002"], Value::Null);
        assert_eq!(rows[0]["n"], Value::Number(12.0));
        assert_eq!(rows[1]["city"], Value::Null);
        assert_eq!(rows[1]["VAR002"], Value::Number(1.0));
    }
}
