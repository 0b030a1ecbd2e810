// src/report.rs
//
// Minimal SpreadsheetML (XLSX) writer: one worksheet per table, a shared
// strings part, and plain numeric cells.

use crate::error::ReportError;
use indexmap::IndexSet;
use quick_xml::escape::escape;
use std::fmt::Write as _;
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Excel refuses sheet names longer than this.
const MAX_SHEET_NAME: usize = 31;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Int(i64),
    /// Written as no cell at all.
    Empty,
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Int(v)
    }
}

impl From<Option<i64>> for Cell {
    fn from(v: Option<i64>) -> Self {
        v.map_or(Cell::Empty, Cell::Int)
    }
}

/// A named table: header row plus data rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: &str, headers: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }
}

/// Write `sheets`, in order, as a single workbook at `path`.
pub fn write_report(path: &Path, sheets: &[Sheet]) -> Result<(), ReportError> {
    let bytes = workbook_bytes(sheets)?;
    fs::write(path, &bytes)?;
    info!(path = %path.display(), sheets = sheets.len(), bytes = bytes.len(), "Workbook written");
    Ok(())
}

/// Serialize the workbook in memory.
///
/// Entry timestamps are pinned, so identical sheets give identical bytes.
pub fn workbook_bytes(sheets: &[Sheet]) -> Result<Vec<u8>, ReportError> {
    let mut strings = SharedStrings::default();
    let worksheets: Vec<String> = sheets
        .iter()
        .map(|sheet| worksheet_xml(sheet, &mut strings))
        .collect();

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    let parts = [
        ("[Content_Types].xml", content_types_xml(sheets.len())),
        ("_rels/.rels", root_rels_xml()),
        ("xl/workbook.xml", workbook_xml(sheets)),
        ("xl/_rels/workbook.xml.rels", workbook_rels_xml(sheets.len())),
        ("xl/styles.xml", styles_xml()),
        ("xl/sharedStrings.xml", strings.to_xml()),
    ];
    for (name, body) in parts {
        zip.start_file(name, entry_options())?;
        zip.write_all(body.as_bytes())?;
    }

    for (idx, body) in worksheets.iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", idx + 1), entry_options())?;
        zip.write_all(body.as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
}

#[derive(Default)]
struct SharedStrings {
    table: IndexSet<String>,
    refs: usize,
}

impl SharedStrings {
    fn index_of(&mut self, s: &str) -> usize {
        self.refs += 1;
        match self.table.get_index_of(s) {
            Some(idx) => idx,
            None => self.table.insert_full(s.to_string()).0,
        }
    }

    fn to_xml(&self) -> String {
        let mut xml = format!(
            r#"{XML_DECL}<sst xmlns="{NS_MAIN}" count="{}" uniqueCount="{}">"#,
            self.refs,
            self.table.len()
        );
        for s in &self.table {
            let _ = write!(xml, r#"<si><t xml:space="preserve">{}</t></si>"#, xml_text(s));
        }
        xml.push_str("</sst>");
        xml
    }
}

fn worksheet_xml(sheet: &Sheet, strings: &mut SharedStrings) -> String {
    let mut xml = format!(r#"{XML_DECL}<worksheet xmlns="{NS_MAIN}"><sheetData>"#);

    let header: Vec<Cell> = sheet.headers.iter().map(|h| Cell::from(h.as_str())).collect();
    for (row_idx, row) in std::iter::once(&header).chain(&sheet.rows).enumerate() {
        let row_num = row_idx + 1;
        let _ = write!(xml, r#"<row r="{row_num}">"#);
        for (col_idx, cell) in row.iter().enumerate() {
            let reference = format!("{}{row_num}", column_name(col_idx));
            match cell {
                Cell::Text(s) => {
                    let idx = strings.index_of(s);
                    let _ = write!(xml, r#"<c r="{reference}" t="s"><v>{idx}</v></c>"#);
                }
                Cell::Int(v) => {
                    let _ = write!(xml, r#"<c r="{reference}"><v>{v}</v></c>"#);
                }
                Cell::Empty => {}
            }
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

fn workbook_xml(sheets: &[Sheet]) -> String {
    let mut xml = format!(r#"{XML_DECL}<workbook xmlns="{NS_MAIN}" xmlns:r="{NS_REL}"><sheets>"#);
    for (idx, sheet) in sheets.iter().enumerate() {
        let name: String = sheet.name.chars().take(MAX_SHEET_NAME).collect();
        let _ = write!(
            xml,
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            escape(name.as_str()),
            idx + 1,
            idx + 1
        );
    }
    xml.push_str("</sheets></workbook>");
    xml
}

fn workbook_rels_xml(sheet_count: usize) -> String {
    let mut xml = format!(r#"{XML_DECL}<Relationships xmlns="{NS_PKG_REL}">"#);
    for idx in 1..=sheet_count {
        let _ = write!(
            xml,
            r#"<Relationship Id="rId{idx}" Type="{NS_REL}/worksheet" Target="worksheets/sheet{idx}.xml"/>"#
        );
    }
    let _ = write!(
        xml,
        r#"<Relationship Id="rId{}" Type="{NS_REL}/styles" Target="styles.xml"/>"#,
        sheet_count + 1
    );
    let _ = write!(
        xml,
        r#"<Relationship Id="rId{}" Type="{NS_REL}/sharedStrings" Target="sharedStrings.xml"/>"#,
        sheet_count + 2
    );
    xml.push_str("</Relationships>");
    xml
}

fn root_rels_xml() -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="{NS_PKG_REL}"><Relationship Id="rId1" Type="{NS_REL}/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
    )
}

fn content_types_xml(sheet_count: usize) -> String {
    const SML: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml";
    let mut xml = format!(
        r#"{XML_DECL}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="{SML}.sheet.main+xml"/><Override PartName="/xl/styles.xml" ContentType="{SML}.styles+xml"/><Override PartName="/xl/sharedStrings.xml" ContentType="{SML}.sharedStrings+xml"/>"#
    );
    for idx in 1..=sheet_count {
        let _ = write!(
            xml,
            r#"<Override PartName="/xl/worksheets/sheet{idx}.xml" ContentType="{SML}.worksheet+xml"/>"#
        );
    }
    xml.push_str("</Types>");
    xml
}

fn styles_xml() -> String {
    format!(
        r#"{XML_DECL}<styleSheet xmlns="{NS_MAIN}"><fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#
    )
}

/// Escape for XML text, dropping control characters XML 1.0 cannot carry.
fn xml_text(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect();
    escape(cleaned.as_str()).into_owned()
}

/// Zero-based column index to spreadsheet letters: 0 → A, 26 → AA.
fn column_name(mut idx: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (idx % 26) as u8);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}
