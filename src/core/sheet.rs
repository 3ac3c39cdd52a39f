//! Upload parsing: turns an uploaded workbook or CSV file into [`AttendeeRow`]s.
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};

use crate::domain::model::{
    AttendeeRow, COLUMN_DESIGNATION, COLUMN_EMAIL, COLUMN_ITEMS, COLUMN_MOBILE, COLUMN_NAME,
    COLUMN_ORGANISATION,
};
use crate::utils::error::{CheckinError, Result};
use crate::utils::validation::validate_file_extension;

const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];
const SUPPORTED_EXTENSIONS: [&str; 6] = ["xlsx", "xlsm", "xlsb", "xls", "ods", "csv"];

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Workbook,
    Csv,
}

impl SheetFormat {
    /// Picks the parser from the file extension, falling back to the content.
    pub fn detect(file_name: Option<&str>, bytes: &[u8]) -> Result<Self> {
        let extension = match file_name.filter(|name| !name.is_empty()) {
            Some(name) => validate_file_extension(name, &SUPPORTED_EXTENSIONS)?,
            None => None,
        };

        match extension.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some(ext) if WORKBOOK_EXTENSIONS.contains(&ext) => Ok(Self::Workbook),
            _ => Self::sniff(file_name.unwrap_or("upload"), bytes),
        }
    }

    fn sniff(file_name: &str, bytes: &[u8]) -> Result<Self> {
        if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
            Ok(Self::Workbook)
        } else if std::str::from_utf8(bytes).is_ok() {
            Ok(Self::Csv)
        } else {
            Err(CheckinError::UnsupportedFormat {
                file_name: file_name.to_string(),
            })
        }
    }
}

/// Positions of the recognised columns within a header row.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnMap {
    name: usize,
    designation: Option<usize>,
    organisation: Option<usize>,
    mobile: Option<usize>,
    email: Option<usize>,
    items: Option<usize>,
}

impl ColumnMap {
    fn from_headers<S: AsRef<str>>(headers: &[S]) -> Result<Self> {
        let position = |column: &str| {
            headers
                .iter()
                .position(|header| header.as_ref().trim().eq_ignore_ascii_case(column))
        };

        let name = position(COLUMN_NAME).ok_or_else(|| {
            CheckinError::malformed_spreadsheet(format!("missing required column '{COLUMN_NAME}'"))
        })?;

        Ok(Self {
            name,
            designation: position(COLUMN_DESIGNATION),
            organisation: position(COLUMN_ORGANISATION),
            mobile: position(COLUMN_MOBILE),
            email: position(COLUMN_EMAIL),
            items: position(COLUMN_ITEMS),
        })
    }

    fn row(&self, cells: &[String]) -> AttendeeRow {
        let cell = |index: Option<usize>| {
            index
                .and_then(|i| cells.get(i))
                .cloned()
                .unwrap_or_default()
        };

        AttendeeRow {
            name: cell(Some(self.name)),
            designation: cell(self.designation),
            organisation: cell(self.organisation),
            mobile: cell(self.mobile),
            email: cell(self.email),
            items: cell(self.items),
        }
    }
}

fn is_blank(cells: &[String]) -> bool {
    cells.iter().all(|cell| cell.trim().is_empty())
}

pub fn parse_rows(bytes: &[u8], format: SheetFormat) -> Result<Vec<AttendeeRow>> {
    let rows = match format {
        SheetFormat::Workbook => parse_workbook(bytes)?,
        SheetFormat::Csv => parse_csv(bytes)?,
    };

    tracing::debug!("Parsed {} attendee rows from {:?} upload", rows.len(), format);
    Ok(rows)
}

fn cell_text(cell: &Data, row_number: usize) -> Result<String> {
    match cell {
        Data::Empty => Ok(String::new()),
        Data::String(text) => Ok(text.clone()),
        Data::Int(value) => Ok(value.to_string()),
        // Phone numbers typed into Excel arrive as floats.
        Data::Float(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
            Ok((*value as i64).to_string())
        }
        Data::Float(value) => Ok(value.to_string()),
        Data::Bool(value) => Ok(value.to_string()),
        Data::Error(err) => Err(CheckinError::malformed_spreadsheet(format!(
            "row {row_number}: cell error {err:?}"
        ))),
        other => Ok(other.to_string()),
    }
}

/// 1-based sheet row of the `offset`-th row of `range`. Calamine ranges start
/// at the first used cell, not at sheet row 1.
fn sheet_row_number(range: &Range<Data>, offset: usize) -> usize {
    let first_row = range.start().map_or(0, |(row, _)| row as usize);
    first_row + offset + 1
}

fn parse_workbook(bytes: &[u8]) -> Result<Vec<AttendeeRow>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| CheckinError::malformed_spreadsheet(format!("unreadable workbook: {e}")))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| CheckinError::malformed_spreadsheet("workbook has no worksheets"))?
        .map_err(|e| CheckinError::malformed_spreadsheet(format!("unreadable worksheet: {e}")))?;

    let mut lines = range.rows().enumerate();
    let (header_offset, header_cells) = lines
        .next()
        .ok_or_else(|| CheckinError::malformed_spreadsheet("worksheet is empty"))?;

    let header_row = sheet_row_number(&range, header_offset);
    let headers = header_cells
        .iter()
        .map(|cell| cell_text(cell, header_row))
        .collect::<Result<Vec<_>>>()?;
    let columns = ColumnMap::from_headers(&headers)?;

    let mut rows = Vec::new();
    for (offset, cells) in lines {
        let row_number = sheet_row_number(&range, offset);
        let cells = cells
            .iter()
            .map(|cell| cell_text(cell, row_number))
            .collect::<Result<Vec<_>>>()?;

        if is_blank(&cells) {
            continue;
        }
        rows.push(columns.row(&cells));
    }

    Ok(rows)
}

fn parse_csv(bytes: &[u8]) -> Result<Vec<AttendeeRow>> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| CheckinError::malformed_spreadsheet(format!("unreadable header: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();
    let columns = ColumnMap::from_headers(&headers)?;

    let mut rows = Vec::new();
    for (offset, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            CheckinError::malformed_spreadsheet(format!("row {}: {e}", offset + 2))
        })?;
        let cells: Vec<String> = record.iter().map(str::to_string).collect();

        if is_blank(&cells) {
            continue;
        }
        rows.push(columns.row(&cells));
    }

    Ok(rows)
}
