use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::domain::model::{AttendeeRow, TABLE_HEADERS};
use crate::utils::error::{CheckinError, Result};

pub const WORKSHEET_NAME: &str = "Attendees";

fn xlsx_error(e: XlsxError) -> CheckinError {
    CheckinError::ExportError {
        format: "xlsx",
        message: e.to_string(),
    }
}

pub fn render_xlsx(rows: &[AttendeeRow]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(WORKSHEET_NAME).map_err(xlsx_error)?;

    for (col, header) in TABLE_HEADERS.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(xlsx_error)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let row_number = (index + 1) as u32;
        for (col, cell) in row.cells().iter().enumerate() {
            worksheet
                .write_string(row_number, col as u16, *cell)
                .map_err(xlsx_error)?;
        }
    }

    let bytes = workbook.save_to_buffer().map_err(xlsx_error)?;
    tracing::debug!("Rendered {} rows into {} byte workbook", rows.len(), bytes.len());
    Ok(bytes)
}

pub fn render_csv(rows: &[AttendeeRow]) -> Result<Vec<u8>> {
    let csv_error = |e: csv::Error| CheckinError::ExportError {
        format: "csv",
        message: e.to_string(),
    };

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(TABLE_HEADERS).map_err(csv_error)?;
    for row in rows {
        writer.write_record(row.cells()).map_err(csv_error)?;
    }

    writer.into_inner().map_err(|e| CheckinError::ExportError {
        format: "csv",
        message: e.to_string(),
    })
}
