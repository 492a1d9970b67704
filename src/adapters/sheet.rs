//! Spreadsheet encoding and decoding.
//!
//! Workbooks are read with calamine and written with rust_xlsxwriter, keeping
//! numbers, booleans and dates typed. Delimited files go through the csv
//! crate and carry cell text.

use crate::domain::model::{Cell, Sheet, SourceRow, IMAGE_COLUMN, SKU_COLUMN};
use crate::utils::error::{EtlError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use rust_xlsxwriter::{Format, Workbook};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

pub const READABLE_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods", "csv", "tsv"];
pub const WRITABLE_EXTENSIONS: &[&str] = &["xlsx", "csv", "tsv"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Workbook,
    Csv,
    Tsv,
}

impl SheetFormat {
    pub fn from_path(path: &str) -> Result<Self> {
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "xlsx" | "xlsm" | "xls" | "ods" => Ok(SheetFormat::Workbook),
            "csv" => Ok(SheetFormat::Csv),
            "tsv" => Ok(SheetFormat::Tsv),
            _ => Err(EtlError::SheetError {
                message: format!("cannot tell spreadsheet format of '{}'", path),
            }),
        }
    }

    fn delimiter(self) -> u8 {
        match self {
            SheetFormat::Tsv => b'\t',
            _ => b',',
        }
    }
}

/// Decodes `data` and checks that the required columns are present.
pub fn decode_sheet(data: &[u8], format: SheetFormat, sheet_name: Option<&str>) -> Result<Sheet> {
    let (table, header_line) = match format {
        SheetFormat::Workbook => read_workbook(data, sheet_name)?,
        SheetFormat::Csv | SheetFormat::Tsv => (read_delimited(data, format.delimiter())?, 0),
    };

    let mut rows = table.into_iter();
    let columns: Arc<[String]> = match rows.next() {
        Some(header) => header.iter().map(Cell::to_string).collect(),
        None => {
            return Err(EtlError::SheetError {
                message: "spreadsheet has no header row".to_string(),
            })
        }
    };

    for required in [SKU_COLUMN, IMAGE_COLUMN] {
        if !columns.iter().any(|c| c.trim() == required) {
            return Err(EtlError::MissingColumn {
                column: required.to_string(),
            });
        }
    }

    let rows = rows
        .enumerate()
        .map(|(index, cells)| {
            SourceRow::new(Arc::clone(&columns), cells, index).with_header_line(header_line)
        })
        .collect();

    Ok(Sheet { columns, rows })
}

fn read_delimited(data: &[u8], delimiter: u8) -> Result<Vec<Vec<Cell>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(data);

    let mut table = Vec::new();
    for record in reader.records() {
        let record = record?;
        table.push(record.iter().map(Cell::from).collect());
    }
    Ok(table)
}

/// Returns the used range plus the zero-based line its first row sits on.
fn read_workbook(data: &[u8], sheet_name: Option<&str>) -> Result<(Vec<Vec<Cell>>, usize)> {
    let sheet_error = |e: calamine::Error| EtlError::SheetError {
        message: e.to_string(),
    };

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(data.to_vec())).map_err(sheet_error)?;
    let name = match sheet_name {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| EtlError::SheetError {
                message: "workbook contains no sheets".to_string(),
            })?,
    };

    // The range starts at the first non-empty cell, not at A1.
    let range = workbook.worksheet_range(&name).map_err(sheet_error)?;
    let header_line = range.start().map_or(0, |(row, _)| row as usize);
    let table = range
        .rows()
        .map(|row| row.iter().map(workbook_cell).collect())
        .collect();
    Ok((table, header_line))
}

fn workbook_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::from(s.as_str()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) if dt.is_datetime() => Cell::DateTime(dt.as_f64()),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        other => Cell::Text(other.to_string()),
    }
}

/// Encodes a header plus rows. Every row must be as wide as the header.
pub fn encode_sheet(
    columns: &[String],
    rows: &[Vec<Cell>],
    format: SheetFormat,
    sheet_name: &str,
) -> Result<Vec<u8>> {
    match format {
        SheetFormat::Workbook => write_workbook(columns, rows, sheet_name),
        SheetFormat::Csv | SheetFormat::Tsv => write_delimited(columns, rows, format.delimiter()),
    }
}

fn write_delimited(columns: &[String], rows: &[Vec<Cell>], delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(columns)?;
    for row in rows {
        writer.write_record(row.iter().map(Cell::to_string))?;
    }

    writer.into_inner().map_err(|e| EtlError::IoError(e.into_error()))
}

fn write_workbook(columns: &[String], rows: &[Vec<Cell>], sheet_name: &str) -> Result<Vec<u8>> {
    let xlsx_error = |e: rust_xlsxwriter::XlsxError| EtlError::SheetError {
        message: e.to_string(),
    };
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let datetime_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name).map_err(xlsx_error)?;

    for (col_idx, name) in columns.iter().enumerate() {
        if !name.is_empty() {
            worksheet
                .write_string(0, column_number(col_idx)?, name.as_str())
                .map_err(xlsx_error)?;
        }
    }

    for (row_idx, cells) in rows.iter().enumerate() {
        let row_num = u32::try_from(row_idx + 1).map_err(|_| EtlError::SheetError {
            message: "too many rows for a worksheet".to_string(),
        })?;
        for (col_idx, cell) in cells.iter().enumerate() {
            let col_num = column_number(col_idx)?;
            match cell {
                Cell::Empty => {}
                Cell::Text(text) => {
                    worksheet
                        .write_string(row_num, col_num, text.as_str())
                        .map_err(xlsx_error)?;
                }
                Cell::Number(n) => {
                    worksheet.write_number(row_num, col_num, *n).map_err(xlsx_error)?;
                }
                Cell::Bool(b) => {
                    worksheet.write_boolean(row_num, col_num, *b).map_err(xlsx_error)?;
                }
                Cell::DateTime(serial) => {
                    let format = if serial.fract() == 0.0 {
                        &date_format
                    } else {
                        &datetime_format
                    };
                    worksheet
                        .write_number_with_format(row_num, col_num, *serial, format)
                        .map_err(xlsx_error)?;
                }
            }
        }
    }

    workbook.save_to_buffer().map_err(xlsx_error)
}

fn column_number(index: usize) -> Result<u16> {
    u16::try_from(index).map_err(|_| EtlError::SheetError {
        message: "too many columns for a worksheet".to_string(),
    })
}
