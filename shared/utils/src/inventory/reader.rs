//! Workbook Reader
//!
//! Decodes uploaded stock files into raw tables. Supports CSV and Excel
//! (XLSX/XLS) workbooks; every Excel sheet becomes one table.

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_from_rs, DataType, Range, Reader, Xls, Xlsx};
use tracing::debug;

use stockboard_models::{render_float, RawRow, RawTable};

use crate::error::{StockboardError, StockboardResult};

/// Supported stock file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Xlsx,
    Xls,
}

impl SourceFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xlsm" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            _ => None,
        }
    }

    /// Detect format from content type header
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type.split(';').next().unwrap_or("").trim();
        match essence {
            "text/csv" | "application/csv" => Some(Self::Csv),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => Some(Self::Xlsx),
            "application/vnd.ms-excel" => Some(Self::Xls),
            _ => None,
        }
    }

    /// Canonical file extension, as listed in `allowed_extensions`.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Xlsx => "XLSX",
            Self::Xls => "XLS",
        }
    }
}

/// Render one cell the way a spreadsheet shows it. Whole floats lose their
/// fractional part so `1500.0` reads as `1500`.
pub fn render_cell(cell: &DataType) -> String {
    match cell {
        DataType::Empty => String::new(),
        DataType::String(s) => s.clone(),
        DataType::Int(i) => i.to_string(),
        DataType::Float(f) => render_float(*f),
        DataType::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Convert a sheet range into positional rows addressed by absolute sheet
/// column, padding for ranges that do not start at `A1`.
pub fn range_to_rows(range: &Range<DataType>) -> Vec<RawRow> {
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<RawRow> = (0..row_offset).map(|_| RawRow::Positional(Vec::new())).collect();
    for cells in range.rows() {
        let mut values = vec![String::new(); col_offset];
        values.extend(cells.iter().map(render_cell));
        rows.push(RawRow::Positional(values));
    }
    rows
}

#[derive(Debug, Default)]
pub struct WorkbookReader;

impl WorkbookReader {
    pub fn new() -> Self {
        Self
    }

    /// Decode a stock file. The format is taken from `format` when given,
    /// otherwise from the file extension.
    pub fn read_bytes(
        &self,
        filename: &str,
        data: &[u8],
        format: Option<SourceFormat>,
    ) -> StockboardResult<Vec<RawTable>> {
        let format = format
            .or_else(|| SourceFormat::from_extension(Path::new(filename)))
            .ok_or_else(|| StockboardError::unsupported_format(filename))?;

        let tables = match format {
            SourceFormat::Csv => vec![self.read_csv(filename, data)?],
            SourceFormat::Xlsx => {
                let workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(data))
                    .map_err(|e: calamine::XlsxError| StockboardError::source_unreadable(filename, e.to_string()))?;
                self.read_workbook(filename, workbook)?
            }
            SourceFormat::Xls => {
                let workbook: Xls<_> = open_workbook_from_rs(Cursor::new(data))
                    .map_err(|e: calamine::XlsError| StockboardError::source_unreadable(filename, e.to_string()))?;
                self.read_workbook(filename, workbook)?
            }
        };

        debug!(
            filename,
            format = format.label(),
            tables = tables.len(),
            "Decoded stock file"
        );
        Ok(tables)
    }

    /// Read a stock file from disk.
    pub fn read_path(&self, path: &Path) -> StockboardResult<Vec<RawTable>> {
        let filename = path.display().to_string();
        let data = std::fs::read(path)
            .map_err(|e| StockboardError::source_unreadable(&filename, e.to_string()))?;
        self.read_bytes(&filename, &data, None)
    }

    fn read_workbook<RS, R>(&self, filename: &str, mut workbook: R) -> StockboardResult<Vec<RawTable>>
    where
        RS: std::io::Read + std::io::Seek,
        R: Reader<RS>,
        R::Error: std::fmt::Display,
    {
        let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
        if sheet_names.is_empty() {
            return Err(StockboardError::source_unreadable(filename, "No sheets found in workbook"));
        }

        let mut tables = Vec::with_capacity(sheet_names.len());
        for name in sheet_names {
            let range = workbook
                .worksheet_range(&name)
                .ok_or_else(|| {
                    StockboardError::source_unreadable(filename, format!("Missing sheet '{}'", name))
                })?
                .map_err(|e| {
                    StockboardError::source_unreadable(
                        filename,
                        format!("Failed to read sheet '{}': {}", name, e),
                    )
                })?;

            tables.push(RawTable::new(name, range_to_rows(&range)));
        }

        Ok(tables)
    }

    fn read_csv(&self, filename: &str, data: &[u8]) -> StockboardResult<RawTable> {
        let data = data.strip_prefix("\u{FEFF}".as_bytes()).unwrap_or(data);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(data);

        // Fields are decoded lossily so non-UTF-8 exports still load.
        let mut rows = Vec::new();
        for result in reader.byte_records() {
            let record = result
                .map_err(|e| StockboardError::source_unreadable(filename, e.to_string()))?;
            rows.push(RawRow::Positional(
                record
                    .iter()
                    .map(|field| String::from_utf8_lossy(field).into_owned())
                    .collect(),
            ));
        }

        let name = Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(filename)
            .to_string();

        Ok(RawTable::new(name, rows))
    }
}
