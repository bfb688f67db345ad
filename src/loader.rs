use crate::error::LoadError;
use crate::record::{Record, Schema, Table};
use calamine::{Data, Reader, open_workbook_auto};
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::path::Path;

/// Largest Excel serial date (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// An amount cell after conversion.
#[derive(Clone, Copy, Debug, PartialEq)]
enum AmountCell {
    Value(Decimal),
    Missing,
    /// A finite number beyond what `Decimal` can hold.
    OutOfRange(f64),
}

/// Position of each required column within a header row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Columns {
    date: usize,
    amount: usize,
    vendor: usize,
    category: usize,
}

impl Columns {
    /// Locate the schema's columns by exact header name.
    ///
    /// Every missing column is reported at once so a broken export can be
    /// fixed in a single pass.
    fn locate(headers: &[String], schema: &Schema) -> Result<Self, LoadError> {
        let find = |name: &str| headers.iter().position(|h| h == name);

        let mut missing = Vec::new();
        let mut require = |name: &str| {
            let index = find(name);
            if index.is_none() {
                missing.push(name.to_string());
            }
            index.unwrap_or_default()
        };

        let columns = Columns {
            date: require(&schema.date),
            amount: require(&schema.amount),
            vendor: require(&schema.vendor),
            category: require(&schema.category),
        };

        if missing.is_empty() {
            Ok(columns)
        } else {
            Err(LoadError::MissingColumns(missing))
        }
    }
}

/// Load the expense table from an Excel (or OpenDocument) workbook
///
/// The first row of `sheet` is the header row; the remaining rows become
/// records. Rows missing a document date, amount or vendor are dropped.
///
/// # Arguments
/// * `filepath` - Path to the workbook
/// * `sheet` - Name of the worksheet holding the ledger
/// * `schema` - Header names of the required columns
///
/// # Returns
/// * `Result<Table, LoadError>` - The cleaned table or the reason loading failed
///
/// # Examples
/// ```no_run
/// use expense_dashboard::loader::from_excel;
/// use expense_dashboard::record::Schema;
///
/// match from_excel("detallefinanciero.xlsx", "Base", &Schema::default()) {
///     Ok(table) => println!("Loaded {} records", table.len()),
///     Err(e) => eprintln!("Error loading workbook: {}", e),
/// }
/// ```
pub fn from_excel(
    filepath: impl AsRef<Path>,
    sheet: &str,
    schema: &Schema,
) -> Result<Table, LoadError> {
    let path = filepath.as_ref();
    let workbook_error = |source| LoadError::Workbook {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(workbook_error)?;

    let available = workbook.sheet_names();
    if !available.iter().any(|name| name == sheet) {
        return Err(LoadError::SheetNotFound {
            sheet: sheet.to_string(),
            available,
        });
    }

    let range = workbook.worksheet_range(sheet).map_err(workbook_error)?;
    let mut rows = range.rows();

    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| LoadError::EmptySheet(sheet.to_string()))?
        .iter()
        .map(|cell| data_to_label(cell).unwrap_or_default())
        .collect();
    let columns = Columns::locate(&headers, schema)?;

    let mut records = Vec::new();
    let mut dropped = 0usize;
    let mut out_of_range = 0usize;

    // Data rows count from 2, the header row being 1.
    for (number, row) in (2usize..).zip(rows) {
        let cell = |index: usize| row.get(index).unwrap_or(&Data::Empty);

        let amount = match data_to_amount(cell(columns.amount)) {
            AmountCell::Value(amount) => Some(amount),
            AmountCell::Missing => None,
            AmountCell::OutOfRange(value) => {
                log::warn!(
                    "Skipping row {} of [{}]: amount {} is outside the supported range",
                    number,
                    sheet,
                    value
                );
                out_of_range += 1;
                continue;
            }
        };
        let date = data_to_date(cell(columns.date));
        let vendor = data_to_label(cell(columns.vendor));

        match (date, amount, vendor) {
            (Some(date), Some(amount), Some(vendor)) => {
                let category = data_to_label(cell(columns.category));
                records.push(Record::new(date, amount, vendor, category));
            }
            _ => dropped += 1,
        }
    }

    log::info!(
        "Loaded {} records from {} [{}] ({} incomplete rows dropped, {} out of range)",
        records.len(),
        path.display(),
        sheet,
        dropped,
        out_of_range
    );

    Ok(Table::new(records))
}

/// Load the expense table from a CSV file
///
/// Same column rules as [`from_excel`]; the header line names the columns.
///
/// # Arguments
/// * `filepath` - Path to the CSV file to load
/// * `schema` - Header names of the required columns
///
/// # Returns
/// * `Result<Table, LoadError>` - The cleaned table or the reason loading failed
pub fn from_csv(filepath: impl AsRef<Path>, schema: &Schema) -> Result<Table, LoadError> {
    let path = filepath.as_ref();
    let csv_error = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(LoadError::EmptySheet(path.display().to_string()));
    }
    let columns = Columns::locate(&headers, schema)?;

    let mut records = Vec::new();
    let mut dropped = 0usize;

    for row in reader.records() {
        let row = row.map_err(csv_error)?;
        let field = |index: usize| row.get(index).unwrap_or("");

        let date = parse_date_text(field(columns.date));
        let amount = parse_amount_text(field(columns.amount));
        let vendor = non_empty(field(columns.vendor));

        match (date, amount, vendor) {
            (Some(date), Some(amount), Some(vendor)) => {
                let category = non_empty(field(columns.category));
                records.push(Record::new(date, amount, vendor, category));
            }
            _ => dropped += 1,
        }
    }

    log::info!(
        "Loaded {} records from {} ({} incomplete rows dropped)",
        records.len(),
        path.display(),
        dropped
    );

    Ok(Table::new(records))
}

/// Detect file type and load appropriate format
///
/// This function examines the file extension and calls the appropriate loader
/// for CSV or workbook files. The sheet name only applies to workbooks.
///
/// # Examples
/// ```no_run
/// use expense_dashboard::loader::load_table;
/// use expense_dashboard::record::Schema;
///
/// match load_table("detallefinanciero.xlsx", "Base", &Schema::default()) {
///     Ok(table) => println!("Successfully loaded {} records", table.len()),
///     Err(e) => eprintln!("Error loading file: {}", e),
/// }
/// ```
pub fn load_table(
    filepath: impl AsRef<Path>,
    sheet: &str,
    schema: &Schema,
) -> Result<Table, LoadError> {
    let path = filepath.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match extension.as_deref() {
        Some("csv") => from_csv(path, schema),
        Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => from_excel(path, sheet, schema),
        _ => Err(LoadError::UnsupportedFormat(path.to_path_buf())),
    }
}

fn data_to_date(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::DateTime(dt) => dt.as_datetime().map(|dt| dt.date()),
        Data::DateTimeIso(text) | Data::String(text) => parse_date_text(text),
        Data::Float(serial) => serial_to_date(*serial),
        Data::Int(serial) => serial_to_date(*serial as f64),
        _ => None,
    }
}

fn data_to_amount(cell: &Data) -> AmountCell {
    match cell {
        Data::Float(value) if value.is_finite() => Decimal::from_f64(*value)
            .map_or(AmountCell::OutOfRange(*value), AmountCell::Value),
        Data::Int(value) => AmountCell::Value(Decimal::from(*value)),
        Data::String(text) => {
            parse_amount_text(text).map_or(AmountCell::Missing, AmountCell::Value)
        }
        _ => AmountCell::Missing,
    }
}

fn data_to_label(cell: &Data) -> Option<String> {
    match cell {
        Data::String(text) | Data::DateTimeIso(text) => non_empty(text),
        Data::Int(value) => Some(value.to_string()),
        Data::Float(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
            Some(format!("{}", *value as i64))
        }
        Data::Float(value) => Some(value.to_string()),
        Data::Bool(value) => Some(value.to_string()),
        Data::DateTime(dt) => dt.as_datetime().map(|dt| dt.to_string()),
        _ => None,
    }
}

fn non_empty(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Parse a textual document date.
///
/// Accepts ISO dates, optionally followed by a time part, and the day-first
/// forms `DD-MM-YYYY` / `DD/MM/YYYY` common in local exports.
pub(crate) fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let head = text.trim().split([' ', 'T']).next()?;
    ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y", "%Y/%m/%d"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(head, format).ok())
}

fn parse_amount_text(text: &str) -> Option<Decimal> {
    text.trim().parse::<Decimal>().ok()
}

/// Convert an Excel serial day number (1900 date system) to a date.
fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !(1.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial.floor() as u64))
}
