use crate::error::ExportError;
use crate::filter::FilteredView;
use crate::record::{Record, Schema};
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;

/// File name offered for the spreadsheet download.
pub const XLSX_FILE_NAME: &str = "detalle_filtrado.xlsx";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const CSV_FILE_NAME: &str = "detalle_filtrado.csv";
/// Worksheet name of the export; matches the default input sheet.
pub const EXPORT_SHEET: &str = "Base";

/// Convert the filtered view to CSV format
///
/// Writes a header row with the schema's column names followed by one line
/// per record: date, category, amount, vendor.
///
/// # Arguments
/// * `view` - The filtered records to export
/// * `schema` - Header names to write
///
/// # Returns
/// * `Result<Vec<u8>, ExportError>` - CSV content as bytes or an error
pub fn to_csv(view: &FilteredView<'_>, schema: &Schema) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(schema.export_headers())?;

    for record in view.iter() {
        writer.write_record([
            record.date.format("%Y-%m-%d").to_string(),
            record.category.clone().unwrap_or_default(),
            record.amount.normalize().to_string(),
            record.vendor.clone(),
        ])?;
    }

    writer.flush()?;
    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

/// Convert the filtered view to XLSX format
///
/// This function exports the filtered records to an Excel workbook using the
/// rust_xlsxwriter library. Dates are written as real date cells and amounts
/// as numbers, so the file loads back into the dashboard unchanged.
///
/// # Arguments
/// * `view` - The filtered records to export
/// * `schema` - Header names to write
///
/// # Returns
/// * `Result<Vec<u8>, ExportError>` - XLSX file content as bytes or an error
///
/// # Examples
/// ```
/// use expense_dashboard::downloader::to_xlsx;
/// use expense_dashboard::filter::FilteredView;
/// use expense_dashboard::record::Schema;
///
/// let view = FilteredView::default();
/// match to_xlsx(&view, &Schema::default()) {
///     Ok(xlsx_data) => println!("XLSX generated: {} bytes", xlsx_data.len()),
///     Err(e) => eprintln!("Failed to generate XLSX: {}", e),
/// }
/// ```
pub fn to_xlsx(view: &FilteredView<'_>, schema: &Schema) -> Result<Vec<u8>, ExportError> {
    use rust_xlsxwriter::{Format, Workbook, Worksheet};

    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    worksheet.set_name(EXPORT_SHEET)?;
    let header_format = Format::new().set_bold();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let amount_format = Format::new().set_num_format("#,##0");

    for (col, header) in schema.export_headers().iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    for (i, record) in view.iter().enumerate() {
        let row = (i + 1) as u32;
        write_record(&mut worksheet, row, record, &date_format, &amount_format)?;
    }

    worksheet.set_column_width(0, 18.0)?;
    worksheet.set_column_width(1, 40.0)?;
    worksheet.set_column_width(2, 16.0)?;
    worksheet.set_column_width(3, 40.0)?;

    workbook.push_worksheet(worksheet);

    let buffer = workbook.save_to_buffer()?;
    log::debug!("Exported {} records to XLSX ({} bytes)", view.len(), buffer.len());

    Ok(buffer)
}

fn write_record(
    worksheet: &mut rust_xlsxwriter::Worksheet,
    row: u32,
    record: &Record,
    date_format: &rust_xlsxwriter::Format,
    amount_format: &rust_xlsxwriter::Format,
) -> Result<(), ExportError> {
    worksheet.write_number_with_format(row, 0, excel_serial(record.date), date_format)?;
    if let Some(category) = record.category_label() {
        worksheet.write_string(row, 1, category)?;
    }
    worksheet.write_number_with_format(
        row,
        2,
        record.amount.to_f64().unwrap_or_default(),
        amount_format,
    )?;
    worksheet.write_string(row, 3, record.vendor.as_str())?;
    Ok(())
}

/// Excel serial day number (1900 date system) of a date.
fn excel_serial(date: NaiveDate) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or_default();
    (date - epoch).num_days() as f64
}
