use expense_dashboard::downloader::{EXPORT_SHEET, to_xlsx};
use expense_dashboard::loader::load_table;
use expense_dashboard::{FilterRequest, Schema, Session};
use rust_decimal::Decimal;
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_ledger(dir: &Path) -> PathBuf {
    let path = dir.join("detallefinanciero.xlsx");
    let schema = Schema::default();
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Base").unwrap();

    let headers = [
        "Sociedad",
        schema.date.as_str(),
        schema.category.as_str(),
        schema.amount.as_str(),
        schema.vendor.as_str(),
    ];
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }

    let rows: [(&str, Option<f64>, Option<&str>, &str); 6] = [
        ("2024-01-12", Some(100.0), Some("VendorA"), "Cat1"),
        ("2024-02-03", Some(200.0), Some("VendorB"), "Cat2"),
        ("2024-02-27", Some(50.0), Some("VendorA"), "Cat1"),
        ("2024-03-01", None, Some("VendorC"), "Cat2"),
        ("2024-03-02", Some(999.0), None, "Cat2"),
        ("", Some(5.0), Some("VendorD"), "Cat3"),
    ];
    for (i, (date, amount, vendor, category)) in rows.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, "CL01").unwrap();
        if !date.is_empty() {
            sheet.write_string(row, 1, *date).unwrap();
        }
        sheet.write_string(row, 2, *category).unwrap();
        if let Some(amount) = amount {
            sheet.write_number(row, 3, *amount).unwrap();
        }
        if let Some(vendor) = vendor {
            sheet.write_string(row, 4, *vendor).unwrap();
        }
    }

    workbook.save(&path).unwrap();
    path
}

#[test]
fn ledger_to_dashboard() {
    let dir = TempDir::new().unwrap();
    let path = write_ledger(dir.path());

    let table = load_table(&path, "Base", &Schema::default()).unwrap();
    assert_eq!(table.len(), 3);

    let session = Session::new(table, Decimal::from(1000)).unwrap();
    assert_eq!(session.kpis().executed, Decimal::from(350));
    assert_eq!(session.kpis().balance, Decimal::from(650));
    assert_eq!(
        expense_dashboard::format::format_percent(session.kpis().execution_ratio),
        "35.0 %"
    );

    let view = session.view(&FilterRequest::default());
    let monthly: Vec<(String, Decimal)> = view
        .monthly
        .iter()
        .map(|m| (m.period.to_string(), m.total))
        .collect();
    assert_eq!(
        monthly,
        vec![
            ("2024-01".to_string(), Decimal::from(100)),
            ("2024-02".to_string(), Decimal::from(250)),
        ]
    );
    assert_eq!(view.category_totals[0].label, "Cat2");
    assert_eq!(view.top_vendors[0].label, "VendorB");
}

#[test]
fn filtered_export_reloads_as_the_filtered_view() {
    let dir = TempDir::new().unwrap();
    let path = write_ledger(dir.path());
    let table = load_table(&path, "Base", &Schema::default()).unwrap();
    let session = Session::new(table, Decimal::from(1000)).unwrap();

    let request = FilterRequest {
        objects: vec!["Cat1".into()],
        vendors: vec![],
    };
    let (resolved, view) = session.filtered(&request);
    assert_eq!(resolved.available_vendors, vec!["VendorA"]);
    assert_eq!(view.len(), 2);

    let export_path = dir.path().join("detalle_filtrado.xlsx");
    std::fs::write(&export_path, to_xlsx(&view, &Schema::default()).unwrap()).unwrap();

    let reloaded = load_table(&export_path, EXPORT_SHEET, &Schema::default()).unwrap();
    assert_eq!(reloaded.len(), 2);
    assert!(reloaded.iter().all(|r| r.vendor == "VendorA"));
    let total: Decimal = reloaded.iter().map(|r| r.amount).sum();
    assert_eq!(total, Decimal::from(150));
}
