use lakehouse_utils::ingestion::{
    create_preview_views, read_file, read_file_with, AnalyticSession, FileFormat, ReadOptions,
    FILENAME_COLUMN,
};
use polars::prelude::*;
use rust_xlsxwriter::{Workbook, XlsxError};
use std::path::Path;
use tempfile::TempDir;

/// `Summary` (empty) is deliberately not first so the default sheet has data
fn write_ledger_book(path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();

    let ledger = workbook.add_worksheet();
    ledger.set_name("Ledger")?;
    ledger.write_string(0, 0, "Account")?;
    ledger.write_string(0, 1, "Amount")?;
    ledger.write_string(0, 2, "Posted")?;
    ledger.write_number(1, 0, 4000)?;
    ledger.write_string(1, 1, "286.64-")?;
    ledger.write_number(1, 2, 45000)?;
    ledger.write_number(2, 0, 4010)?;
    ledger.write_number(2, 1, 12.5)?;

    let rates = workbook.add_worksheet();
    rates.set_name("Rates")?;
    rates.write_string(0, 0, "Currency")?;
    rates.write_string(0, 1, "Rate")?;
    rates.write_string(1, 0, "USD")?;
    rates.write_number(1, 1, 83.12)?;

    let summary = workbook.add_worksheet();
    summary.set_name("Summary")?;

    workbook.save(path)
}

fn ledger_book(dir: &TempDir) -> String {
    let path = dir.path().join("gl_2024.xlsx");
    write_ledger_book(&path).unwrap();
    path.to_string_lossy().to_string()
}

fn sheet(name: &str) -> ReadOptions {
    ReadOptions {
        sheet: Some(name.to_string()),
        ..Default::default()
    }
}

#[test]
fn test_first_sheet_is_read_by_default() {
    let dir = TempDir::new().unwrap();
    let path = ledger_book(&dir);

    let df = read_file(FileFormat::Xlsx, &path).unwrap();
    assert_eq!(df.shape(), (2, 4));
    assert_eq!(df.get_column_names(), vec!["Account", "Amount", "Posted", FILENAME_COLUMN]);
}

#[test]
fn test_every_cell_is_text() {
    let dir = TempDir::new().unwrap();
    let path = ledger_book(&dir);

    let df = read_file(FileFormat::Xlsx, &path).unwrap();
    for column in ["Account", "Amount", "Posted"] {
        assert_eq!(df.column(column).unwrap().dtype(), &DataType::String, "{}", column);
    }

    let account = df.column("Account").unwrap().str().unwrap().clone();
    assert_eq!(account.get(0), Some("4000"));
    let amount = df.column("Amount").unwrap().str().unwrap().clone();
    assert_eq!(amount.get(0), Some("286.64-"));
    assert_eq!(amount.get(1), Some("12.5"));
    let posted = df.column("Posted").unwrap().str().unwrap().clone();
    assert_eq!(posted.get(0), Some("45000"));
    assert_eq!(posted.get(1), None);
}

#[test]
fn test_filename_is_repeated_on_every_row() {
    let dir = TempDir::new().unwrap();
    let path = ledger_book(&dir);

    let df = read_file(FileFormat::Xlsx, &path).unwrap();
    let filenames = df.column(FILENAME_COLUMN).unwrap().str().unwrap().clone();
    assert_eq!(filenames.len(), 2);
    assert!(filenames.into_iter().all(|f| f == Some(path.as_str())));
}

#[test]
fn test_named_sheet_is_selected() {
    let dir = TempDir::new().unwrap();
    let path = ledger_book(&dir);

    let df = read_file_with(FileFormat::Xlsx, &path, &sheet("Rates")).unwrap();
    assert_eq!(df.get_column_names(), vec!["Currency", "Rate", FILENAME_COLUMN]);
    assert_eq!(df.column("Rate").unwrap().str().unwrap().get(0), Some("83.12"));

    assert!(read_file_with(FileFormat::Xlsx, &path, &sheet("Missing")).is_err());
}

#[test]
fn test_empty_sheet_has_no_rows() {
    let dir = TempDir::new().unwrap();
    let path = ledger_book(&dir);

    let df = read_file_with(FileFormat::Xlsx, &path, &sheet("Summary")).unwrap();
    assert_eq!(df.height(), 0);
    assert_eq!(df.get_column_names(), vec![FILENAME_COLUMN]);
}

#[test]
fn test_xlsx_preview_views() {
    let dir = TempDir::new().unwrap();
    let path = ledger_book(&dir);
    let mut session = AnalyticSession::new();
    let options = ReadOptions {
        normalize_names: true,
        ..Default::default()
    };

    let message = create_preview_views(&mut session, FileFormat::Xlsx, &path, &options).unwrap();
    assert_eq!(
        message,
        format!("Created views 'xlsx_raw' and 'xlsx_summary' from '{}'", path)
    );
    assert_eq!(session.views(), vec!["xlsx_raw", "xlsx_summary"]);

    let raw = session.sql("SELECT account, amount FROM xlsx_raw").unwrap();
    assert_eq!(raw.height(), 2);

    let summary = session
        .sql("SELECT column_name, null_count FROM xlsx_summary")
        .unwrap();
    assert_eq!(summary.height(), 4);
    let names = summary.column("column_name").unwrap().str().unwrap().clone();
    assert_eq!(names.get(2), Some("posted"));
    let nulls = summary.column("null_count").unwrap().u64().unwrap().clone();
    assert_eq!(nulls.get(2), Some(1));
}
