//! Ingestion Module
//!
//! Gets lakehouse files into the analytic session:
//! - File discovery under a Files/ folder
//! - Typed CSV/XLSX reads with a source filename column
//! - Preview views with per-column profiles
//! - Load timestamps for the write step

pub mod discovery;
pub mod enrich;
pub mod excel;
pub mod reader;
pub mod session;
pub mod views;

pub use discovery::{is_supported_file, list_lakehouse_files, DEFAULT_FILES_FOLDER};
pub use enrich::{with_load_timestamps, LOAD_TS_COLUMN, UPDATE_TS_COLUMN};
pub use excel::read_xlsx;
pub use reader::{read_file, read_file_with, FileFormat, ReadOptions, FILENAME_COLUMN};
pub use session::AnalyticSession;
pub use views::{create_preview_views, raw_view_name, summarize, summary_view_name};
