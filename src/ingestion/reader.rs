//! Typed Reader - CSV and XLSX files loaded into polars frames

use crate::error::{LakehouseError, Result};
use crate::ingestion::excel::read_xlsx;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Column holding the source file path on every loaded row
pub const FILENAME_COLUMN: &str = "filename";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileFormat {
    Csv,
    Xlsx,
}

impl FileFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Xlsx => "xlsx",
        }
    }

    /// Format implied by the file extension
    pub fn from_path(path: &str) -> Result<Self> {
        Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| LakehouseError::UnsupportedFormat(path.to_string()))?
            .parse()
    }
}

impl FromStr for FileFormat {
    type Err = LakehouseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(FileFormat::Csv),
            "xlsx" => Ok(FileFormat::Xlsx),
            _ => Err(LakehouseError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReadOptions {
    /// Load every CSV column as text (XLSX is always text)
    pub all_text: bool,
    /// Lower-case column names and replace other characters with `_`
    pub normalize_names: bool,
    /// Worksheet to load; the first one when absent
    pub sheet: Option<String>,
}

/// Load a file with default options
pub fn read_file(format: FileFormat, path: &str) -> Result<DataFrame> {
    read_file_with(format, path, &ReadOptions::default())
}

pub fn read_file_with(format: FileFormat, path: &str, options: &ReadOptions) -> Result<DataFrame> {
    let mut df = match format {
        FileFormat::Csv => {
            let mut reader = LazyCsvReader::new(path).with_has_header(true);
            if options.all_text {
                reader = reader.with_infer_schema_length(Some(0));
            }
            reader.finish()?.collect()?
        }
        FileFormat::Xlsx => read_xlsx(path, options.sheet.as_deref())?,
    };

    // sized to the frame so an empty sheet stays empty
    let height = df.height();
    df.with_column(Series::new(FILENAME_COLUMN, vec![path; height]))?;

    if options.normalize_names {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| normalize_column_name(s))
            .collect();
        df.set_column_names(&names)?;
    }

    info!(path, format = %format, rows = df.height(), columns = df.width(), "Loaded file");
    Ok(df)
}

/// `"Order Date (UTC)"` -> `"order_date_utc"`
pub fn normalize_column_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    for c in name.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            normalized.push(c);
        } else if !normalized.ends_with('_') {
            normalized.push('_');
        }
    }
    let normalized = normalized.trim_matches('_').to_string();
    if normalized.is_empty() {
        "column".to_string()
    } else {
        normalized
    }
}
