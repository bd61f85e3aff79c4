//! File Discovery - enumerate ingestible files in a lakehouse folder

use crate::error::Result;
use crate::platform::FileSystem;
use tracing::debug;

pub const DEFAULT_FILES_FOLDER: &str = "/lakehouse/default/Files/";

const SUPPORTED_EXTENSIONS: [&str; 2] = [".csv", ".xlsx"];

/// True when `name` ends in `.csv` or `.xlsx`, ignoring case
pub fn is_supported_file(name: &str) -> bool {
    let lower = name.to_lowercase();
    SUPPORTED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Paths of the CSV/XLSX files directly under `folder`.
///
/// `pattern` is a case-sensitive substring the file name must contain.
/// Results keep the order of the underlying listing.
pub fn list_lakehouse_files(
    fs: &dyn FileSystem,
    folder: &str,
    pattern: Option<&str>,
) -> Result<Vec<String>> {
    let files: Vec<String> = fs
        .ls(folder)?
        .into_iter()
        .filter(|f| !f.is_dir && is_supported_file(&f.name))
        .filter(|f| pattern.map_or(true, |p| f.name.contains(p)))
        .map(|f| f.path)
        .collect();

    debug!(folder, ?pattern, found = files.len(), "Listed lakehouse files");
    Ok(files)
}
