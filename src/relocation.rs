//! File Relocation - move processed files out of the landing folder

use crate::platform::FileSystem;
use tracing::{info, warn};

/// Move `src` into `dest_dir`, keeping its file name.
///
/// Returns the new path, or `None` after logging when the move fails.
pub fn move_file(
    fs: &dyn FileSystem,
    src: &str,
    dest_dir: &str,
    create_path: bool,
    overwrite: bool,
) -> Option<String> {
    let file_name = src.trim_end_matches('/').rsplit('/').next().unwrap_or(src);
    let dest_dir = if dest_dir.ends_with('/') {
        dest_dir.to_string()
    } else {
        format!("{}/", dest_dir)
    };
    let dest = format!("{}{}", dest_dir, file_name);

    match fs.mv(src, &dest, create_path, overwrite) {
        Ok(()) => {
            info!(src, dest = %dest, "Moved file");
            Some(dest)
        }
        Err(e) => {
            warn!(src, dest = %dest, error = %e, "Failed to move file");
            None
        }
    }
}
