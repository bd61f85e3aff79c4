use crate::error::{LakehouseError, Result};
use crate::platform::{FileInfo, FileSystem};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Filesystem backed by the local (mounted) disk
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for LocalFileSystem {
    fn ls(&self, folder: &str) -> Result<Vec<FileInfo>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(folder)? {
            let entry = entry?;
            let path = entry.path();
            entries.push(FileInfo {
                name: entry.file_name().to_string_lossy().to_string(),
                path: path.to_string_lossy().to_string(),
                is_dir: entry.file_type()?.is_dir(),
            });
        }
        // read_dir order is platform dependent
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn mv(&self, src: &str, dest: &str, create_path: bool, overwrite: bool) -> Result<()> {
        let dest_path = Path::new(dest);

        if let Some(parent) = dest_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                if create_path {
                    fs::create_dir_all(parent)?;
                } else {
                    return Err(LakehouseError::Io(std::io::Error::new(
                        ErrorKind::NotFound,
                        format!("destination folder {} does not exist", parent.display()),
                    )));
                }
            }
        }

        if dest_path.exists() && !overwrite {
            return Err(LakehouseError::Io(std::io::Error::new(
                ErrorKind::AlreadyExists,
                format!("{} already exists", dest),
            )));
        }

        if fs::rename(src, dest_path).is_err() {
            // rename does not cross mount points
            debug!("rename {} -> {} failed, falling back to copy", src, dest);
            fs::copy(src, dest_path)?;
            fs::remove_file(src)?;
        }
        Ok(())
    }
}
