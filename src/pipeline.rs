//! Ingestion Pipeline - one job from landing folder to Delta table
//!
//! discovery -> read -> clean -> load timestamps -> write -> audit -> archive

use crate::audit::record::{AUDIT_KEYS, TARGET_OBJECT, TARGET_SCHEMA, WRITE_MODE};
use crate::audit::{AuditRecorder, JobConfig, PipelineRunContext, RunOutcome};
use crate::cleaning::{excel_serial_column, fix_trailing_sign_column};
use crate::delta::{TableWriter, WriteMode, WriteSummary};
use crate::error::Result;
use crate::ingestion::{
    list_lakehouse_files, read_file, with_load_timestamps, AnalyticSession, FileFormat,
    DEFAULT_FILES_FOLDER,
};
use crate::paths::TableAddress;
use crate::platform::FileSystem;
use crate::relocation::move_file;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

pub const SOURCE_FOLDER: &str = "SOURCE_FOLDER";
pub const FILE_FORMAT: &str = "FILE_FORMAT";
pub const FILE_PATTERN: &str = "FILE_PATTERN";
pub const ARCHIVE_FOLDER: &str = "ARCHIVE_FOLDER";
pub const SIGN_COLUMNS: &str = "SIGN_COLUMNS";
pub const SERIAL_DATE_COLUMNS: &str = "SERIAL_DATE_COLUMNS";

/// What happened to one input file
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FileRunReport {
    pub file: String,
    pub outcome: RunOutcome,
    pub exit_message: String,
    pub rows: usize,
    pub archived_to: Option<String>,
}

pub struct IngestionPipeline {
    fs: Arc<dyn FileSystem>,
    writer: Arc<TableWriter>,
    recorder: AuditRecorder,
}

impl IngestionPipeline {
    pub fn new(fs: Arc<dyn FileSystem>, writer: Arc<TableWriter>) -> Self {
        Self {
            recorder: AuditRecorder::new(writer.clone()),
            fs,
            writer,
        }
    }

    /// Ingest every matching file of the job, auditing each one.
    ///
    /// Configuration problems abort before any file is touched; per-file
    /// failures are recorded and the remaining files still run. With
    /// `WRITE_MODE=overwrite` the first successful write replaces the table,
    /// later files of the same run append to it.
    pub async fn run(&self, job: &JobConfig, run: &PipelineRunContext) -> Result<Vec<FileRunReport>> {
        // every file gets audited, so the audit keys gate the whole run
        job.require_all(&AUDIT_KEYS)?;
        let address = TableAddress::new(job.require(TARGET_SCHEMA)?, job.require(TARGET_OBJECT)?);
        let mode: WriteMode = job.require(WRITE_MODE)?.parse()?;
        let format_hint = job.get(FILE_FORMAT).map(str::parse::<FileFormat>).transpose()?;
        let folder = job.get(SOURCE_FOLDER).unwrap_or(DEFAULT_FILES_FOLDER);

        let files = list_lakehouse_files(self.fs.as_ref(), folder, job.get(FILE_PATTERN))?;
        info!(run_id = %run.run_id, folder, files = files.len(), table = %address, "Starting ingestion");

        let session = AnalyticSession::new();
        let mut reports = Vec::with_capacity(files.len());
        let mut replaced = false;

        for file in &files {
            let format = match format_hint {
                Some(format) => format,
                None => FileFormat::from_path(file)?,
            };
            let file_mode = if replaced && mode == WriteMode::Overwrite {
                WriteMode::Append
            } else {
                mode
            };

            let (outcome, exit_message, rows) =
                match self.ingest_file(&session, job, file, format, &address, file_mode).await {
                    Ok(summary) => {
                        replaced = true;
                        let message = format!(
                            "Wrote {} rows to {} (version {})",
                            summary.rows, address, summary.version
                        );
                        (RunOutcome::Success, message, summary.rows)
                    }
                    Err(message) => {
                        warn!(file = %file, %message, "Ingestion failed");
                        (RunOutcome::Failure, message, 0)
                    }
                };

            self.recorder
                .audit_run(job, file, run, &exit_message, outcome)
                .await?;

            let archived_to = match (outcome, job.get(ARCHIVE_FOLDER)) {
                (RunOutcome::Success, Some(archive)) => {
                    move_file(self.fs.as_ref(), file, archive, true, true)
                }
                _ => None,
            };

            reports.push(FileRunReport {
                file: file.clone(),
                outcome,
                exit_message,
                rows,
                archived_to,
            });
        }

        Ok(reports)
    }

    async fn ingest_file(
        &self,
        session: &AnalyticSession,
        job: &JobConfig,
        file: &str,
        format: FileFormat,
        address: &TableAddress,
        mode: WriteMode,
    ) -> std::result::Result<WriteSummary, String> {
        let mut df = read_file(format, file).map_err(|e| e.to_string())?;

        for column in column_list(job.get(SIGN_COLUMNS)) {
            fix_trailing_sign_column(&mut df, column).map_err(|e| e.to_string())?;
        }
        for column in column_list(job.get(SERIAL_DATE_COLUMNS)) {
            excel_serial_column(&mut df, column).map_err(|e| e.to_string())?;
        }

        let df = with_load_timestamps(df, session).map_err(|e| e.to_string())?;
        self.writer
            .write_table(&df, address, mode)
            .await
            .map_err(|failure| failure.to_string())
    }
}

/// `"a, b,,c"` -> `["a", "b", "c"]`
fn column_list(value: Option<&str>) -> Vec<&str> {
    value
        .map(|v| v.split(',').map(str::trim).filter(|c| !c.is_empty()).collect())
        .unwrap_or_default()
}
