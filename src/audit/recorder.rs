use crate::audit::record::{AuditRecord, JobConfig, PipelineRunContext, RunOutcome};
use crate::delta::{TableWriter, WriteMode};
use crate::error::Result;
use crate::paths::TableAddress;
use std::sync::Arc;
use tracing::{info, warn};

pub const AUDIT_SCHEMA: &str = "AUDIT";
pub const AUDIT_TABLE: &str = "PIPELINE_RUNS";

pub fn audit_table() -> TableAddress {
    TableAddress::new(AUDIT_SCHEMA, AUDIT_TABLE)
}

/// Appends one row per notebook invocation to `AUDIT.PIPELINE_RUNS`
pub struct AuditRecorder {
    writer: Arc<TableWriter>,
}

impl AuditRecorder {
    pub fn new(writer: Arc<TableWriter>) -> Self {
        Self { writer }
    }

    /// Build and append the audit row for one run.
    ///
    /// Missing job keys are an error. A failed append is logged and otherwise
    /// ignored so that auditing never changes the caller's outcome.
    pub async fn audit_run(
        &self,
        job: &JobConfig,
        file_to_process: &str,
        run: &PipelineRunContext,
        exit_value: &str,
        outcome: RunOutcome,
    ) -> Result<AuditRecord> {
        let ctx = self.writer.resolver().context();
        let record = AuditRecord::build(ctx, job, file_to_process, run, exit_value, outcome)?;
        let row = record.to_dataframe()?;

        match self.writer.write_table(&row, &audit_table(), WriteMode::Append).await {
            Ok(summary) => info!(
                run_id = %record.run_id,
                outcome = %record.outcome,
                version = summary.version,
                "Recorded pipeline run"
            ),
            Err(failure) => warn!(
                run_id = %record.run_id,
                kind = ?failure.kind,
                "Audit row not written: {}",
                failure
            ),
        }

        Ok(record)
    }
}
