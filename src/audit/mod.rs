//! Pipeline Audit
//!
//! One append-only row per notebook invocation in `AUDIT.PIPELINE_RUNS`,
//! plus the catch-all boundary around child notebook runs.

pub mod record;
pub mod recorder;
pub mod runner;

pub use record::{AuditRecord, JobConfig, PipelineRunContext, RunOutcome};
pub use recorder::{audit_table, AuditRecorder, AUDIT_SCHEMA, AUDIT_TABLE};
pub use runner::{run_notebook, NotebookRun, NOTEBOOK_TIMEOUT};
