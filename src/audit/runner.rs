use crate::audit::record::{JobConfig, RunOutcome, NOTEBOOK};
use crate::error::Result;
use crate::platform::NotebookRunner;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{error, info};

/// Upper bound for a child notebook run
pub const NOTEBOOK_TIMEOUT: Duration = Duration::from_secs(300);

/// Exit value and outcome of a child notebook, ready for auditing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebookRun {
    pub exit_value: String,
    pub outcome: RunOutcome,
}

/// Run the job's `NOTEBOOK` with `params`.
///
/// Any failure of the child, including a timeout, becomes a `Failure`
/// outcome carrying the error text. Only a missing `NOTEBOOK` key is returned
/// as an error.
pub async fn run_notebook(
    runner: &dyn NotebookRunner,
    job: &JobConfig,
    params: &HashMap<String, String>,
) -> Result<NotebookRun> {
    let notebook = job.require(NOTEBOOK)?;

    let run = match runner.run(notebook, NOTEBOOK_TIMEOUT, params).await {
        Ok(exit_value) => {
            info!(notebook, %exit_value, "Notebook completed");
            NotebookRun {
                exit_value,
                outcome: RunOutcome::Success,
            }
        }
        Err(e) => {
            error!(notebook, error = %e, "Notebook failed");
            NotebookRun {
                exit_value: e.to_string(),
                outcome: RunOutcome::Failure,
            }
        }
    };
    Ok(run)
}
