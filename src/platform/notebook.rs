//! Child notebooks executed as local programs.
//!
//! Parameters are passed as environment variables; the last non-empty stdout
//! line is taken as the notebook's exit value.

use crate::platform::NotebookRunner;
use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

pub struct ProcessNotebookRunner {
    notebook_dir: PathBuf,
}

impl ProcessNotebookRunner {
    pub fn new(notebook_dir: impl Into<PathBuf>) -> Self {
        Self {
            notebook_dir: notebook_dir.into(),
        }
    }
}

#[async_trait]
impl NotebookRunner for ProcessNotebookRunner {
    async fn run(
        &self,
        notebook: &str,
        timeout: Duration,
        params: &HashMap<String, String>,
    ) -> anyhow::Result<String> {
        let program = self.notebook_dir.join(notebook);
        debug!(notebook, program = %program.display(), "Running child notebook");

        let output = tokio::time::timeout(timeout, async {
            Command::new(&program)
                .envs(params)
                .current_dir(&self.notebook_dir)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .output()
                .await
                .with_context(|| format!("failed to start notebook '{}'", notebook))
        })
        .await
        .map_err(|_| anyhow!("notebook '{}' timed out after {}s", notebook, timeout.as_secs()))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "notebook '{}' failed ({}): {}",
                notebook,
                output.status,
                stderr.trim()
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .last()
            .unwrap_or_default()
            .to_string())
    }
}
