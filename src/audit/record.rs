//! Audit record types

use crate::context::{generate_run_id, ist_now, ExecutionContext};
use crate::error::{LakehouseError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub const DATA_SOURCE: &str = "DATA_SOURCE";
pub const NOTEBOOK: &str = "NOTEBOOK";
pub const TARGET_SCHEMA: &str = "TARGET_SCHEMA";
pub const TARGET_OBJECT: &str = "TARGET_OBJECT";
pub const WRITE_MODE: &str = "WRITE_MODE";

/// Job keys projected into every audit row
pub const AUDIT_KEYS: [&str; 5] = [DATA_SOURCE, NOTEBOOK, TARGET_SCHEMA, TARGET_OBJECT, WRITE_MODE];

/// String parameters describing one ingestion job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobConfig(HashMap<String, String>);

impl JobConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Value for `key`, or `MissingConfigKey`
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| LakehouseError::MissingConfigKey(key.to_string()))
    }

    /// Fails on the first of `keys` that is missing
    pub fn require_all(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            self.require(key)?;
        }
        Ok(())
    }

    pub fn as_map(&self) -> &HashMap<String, String> {
        &self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for JobConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunOutcome {
    Success,
    Failure,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Success => f.write_str("SUCCESS"),
            RunOutcome::Failure => f.write_str("FAILURE"),
        }
    }
}

/// Trigger metadata handed down by the orchestrating pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRunContext {
    pub run_id: String,
    pub trigger_time: String,
    pub pipeline_name: String,
    pub trigger_type: String,
}

impl PipelineRunContext {
    /// Context for a run started by hand from a notebook
    pub fn manual(ctx: &ExecutionContext) -> Self {
        Self {
            run_id: generate_run_id(),
            trigger_time: ist_now(),
            pipeline_name: ctx.notebook.clone(),
            trigger_type: "Manual".to_string(),
        }
    }
}

/// One row of `AUDIT.PIPELINE_RUNS`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub run_id: String,
    pub trigger_time: String,
    pub pipeline_name: String,
    pub trigger_type: String,
    pub is_pipeline_triggered: bool,
    pub executed_by: String,
    pub data_source: String,
    pub notebook: String,
    pub target_schema: String,
    pub target_object: String,
    pub write_mode: String,
    pub input_file: String,
    pub exit_message: String,
    pub outcome: RunOutcome,
}

impl AuditRecord {
    /// Assemble a record; every projected job key must be present.
    pub fn build(
        ctx: &ExecutionContext,
        job: &JobConfig,
        input_file: &str,
        run: &PipelineRunContext,
        exit_message: &str,
        outcome: RunOutcome,
    ) -> Result<Self> {
        Ok(Self {
            run_id: run.run_id.clone(),
            trigger_time: run.trigger_time.clone(),
            pipeline_name: run.pipeline_name.clone(),
            trigger_type: run.trigger_type.clone(),
            is_pipeline_triggered: ctx.is_for_pipeline,
            executed_by: ctx.user.clone(),
            data_source: job.require(DATA_SOURCE)?.to_string(),
            notebook: job.require(NOTEBOOK)?.to_string(),
            target_schema: job.require(TARGET_SCHEMA)?.to_string(),
            target_object: job.require(TARGET_OBJECT)?.to_string(),
            write_mode: job.require(WRITE_MODE)?.to_string(),
            input_file: input_file.to_string(),
            exit_message: exit_message.to_string(),
            outcome,
        })
    }

    pub fn to_dataframe(&self) -> Result<DataFrame> {
        Ok(df![
            "RUN_ID" => [self.run_id.as_str()],
            "TRIGGER_TIME" => [self.trigger_time.as_str()],
            "PIPELINE_NAME" => [self.pipeline_name.as_str()],
            "TRIGGER_TYPE" => [self.trigger_type.as_str()],
            "IS_PIPELINE_TRIGGERED" => [self.is_pipeline_triggered],
            "EXECUTED_BY" => [self.executed_by.as_str()],
            "DATA_SOURCE" => [self.data_source.as_str()],
            "NOTEBOOK" => [self.notebook.as_str()],
            "TARGET_SCHEMA" => [self.target_schema.as_str()],
            "TARGET_OBJECT" => [self.target_object.as_str()],
            "WRITE_MODE" => [self.write_mode.as_str()],
            "INPUT_FILE" => [self.input_file.as_str()],
            "EXIT_MESSAGE" => [self.exit_message.as_str()],
            "OUTCOME" => [self.outcome.to_string()]
        ]?)
    }
}
