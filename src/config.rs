//! Configuration loaded from the environment (and an optional `.env` file)

use crate::context::ExecutionContext;
use crate::error::{LakehouseError, Result};
use crate::paths::{PathResolver, StorageTarget, DEFAULT_MOUNT_ROOT, DEFAULT_STORAGE_HOST};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct LakehouseConfig {
    pub context: ExecutionContext,
    pub storage_host: String,
    pub mount_root: PathBuf,
    pub target: StorageTarget,
    pub storage_token: Option<String>,
}

impl LakehouseConfig {
    /// Read `LAKEHOUSE_*` variables. Identity variables are required.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` is this over `std::env::var`
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| LakehouseError::Config(format!("{} is not set", key)))
        };

        let is_for_pipeline = match lookup("LAKEHOUSE_IS_PIPELINE") {
            Some(v) => parse_flag(&v)?,
            None => false,
        };

        let context = ExecutionContext {
            workspace: required("LAKEHOUSE_WORKSPACE")?,
            lakehouse: required("LAKEHOUSE_NAME")?,
            user: required("LAKEHOUSE_USER")?,
            notebook: lookup("LAKEHOUSE_NOTEBOOK").unwrap_or_else(|| "interactive".to_string()),
            is_for_pipeline,
        };

        let target = match lookup("LAKEHOUSE_TARGET") {
            Some(v) => v.parse()?,
            None => StorageTarget::OneLake,
        };

        Ok(Self {
            context,
            storage_host: lookup("LAKEHOUSE_STORAGE_HOST")
                .unwrap_or_else(|| DEFAULT_STORAGE_HOST.to_string()),
            mount_root: lookup("LAKEHOUSE_MOUNT_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MOUNT_ROOT)),
            target,
            storage_token: lookup("LAKEHOUSE_STORAGE_TOKEN"),
        })
    }

    pub fn resolver(&self) -> PathResolver {
        PathResolver::new(self.context.clone())
            .with_storage_host(self.storage_host.clone())
            .with_mount_root(self.mount_root.clone())
            .with_target(self.target)
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        other => Err(LakehouseError::Config(format!(
            "LAKEHOUSE_IS_PIPELINE must be a boolean, got '{}'",
            other
        ))),
    }
}
