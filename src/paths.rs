//! Path Resolver - canonical locations for lakehouse tables

use crate::context::ExecutionContext;
use crate::error::{LakehouseError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_STORAGE_HOST: &str = "onelake.dfs.fabric.microsoft.com";
pub const DEFAULT_MOUNT_ROOT: &str = "/lakehouse/default";

/// `schema.table` pair naming a lakehouse table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableAddress {
    pub schema: String,
    pub table_name: String,
}

impl TableAddress {
    pub fn new(schema: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table_name: table_name.into(),
        }
    }
}

impl fmt::Display for TableAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table_name)
    }
}

/// `abfss://<workspace>@<host>/<lakehouse>.Lakehouse/Tables/<schema>/<table>`
pub fn table_storage_path(ctx: &ExecutionContext, address: &TableAddress) -> String {
    storage_path_on_host(ctx, DEFAULT_STORAGE_HOST, address)
}

pub fn storage_path_on_host(ctx: &ExecutionContext, host: &str, address: &TableAddress) -> String {
    format!(
        "abfss://{}@{}/{}.Lakehouse/Tables/{}/{}",
        ctx.workspace, host, ctx.lakehouse, address.schema, address.table_name
    )
}

/// `/lakehouse/default/Tables/<schema>/<table>`
pub fn local_table_path(address: &TableAddress) -> String {
    mounted_path_under(DEFAULT_MOUNT_ROOT, address)
}

pub fn mounted_path_under(root: &str, address: &TableAddress) -> String {
    format!(
        "{}/Tables/{}/{}",
        root.trim_end_matches('/'),
        address.schema,
        address.table_name
    )
}

/// Where table writes land
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageTarget {
    /// Remote OneLake URI, needs a bearer token
    OneLake,
    /// Locally mounted lakehouse folder
    Mounted,
}

impl FromStr for StorageTarget {
    type Err = LakehouseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "onelake" | "remote" => Ok(Self::OneLake),
            "mounted" | "local" => Ok(Self::Mounted),
            other => Err(LakehouseError::Config(format!(
                "unknown storage target '{}', expected 'onelake' or 'mounted'",
                other
            ))),
        }
    }
}

/// Resolves table addresses against one execution context
#[derive(Debug, Clone)]
pub struct PathResolver {
    ctx: ExecutionContext,
    storage_host: String,
    mount_root: PathBuf,
    target: StorageTarget,
}

impl PathResolver {
    pub fn new(ctx: ExecutionContext) -> Self {
        Self {
            ctx,
            storage_host: DEFAULT_STORAGE_HOST.to_string(),
            mount_root: PathBuf::from(DEFAULT_MOUNT_ROOT),
            target: StorageTarget::OneLake,
        }
    }

    pub fn with_storage_host(mut self, host: impl Into<String>) -> Self {
        self.storage_host = host.into();
        self
    }

    pub fn with_mount_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.mount_root = root.into();
        self
    }

    pub fn with_target(mut self, target: StorageTarget) -> Self {
        self.target = target;
        self
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.ctx
    }

    pub fn target(&self) -> StorageTarget {
        self.target
    }

    pub fn storage_path(&self, address: &TableAddress) -> String {
        storage_path_on_host(&self.ctx, &self.storage_host, address)
    }

    pub fn mounted_path(&self, address: &TableAddress) -> String {
        mounted_path_under(&self.mount_root.to_string_lossy(), address)
    }

    /// Location used for reads and writes under the configured target
    pub fn resolve(&self, address: &TableAddress) -> String {
        match self.target {
            StorageTarget::OneLake => self.storage_path(address),
            StorageTarget::Mounted => self.mounted_path(address),
        }
    }
}
