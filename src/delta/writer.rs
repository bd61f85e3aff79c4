//! Table Writer - commits polars frames to Delta tables

use crate::delta::convert::dataframe_to_record_batch;
use crate::delta::register_storage_handlers;
use crate::error::{LakehouseError, Result};
use crate::paths::{PathResolver, StorageTarget, TableAddress};
use crate::platform::{CredentialProvider, TokenScope};
use deltalake::protocol::SaveMode;
use deltalake::{DeltaOps, ObjectStore};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::io::Cursor;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteMode {
    Append,
    Overwrite,
}

impl FromStr for WriteMode {
    type Err = LakehouseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "append" => Ok(WriteMode::Append),
            "overwrite" => Ok(WriteMode::Overwrite),
            _ => Err(LakehouseError::InvalidWriteMode(s.to_string())),
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteMode::Append => f.write_str("append"),
            WriteMode::Overwrite => f.write_str("overwrite"),
        }
    }
}

impl From<WriteMode> for SaveMode {
    fn from(mode: WriteMode) -> Self {
        match mode {
            WriteMode::Append => SaveMode::Append,
            WriteMode::Overwrite => SaveMode::Overwrite,
        }
    }
}

/// Stage at which a write gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteFailureKind {
    Credential,
    Conversion,
    Storage,
    Commit,
}

/// Failed write with the context needed to report it.
///
/// Displays as `Error '<message>' occured during write`.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("Error '{message}' occured during write")]
pub struct WriteFailure {
    pub kind: WriteFailureKind,
    pub message: String,
    pub location: String,
    pub schema: String,
    pub table: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteSummary {
    pub location: String,
    pub version: i64,
    pub rows: usize,
}

pub struct TableWriter {
    resolver: PathResolver,
    credentials: Arc<dyn CredentialProvider>,
}

impl TableWriter {
    pub fn new(resolver: PathResolver, credentials: Arc<dyn CredentialProvider>) -> Self {
        register_storage_handlers();
        Self {
            resolver,
            credentials,
        }
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Write `df` to the table at `address`.
    ///
    /// Each call fetches its own storage token. Failures are logged and
    /// returned, never raised. Concurrent writers to one table are left to
    /// Delta's optimistic commit protocol.
    pub async fn write_table(
        &self,
        df: &DataFrame,
        address: &TableAddress,
        mode: WriteMode,
    ) -> std::result::Result<WriteSummary, WriteFailure> {
        let location = self.resolver.resolve(address);
        let fail = |kind: WriteFailureKind, message: String| {
            error!(
                path = %location,
                schema = %address.schema,
                table = %address.table_name,
                ?kind,
                "Error '{}' occured during write",
                message
            );
            WriteFailure {
                kind,
                message,
                location: location.clone(),
                schema: address.schema.clone(),
                table: address.table_name.clone(),
            }
        };

        let token = self
            .credentials
            .token(TokenScope::Storage)
            .map_err(|e| fail(WriteFailureKind::Credential, e.to_string()))?;

        let batch = dataframe_to_record_batch(df)
            .map_err(|e| fail(WriteFailureKind::Conversion, e.to_string()))?;

        let ops = DeltaOps::try_from_uri_with_storage_options(&location, self.storage_options(token))
            .await
            .map_err(|e| fail(WriteFailureKind::Storage, e.to_string()))?;

        let table = ops
            .write(vec![batch])
            .with_save_mode(mode.into())
            .await
            .map_err(|e| fail(WriteFailureKind::Commit, e.to_string()))?;

        info!(
            path = %location,
            table = %address,
            %mode,
            rows = df.height(),
            version = table.version(),
            "Wrote table"
        );

        Ok(WriteSummary {
            location,
            version: table.version(),
            rows: df.height(),
        })
    }

    /// Row count of the current table snapshot
    pub async fn row_count(&self, address: &TableAddress) -> Result<usize> {
        let location = self.resolver.resolve(address);
        let token = match self.resolver.target() {
            StorageTarget::OneLake => self.credentials.token(TokenScope::Storage)?,
            StorageTarget::Mounted => String::new(),
        };
        let table =
            deltalake::open_table_with_storage_options(&location, self.storage_options(token)).await?;

        let store = table.object_store();
        let mut rows = 0;
        for file in table.get_files_iter()? {
            let bytes = store
                .get(&file)
                .await
                .map_err(|e| LakehouseError::Delta(e.to_string()))?
                .bytes()
                .await
                .map_err(|e| LakehouseError::Delta(e.to_string()))?;
            rows += ParquetReader::new(Cursor::new(bytes.to_vec())).finish()?.height();
        }
        Ok(rows)
    }

    fn storage_options(&self, token: String) -> HashMap<String, String> {
        match self.resolver.target() {
            StorageTarget::OneLake => HashMap::from([
                ("bearer_token".to_string(), token),
                ("use_fabric_endpoint".to_string(), "true".to_string()),
            ]),
            StorageTarget::Mounted => HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_mode_parse() {
        assert_eq!("Append".parse::<WriteMode>().unwrap(), WriteMode::Append);
        assert_eq!("OVERWRITE".parse::<WriteMode>().unwrap(), WriteMode::Overwrite);
        assert!(matches!(
            "merge".parse::<WriteMode>(),
            Err(LakehouseError::InvalidWriteMode(m)) if m == "merge"
        ));
    }

    #[test]
    fn test_failure_renders_legacy_message() {
        let failure = WriteFailure {
            kind: WriteFailureKind::Commit,
            message: "schema mismatch".to_string(),
            location: "/lake/Tables/raw/orders".to_string(),
            schema: "raw".to_string(),
            table: "orders".to_string(),
        };
        assert_eq!(failure.to_string(), "Error 'schema mismatch' occured during write");
    }
}
