//! Platform Services - the hosted runtime behind narrow traits
//!
//! Implementations:
//! - LocalFileSystem: std::fs over a mounted lakehouse folder
//! - StaticTokenProvider: bearer token supplied by configuration
//! - ProcessNotebookRunner: child notebooks run as local programs

pub mod credentials;
pub mod local_fs;
pub mod notebook;

pub use credentials::StaticTokenProvider;
pub use local_fs::LocalFileSystem;
pub use notebook::ProcessNotebookRunner;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// One entry returned by [`FileSystem::ls`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub path: String,
    pub is_dir: bool,
}

/// Hosted filesystem operations
pub trait FileSystem: Send + Sync {
    /// List the direct children of `folder`
    fn ls(&self, folder: &str) -> Result<Vec<FileInfo>>;

    /// Move `src` to the full destination path `dest`
    fn mv(&self, src: &str, dest: &str, create_path: bool, overwrite: bool) -> Result<()>;
}

/// Resource kinds a token can be issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenScope {
    Storage,
}

impl fmt::Display for TokenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenScope::Storage => f.write_str("storage"),
        }
    }
}

/// Issues short-lived bearer tokens. Callers must not cache the result.
pub trait CredentialProvider: Send + Sync {
    fn token(&self, scope: TokenScope) -> Result<String>;
}

/// Runs a child notebook and returns its declared exit value
#[async_trait]
pub trait NotebookRunner: Send + Sync {
    async fn run(
        &self,
        notebook: &str,
        timeout: Duration,
        params: &HashMap<String, String>,
    ) -> anyhow::Result<String>;
}
