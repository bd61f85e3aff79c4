//! Execution Context - identity values of the hosted notebook run
//!
//! Everything that used to be read from the runtime's global context is carried
//! by an explicit `ExecutionContext` handed to each component.

use crate::error::{LakehouseError, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Asia::Kolkata;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Civil time zone used for every human-facing timestamp.
pub const LOCAL_TIME_ZONE: &str = "Asia/Kolkata";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Identity of the current run as exposed by the hosting workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
    pub workspace: String,
    pub lakehouse: String,
    pub user: String,
    pub notebook: String,
    /// Set when the notebook was started by a pipeline rather than by hand
    pub is_for_pipeline: bool,
}

impl ExecutionContext {
    pub fn new(
        workspace: impl Into<String>,
        lakehouse: impl Into<String>,
        user: impl Into<String>,
        notebook: impl Into<String>,
        is_for_pipeline: bool,
    ) -> Self {
        Self {
            workspace: workspace.into(),
            lakehouse: lakehouse.into(),
            user: user.into(),
            notebook: notebook.into(),
            is_for_pipeline,
        }
    }

    /// Look up a single property, stamping header/footer with the current time
    pub fn get(&self, property: MetadataProperty) -> String {
        self.get_at(property, Utc::now())
    }

    /// Same as [`ExecutionContext::get`] with an explicit clock reading
    pub fn get_at(&self, property: MetadataProperty, now: DateTime<Utc>) -> String {
        match property {
            MetadataProperty::Workspace => self.workspace.clone(),
            MetadataProperty::Lakehouse => self.lakehouse.clone(),
            MetadataProperty::User => self.user.clone(),
            MetadataProperty::Notebook => self.notebook.clone(),
            MetadataProperty::Header => self.header_at(now),
            MetadataProperty::Footer => self.footer_at(now),
        }
    }

    pub fn header_at(&self, now: DateTime<Utc>) -> String {
        format!(
            "Notebook - '{}' execution started at {} by user - '{}'",
            self.notebook,
            format_ist(now),
            self.user
        )
    }

    pub fn footer_at(&self, now: DateTime<Utc>) -> String {
        format!(
            "Notebook - '{}' execution completed at {}",
            self.notebook,
            format_ist(now)
        )
    }
}

/// Keys accepted by [`get_metadata`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetadataProperty {
    Workspace,
    Lakehouse,
    User,
    Notebook,
    Header,
    Footer,
}

impl FromStr for MetadataProperty {
    type Err = LakehouseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "workspace" => Ok(Self::Workspace),
            "lakehouse" => Ok(Self::Lakehouse),
            "user" => Ok(Self::User),
            "notebook" => Ok(Self::Notebook),
            "header" => Ok(Self::Header),
            "footer" => Ok(Self::Footer),
            _ => Err(LakehouseError::UnknownProperty(s.to_string())),
        }
    }
}

impl fmt::Display for MetadataProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Workspace => "workspace",
            Self::Lakehouse => "lakehouse",
            Self::User => "user",
            Self::Notebook => "notebook",
            Self::Header => "header",
            Self::Footer => "footer",
        };
        f.write_str(name)
    }
}

/// Resolve a case-insensitive property name against the context.
///
/// Unknown names are rejected instead of yielding nothing.
pub fn get_metadata(ctx: &ExecutionContext, property: &str) -> Result<String> {
    let property = property.parse::<MetadataProperty>()?;
    Ok(ctx.get(property))
}

/// Render an instant as Asia/Kolkata civil time (`YYYY-MM-DDTHH:MM:SS`)
pub fn format_ist(instant: DateTime<Utc>) -> String {
    instant.with_timezone(&Kolkata).format(TIMESTAMP_FORMAT).to_string()
}

pub fn ist_now() -> String {
    format_ist(Utc::now())
}

/// Random v4 UUID, used for run ids
pub fn generate_run_id() -> String {
    Uuid::new_v4().to_string()
}
