pub mod audit;
pub mod cleaning;
pub mod config;
pub mod context;
pub mod delta;
pub mod error;
pub mod ingestion;
pub mod observability;
pub mod paths;
pub mod pipeline;
pub mod platform;
pub mod relocation;

pub use config::LakehouseConfig;
pub use context::{get_metadata, ExecutionContext, MetadataProperty};
pub use error::{LakehouseError, Result};
pub use paths::{PathResolver, StorageTarget, TableAddress};
pub use pipeline::{FileRunReport, IngestionPipeline};
