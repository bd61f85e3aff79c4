//! Delta Module - versioned table writes
//!
//! Frames are converted to Arrow and handed to `deltalake`; the transaction
//! log, schema enforcement and conflict detection all live there.

pub mod convert;
pub mod writer;

pub use convert::dataframe_to_record_batch;
pub use writer::{TableWriter, WriteFailure, WriteFailureKind, WriteMode, WriteSummary};

use std::sync::Once;

static REGISTER_HANDLERS: Once = Once::new();

/// Make `abfss://` URIs resolvable. Safe to call repeatedly.
pub fn register_storage_handlers() {
    REGISTER_HANDLERS.call_once(|| {
        deltalake::azure::register_handlers(None);
    });
}
