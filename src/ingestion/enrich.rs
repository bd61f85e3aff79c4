//! Load timestamps stamped onto a frame right before it is written.
//!
//! Readers never add these columns; the ingestion pipeline calls
//! [`with_load_timestamps`] once per file, just before the Delta write.

use crate::error::Result;
use crate::ingestion::session::AnalyticSession;
use polars::prelude::*;

pub const LOAD_TS_COLUMN: &str = "LOAD_TS";
pub const UPDATE_TS_COLUMN: &str = "UPDATE_TS";

/// Append `LOAD_TS` and `UPDATE_TS`, both set to the session clock
pub fn with_load_timestamps(df: DataFrame, session: &AnalyticSession) -> Result<DataFrame> {
    let now = session.now_literal();
    Ok(df
        .lazy()
        .with_columns([
            now.clone().alias(LOAD_TS_COLUMN),
            now.alias(UPDATE_TS_COLUMN),
        ])
        .collect()?)
}
