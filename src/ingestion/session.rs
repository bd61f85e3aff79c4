//! Analytic Session - scoped SQL context over loaded frames

use crate::context::LOCAL_TIME_ZONE;
use crate::error::Result;
use chrono::Utc;
use polars::prelude::*;
use polars::sql::SQLContext;
use tracing::debug;

/// In-memory SQL session. Views registered here live as long as the session.
pub struct AnalyticSession {
    ctx: SQLContext,
    time_zone: String,
}

impl AnalyticSession {
    /// Open a session on the `Asia/Kolkata` clock
    pub fn new() -> Self {
        Self::with_time_zone(LOCAL_TIME_ZONE)
    }

    pub fn with_time_zone(time_zone: &str) -> Self {
        Self {
            ctx: SQLContext::new(),
            time_zone: time_zone.to_string(),
        }
    }

    pub fn time_zone(&self) -> &str {
        &self.time_zone
    }

    /// Current instant as a session-zoned timestamp literal
    pub fn now_literal(&self) -> Expr {
        lit(Utc::now().timestamp_micros()).cast(DataType::Datetime(
            TimeUnit::Microseconds,
            Some(self.time_zone.clone()),
        ))
    }

    pub fn register(&mut self, name: &str, frame: LazyFrame) {
        debug!(view = name, "Registering view");
        self.ctx.register(name, frame);
    }

    pub fn views(&self) -> Vec<String> {
        let mut names = self.ctx.get_tables();
        names.sort();
        names
    }

    pub fn sql(&mut self, query: &str) -> Result<DataFrame> {
        Ok(self.ctx.execute(query)?.collect()?)
    }
}

impl Default for AnalyticSession {
    fn default() -> Self {
        Self::new()
    }
}
