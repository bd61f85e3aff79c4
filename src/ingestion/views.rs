//! View Builder - raw and profiling views for a quick look at a file

use crate::error::Result;
use crate::ingestion::reader::{read_file_with, FileFormat, ReadOptions};
use crate::ingestion::session::AnalyticSession;
use polars::prelude::*;
use tracing::info;

pub fn raw_view_name(format: FileFormat) -> String {
    format!("{}_raw", format)
}

pub fn summary_view_name(format: FileFormat) -> String {
    format!("{}_summary", format)
}

/// Load `path` and register `<format>_raw` plus `<format>_summary` in the session
pub fn create_preview_views(
    session: &mut AnalyticSession,
    format: FileFormat,
    path: &str,
    options: &ReadOptions,
) -> Result<String> {
    let df = read_file_with(format, path, options)?;
    let summary = summarize(&df)?;

    let raw_name = raw_view_name(format);
    let summary_name = summary_view_name(format);
    session.register(&raw_name, df.lazy());
    session.register(&summary_name, summary.lazy());

    info!(path, raw = %raw_name, summary = %summary_name, "Created preview views");
    Ok(format!(
        "Created views '{}' and '{}' from '{}'",
        raw_name, summary_name, path
    ))
}

/// One row per column with basic profile statistics
pub fn summarize(df: &DataFrame) -> Result<DataFrame> {
    let width = df.width();
    let mut names = Vec::with_capacity(width);
    let mut types = Vec::with_capacity(width);
    let mut mins: Vec<Option<String>> = Vec::with_capacity(width);
    let mut maxs: Vec<Option<String>> = Vec::with_capacity(width);
    let mut avgs: Vec<Option<String>> = Vec::with_capacity(width);
    let mut uniques = Vec::with_capacity(width);
    let mut counts = Vec::with_capacity(width);
    let mut null_counts = Vec::with_capacity(width);
    let mut null_pcts = Vec::with_capacity(width);

    for series in df.get_columns() {
        let name = series.name().to_string();
        let numeric = series.dtype().is_numeric();

        let mut exprs = vec![
            col(&name).min().cast(DataType::String).alias("min"),
            col(&name).max().cast(DataType::String).alias("max"),
        ];
        if numeric {
            exprs.push(col(&name).mean().cast(DataType::String).alias("avg"));
        }
        let stats = df.clone().lazy().select(exprs).collect()?;

        mins.push(first_text(&stats, "min")?);
        maxs.push(first_text(&stats, "max")?);
        avgs.push(if numeric { first_text(&stats, "avg")? } else { None });

        let count = series.len() as u64;
        let nulls = series.null_count() as u64;
        uniques.push(series.n_unique()? as u64);
        counts.push(count);
        null_counts.push(nulls);
        null_pcts.push(if count == 0 {
            0.0
        } else {
            (nulls as f64 / count as f64 * 10000.0).round() / 100.0
        });
        types.push(series.dtype().to_string());
        names.push(name);
    }

    Ok(DataFrame::new(vec![
        Series::new("column_name", names),
        Series::new("column_type", types),
        Series::new("min", mins),
        Series::new("max", maxs),
        Series::new("approx_unique", uniques),
        Series::new("avg", avgs),
        Series::new("count", counts),
        Series::new("null_count", null_counts),
        Series::new("null_percentage", null_pcts),
    ])?)
}

fn first_text(df: &DataFrame, column: &str) -> Result<Option<String>> {
    Ok(df.column(column)?.str()?.get(0).map(|s| s.to_string()))
}
