use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort loading or cleaning before the dashboard opens.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("source data is missing required column(s): {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("{} has no worksheets", .0.display())]
    EmptyWorkbook(PathBuf),

    #[error("no source files configured")]
    NoSources,

    #[error("configuration error: {0}")]
    Configuration(String),
}
