use std::path::PathBuf;

use anyhow::{Context, Result};

use super::clean::{CleaningReport, CleaningRules, clean};
use super::loader::load_sources;
use super::model::SalesTable;
use super::snapshot::write_snapshot;
use crate::config::DashboardConfig;

/// Load `sources`, clean them with the rules from `config`, and overwrite the
/// snapshot. Any failure aborts the whole run; nothing is partially applied
/// to an existing table.
pub fn run_pipeline(
    config: &DashboardConfig,
    sources: &[PathBuf],
) -> Result<(SalesTable, CleaningReport)> {
    let rules = CleaningRules::from_config(config)?;
    let raw = load_sources(sources)?;
    let (table, report) = clean(raw, &rules)?;

    write_snapshot(&config.snapshot_path, &table.schema, &table.records)
        .with_context(|| format!("writing snapshot {}", config.snapshot_path.display()))?;

    Ok((table, report))
}
