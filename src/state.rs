use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::clean::CleaningReport;
use crate::data::filter::{FilterState, SalesView, filter_view, init_filter_state};
use crate::data::metrics::{DashboardData, summarize};
use crate::data::model::{SalesTable, Text};
use crate::data::pipeline::run_pipeline;

// ---------------------------------------------------------------------------
// Tabs and multi-select columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    ProductAnalysis,
    SalesRevenue,
    CustomerOrders,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::ProductAnalysis, Tab::SalesRevenue, Tab::CustomerOrders];

    pub fn title(self) -> &'static str {
        match self {
            Tab::ProductAnalysis => "Product Analysis",
            Tab::SalesRevenue => "Sales & Revenue",
            Tab::CustomerOrders => "Customer & Orders",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterColumn {
    Region,
    Category,
}

impl FilterColumn {
    pub fn label(self) -> &'static str {
        match self {
            FilterColumn::Region => "Select Region",
            FilterColumn::Category => "Select Product Category",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// One interactive session, independent of rendering. The canonical table is
/// shared read-only; every filter change re-derives the view and its numbers.
pub struct AppState {
    pub config: DashboardConfig,

    /// Cleaned table. Replaced wholesale on reload, never edited.
    pub table: Arc<SalesTable>,

    /// What the last cleaning run did.
    pub report: CleaningReport,

    pub filters: FilterState,

    /// Indices of records passing the current filters.
    pub visible_indices: Vec<usize>,

    /// KPIs and chart series for `visible_indices`.
    pub dashboard: DashboardData,

    /// Region colours for the scatter plot.
    pub region_colors: ColorMap,

    pub active_tab: Tab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig, table: SalesTable, report: CleaningReport) -> Self {
        let table = Arc::new(table);
        let filters = init_filter_state(&table, config.year_bounds());
        let view = filter_view(&table, &filters);
        let dashboard = summarize(&view);
        let visible_indices = view.indices;
        Self {
            config,
            region_colors: ColorMap::new(&table.regions),
            table,
            report,
            filters,
            visible_indices,
            dashboard,
            active_tab: Tab::ProductAnalysis,
            status_message: None,
        }
    }

    /// Swap in a freshly cleaned table and reset filters to "everything".
    pub fn set_table(&mut self, table: SalesTable, report: CleaningReport) {
        self.filters = init_filter_state(&table, self.config.year_bounds());
        self.region_colors = ColorMap::new(&table.regions);
        self.table = Arc::new(table);
        self.report = report;
        self.status_message = None;
        self.refilter();
    }

    /// The current filtered view.
    pub fn view(&self) -> SalesView<'_> {
        SalesView {
            table: &self.table,
            indices: self.visible_indices.clone(),
        }
    }

    /// Recompute the view, KPIs and chart series after a filter change.
    pub fn refilter(&mut self) {
        let view = filter_view(&self.table, &self.filters);
        self.dashboard = summarize(&view);
        self.visible_indices = view.indices;
        log::debug!(
            "Filters {:?} -> {} of {} rows",
            self.filters.year_range,
            self.visible_indices.len(),
            self.table.len()
        );
    }

    // -- year range --

    /// Move the lower bound, dragging the upper bound along if needed.
    pub fn set_year_from(&mut self, year: i32) {
        let (min, max) = self.config.year_bounds();
        let from = year.clamp(min, max);
        let to = self.filters.year_range.1.max(from);
        self.set_year_range(from, to);
    }

    /// Move the upper bound, dragging the lower bound along if needed.
    pub fn set_year_to(&mut self, year: i32) {
        let (min, max) = self.config.year_bounds();
        let to = year.clamp(min, max);
        let from = self.filters.year_range.0.min(to);
        self.set_year_range(from, to);
    }

    fn set_year_range(&mut self, from: i32, to: i32) {
        if self.filters.year_range != (from, to) {
            self.filters.year_range = (from, to);
            self.refilter();
        }
    }

    // -- multi-selects --

    /// Every observed value of `column`.
    pub fn domain(&self, column: FilterColumn) -> &BTreeSet<Text> {
        match column {
            FilterColumn::Region => &self.table.regions,
            FilterColumn::Category => &self.table.categories,
        }
    }

    pub fn selected(&self, column: FilterColumn) -> &BTreeSet<Text> {
        match column {
            FilterColumn::Region => &self.filters.regions,
            FilterColumn::Category => &self.filters.categories,
        }
    }

    fn selected_mut(&mut self, column: FilterColumn) -> &mut BTreeSet<Text> {
        match column {
            FilterColumn::Region => &mut self.filters.regions,
            FilterColumn::Category => &mut self.filters.categories,
        }
    }

    /// Toggle a single value in a column's selection.
    pub fn toggle_filter_value(&mut self, column: FilterColumn, value: &Text) {
        let selected = self.selected_mut(column);
        if !selected.remove(value) {
            selected.insert(value.clone());
        }
        self.refilter();
    }

    /// Select all values in a column.
    pub fn select_all(&mut self, column: FilterColumn) {
        let all = self.domain(column).clone();
        *self.selected_mut(column) = all;
        self.refilter();
    }

    /// Deselect all values in a column.
    pub fn select_none(&mut self, column: FilterColumn) {
        self.selected_mut(column).clear();
        self.refilter();
    }

    // -- reload --

    /// Re-run the pipeline on `sources`. On failure the current table stays
    /// and the error is shown in the status line.
    pub fn reload_sources(&mut self, sources: Vec<PathBuf>) {
        match run_pipeline(&self.config, &sources) {
            Ok((table, report)) => {
                log::info!("Reloaded {} rows from {} sources", table.len(), sources.len());
                self.config.sources = sources;
                self.set_table(table, report);
            }
            Err(e) => {
                log::error!("Failed to reload sources: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::model::{SalesRecord, TableSchema};

    fn record(id: &str, year: i32, region: &str, category: &str, sales: f64) -> SalesRecord {
        SalesRecord {
            order_id: Some(id.into()),
            order_date: NaiveDate::from_ymd_opt(year, 3, 1).and_then(|d| d.and_hms_opt(0, 0, 0)),
            ship_date: NaiveDate::from_ymd_opt(year, 3, 2).and_then(|d| d.and_hms_opt(0, 0, 0)),
            region: Some(region.into()),
            product_category: Some(category.into()),
            sales: Some(sales),
            ..Default::default()
        }
    }

    fn state() -> AppState {
        let table = SalesTable::from_records(
            TableSchema::default(),
            vec![
                record("1", 2009, "West", "Furniture", 10.0),
                record("2", 2010, "Atlantic", "Technology", 20.0),
                record("3", 2012, "West", "Technology", 40.0),
            ],
        );
        AppState::new(DashboardConfig::default(), table, CleaningReport::default())
    }

    #[test]
    fn new_session_shows_everything() {
        let s = state();
        assert_eq!(s.visible_indices, vec![0, 1, 2]);
        assert_eq!(s.dashboard.kpis.total_sales, 70.0);
        assert_eq!(s.filters.year_range, (2009, 2012));
    }

    #[test]
    fn toggling_a_region_recomputes_kpis() {
        let mut s = state();
        s.toggle_filter_value(FilterColumn::Region, &Text::from("West"));
        assert_eq!(s.visible_indices, vec![1]);
        assert_eq!(s.dashboard.kpis.total_sales, 20.0);

        s.toggle_filter_value(FilterColumn::Region, &Text::from("West"));
        assert_eq!(s.visible_indices, vec![0, 1, 2]);
    }

    #[test]
    fn select_none_then_all() {
        let mut s = state();
        s.select_none(FilterColumn::Category);
        assert!(s.visible_indices.is_empty());
        assert_eq!(s.dashboard.kpis.total_orders, 0);
        assert_eq!(s.dashboard.kpis.total_sales_label(), "$0");

        s.select_all(FilterColumn::Category);
        assert_eq!(s.visible_indices.len(), 3);
    }

    #[test]
    fn year_bounds_stay_ordered_and_clamped() {
        let mut s = state();
        s.set_year_to(2010);
        assert_eq!(s.filters.year_range, (2009, 2010));
        assert_eq!(s.visible_indices, vec![0, 1]);

        s.set_year_from(2011);
        assert_eq!(s.filters.year_range, (2011, 2011));
        assert!(s.visible_indices.is_empty());

        s.set_year_from(1990);
        assert_eq!(s.filters.year_range, (2009, 2011));
        s.set_year_to(2050);
        assert_eq!(s.filters.year_range, (2009, 2012));
    }

    #[test]
    fn filtering_never_touches_the_canonical_table() {
        let mut s = state();
        let before = Arc::clone(&s.table);
        s.select_none(FilterColumn::Region);
        s.set_year_to(2009);
        assert!(Arc::ptr_eq(&before, &s.table));
        assert_eq!(s.table.len(), 3);
    }

    #[test]
    fn failed_reload_keeps_previous_table() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = state();
        s.config.snapshot_path = dir.path().join("cleaned_data.csv");

        s.reload_sources(vec![dir.path().join("missing.csv")]);
        assert_eq!(s.table.len(), 3);
        assert!(s.status_message.as_deref().unwrap().contains("missing.csv"));
        assert_eq!(s.config.sources.len(), 4);
    }

    #[test]
    fn successful_reload_replaces_table_and_resets_filters() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("2011.csv");
        std::fs::write(
            &src,
            "Order ID,Order Date,Ship Date,Order Priority,Customer Name,Province,Region,Product Category,Product Name,Sales,Profit,Discount\n\
             9,2011-04-01,2011-04-05,Low,Dee,Yukon,Yukon,Furniture,Lamp,12,1,0\n",
        )
        .unwrap();

        let mut s = state();
        s.config.snapshot_path = dir.path().join("cleaned_data.csv");
        s.select_none(FilterColumn::Region);
        s.status_message = Some("old".into());

        s.reload_sources(vec![src.clone()]);
        assert_eq!(s.table.len(), 1);
        assert_eq!(s.visible_indices, vec![0]);
        assert!(s.filters.regions.contains("Yukon"));
        assert_eq!(s.config.sources, vec![src]);
        assert_eq!(s.status_message, None);
        assert!(s.config.snapshot_path.exists());
    }
}
