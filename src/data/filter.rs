use std::collections::BTreeSet;

use super::model::{SalesRecord, SalesTable, Text};

// ---------------------------------------------------------------------------
// Filter selections
// ---------------------------------------------------------------------------

/// The three sidebar selections. They combine with AND; an empty region or
/// category set matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    /// Inclusive `(from, to)` order years.
    pub year_range: (i32, i32),
    pub regions: BTreeSet<Text>,
    pub categories: BTreeSet<Text>,
}

/// Initialise a [`FilterState`] with every observed value selected and the
/// full slider span.
pub fn init_filter_state(table: &SalesTable, year_bounds: (i32, i32)) -> FilterState {
    FilterState {
        year_range: year_bounds,
        regions: table.regions.clone(),
        categories: table.categories.clone(),
    }
}

impl FilterState {
    /// A record passes when its order year is in range and its region and
    /// category are both selected. Missing values never match.
    pub fn matches(&self, rec: &SalesRecord) -> bool {
        let (from, to) = self.year_range;
        let year_ok = rec.order_year().is_some_and(|y| from <= y && y <= to);
        let region_ok = rec.region.as_ref().is_some_and(|r| self.regions.contains(r));
        let category_ok = rec
            .product_category
            .as_ref()
            .is_some_and(|c| self.categories.contains(c));
        year_ok && region_ok && category_ok
    }
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// A read-only selection of rows from the canonical table.
#[derive(Debug, Clone)]
pub struct SalesView<'a> {
    pub table: &'a SalesTable,
    pub indices: Vec<usize>,
}

impl<'a> SalesView<'a> {
    pub fn records(&self) -> impl Iterator<Item = &'a SalesRecord> + '_ {
        let table = self.table;
        self.indices.iter().map(move |&i| &table.records[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Return indices of records that pass all filters, in table order.
pub fn filtered_indices(table: &SalesTable, filters: &FilterState) -> Vec<usize> {
    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| filters.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

/// Derive the filtered view. The table itself is never touched.
pub fn filter_view<'a>(table: &'a SalesTable, filters: &FilterState) -> SalesView<'a> {
    SalesView {
        table,
        indices: filtered_indices(table, filters),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::model::TableSchema;

    fn record(year: i32, region: &str, category: &str) -> SalesRecord {
        SalesRecord {
            order_date: NaiveDate::from_ymd_opt(year, 6, 1).and_then(|d| d.and_hms_opt(0, 0, 0)),
            ship_date: NaiveDate::from_ymd_opt(year, 6, 3).and_then(|d| d.and_hms_opt(0, 0, 0)),
            region: Some(region.into()),
            product_category: Some(category.into()),
            sales: Some(1.0),
            ..Default::default()
        }
    }

    fn table() -> SalesTable {
        SalesTable::from_records(
            TableSchema::default(),
            vec![
                record(2009, "West", "Furniture"),
                record(2010, "Atlantic", "Technology"),
                record(2011, "West", "Technology"),
                record(2012, "Quebec", "Office Supplies"),
            ],
        )
    }

    #[test]
    fn default_filters_select_everything() {
        let t = table();
        let filters = init_filter_state(&t, (2009, 2012));
        assert_eq!(filtered_indices(&t, &filters), vec![0, 1, 2, 3]);
    }

    #[test]
    fn year_bounds_are_inclusive() {
        let t = table();
        let mut filters = init_filter_state(&t, (2009, 2012));
        filters.year_range = (2010, 2011);
        assert_eq!(filtered_indices(&t, &filters), vec![1, 2]);
        filters.year_range = (2012, 2012);
        assert_eq!(filtered_indices(&t, &filters), vec![3]);
    }

    #[test]
    fn filters_combine_with_and() {
        let t = table();
        let mut filters = init_filter_state(&t, (2009, 2012));
        filters.regions = BTreeSet::from([Text::from("West")]);
        filters.categories = BTreeSet::from([Text::from("Technology")]);
        let view = filter_view(&t, &filters);
        assert_eq!(view.indices, vec![2]);
        assert_eq!(view.records().next().unwrap().order_year(), Some(2011));
    }

    #[test]
    fn empty_selection_matches_nothing() {
        let t = table();
        let mut filters = init_filter_state(&t, (2009, 2012));
        filters.regions.clear();
        assert!(filter_view(&t, &filters).is_empty());

        let mut filters = init_filter_state(&t, (2009, 2012));
        filters.regions = BTreeSet::from([Text::from("Yukon")]);
        assert!(filter_view(&t, &filters).is_empty());
    }

    #[test]
    fn missing_region_never_matches() {
        let mut rec = record(2010, "West", "Furniture");
        rec.region = None;
        let t = SalesTable::from_records(TableSchema::default(), vec![rec]);
        let mut filters = init_filter_state(&t, (2009, 2012));
        filters.regions.insert("West".into());
        assert!(filtered_indices(&t, &filters).is_empty());
    }
}
