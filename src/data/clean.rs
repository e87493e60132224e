use std::collections::HashSet;

use chrono::NaiveDateTime;

use super::model::{
    CellValue, ColumnKind, ColumnSlot, RawTable, SalesColumn, SalesRecord, SalesTable,
    TableSchema, Text,
};
use crate::config::DashboardConfig;
use crate::error::DashboardError;

/// Order priority value that carries no information.
pub const UNSPECIFIED_PRIORITY: &str = "Not Specified";

/// Spelling fixes that are always applied.
const BUILTIN_CORRECTIONS: &[(SalesColumn, &str, &str)] = &[
    (SalesColumn::Province, "Saskachewan", "Saskatchewan"),
    (SalesColumn::Region, "Prarie", "Prairie"),
];

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Replace exactly `from` with `to` in one text column.
#[derive(Debug, Clone, PartialEq)]
pub struct Correction {
    pub column: SalesColumn,
    pub from: String,
    pub to: Text,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CleaningRules {
    pub corrections: Vec<Correction>,
    pub default_priority: Text,
}

impl Default for CleaningRules {
    fn default() -> Self {
        Self {
            corrections: BUILTIN_CORRECTIONS
                .iter()
                .map(|&(column, from, to)| Correction {
                    column,
                    from: from.to_string(),
                    to: Text::from(to),
                })
                .collect(),
            default_priority: Text::from("Medium"),
        }
    }
}

impl CleaningRules {
    /// Built-in rules extended with the corrections from `config`.
    pub fn from_config(config: &DashboardConfig) -> Result<Self, DashboardError> {
        let mut rules = Self {
            default_priority: Text::from(config.default_priority.as_str()),
            ..Self::default()
        };
        for rule in &config.corrections {
            let column = SalesColumn::from_header(&rule.column)
                .filter(|c| c.kind() == ColumnKind::Text)
                .ok_or_else(|| {
                    DashboardError::Configuration(format!(
                        "correction targets unknown or non-text column '{}'",
                        rule.column
                    ))
                })?;
            rules.corrections.push(Correction {
                column,
                from: rule.from.clone(),
                to: Text::from(rule.to.as_str()),
            });
        }
        Ok(rules)
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// What each cleaning step changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleaningReport {
    pub rows_loaded: usize,
    pub duplicates_removed: usize,
    pub values_corrected: usize,
    pub distinct_categories: usize,
    pub discounts_clamped: usize,
    pub base_margins_imputed: usize,
    pub base_margin_fill: Option<f64>,
    pub invalid_date_rows_dropped: usize,
    pub priorities_remapped: usize,
    pub rows_retained: usize,
}

impl CleaningReport {
    pub fn log(&self) {
        log::info!(
            "Cleaned {} rows -> {} rows ({} duplicates, {} rows with missing or inverted dates dropped)",
            self.rows_loaded,
            self.rows_retained,
            self.duplicates_removed,
            self.invalid_date_rows_dropped
        );
        log::info!(
            "Corrected {} spellings, clamped {} discounts, remapped {} priorities, {} distinct categories",
            self.values_corrected,
            self.discounts_clamped,
            self.priorities_remapped,
            self.distinct_categories
        );
        if let Some(fill) = self.base_margin_fill {
            log::info!(
                "Imputed {} product base margins with mean {fill:.4}",
                self.base_margins_imputed
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Turn the concatenated source rows into the canonical table.
///
/// Steps run in a fixed order; later steps rely on the normalisation done by
/// earlier ones. Malformed dates and numbers never fail: they become `None`.
pub fn clean(
    raw: RawTable,
    rules: &CleaningRules,
) -> Result<(SalesTable, CleaningReport), DashboardError> {
    let mut report = CleaningReport {
        rows_loaded: raw.len(),
        ..Default::default()
    };

    let (schema, mut rows) = parse_rows(raw)?;
    rows.sort_by_key(|r| ship_date_key(&r.record));
    report.duplicates_removed = drop_duplicate_rows(&mut rows);
    let mut records: Vec<SalesRecord> = rows.into_iter().map(|r| r.record).collect();
    report.values_corrected = apply_corrections(&mut records, &rules.corrections);
    report.distinct_categories = intern_categories(&schema, &mut records);
    report.discounts_clamped = clamp_discounts(&mut records);
    if schema.has_column(SalesColumn::ProductBaseMargin) {
        let (imputed, fill) = impute_base_margin(&mut records);
        report.base_margins_imputed = imputed;
        report.base_margin_fill = fill;
    }
    report.invalid_date_rows_dropped = drop_invalid_ship_dates(&mut records);
    sort_by_order_date(&mut records);
    // Vector positions are the dense 0-based row index from here on.
    report.priorities_remapped = map_unspecified_priority(&mut records, &rules.default_priority);
    report.rows_retained = records.len();

    report.log();
    Ok((SalesTable::from_records(schema, records), report))
}

/// A typed record together with the cells it was parsed from.
///
/// `key` is the source row with only the two date cells replaced by their
/// parsed values. Rows that differ in any other cell, even in ways the typed
/// record cannot see (two different unparseable margins, say), keep distinct
/// keys.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    pub record: SalesRecord,
    pub key: Vec<CellValue>,
}

/// Check the header set and convert every row to a typed record.
/// Dates and numbers that fail to parse are stored as `None`.
pub fn parse_records(raw: RawTable) -> Result<(TableSchema, Vec<SalesRecord>), DashboardError> {
    let (schema, rows) = parse_rows(raw)?;
    Ok((schema, rows.into_iter().map(|r| r.record).collect()))
}

/// Like [`parse_records`], keeping each row's dedupe key.
pub fn parse_rows(raw: RawTable) -> Result<(TableSchema, Vec<SourceRow>), DashboardError> {
    let schema = TableSchema::from_headers(&raw.headers);

    let missing: Vec<String> = SalesColumn::ALL
        .into_iter()
        .filter(|c| c.is_required() && !schema.has_column(*c))
        .map(|c| c.header().to_string())
        .collect();
    if !missing.is_empty() {
        return Err(DashboardError::MissingColumns { columns: missing });
    }

    let n_extra = schema.extra_count();
    let rows = raw
        .rows
        .into_iter()
        .map(|mut row| {
            let mut rec = SalesRecord {
                extra: Vec::with_capacity(n_extra),
                ..Default::default()
            };
            for (slot, cell) in schema.slots.iter().zip(&row) {
                match slot {
                    ColumnSlot::Known(col) => rec.set(*col, cell),
                    ColumnSlot::Extra(_) => rec.extra.push(cell.clone()),
                }
            }
            rec.extra.resize(n_extra, CellValue::Null);

            row.resize(schema.slots.len(), CellValue::Null);
            for (slot, cell) in schema.slots.iter().zip(row.iter_mut()) {
                if let ColumnSlot::Known(col @ (SalesColumn::OrderDate | SalesColumn::ShipDate)) = slot {
                    *cell = rec.cell(*col);
                }
            }
            SourceRow { record: rec, key: row }
        })
        .collect();

    Ok((schema, rows))
}

/// Ship date first, missing dates last.
fn ship_date_key(record: &SalesRecord) -> (bool, Option<NaiveDateTime>) {
    (record.ship_date.is_none(), record.ship_date)
}

/// Stable sort by order date, missing dates last.
pub fn sort_by_order_date(records: &mut [SalesRecord]) {
    records.sort_by_key(|r| (r.order_date.is_none(), r.order_date));
}

/// Remove rows whose source cells equal an earlier row's across every column.
/// Returns the count removed.
pub fn drop_duplicate_rows(rows: &mut Vec<SourceRow>) -> usize {
    let before = rows.len();
    let mut seen: HashSet<Vec<CellValue>> = HashSet::with_capacity(before);
    rows.retain(|r| seen.insert(r.key.clone()));
    before - rows.len()
}

/// Apply the exact-match spelling fixes. Values not listed pass through.
pub fn apply_corrections(records: &mut [SalesRecord], corrections: &[Correction]) -> usize {
    let mut changed = 0;
    for rec in records.iter_mut() {
        for fix in corrections {
            if let Some(Some(value)) = rec.text_mut(fix.column) {
                if **value == *fix.from && *value != fix.to {
                    *value = fix.to.clone();
                    changed += 1;
                }
            }
        }
    }
    changed
}

/// Share one allocation per distinct categorical value. Columns absent from
/// the source are skipped. Returns the number of distinct values.
pub fn intern_categories(schema: &TableSchema, records: &mut [SalesRecord]) -> usize {
    let columns: Vec<SalesColumn> = SalesColumn::CATEGORICAL
        .into_iter()
        .filter(|c| schema.has_column(*c))
        .collect();

    let mut pool: HashSet<Text> = HashSet::new();
    for rec in records.iter_mut() {
        for col in &columns {
            if let Some(Some(value)) = rec.text_mut(*col) {
                match pool.get(&**value) {
                    Some(shared) => *value = shared.clone(),
                    None => {
                        pool.insert(value.clone());
                    }
                }
            }
        }
    }
    pool.len()
}

/// Clamp discounts into `[0, 1]`. Returns the number of values changed.
pub fn clamp_discounts(records: &mut [SalesRecord]) -> usize {
    let mut clamped = 0;
    for discount in records.iter_mut().filter_map(|r| r.discount.as_mut()) {
        let bounded = discount.clamp(0.0, 1.0);
        if bounded != *discount {
            *discount = bounded;
            clamped += 1;
        }
    }
    clamped
}

/// Fill missing base margins with the mean of the present ones.
/// With no present values there is nothing to fill with and rows stay missing.
pub fn impute_base_margin(records: &mut [SalesRecord]) -> (usize, Option<f64>) {
    let (sum, count) = records
        .iter()
        .filter_map(|r| r.product_base_margin)
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        return (0, None);
    }
    let mean = sum / count as f64;

    let mut imputed = 0;
    for rec in records.iter_mut().filter(|r| r.product_base_margin.is_none()) {
        rec.product_base_margin = Some(mean);
        imputed += 1;
    }
    (imputed, Some(mean))
}

/// Keep only rows that ship on or after their order date. Rows with a
/// missing order or ship date are dropped too. Returns the count dropped.
pub fn drop_invalid_ship_dates(records: &mut Vec<SalesRecord>) -> usize {
    let before = records.len();
    records.retain(SalesRecord::ships_on_or_after_order);
    before - records.len()
}

/// Replace the "Not Specified" priority with `default_priority`.
pub fn map_unspecified_priority(records: &mut [SalesRecord], default_priority: &Text) -> usize {
    let mut remapped = 0;
    for priority in records.iter_mut().filter_map(|r| r.order_priority.as_mut()) {
        if &**priority == UNSPECIFIED_PRIORITY {
            *priority = default_priority.clone();
            remapped += 1;
        }
    }
    remapped
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use super::*;
    use crate::config::CorrectionRule;

    const HEADERS: [&str; 13] = [
        "Order ID",
        "Order Date",
        "Ship Date",
        "Order Priority",
        "Customer Name",
        "Province",
        "Region",
        "Product Category",
        "Product Name",
        "Sales",
        "Profit",
        "Discount",
        "Product Base Margin",
    ];
    const ORDER_DATE: usize = 1;
    const PRIORITY: usize = 3;
    const PROVINCE: usize = 5;
    const REGION: usize = 6;
    const DISCOUNT: usize = 11;
    const BASE_MARGIN: usize = 12;

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    fn row(id: i64, order: &str, ship: &str) -> Vec<CellValue> {
        vec![
            CellValue::Integer(id),
            s(order),
            s(ship),
            s("High"),
            s("Ada Lovelace"),
            s("Ontario"),
            s("Central"),
            s("Technology"),
            s("Widget"),
            CellValue::Float(100.0),
            CellValue::Float(10.0),
            CellValue::Float(0.05),
            CellValue::Float(0.5),
        ]
    }

    fn raw(rows: Vec<Vec<CellValue>>) -> RawTable {
        RawTable {
            headers: HEADERS.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }

    fn run(rows: Vec<Vec<CellValue>>) -> (SalesTable, CleaningReport) {
        clean(raw(rows), &CleaningRules::default()).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap()
    }

    #[test]
    fn ship_before_order_rows_are_removed() {
        let (table, report) = run(vec![
            row(1, "2011-05-01", "2011-04-30"),
            row(2, "2011-05-01", "2011-05-03"),
        ]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.records[0].order_id.as_deref(), Some("2"));
        assert_eq!(report.invalid_date_rows_dropped, 1);
        assert!(table.records.iter().all(|r| r.ship_date >= r.order_date));
    }

    #[test]
    fn unparseable_dates_drop_their_rows() {
        let (table, report) = run(vec![
            row(1, "garbage", "2011-05-03"),
            row(2, "2011-05-01", ""),
            row(3, "2011-05-01", "2011-05-01"),
        ]);
        assert_eq!(table.len(), 1);
        assert_eq!(report.invalid_date_rows_dropped, 2);
        assert!(table.records.iter().all(SalesRecord::ships_on_or_after_order));
    }

    #[test]
    fn discounts_are_clamped_not_dropped() {
        let mut high = row(1, "2011-01-01", "2011-01-02");
        high[DISCOUNT] = CellValue::Float(1.5);
        let mut low = row(2, "2011-01-02", "2011-01-03");
        low[DISCOUNT] = CellValue::Float(-0.2);

        let (table, report) = run(vec![high, low]);
        assert_eq!(table.records[0].discount, Some(1.0));
        assert_eq!(table.records[1].discount, Some(0.0));
        assert_eq!(report.discounts_clamped, 2);
        assert!(table
            .records
            .iter()
            .filter_map(|r| r.discount)
            .all(|d| (0.0..=1.0).contains(&d)));
    }

    #[test]
    fn known_misspellings_are_corrected() {
        let mut r = row(1, "2010-03-01", "2010-03-04");
        r[PROVINCE] = s("Saskachewan");
        r[REGION] = s("Prarie");
        let mut untouched = row(2, "2010-03-02", "2010-03-04");
        untouched[PROVINCE] = s("Saskatchewann");

        let (table, report) = run(vec![r, untouched]);
        assert_eq!(table.records[0].province.as_deref(), Some("Saskatchewan"));
        assert_eq!(table.records[0].region.as_deref(), Some("Prairie"));
        assert_eq!(table.records[1].province.as_deref(), Some("Saskatchewann"));
        assert_eq!(report.values_corrected, 2);
        assert!(table.regions.contains("Prairie"));
        assert!(!table.regions.contains("Prarie"));
    }

    #[test]
    fn corrections_are_idempotent() {
        let mut r = row(1, "2010-03-01", "2010-03-04");
        r[PROVINCE] = s("Saskachewan");
        let (_, mut once) = parse_records(raw(vec![r])).unwrap();
        let rules = CleaningRules::default();

        apply_corrections(&mut once, &rules.corrections);
        let mut twice = once.clone();
        let changed = apply_corrections(&mut twice, &rules.corrections);

        assert_eq!(changed, 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn unspecified_priority_becomes_medium() {
        let mut r = row(1, "2012-07-01", "2012-07-02");
        r[PRIORITY] = s("Not Specified");
        let (table, report) = run(vec![r, row(2, "2012-07-01", "2012-07-02")]);
        assert_eq!(table.records[0].order_priority.as_deref(), Some("Medium"));
        assert_eq!(table.records[1].order_priority.as_deref(), Some("High"));
        assert_eq!(report.priorities_remapped, 1);
    }

    #[test]
    fn exact_duplicates_are_removed() {
        let (table, report) = run(vec![
            row(1, "2009-01-01", "2009-01-02"),
            row(1, "2009-01-01", "2009-01-02"),
            row(1, "2009-01-01", "2009-01-03"),
        ]);
        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(table.len(), 2);

        let distinct: HashSet<Vec<CellValue>> = table
            .records
            .iter()
            .map(|r| table.schema.row_cells(r))
            .collect();
        assert_eq!(distinct.len(), table.len());
    }

    #[test]
    fn final_order_is_by_order_date() {
        let (table, _) = run(vec![
            row(1, "2012-01-05", "2012-01-06"),
            row(2, "2009-06-01", "2012-12-31"),
            row(3, "2010-02-01", "2010-02-02"),
        ]);
        let dates: Vec<_> = table.records.iter().map(|r| r.order_date.unwrap()).collect();
        assert_eq!(
            dates,
            vec![date(2009, 6, 1), date(2010, 2, 1), date(2012, 1, 5)]
        );
    }

    #[test]
    fn equal_order_dates_keep_ship_date_order() {
        let (table, _) = run(vec![
            row(1, "2011-01-01", "2011-01-09"),
            row(2, "2011-01-01", "2011-01-02"),
        ]);
        let ids: Vec<_> = table.records.iter().map(|r| r.order_id.clone().unwrap()).collect();
        assert_eq!(ids, vec![Text::from("2"), Text::from("1")]);
    }

    #[test]
    fn base_margin_gaps_take_the_column_mean() {
        let mut a = row(1, "2011-01-01", "2011-01-02");
        a[BASE_MARGIN] = CellValue::Float(0.4);
        let mut b = row(2, "2011-01-02", "2011-01-03");
        b[BASE_MARGIN] = CellValue::Float(0.6);
        let mut c = row(3, "2011-01-03", "2011-01-04");
        c[BASE_MARGIN] = s("unknown");
        let mut d = row(4, "2011-01-04", "2011-01-05");
        d[BASE_MARGIN] = CellValue::Null;

        let (table, report) = run(vec![a, b, c, d]);
        assert_eq!(report.base_margins_imputed, 2);
        let fill = report.base_margin_fill.unwrap();
        assert!((fill - 0.5).abs() < 1e-12);
        assert!(table
            .records
            .iter()
            .all(|r| r.product_base_margin.is_some()));
    }

    #[test]
    fn base_margin_step_is_skipped_without_the_column() {
        let headers: Vec<String> = HEADERS[..12].iter().map(|h| h.to_string()).collect();
        let mut r = row(1, "2011-01-01", "2011-01-02");
        r.truncate(12);
        let (table, report) = clean(
            RawTable {
                headers,
                rows: vec![r],
            },
            &CleaningRules::default(),
        )
        .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(report.base_margin_fill, None);
        assert!(!table.schema.has_column(SalesColumn::ProductBaseMargin));
    }

    #[test]
    fn missing_required_columns_fail_fast() {
        let table = RawTable {
            headers: vec!["Order ID".into(), "Sales".into()],
            rows: vec![],
        };
        match clean(table, &CleaningRules::default()) {
            Err(DashboardError::MissingColumns { columns }) => {
                assert!(columns.contains(&"Order Date".to_string()));
                assert!(columns.contains(&"Region".to_string()));
                assert!(!columns.contains(&"Sales".to_string()));
                assert!(!columns.contains(&"Ship Mode".to_string()));
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn categorical_values_share_one_allocation() {
        let (table, report) = run(vec![
            row(1, "2011-01-01", "2011-01-02"),
            row(2, "2011-01-02", "2011-01-03"),
        ]);
        let a = table.records[0].region.as_ref().unwrap();
        let b = table.records[1].region.as_ref().unwrap();
        assert!(Arc::ptr_eq(a, b));
        assert!(report.distinct_categories > 0);
    }

    #[test]
    fn config_corrections_extend_builtins() {
        let mut config = DashboardConfig::default();
        config.corrections.push(CorrectionRule {
            column: "Customer Name".into(),
            from: "Ada Lovelace".into(),
            to: "Augusta Ada King".into(),
        });
        config.default_priority = "Low".into();
        let rules = CleaningRules::from_config(&config).unwrap();
        assert_eq!(rules.corrections.len(), BUILTIN_CORRECTIONS.len() + 1);

        let mut r = row(1, "2011-01-01", "2011-01-02");
        r[PRIORITY] = s("Not Specified");
        let (table, _) = clean(raw(vec![r]), &rules).unwrap();
        assert_eq!(table.records[0].customer_name.as_deref(), Some("Augusta Ada King"));
        assert_eq!(table.records[0].order_priority.as_deref(), Some("Low"));
    }

    #[test]
    fn corrections_on_numeric_columns_are_rejected() {
        let mut config = DashboardConfig::default();
        config.corrections.push(CorrectionRule {
            column: "Sales".into(),
            from: "1".into(),
            to: "2".into(),
        });
        assert!(matches!(
            CleaningRules::from_config(&config),
            Err(DashboardError::Configuration(_))
        ));
    }

    #[test]
    fn same_day_ship_is_compared_by_time_of_day() {
        let mut early = row(1, "2011-05-01", "2011-05-01 09:00:00");
        early[ORDER_DATE] = s("2011-05-01 13:45:00");
        let mut late = row(2, "2011-05-01", "2011-05-01 17:30:00");
        late[ORDER_DATE] = s("2011-05-01 13:45:00");

        let (table, report) = run(vec![early, late]);
        assert_eq!(report.invalid_date_rows_dropped, 1);
        assert_eq!(table.len(), 1);
        assert_eq!(table.records[0].order_id.as_deref(), Some("2"));
        assert_eq!(
            table.records[0].order_date,
            date(2011, 5, 1).date().and_hms_opt(13, 45, 0)
        );
        assert_eq!(table.records[0].delivery_days(), Some(0));
    }

    #[test]
    fn rows_differing_only_in_unparseable_cells_are_kept() {
        let mut a = row(1, "2011-01-01", "2011-01-02");
        a[BASE_MARGIN] = s("n/a");
        let mut b = row(1, "2011-01-01", "2011-01-02");
        b[BASE_MARGIN] = s("unknown");
        let c = row(1, "2011-01-01", "2011-01-02");

        let (table, report) = run(vec![a, b, c]);
        assert_eq!(report.duplicates_removed, 0);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn dates_written_differently_still_deduplicate() {
        let a = row(1, "2011-01-01", "2011-01-02");
        let b = row(1, "1/1/2011", "2011-01-02 00:00:00");
        let (table, report) = run(vec![a, b]);
        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(table.len(), 1);
    }
}
