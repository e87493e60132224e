use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

/// Shared, immutable text used for categorical values.
pub type Text = Arc<str>;

// ---------------------------------------------------------------------------
// CellValue – a single cell as read from a source file
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring what spreadsheet and CSV readers produce.
/// Rows of cells are compared and hashed whole, so `CellValue` must be `Ord`.
#[derive(Debug, Clone)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Null,
}

// -- Manual Eq/Ord so whole rows can go in a BTreeSet / HashSet --

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                Date(_) => 5,
                DateTime(_) => 6,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            (DateTime(a), DateTime(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Date(d) => d.hash(state),
            CellValue::DateTime(dt) => dt.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Null => Ok(()),
        }
    }
}

/// Formats accepted for textual dates, tried in order. Month-first for slashes.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m/%d/%y", "%d-%b-%Y"];

impl CellValue {
    /// Numeric view of the cell. Text is parsed; anything else is missing.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            CellValue::Float(v) => *v,
            CellValue::Integer(i) => *i as f64,
            CellValue::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        v.is_finite().then_some(v)
    }

    /// A timestamp cell, or a plain date when the time is midnight.
    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        if dt.time() == NaiveTime::MIN {
            CellValue::Date(dt.date())
        } else {
            CellValue::DateTime(dt)
        }
    }

    /// Timestamp view of the cell; plain dates are taken at midnight.
    /// Unparseable text and non-date cells are missing.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::Date(d) => Some(d.and_time(NaiveTime::MIN)),
            CellValue::DateTime(dt) => Some(*dt),
            CellValue::String(s) => parse_datetime(s),
            _ => None,
        }
    }

    /// Text view of the cell. Whole floats print without a fraction so
    /// numeric IDs read from spreadsheets keep their natural form.
    pub fn as_text(&self) -> Option<Text> {
        let s = match self {
            CellValue::String(s) if s.trim().is_empty() => return None,
            CellValue::String(s) => s.clone(),
            CellValue::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{v:.0}"),
            CellValue::Null => return None,
            other => other.to_string(),
        };
        Some(Text::from(s))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

/// Parse a textual timestamp. Date-only text is taken at midnight.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .map(|d| d.and_time(NaiveTime::MIN))
}

// ---------------------------------------------------------------------------
// RawTable – untyped rows straight from the loaders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Stack tables vertically. Headers are unioned in first-seen order and
    /// cells a source lacks are filled with `Null`.
    pub fn concat(tables: Vec<RawTable>) -> RawTable {
        let mut headers: Vec<String> = Vec::new();
        for table in &tables {
            for h in &table.headers {
                if !headers.contains(h) {
                    headers.push(h.clone());
                }
            }
        }

        let total_rows = tables.iter().map(|t| t.rows.len()).sum();
        let mut rows = Vec::with_capacity(total_rows);
        for table in tables {
            let mapping: Vec<Option<usize>> = headers
                .iter()
                .map(|h| table.column_index(h))
                .collect();
            for row in table.rows {
                rows.push(
                    mapping
                        .iter()
                        .map(|idx| {
                            idx.and_then(|i| row.get(i).cloned())
                                .unwrap_or(CellValue::Null)
                        })
                        .collect(),
                );
            }
        }

        RawTable { headers, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// SalesColumn – the known schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Date,
    Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SalesColumn {
    OrderId,
    OrderDate,
    ShipDate,
    OrderPriority,
    ShipMode,
    CustomerName,
    Province,
    Region,
    CustomerSegment,
    ProductCategory,
    ProductSubCategory,
    ProductName,
    ProductContainer,
    Sales,
    Profit,
    Discount,
    ProductBaseMargin,
}

impl SalesColumn {
    pub const ALL: [SalesColumn; 17] = [
        SalesColumn::OrderId,
        SalesColumn::OrderDate,
        SalesColumn::ShipDate,
        SalesColumn::OrderPriority,
        SalesColumn::ShipMode,
        SalesColumn::CustomerName,
        SalesColumn::Province,
        SalesColumn::Region,
        SalesColumn::CustomerSegment,
        SalesColumn::ProductCategory,
        SalesColumn::ProductSubCategory,
        SalesColumn::ProductName,
        SalesColumn::ProductContainer,
        SalesColumn::Sales,
        SalesColumn::Profit,
        SalesColumn::Discount,
        SalesColumn::ProductBaseMargin,
    ];

    /// Columns recast to interned categories during cleaning.
    pub const CATEGORICAL: [SalesColumn; 10] = [
        SalesColumn::OrderPriority,
        SalesColumn::ShipMode,
        SalesColumn::CustomerName,
        SalesColumn::Province,
        SalesColumn::Region,
        SalesColumn::CustomerSegment,
        SalesColumn::ProductCategory,
        SalesColumn::ProductSubCategory,
        SalesColumn::ProductName,
        SalesColumn::ProductContainer,
    ];

    pub fn header(self) -> &'static str {
        match self {
            SalesColumn::OrderId => "Order ID",
            SalesColumn::OrderDate => "Order Date",
            SalesColumn::ShipDate => "Ship Date",
            SalesColumn::OrderPriority => "Order Priority",
            SalesColumn::ShipMode => "Ship Mode",
            SalesColumn::CustomerName => "Customer Name",
            SalesColumn::Province => "Province",
            SalesColumn::Region => "Region",
            SalesColumn::CustomerSegment => "Customer Segment",
            SalesColumn::ProductCategory => "Product Category",
            SalesColumn::ProductSubCategory => "Product Sub-Category",
            SalesColumn::ProductName => "Product Name",
            SalesColumn::ProductContainer => "Product Container",
            SalesColumn::Sales => "Sales",
            SalesColumn::Profit => "Profit",
            SalesColumn::Discount => "Discount",
            SalesColumn::ProductBaseMargin => "Product Base Margin",
        }
    }

    pub fn from_header(header: &str) -> Option<Self> {
        let header = header.trim();
        Self::ALL.into_iter().find(|c| c.header() == header)
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            SalesColumn::OrderDate | SalesColumn::ShipDate => ColumnKind::Date,
            SalesColumn::Sales
            | SalesColumn::Profit
            | SalesColumn::Discount
            | SalesColumn::ProductBaseMargin => ColumnKind::Number,
            _ => ColumnKind::Text,
        }
    }

    /// Optional columns are the four extra categoricals and the base margin.
    pub fn is_required(self) -> bool {
        !matches!(
            self,
            SalesColumn::ShipMode
                | SalesColumn::CustomerSegment
                | SalesColumn::ProductSubCategory
                | SalesColumn::ProductContainer
                | SalesColumn::ProductBaseMargin
        )
    }
}

impl fmt::Display for SalesColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

// ---------------------------------------------------------------------------
// TableSchema – header order of the cleaned table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSlot {
    Known(SalesColumn),
    /// Index into `SalesRecord::extra`.
    Extra(usize),
}

/// Source header order, with each header resolved to a known column or an
/// extra pass-through slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSchema {
    pub headers: Vec<String>,
    pub slots: Vec<ColumnSlot>,
}

impl TableSchema {
    pub fn from_headers(headers: &[String]) -> Self {
        let mut slots = Vec::with_capacity(headers.len());
        let mut seen = BTreeSet::new();
        let mut n_extra = 0;
        for h in headers {
            match SalesColumn::from_header(h) {
                Some(col) if seen.insert(col) => slots.push(ColumnSlot::Known(col)),
                _ => {
                    slots.push(ColumnSlot::Extra(n_extra));
                    n_extra += 1;
                }
            }
        }
        Self {
            headers: headers.to_vec(),
            slots,
        }
    }

    pub fn has_column(&self, col: SalesColumn) -> bool {
        self.slots.contains(&ColumnSlot::Known(col))
    }

    pub fn extra_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, ColumnSlot::Extra(_)))
            .count()
    }

    /// Cells of `record` in header order.
    pub fn row_cells(&self, record: &SalesRecord) -> Vec<CellValue> {
        self.slots
            .iter()
            .map(|slot| match slot {
                ColumnSlot::Known(col) => record.cell(*col),
                ColumnSlot::Extra(i) => record.extra.get(*i).cloned().unwrap_or(CellValue::Null),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// SalesRecord – one typed row
// ---------------------------------------------------------------------------

/// A single line item. Every field that may be blank or unparseable is an
/// `Option`; `None` is the only missing-value marker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesRecord {
    pub order_id: Option<Text>,
    pub order_date: Option<NaiveDateTime>,
    pub ship_date: Option<NaiveDateTime>,
    pub order_priority: Option<Text>,
    pub ship_mode: Option<Text>,
    pub customer_name: Option<Text>,
    pub province: Option<Text>,
    pub region: Option<Text>,
    pub customer_segment: Option<Text>,
    pub product_category: Option<Text>,
    pub product_sub_category: Option<Text>,
    pub product_name: Option<Text>,
    pub product_container: Option<Text>,
    pub sales: Option<f64>,
    pub profit: Option<f64>,
    pub discount: Option<f64>,
    pub product_base_margin: Option<f64>,
    /// Pass-through cells for columns outside the known schema.
    pub extra: Vec<CellValue>,
}

impl SalesRecord {
    /// Assign a raw cell to the typed field for `col`, coercing as needed.
    pub fn set(&mut self, col: SalesColumn, value: &CellValue) {
        match col.kind() {
            ColumnKind::Date => {
                let date = value.as_datetime();
                match col {
                    SalesColumn::OrderDate => self.order_date = date,
                    _ => self.ship_date = date,
                }
            }
            ColumnKind::Number => {
                let num = value.as_f64();
                match col {
                    SalesColumn::Sales => self.sales = num,
                    SalesColumn::Profit => self.profit = num,
                    SalesColumn::Discount => self.discount = num,
                    _ => self.product_base_margin = num,
                }
            }
            ColumnKind::Text => {
                if let Some(slot) = self.text_mut(col) {
                    *slot = value.as_text();
                }
            }
        }
    }

    /// Borrow a text field. `None` for date and numeric columns.
    pub fn text(&self, col: SalesColumn) -> Option<&Text> {
        match col {
            SalesColumn::OrderId => self.order_id.as_ref(),
            SalesColumn::OrderPriority => self.order_priority.as_ref(),
            SalesColumn::ShipMode => self.ship_mode.as_ref(),
            SalesColumn::CustomerName => self.customer_name.as_ref(),
            SalesColumn::Province => self.province.as_ref(),
            SalesColumn::Region => self.region.as_ref(),
            SalesColumn::CustomerSegment => self.customer_segment.as_ref(),
            SalesColumn::ProductCategory => self.product_category.as_ref(),
            SalesColumn::ProductSubCategory => self.product_sub_category.as_ref(),
            SalesColumn::ProductName => self.product_name.as_ref(),
            SalesColumn::ProductContainer => self.product_container.as_ref(),
            _ => None,
        }
    }

    pub fn text_mut(&mut self, col: SalesColumn) -> Option<&mut Option<Text>> {
        match col {
            SalesColumn::OrderId => Some(&mut self.order_id),
            SalesColumn::OrderPriority => Some(&mut self.order_priority),
            SalesColumn::ShipMode => Some(&mut self.ship_mode),
            SalesColumn::CustomerName => Some(&mut self.customer_name),
            SalesColumn::Province => Some(&mut self.province),
            SalesColumn::Region => Some(&mut self.region),
            SalesColumn::CustomerSegment => Some(&mut self.customer_segment),
            SalesColumn::ProductCategory => Some(&mut self.product_category),
            SalesColumn::ProductSubCategory => Some(&mut self.product_sub_category),
            SalesColumn::ProductName => Some(&mut self.product_name),
            SalesColumn::ProductContainer => Some(&mut self.product_container),
            _ => None,
        }
    }

    /// The typed field for `col` as a cell, for output and row comparison.
    pub fn cell(&self, col: SalesColumn) -> CellValue {
        let number = |v: Option<f64>| v.map_or(CellValue::Null, CellValue::Float);
        let date = |v: Option<NaiveDateTime>| v.map_or(CellValue::Null, CellValue::from_datetime);
        match col {
            SalesColumn::OrderDate => date(self.order_date),
            SalesColumn::ShipDate => date(self.ship_date),
            SalesColumn::Sales => number(self.sales),
            SalesColumn::Profit => number(self.profit),
            SalesColumn::Discount => number(self.discount),
            SalesColumn::ProductBaseMargin => number(self.product_base_margin),
            other => self
                .text(other)
                .map_or(CellValue::Null, |t| CellValue::String(t.to_string())),
        }
    }

    /// True only when both dates are present and shipping is not before ordering.
    /// A missing date on either side never satisfies the comparison.
    pub fn ships_on_or_after_order(&self) -> bool {
        match (self.order_date, self.ship_date) {
            (Some(order), Some(ship)) => ship >= order,
            _ => false,
        }
    }

    /// Whole days between order and shipment, time of day included.
    pub fn delivery_days(&self) -> Option<i64> {
        Some((self.ship_date? - self.order_date?).num_days())
    }

    pub fn order_year(&self) -> Option<i32> {
        self.order_date.map(|d| d.year())
    }
}

// ---------------------------------------------------------------------------
// SalesTable – the canonical cleaned table
// ---------------------------------------------------------------------------

/// The cleaned table with pre-computed filter domains. Built once by the
/// cleaning pipeline and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct SalesTable {
    pub schema: TableSchema,
    /// Rows in final order; the position in this vector is the row index.
    pub records: Vec<SalesRecord>,
    /// Sorted set of observed regions.
    pub regions: BTreeSet<Text>,
    /// Sorted set of observed product categories.
    pub categories: BTreeSet<Text>,
}

impl SalesTable {
    /// Build filter domains from the cleaned records.
    pub fn from_records(schema: TableSchema, records: Vec<SalesRecord>) -> Self {
        let mut regions = BTreeSet::new();
        let mut categories = BTreeSet::new();
        for rec in &records {
            if let Some(r) = &rec.region {
                regions.insert(r.clone());
            }
            if let Some(c) = &rec.product_category {
                categories.insert(c.clone());
            }
        }
        SalesTable {
            schema,
            records,
            regions,
            categories,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First and last order year present in the table.
    pub fn year_span(&self) -> Option<(i32, i32)> {
        let years = self.records.iter().filter_map(SalesRecord::order_year);
        let (min, max) = years.fold((i32::MAX, i32::MIN), |(lo, hi), y| (lo.min(y), hi.max(y)));
        (min <= max).then_some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    fn at(m: u32, day: u32, h: u32, min: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(2011, m, day).and_then(|d| d.and_hms_opt(h, min, 0))
    }

    #[test]
    fn dates_parse_from_common_text_forms() {
        let midnight = at(5, 1, 0, 0);
        assert_eq!(s("2011-05-01").as_datetime(), midnight);
        assert_eq!(s("2011-05-01 00:00:00").as_datetime(), midnight);
        assert_eq!(s("5/1/2011").as_datetime(), midnight);
        assert_eq!(s("2011-05-01 13:45:00").as_datetime(), at(5, 1, 13, 45));
        assert_eq!(s("not a date").as_datetime(), None);
        assert_eq!(CellValue::Float(40664.0).as_datetime(), None);
        assert_eq!(CellValue::Null.as_datetime(), None);
    }

    #[test]
    fn midnight_timestamps_become_plain_dates() {
        let date = NaiveDate::from_ymd_opt(2011, 5, 1).unwrap();
        assert_eq!(
            CellValue::from_datetime(at(5, 1, 0, 0).unwrap()),
            CellValue::Date(date)
        );
        let cell = CellValue::from_datetime(at(5, 1, 9, 30).unwrap());
        assert_eq!(cell, CellValue::DateTime(at(5, 1, 9, 30).unwrap()));
        assert_eq!(cell.to_string(), "2011-05-01 09:30:00");
    }

    #[test]
    fn numeric_coercion_treats_garbage_as_missing() {
        assert_eq!(s(" 0.35 ").as_f64(), Some(0.35));
        assert_eq!(CellValue::Integer(3).as_f64(), Some(3.0));
        assert_eq!(s("n/a").as_f64(), None);
        assert_eq!(s("NaN").as_f64(), None);
        assert_eq!(CellValue::Bool(true).as_f64(), None);
    }

    #[test]
    fn whole_float_ids_render_without_fraction() {
        assert_eq!(CellValue::Float(3.0).as_text().as_deref(), Some("3"));
        assert_eq!(CellValue::Integer(42).as_text().as_deref(), Some("42"));
        assert_eq!(s("  ").as_text(), None);
    }

    #[test]
    fn concat_unions_headers_and_fills_nulls() {
        let a = RawTable {
            headers: vec!["A".into(), "B".into()],
            rows: vec![vec![CellValue::Integer(1), s("x")]],
        };
        let b = RawTable {
            headers: vec!["B".into(), "C".into()],
            rows: vec![vec![s("y"), CellValue::Bool(true)]],
        };
        let joined = RawTable::concat(vec![a, b]);
        assert_eq!(joined.headers, vec!["A", "B", "C"]);
        assert_eq!(joined.rows[0], vec![CellValue::Integer(1), s("x"), CellValue::Null]);
        assert_eq!(joined.rows[1], vec![CellValue::Null, s("y"), CellValue::Bool(true)]);
    }

    #[test]
    fn missing_dates_never_satisfy_ship_comparison() {
        let mut rec = SalesRecord {
            order_date: at(5, 1, 0, 0),
            ship_date: at(5, 1, 0, 0),
            ..Default::default()
        };
        assert!(rec.ships_on_or_after_order());
        rec.ship_date = at(4, 30, 0, 0);
        assert!(!rec.ships_on_or_after_order());
        rec.ship_date = None;
        assert!(!rec.ships_on_or_after_order());
        assert_eq!(rec.delivery_days(), None);
    }

    #[test]
    fn same_day_ship_before_order_time_is_rejected() {
        let mut rec = SalesRecord {
            order_date: at(5, 1, 14, 0),
            ship_date: at(5, 1, 9, 0),
            ..Default::default()
        };
        assert!(!rec.ships_on_or_after_order());

        rec.ship_date = at(5, 3, 9, 0);
        assert!(rec.ships_on_or_after_order());
        // 1 day 19 hours
        assert_eq!(rec.delivery_days(), Some(1));
    }

    #[test]
    fn schema_maps_unknown_headers_to_extra_slots() {
        let headers: Vec<String> = ["Row ID", "Order ID", "Sales", "Unit Price"]
            .iter()
            .map(|h| h.to_string())
            .collect();
        let schema = TableSchema::from_headers(&headers);
        assert_eq!(
            schema.slots,
            vec![
                ColumnSlot::Extra(0),
                ColumnSlot::Known(SalesColumn::OrderId),
                ColumnSlot::Known(SalesColumn::Sales),
                ColumnSlot::Extra(1),
            ]
        );
        assert_eq!(schema.extra_count(), 2);

        let rec = SalesRecord {
            order_id: Some("7".into()),
            sales: Some(10.5),
            extra: vec![CellValue::Integer(1), CellValue::Float(2.5)],
            ..Default::default()
        };
        assert_eq!(
            schema.row_cells(&rec),
            vec![
                CellValue::Integer(1),
                s("7"),
                CellValue::Float(10.5),
                CellValue::Float(2.5)
            ]
        );
    }
}
