use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::Datelike;

use super::filter::SalesView;
use super::model::{SalesRecord, Text};

/// How many bars the "top N" charts show.
pub const TOP_N: usize = 10;

// ---------------------------------------------------------------------------
// KPIs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kpis {
    pub total_sales: f64,
    pub total_orders: usize,
    pub avg_profit_margin: f64,
    /// `None` when the view has no dated rows.
    pub avg_delivery_days: Option<f64>,
}

/// Profit over sales, or 0 when there are no positive sales to divide by.
pub fn profit_margin(profit: f64, sales: f64) -> f64 {
    if sales > 0.0 { profit / sales } else { 0.0 }
}

pub fn compute_kpis(view: &SalesView<'_>) -> Kpis {
    let mut total_sales = 0.0;
    let mut total_profit = 0.0;
    let mut orders: HashSet<&str> = HashSet::new();
    let mut delivery_sum = 0i64;
    let mut delivery_n = 0usize;

    for rec in view.records() {
        total_sales += rec.sales.unwrap_or(0.0);
        total_profit += rec.profit.unwrap_or(0.0);
        if let Some(id) = &rec.order_id {
            orders.insert(id);
        }
        if let Some(days) = rec.delivery_days() {
            delivery_sum += days;
            delivery_n += 1;
        }
    }

    Kpis {
        total_sales,
        total_orders: orders.len(),
        avg_profit_margin: profit_margin(total_profit, total_sales),
        avg_delivery_days: (delivery_n > 0).then(|| delivery_sum as f64 / delivery_n as f64),
    }
}

impl Kpis {
    pub fn total_sales_label(&self) -> String {
        format!("${}", group_thousands(self.total_sales.round() as i64))
    }

    pub fn total_orders_label(&self) -> String {
        group_thousands(self.total_orders as i64)
    }

    pub fn profit_margin_label(&self) -> String {
        format!("{:.1}%", self.avg_profit_margin * 100.0)
    }

    pub fn delivery_label(&self) -> String {
        match self.avg_delivery_days {
            Some(days) => format!("{days:.1} days"),
            None => "n/a".to_string(),
        }
    }
}

/// `1234567` → `1,234,567`.
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ---------------------------------------------------------------------------
// Chart series
// ---------------------------------------------------------------------------

/// Calendar month an order falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Series behind the nine charts. Every field is derived from the same view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    pub top_products: Vec<(Text, f64)>,
    pub sales_by_category: Vec<(Text, f64)>,
    pub margin_by_category: Vec<(Text, f64)>,
    pub monthly_sales: Vec<(YearMonth, f64)>,
    pub sales_by_region: Vec<(Text, f64)>,
    /// `(region, [discount, sales] points)`.
    pub discount_vs_sales: Vec<(Text, Vec<[f64; 2]>)>,
    pub top_customers: Vec<(Text, f64)>,
    pub shipping_days_by_region: Vec<(Text, f64)>,
    pub orders_by_priority: Vec<(Text, usize)>,
}

pub fn compute_charts(view: &SalesView<'_>) -> ChartData {
    ChartData {
        top_products: top_by_sales(view, |r| r.product_name.as_ref(), TOP_N),
        sales_by_category: sales_by(view, |r| r.product_category.as_ref()),
        margin_by_category: margin_by_category(view),
        monthly_sales: monthly_sales(view),
        sales_by_region: sales_by(view, |r| r.region.as_ref()),
        discount_vs_sales: discount_vs_sales(view),
        top_customers: top_by_sales(view, |r| r.customer_name.as_ref(), TOP_N),
        shipping_days_by_region: shipping_days_by_region(view),
        orders_by_priority: orders_by_priority(view),
    }
}

/// Summed sales per key, keys in lexical order. Rows with a missing key are
/// skipped; missing sales count as 0.
pub fn sales_by<F>(view: &SalesView<'_>, key: F) -> Vec<(Text, f64)>
where
    F: Fn(&SalesRecord) -> Option<&Text>,
{
    let mut groups: BTreeMap<Text, f64> = BTreeMap::new();
    for rec in view.records() {
        if let Some(k) = key(rec) {
            *groups.entry(k.clone()).or_default() += rec.sales.unwrap_or(0.0);
        }
    }
    groups.into_iter().collect()
}

/// The `n` keys with the highest summed sales, highest first. Ties break by name.
pub fn top_by_sales<F>(view: &SalesView<'_>, key: F, n: usize) -> Vec<(Text, f64)>
where
    F: Fn(&SalesRecord) -> Option<&Text>,
{
    let mut totals = sales_by(view, key);
    totals.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    totals.truncate(n);
    totals
}

pub fn margin_by_category(view: &SalesView<'_>) -> Vec<(Text, f64)> {
    let mut groups: BTreeMap<Text, (f64, f64)> = BTreeMap::new();
    for rec in view.records() {
        if let Some(cat) = &rec.product_category {
            let (profit, sales) = groups.entry(cat.clone()).or_default();
            *profit += rec.profit.unwrap_or(0.0);
            *sales += rec.sales.unwrap_or(0.0);
        }
    }
    groups
        .into_iter()
        .map(|(cat, (profit, sales))| (cat, profit_margin(profit, sales)))
        .collect()
}

/// Sales per calendar month of the order date, oldest month first.
pub fn monthly_sales(view: &SalesView<'_>) -> Vec<(YearMonth, f64)> {
    let mut months: BTreeMap<YearMonth, f64> = BTreeMap::new();
    for rec in view.records() {
        if let Some(d) = rec.order_date {
            let ym = YearMonth {
                year: d.year(),
                month: d.month(),
            };
            *months.entry(ym).or_default() += rec.sales.unwrap_or(0.0);
        }
    }
    months.into_iter().collect()
}

/// One point per row with both a discount and a sales value, grouped by region.
pub fn discount_vs_sales(view: &SalesView<'_>) -> Vec<(Text, Vec<[f64; 2]>)> {
    let mut groups: BTreeMap<Text, Vec<[f64; 2]>> = BTreeMap::new();
    for rec in view.records() {
        if let (Some(region), Some(discount), Some(sales)) = (&rec.region, rec.discount, rec.sales) {
            groups.entry(region.clone()).or_default().push([discount, sales]);
        }
    }
    groups.into_iter().collect()
}

pub fn shipping_days_by_region(view: &SalesView<'_>) -> Vec<(Text, f64)> {
    let mut groups: BTreeMap<Text, (i64, usize)> = BTreeMap::new();
    for rec in view.records() {
        if let (Some(region), Some(days)) = (&rec.region, rec.delivery_days()) {
            let (sum, n) = groups.entry(region.clone()).or_default();
            *sum += days;
            *n += 1;
        }
    }
    groups
        .into_iter()
        .map(|(region, (sum, n))| (region, sum as f64 / n as f64))
        .collect()
}

/// Row counts per order priority, most frequent first.
pub fn orders_by_priority(view: &SalesView<'_>) -> Vec<(Text, usize)> {
    let mut counts: BTreeMap<Text, usize> = BTreeMap::new();
    for priority in view.records().filter_map(|r| r.order_priority.as_ref()) {
        *counts.entry(priority.clone()).or_default() += 1;
    }
    let mut counts: Vec<(Text, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

// ---------------------------------------------------------------------------
// Everything the dashboard shows for one filter state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData {
    pub rows: usize,
    pub kpis: Kpis,
    pub charts: ChartData,
}

pub fn summarize(view: &SalesView<'_>) -> DashboardData {
    DashboardData {
        rows: view.len(),
        kpis: compute_kpis(view),
        charts: compute_charts(view),
    }
}
