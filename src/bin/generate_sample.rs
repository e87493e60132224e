use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use chrono::{Datelike, NaiveDate};
use parquet::arrow::ArrowWriter;

const ROWS_PER_YEAR: usize = 400;

static REGIONS: [(&str, &[&str]); 5] = [
    ("West", &["British Columbia", "Alberta"]),
    ("Prarie", &["Saskachewan", "Manitoba"]),
    ("Ontario", &["Ontario"]),
    ("Quebec", &["Quebec"]),
    ("Atlantic", &["Nova Scotia", "New Brunswick"]),
];

static PRODUCTS: [(&str, &[&str]); 3] = [
    ("Furniture", &["Office Chair", "Bookcase", "Conference Table", "Desk Lamp"]),
    ("Office Supplies", &["Binder Clips", "Copy Paper", "Stapler", "Envelopes", "Pens"]),
    ("Technology", &["Laptop", "Monitor", "Wireless Phone", "Printer"]),
];

static PRIORITIES: [&str; 5] = ["Critical", "High", "Medium", "Low", "Not Specified"];
static SHIP_MODES: [&str; 3] = ["Regular Air", "Express Air", "Delivery Truck"];
static SEGMENTS: [&str; 4] = ["Consumer", "Corporate", "Home Office", "Small Business"];
static CUSTOMERS: [&str; 12] = [
    "Ada Lovelace", "Grace Hopper", "Alan Turing", "Edsger Dijkstra", "Barbara Liskov",
    "Donald Knuth", "Frances Allen", "Ken Thompson", "Margaret Hamilton", "John Backus",
    "Radia Perlman", "Niklaus Wirth",
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// Column-wise buffers for one year's file.
#[derive(Default)]
struct Columns {
    order_id: Vec<i64>,
    order_date: Vec<i32>,
    ship_date: Vec<i32>,
    order_priority: Vec<String>,
    ship_mode: Vec<String>,
    customer_name: Vec<String>,
    province: Vec<String>,
    region: Vec<String>,
    customer_segment: Vec<String>,
    product_category: Vec<String>,
    product_name: Vec<String>,
    sales: Vec<f64>,
    profit: Vec<f64>,
    discount: Vec<f64>,
    base_margin: Vec<Option<f64>>,
}

impl Columns {
    fn push_row(&mut self, row: usize) {
        macro_rules! dup {
            ($($field:ident),*) => { $( let v = self.$field[row].clone(); self.$field.push(v); )* };
        }
        dup!(
            order_id, order_date, ship_date, order_priority, ship_mode, customer_name,
            province, region, customer_segment, product_category, product_name, sales,
            profit, discount, base_margin
        );
    }

    fn len(&self) -> usize {
        self.order_id.len()
    }
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - 719_163
}

fn generate_year(year: i32, next_id: &mut i64, rng: &mut SimpleRng) -> Result<Columns> {
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1).context("invalid year")?;
    let mut cols = Columns::default();

    for _ in 0..ROWS_PER_YEAR {
        let order = jan1 + chrono::Days::new(rng.below(365) as u64);
        // A few ship dates land before the order date.
        let ship = if rng.chance(0.02) {
            order - chrono::Days::new(1 + rng.below(5) as u64)
        } else {
            order + chrono::Days::new(rng.below(8) as u64)
        };

        let (region, provinces) = rng.pick(&REGIONS);
        let (category, names) = rng.pick(&PRODUCTS);
        let sales = (20.0 + rng.next_f64() * 4_000.0).round();
        let margin = rng.next_f64() * 0.4 - 0.1;
        let discount = if rng.chance(0.03) {
            // Out of [0, 1] on purpose.
            if rng.chance(0.5) { -0.05 } else { 1.2 }
        } else {
            (rng.next_f64() * 0.1 * 100.0).round() / 100.0
        };

        *next_id += 1;
        cols.order_id.push(*next_id);
        cols.order_date.push(days_since_epoch(order));
        cols.ship_date.push(days_since_epoch(ship));
        cols.order_priority.push(rng.pick(&PRIORITIES).to_string());
        cols.ship_mode.push(rng.pick(&SHIP_MODES).to_string());
        cols.customer_name.push(rng.pick(&CUSTOMERS).to_string());
        cols.province.push(rng.pick(*provinces).to_string());
        cols.region.push(region.to_string());
        cols.customer_segment.push(rng.pick(&SEGMENTS).to_string());
        cols.product_category.push(category.to_string());
        cols.product_name.push(rng.pick(*names).to_string());
        cols.sales.push(sales);
        cols.profit.push((sales * margin).round());
        cols.discount.push(discount);
        cols.base_margin
            .push((!rng.chance(0.05)).then(|| (rng.next_f64() * 0.6 * 100.0).round() / 100.0));
    }

    // Exact duplicates for the cleaner to drop.
    for _ in 0..ROWS_PER_YEAR / 50 {
        let row = rng.below(cols.len());
        cols.push_row(row);
    }

    Ok(cols)
}

fn to_batch(cols: Columns) -> Result<RecordBatch> {
    let text = |name: &str| Field::new(name, DataType::Utf8, false);
    let schema = Arc::new(Schema::new(vec![
        Field::new("Order ID", DataType::Int64, false),
        Field::new("Order Date", DataType::Date32, false),
        Field::new("Ship Date", DataType::Date32, false),
        text("Order Priority"),
        text("Ship Mode"),
        text("Customer Name"),
        text("Province"),
        text("Region"),
        text("Customer Segment"),
        text("Product Category"),
        text("Product Name"),
        Field::new("Sales", DataType::Float64, false),
        Field::new("Profit", DataType::Float64, false),
        Field::new("Discount", DataType::Float64, false),
        Field::new("Product Base Margin", DataType::Float64, true),
    ]));

    let strings = |v: Vec<String>| -> ArrayRef { Arc::new(StringArray::from(v)) };
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(cols.order_id)),
        Arc::new(Date32Array::from(cols.order_date)),
        Arc::new(Date32Array::from(cols.ship_date)),
        strings(cols.order_priority),
        strings(cols.ship_mode),
        strings(cols.customer_name),
        strings(cols.province),
        strings(cols.region),
        strings(cols.customer_segment),
        strings(cols.product_category),
        strings(cols.product_name),
        Arc::new(Float64Array::from(cols.sales)),
        Arc::new(Float64Array::from(cols.profit)),
        Arc::new(Float64Array::from(cols.discount)),
        Arc::new(Float64Array::from(cols.base_margin)),
    ];

    Ok(RecordBatch::try_new(schema, columns)?)
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let mut next_id: i64 = 0;
    let mut written = Vec::new();

    for year in 2009..=2012 {
        let batch = to_batch(generate_year(year, &mut next_id, &mut rng)?)?;

        let output_path = format!("{year}.parquet");
        let file = std::fs::File::create(&output_path)
            .with_context(|| format!("creating {output_path}"))?;
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
        writer.write(&batch)?;
        writer.close()?;

        println!("Wrote {} rows to {output_path}", batch.num_rows());
        if year == 2009 {
            println!("{}", pretty_format_batches(&[batch.slice(0, 5)])?);
        }
        written.push(output_path);
    }

    println!("\nPoint the dashboard at them in sales-dashboard.toml:");
    println!("sources = {:?}", written);
    Ok(())
}
