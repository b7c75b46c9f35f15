use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use parquet::arrow::ArrowWriter;

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

    /// Uniform index in `0..n`.
    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }

    /// Pick an index with probability proportional to `weights`.
    fn weighted(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().sum();
        let mut target = self.next_f64() * total;
        for (i, w) in weights.iter().enumerate() {
            if target < *w {
                return i;
            }
            target -= w;
        }
        weights.len() - 1
    }
}

// ---------------------------------------------------------------------------
// Output tables
// ---------------------------------------------------------------------------

/// One generated table; empty cells are written as nulls in parquet.
struct Table {
    stem: &'static str,
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn new(stem: &'static str, headers: &[&'static str]) -> Self {
        Table {
            stem,
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.headers.len());
        self.rows.push(row);
    }

    fn write_csv(&self, dir: &Path) -> PathBuf {
        let path = dir.join(format!("{}.csv", self.stem));
        let mut writer = csv::Writer::from_path(&path).expect("Failed to create CSV file");
        writer
            .write_record(&self.headers)
            .expect("Failed to write CSV header");
        for row in &self.rows {
            writer.write_record(row).expect("Failed to write CSV row");
        }
        writer.flush().expect("Failed to flush CSV file");
        path
    }

    fn write_parquet(&self, dir: &Path) -> PathBuf {
        let path = dir.join(format!("{}.parquet", self.stem));
        let schema = Arc::new(Schema::new(
            self.headers
                .iter()
                .map(|h| Field::new(*h, DataType::Utf8, true))
                .collect::<Vec<_>>(),
        ));
        let columns: Vec<ArrayRef> = (0..self.headers.len())
            .map(|c| {
                let values: Vec<Option<&str>> = self
                    .rows
                    .iter()
                    .map(|r| Some(r[c].as_str()).filter(|s| !s.is_empty()))
                    .collect();
                Arc::new(StringArray::from(values)) as ArrayRef
            })
            .collect();
        let batch =
            RecordBatch::try_new(schema.clone(), columns).expect("Failed to create RecordBatch");

        let file = std::fs::File::create(&path).expect("Failed to create output file");
        let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
        writer.write(&batch).expect("Failed to write batch");
        writer.close().expect("Failed to close writer");
        path
    }
}

fn timestamp(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

// ---------------------------------------------------------------------------
// Dataset generation
// ---------------------------------------------------------------------------

const STATES: [(&str, f64); 8] = [
    ("SP", 40.0),
    ("RJ", 13.0),
    ("MG", 12.0),
    ("RS", 6.0),
    ("PR", 5.0),
    ("SC", 4.0),
    ("BA", 3.5),
    ("DF", 2.0),
];

/// (raw name, English name, base price); `None` = no translation row.
const CATEGORIES: [(&str, Option<&str>, f64); 8] = [
    ("cama_mesa_banho", Some("bed_bath_table"), 90.0),
    ("beleza_saude", Some("health_beauty"), 130.0),
    ("esporte_lazer", Some("sports_leisure"), 110.0),
    ("moveis_decoracao", Some("furniture_decor"), 85.0),
    ("informatica_acessorios", Some("computers_accessories"), 115.0),
    ("brinquedos", Some("toys"), 115.0),
    ("relogios_presentes", Some("watches_gifts"), 200.0),
    ("pc_gamer", None, 170.0),
];

const N_CUSTOMERS: usize = 400;
const N_PRODUCTS: usize = 120;
const N_ORDERS: usize = 3000;

fn main() {
    let mut args = std::env::args().skip(1);
    let mut out_dir = PathBuf::from("sample_dataset");
    let mut parquet = false;
    for arg in args.by_ref() {
        match arg.as_str() {
            "--parquet" => parquet = true,
            other => out_dir = PathBuf::from(other),
        }
    }
    std::fs::create_dir_all(&out_dir).expect("Failed to create output directory");

    let mut rng = SimpleRng::new(42);
    let state_weights: Vec<f64> = STATES.iter().map(|(_, w)| *w).collect();

    // ---- Customers ----
    let mut customers = Table::new("customers_dataset", &["customer_id", "customer_state"]);
    let mut customer_states = Vec::with_capacity(N_CUSTOMERS);
    for i in 0..N_CUSTOMERS {
        let state = STATES[rng.weighted(&state_weights)].0;
        customer_states.push(state);
        customers.push(vec![format!("c{i:04}"), state.to_string()]);
    }

    // ---- Products + translations ----
    let mut products = Table::new("products_dataset", &["product_id", "product_category_name"]);
    let mut product_prices = Vec::with_capacity(N_PRODUCTS);
    for i in 0..N_PRODUCTS {
        let (raw, _, base) = CATEGORIES[rng.below(CATEGORIES.len())];
        product_prices.push(base * (0.5 + rng.next_f64()));
        products.push(vec![format!("p{i:04}"), raw.to_string()]);
    }

    let mut translations = Table::new(
        "product_category_name_translation",
        &["product_category_name", "product_category_name_english"],
    );
    for (raw, english, _) in CATEGORIES {
        if let Some(english) = english {
            translations.push(vec![raw.to_string(), english.to_string()]);
        }
    }

    // ---- Orders, items, reviews ----
    let mut orders = Table::new(
        "orders_dataset",
        &[
            "order_id",
            "customer_id",
            "order_purchase_timestamp",
            "order_delivered_customer_date",
            "order_estimated_delivery_date",
        ],
    );
    let mut items = Table::new(
        "order_items_dataset",
        &["order_id", "order_item_id", "product_id", "price"],
    );
    let mut reviews = Table::new("order_reviews_dataset", &["order_id", "review_score"]);

    let start = NaiveDate::from_ymd_opt(2016, 9, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid start date");
    let span_minutes = 24 * 30 * 24 * 60;

    for i in 0..N_ORDERS {
        let order_id = format!("o{i:05}");
        // Later months get more orders, like a growing shop.
        let offset = (rng.next_f64().sqrt() * span_minutes as f64) as i64;
        let purchased = start + Duration::minutes(offset);
        let estimated = purchased + Duration::days(20 + rng.below(15) as i64);
        let delivered = purchased + Duration::days(3 + rng.below(30) as i64);

        // A handful of orders carry the awkward cases the dashboard must tolerate.
        let purchased_cell = if i % 997 == 0 {
            "not a timestamp".to_string()
        } else {
            timestamp(purchased)
        };
        let delivered_cell = if rng.below(20) == 0 {
            String::new()
        } else {
            timestamp(delivered)
        };

        let customer = rng.below(N_CUSTOMERS);
        orders.push(vec![
            order_id.clone(),
            format!("c{customer:04}"),
            purchased_cell,
            delivered_cell,
            timestamp(estimated),
        ]);

        let n_items = 1 + rng.weighted(&[80.0, 15.0, 5.0]);
        for line in 1..=n_items {
            let product = rng.below(N_PRODUCTS);
            let price = product_prices[product];
            items.push(vec![
                order_id.clone(),
                line.to_string(),
                format!("p{product:04}"),
                format!("{price:.2}"),
            ]);
        }

        if rng.below(100) >= 3 {
            let score = 1 + rng.weighted(&[11.0, 3.0, 8.0, 19.0, 59.0]);
            reviews.push(vec![order_id, score.to_string()]);
        }
    }

    let tables = [customers, products, translations, orders, items, reviews];
    for table in &tables {
        let path = if parquet {
            table.write_parquet(&out_dir)
        } else {
            table.write_csv(&out_dir)
        };
        println!("Wrote {} rows to {}", table.rows.len(), path.display());
    }
    println!(
        "Customers span {} states; open {} in the dashboard",
        customer_states
            .iter()
            .collect::<std::collections::BTreeSet<_>>()
            .len(),
        out_dir.display()
    );
}
