//! Writes a synthetic climate dataset with the same columns as the dashboard's
//! default input. The output format follows the file extension: `.parquet`
//! writes Parquet, anything else CSV.
//!
//! Usage: `generate_sample [OUTPUT] [ROWS]`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const COUNTRIES: [&str; 12] = [
    "Argentina", "Australia", "Brazil", "Canada", "China", "France", "Germany", "India",
    "Indonesia", "Japan", "South Africa", "USA",
];

const HEADERS: [&str; 10] = [
    "Year",
    "Country",
    "Avg Temperature (°C)",
    "CO2 Emissions (Tons/Capita)",
    "Sea Level Rise (mm)",
    "Rainfall (mm)",
    "Population",
    "Renewable Energy (%)",
    "Extreme Weather Events",
    "Forest Area (%)",
];

/// One generated observation.
struct Record {
    year: i64,
    country: &'static str,
    temperature: f64,
    co2: f64,
    sea_level: f64,
    rainfall: Option<f64>,
    population: i64,
    renewable: f64,
    extreme_events: i64,
    forest: f64,
}

fn generate(rows: usize, rng: &mut SimpleRng) -> Vec<Record> {
    (0..rows)
        .map(|_| {
            let year = 2000 + rng.below(24) as i64;
            let country = COUNTRIES[rng.below(COUNTRIES.len() as u64) as usize];
            let warming = (year - 2000) as f64 * 0.03;
            let co2 = rng.uniform(0.5, 20.0);
            Record {
                year,
                country,
                temperature: 5.0 + rng.uniform(0.0, 25.0) + warming + 0.05 * co2,
                co2,
                sea_level: rng.uniform(1.0, 5.0) + warming * 10.0,
                // Roughly 2% of rainfall readings are missing.
                rainfall: (rng.next_f64() > 0.02).then(|| rng.uniform(500.0, 3000.0)),
                population: rng.uniform(3.0e6, 1.4e9) as i64,
                renewable: rng.uniform(5.0, 50.0),
                extreme_events: rng.below(15) as i64,
                forest: rng.uniform(10.0, 70.0),
            }
        })
        .collect()
}

fn write_csv(path: &Path, records: &[Record]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(HEADERS)?;
    for r in records {
        writer.write_record([
            r.year.to_string(),
            r.country.to_string(),
            format!("{:.1}", r.temperature),
            format!("{:.1}", r.co2),
            format!("{:.1}", r.sea_level),
            r.rainfall.map(|v| format!("{v:.0}")).unwrap_or_default(),
            r.population.to_string(),
            format!("{:.1}", r.renewable),
            r.extreme_events.to_string(),
            format!("{:.1}", r.forest),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, records: &[Record]) -> Result<()> {
    let float = |name: &str, nullable: bool| Field::new(name, DataType::Float64, nullable);
    let schema = Arc::new(Schema::new(vec![
        Field::new(HEADERS[0], DataType::Int64, false),
        Field::new(HEADERS[1], DataType::Utf8, false),
        float(HEADERS[2], false),
        float(HEADERS[3], false),
        float(HEADERS[4], false),
        float(HEADERS[5], true),
        Field::new(HEADERS[6], DataType::Int64, false),
        float(HEADERS[7], false),
        Field::new(HEADERS[8], DataType::Int64, false),
        float(HEADERS[9], false),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(records.iter().map(|r| r.year))),
        Arc::new(StringArray::from_iter_values(records.iter().map(|r| r.country))),
        Arc::new(Float64Array::from_iter_values(records.iter().map(|r| r.temperature))),
        Arc::new(Float64Array::from_iter_values(records.iter().map(|r| r.co2))),
        Arc::new(Float64Array::from_iter_values(records.iter().map(|r| r.sea_level))),
        Arc::new(Float64Array::from(records.iter().map(|r| r.rainfall).collect::<Vec<_>>())),
        Arc::new(Int64Array::from_iter_values(records.iter().map(|r| r.population))),
        Arc::new(Float64Array::from_iter_values(records.iter().map(|r| r.renewable))),
        Arc::new(Int64Array::from_iter_values(records.iter().map(|r| r.extreme_events))),
        Arc::new(Float64Array::from_iter_values(records.iter().map(|r| r.forest))),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = self.state[1].wrapping_mul(5).rotate_left(7).wrapping_mul(9);
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

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let output = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("dataset/climate_change_dataset.csv"));
    let rows: usize = match args.next() {
        Some(n) => n.parse().with_context(|| format!("invalid row count {n:?}"))?,
        None => 1000,
    };

    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let records = generate(rows, &mut SimpleRng::new(42));
    match output.extension().and_then(|e| e.to_str()) {
        Some("parquet") | Some("pq") => write_parquet(&output, &records)?,
        _ => write_csv(&output, &records)?,
    }

    println!("Wrote {} rows to {}", records.len(), output.display());
    Ok(())
}
