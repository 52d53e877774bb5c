use anyhow::{Context, Result};
use serde::Serialize;

/// One row in the layout of `vehicles_us.csv`.
#[derive(Serialize)]
struct ListingRow {
    price: Option<u32>,
    model_year: Option<f64>,
    model: &'static str,
    condition: &'static str,
    cylinders: Option<f64>,
    fuel: &'static str,
    odometer: Option<f64>,
    transmission: &'static str,
    #[serde(rename = "type")]
    vehicle_type: &'static str,
    paint_color: Option<&'static str>,
    is_4wd: Option<f64>,
    date_posted: String,
    days_listed: u32,
}

/// (model, type, base price, cylinders, four-wheel drive)
const MODELS: &[(&str, &str, f64, f64, bool)] = &[
    ("ford f-150", "pickup", 28_000.0, 8.0, true),
    ("chevrolet silverado 1500", "pickup", 30_000.0, 8.0, true),
    ("toyota camry", "sedan", 22_000.0, 4.0, false),
    ("honda civic", "sedan", 19_000.0, 4.0, false),
    ("jeep wrangler", "SUV", 27_000.0, 6.0, true),
    ("bmw x5", "SUV", 45_000.0, 6.0, true),
    ("ram 1500", "truck", 32_000.0, 8.0, true),
    ("nissan altima", "sedan", 21_000.0, 4.0, false),
    ("honda odyssey", "mini-van", 29_000.0, 6.0, false),
    ("ford mustang", "coupe", 31_000.0, 8.0, false),
];
const CONDITIONS: &[&str] = &["new", "like new", "excellent", "good", "fair", "salvage"];
const FUELS: &[&str] = &["gas", "gas", "gas", "gas", "diesel", "hybrid", "electric", "other"];
const COLORS: &[&str] = &["white", "black", "silver", "grey", "blue", "red", "green"];

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

    fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[self.below(items.len())]
    }

    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

fn generate_row(rng: &mut SimpleRng) -> ListingRow {
    let (model, vehicle_type, base_price, cylinders, four_wd) = rng.pick(MODELS);
    let year = 1985 + rng.below(35) as u32;
    let age = 2019 - year.min(2019);
    let condition = rng.pick(CONDITIONS);

    let miles_per_year = 8_000.0 + rng.next_f64() * 10_000.0;
    let odometer = (age as f64 * miles_per_year + rng.next_f64() * 5_000.0).round();

    let depreciation = 0.88f64.powi(age as i32);
    let noise = 0.7 + rng.next_f64() * 0.6;
    let mut price = (base_price * depreciation * noise).round().max(1.0);
    if rng.chance(0.005) {
        // Occasional extreme asking price.
        price *= 20.0;
    }

    let month = 1 + rng.below(12);
    let day = 1 + rng.below(28);

    ListingRow {
        price: (!rng.chance(0.01)).then_some(price as u32),
        model_year: (!rng.chance(0.07)).then_some(year as f64),
        model,
        condition,
        cylinders: (!rng.chance(0.1)).then_some(cylinders),
        fuel: rng.pick(FUELS),
        odometer: (!rng.chance(0.15)).then_some(odometer),
        transmission: if rng.chance(0.9) { "automatic" } else { "manual" },
        vehicle_type,
        paint_color: (!rng.chance(0.18)).then(|| rng.pick(COLORS)),
        is_4wd: four_wd.then_some(1.0),
        date_posted: format!("2018-{month:02}-{day:02}"),
        days_listed: rng.below(120) as u32,
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let n_rows = 5_000;

    let output_path = "vehicles_us.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;
    for _ in 0..n_rows {
        writer
            .serialize(generate_row(&mut rng))
            .context("writing listing row")?;
    }
    writer.flush().context("flushing CSV writer")?;

    println!("Wrote {n_rows} listings to {output_path}");
    Ok(())
}
