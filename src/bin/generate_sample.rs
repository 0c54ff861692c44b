use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

// ---------------------------------------------------------------------------
// Abalone: headerless, sex + 8 measurements
// ---------------------------------------------------------------------------

/// (sex, mean length, length spread, count)
const SEXES: [(&str, f64, f64, usize); 3] = [
    ("M", 0.56, 0.10, 150),
    ("F", 0.58, 0.09, 130),
    ("I", 0.43, 0.11, 130),
];

fn abalone_row(sex: &str, mean: f64, spread: f64, rng: &mut SimpleRng) -> Vec<String> {
    let length = rng.gauss(mean, spread).clamp(0.08, 0.82);
    let diameter = (0.81 * length + rng.gauss(0.0, 0.012)).max(0.05);
    let height = (0.34 * diameter + rng.gauss(0.0, 0.01)).max(0.01);
    let whole = (3.9 * length.powi(3) + rng.gauss(0.0, 0.04)).max(0.002);
    let shucked = whole * (0.43 + rng.gauss(0.0, 0.02));
    let viscera = whole * (0.22 + rng.gauss(0.0, 0.01));
    let shell = whole * (0.29 + rng.gauss(0.0, 0.015));
    let rings = (4.0 + 16.0 * length + rng.gauss(0.0, 2.0)).round().max(1.0);

    let mut row = vec![sex.to_string()];
    row.extend(
        [length, diameter, height, whole, shucked, viscera, shell]
            .iter()
            .map(|v| format!("{v:.4}")),
    );
    row.push(format!("{rings}"));
    row
}

fn write_abalone(path: &Path, rng: &mut SimpleRng) -> Result<usize> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let mut rows = 0;
    for &(sex, mean, spread, count) in &SEXES {
        for _ in 0..count {
            writer.write_record(abalone_row(sex, mean, spread, rng))?;
            rows += 1;
        }
    }

    // A few rows the loader has to tolerate.
    let malformed: [&[&str]; 4] = [
        &["M", "0.5", "?", "0.1", "0.4", "0.2", "0.1", "0.15", "9"],
        &["F", "0.52", "0.41", "", "0.61", "0.25", "0.13", "0.2", "11"],
        &["X", "0.4", "0.3", "0.1", "0.3", "0.1", "0.07", "0.1", "8"],
        &["I", "0.3", "0.22"],
    ];
    for record in malformed {
        writer.write_record(record)?;
        rows += 1;
    }
    writer.flush()?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Iris: header + class column
// ---------------------------------------------------------------------------

/// (class, per-feature (mean, std dev))
const CLASSES: [(&str, [(f64, f64); 4]); 3] = [
    ("Iris-setosa", [(5.01, 0.35), (3.43, 0.38), (1.46, 0.17), (0.25, 0.11)]),
    ("Iris-versicolor", [(5.94, 0.52), (2.77, 0.31), (4.26, 0.47), (1.33, 0.20)]),
    ("Iris-virginica", [(6.59, 0.64), (2.97, 0.32), (5.55, 0.55), (2.03, 0.27)]),
];

const IRIS_PER_CLASS: usize = 50;

fn write_iris(path: &Path, rng: &mut SimpleRng) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(["sepal length", "sepal width", "petal length", "petal width", "class"])?;

    let mut rows = 0;
    for (class, features) in &CLASSES {
        for _ in 0..IRIS_PER_CLASS {
            let mut row: Vec<String> = features
                .iter()
                .map(|&(mean, sd)| format!("{:.1}", rng.gauss(mean, sd).max(0.1)))
                .collect();
            row.push(class.to_string());
            writer.write_record(&row)?;
            rows += 1;
        }
    }
    writer.flush()?;
    Ok(rows)
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let dir = Path::new("samples");
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let abalone = dir.join("abalone.data");
    let n = write_abalone(&abalone, &mut rng)?;
    println!("Wrote {n} abalone rows to {}", abalone.display());

    let iris = dir.join("iris.csv");
    let n = write_iris(&iris, &mut rng)?;
    println!("Wrote {n} iris rows to {}", iris.display());
    Ok(())
}
