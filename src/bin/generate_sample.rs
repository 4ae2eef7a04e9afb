//! Writes a small synthetic dataset in the MUCT on-disk layout:
//! `muct-landmarks/muct76-opencv.csv` plus one JPEG per face under `jpg/`.
//!
//! Every face gets a canonical `i…` row and a mirrored `ir…` row; roughly one
//! face in ten has a missing landmark.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use image::{Rgb, RgbImage};

use muct_dataset::{Landmarks, Point, NUM_LANDMARKS};

const WIDTH: u32 = 120;
const HEIGHT: u32 = 160;
const CAMERAS: [char; 5] = ['a', 'b', 'c', 'd', 'e'];

#[derive(Parser, Debug)]
#[command(about = "Generate a synthetic MUCT-style dataset")]
struct Args {
    /// Output dataset directory
    #[arg(short, long, default_value = "sample_muct")]
    out: PathBuf,

    /// Number of subjects (each photographed by five cameras)
    #[arg(short, long, default_value = "4")]
    subjects: usize,

    /// PRNG seed
    #[arg(long, default_value = "42")]
    seed: u64,
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

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

/// A rough face: jaw on the lower half of an ellipse, every other point
/// somewhere inside it.
fn synthetic_face(rng: &mut SimpleRng) -> Landmarks {
    let cx = f64::from(WIDTH) / 2.0 + rng.uniform(-6.0, 6.0);
    let cy = f64::from(HEIGHT) / 2.0 + rng.uniform(-6.0, 6.0);
    let (rx, ry) = (f64::from(WIDTH) * 0.35, f64::from(HEIGHT) * 0.35);

    let points = (0..NUM_LANDMARKS)
        .map(|i| {
            let (x, y) = if i < 15 {
                let t = std::f64::consts::PI * (i as f64 / 14.0);
                (cx - rx * t.cos(), cy + ry * t.sin())
            } else {
                (
                    cx + rx * rng.uniform(-0.8, 0.8),
                    cy + ry * rng.uniform(-0.8, 0.6),
                )
            };
            Point::new(x.round().max(1.0), y.round().max(1.0))
        })
        .collect();
    Landmarks::from_points(points).expect("face has NUM_LANDMARKS points")
}

fn draw_face(landmarks: &Landmarks) -> RgbImage {
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, Rgb([90, 90, 90]));
    for p in landmarks.points().iter().filter(|p| !p.is_missing()) {
        let (x, y) = (p.x as u32, p.y as u32);
        if x < WIDTH && y < HEIGHT {
            img.put_pixel(x, y, Rgb([255, 255, 255]));
        }
    }
    img
}

fn csv_row(name: &str, tag: &str, landmarks: &Landmarks) -> Vec<String> {
    let mut row = vec![name.to_string(), tag.to_string()];
    row.extend(landmarks.to_flat_vec().iter().map(|v| v.to_string()));
    row
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    let jpg_dir = args.out.join("jpg");
    let csv_dir = args.out.join("muct-landmarks");
    std::fs::create_dir_all(&jpg_dir).with_context(|| format!("creating {}", jpg_dir.display()))?;
    std::fs::create_dir_all(&csv_dir).with_context(|| format!("creating {}", csv_dir.display()))?;

    let mut header = vec!["name".to_string(), "tag".to_string()];
    for i in 0..NUM_LANDMARKS {
        header.push(format!("x{i:02}"));
        header.push(format!("y{i:02}"));
    }

    let mut canonical_rows = Vec::new();
    let mut mirrored_rows = Vec::new();
    for subject in 0..args.subjects {
        let sex = if subject % 2 == 0 { 'f' } else { 'm' };
        for cam in CAMERAS {
            let stem = format!("{subject:03}q{cam}-{sex}n");
            let name = format!("i{stem}");
            let tag = format!("q{cam}");

            let mut values = synthetic_face(&mut rng).to_flat_vec();
            if rng.next_f64() < 0.1 {
                let idx = (rng.next_u64() % NUM_LANDMARKS as u64) as usize;
                values[2 * idx] = 0.0;
                values[2 * idx + 1] = 0.0;
            }
            let face = Landmarks::from_flat(&values).expect("flat face has 152 values");
            let mirrored = face.mirrored(WIDTH)?;

            let path = jpg_dir.join(format!("{name}.jpg"));
            draw_face(&face)
                .save(&path)
                .with_context(|| format!("writing {}", path.display()))?;

            canonical_rows.push(csv_row(&name, &tag, &face));
            mirrored_rows.push(csv_row(&format!("ir{stem}"), &tag, &mirrored));
        }
    }

    let csv_path = csv_dir.join("muct76-opencv.csv");
    let mut writer = csv::Writer::from_path(&csv_path)
        .with_context(|| format!("creating {}", csv_path.display()))?;
    writer.write_record(&header)?;
    for row in canonical_rows.iter().chain(&mirrored_rows) {
        writer.write_record(row)?;
    }
    writer.flush()?;

    log::info!(
        "wrote {} faces ({} rows) to {}",
        canonical_rows.len(),
        canonical_rows.len() + mirrored_rows.len(),
        args.out.display()
    );
    Ok(())
}
