#![allow(dead_code)]

use std::sync::OnceLock;

use palette::Srgba;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;
use swatchscan::SampleGrid;

/// Grid sizes used by the benchmarks, from a 25px viewer thumbnail up to full HD.
pub const SIZES: [(u32, u32); 4] = [(25, 16), (160, 90), (480, 270), (1920, 1080)];

/// A smooth gradient with seeded noise, so the grid has a realistic number of distinct swatches.
pub fn noisy_gradient(width: u32, height: u32, seed: u64) -> SampleGrid {
    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(seed);
    let samples = (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .map(|(x, y)| {
            let r = (x * 255 / width.max(1)) as u8;
            let g = (y * 255 / height.max(1)) as u8;
            let b = rng.gen::<u8>() / 4 + 96;
            Srgba::new(r.wrapping_add(rng.gen::<u8>() % 16), g, b, 255)
        })
        .collect();

    SampleGrid::new(width, height, samples).unwrap()
}

static BENCH_GRIDS: OnceLock<Vec<(String, SampleGrid)>> = OnceLock::new();

pub fn bench_grids() -> &'static [(String, SampleGrid)] {
    BENCH_GRIDS.get_or_init(|| {
        SIZES
            .iter()
            .map(|&(w, h)| (format!("{w}x{h}"), noisy_gradient(w, h, 0)))
            .collect()
    })
}
