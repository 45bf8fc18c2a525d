use std::env;
use std::time::Duration;

use criterion::BenchmarkGroup;
use criterion::measurement::WallTime;

mod rng;

pub use rng::XorShift64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchTier {
    Quick,
    Full,
}

impl BenchTier {
    pub fn from_env() -> Self {
        match env::var("RAST_BENCH_TIER").as_deref() {
            Ok("full") => Self::Full,
            _ => Self::Quick,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub tier: BenchTier,
    pub seed: u64,
}

pub fn bench_config() -> BenchConfig {
    let seed = env::var("RAST_BENCH_SEED")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0xC0FFEE);
    BenchConfig {
        tier: BenchTier::from_env(),
        seed,
    }
}

pub fn configure_group(group: &mut BenchmarkGroup<'_, WallTime>, cfg: &BenchConfig) {
    match cfg.tier {
        BenchTier::Quick => {
            group.sample_size(10);
            group.measurement_time(Duration::from_secs(3));
        }
        BenchTier::Full => {
            group.sample_size(30);
            group.measurement_time(Duration::from_secs(10));
        }
    }
}
