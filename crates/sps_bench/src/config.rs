use crate::error::BenchmarkError;
use crate::report::RunHeader;
use crate::stage::BenchmarkMode;
use bilinear::{BilinearGroup, CountingBilinearGroup};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};
use std::env;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

pub type BenchRng = ChaCha20Rng;

pub const DEFAULT_PREWARM_ITERATIONS: usize = 20;
pub const DEFAULT_RUN_ITERATIONS: usize = 100;
pub const DEFAULT_MESSAGE_LENGTH: usize = 32;
const DEFAULT_SEED_LABEL: &str = "sps-bench";

/// Shared settings of one benchmark session.
///
/// Holds the real group for timing runs and the counting substitute for
/// counting runs; each engine only ever reads its own substrate.
pub struct BenchmarkConfig<T: BilinearGroup, C: BilinearGroup> {
    timing_group: T,
    counting_group: CountingBilinearGroup<C>,
    prewarm_iterations: usize,
    run_iterations: usize,
    payload_size: usize,
    seed: u64,
}

impl<T: BilinearGroup, C: BilinearGroup> BenchmarkConfig<T, C> {
    pub fn new(
        timing_group: T,
        counting_group: C,
        prewarm_iterations: usize,
        run_iterations: usize,
        payload_size: usize,
    ) -> Result<Self, BenchmarkError> {
        validate_iterations(prewarm_iterations, run_iterations)?;
        Ok(Self {
            timing_group,
            counting_group: CountingBilinearGroup::new(counting_group),
            prewarm_iterations,
            run_iterations,
            payload_size,
            seed: seed_from_str(DEFAULT_SEED_LABEL),
        })
    }

    pub fn from_settings(
        timing_group: T,
        counting_group: C,
        settings: &BenchmarkSettings,
    ) -> Result<Self, BenchmarkError> {
        Ok(Self::new(
            timing_group,
            counting_group,
            settings.prewarm_iterations,
            settings.run_iterations,
            settings.payload_size,
        )?
        .with_seed(settings.seed))
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn timing_group(&self) -> &T {
        &self.timing_group
    }

    pub fn counting_group(&self) -> &CountingBilinearGroup<C> {
        &self.counting_group
    }

    pub fn prewarm_iterations(&self) -> usize {
        self.prewarm_iterations
    }

    pub fn run_iterations(&self) -> usize {
        self.run_iterations
    }

    pub fn payload_size(&self) -> usize {
        self.payload_size
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Independent random stream for `label`, derived from the session seed.
    pub fn rng(&self, label: &str) -> BenchRng {
        BenchRng::seed_from_u64(self.seed ^ seed_from_str(label))
    }

    pub fn header<'a>(
        &self,
        scheme: &'a str,
        tex_name: String,
        mode: BenchmarkMode,
    ) -> RunHeader<'a> {
        let substrate = match mode {
            BenchmarkMode::Timing => self.timing_group.name(),
            BenchmarkMode::Counting => self.counting_group.name(),
        };
        RunHeader {
            scheme,
            tex_name,
            mode,
            substrate,
            prewarm_iterations: self.prewarm_iterations,
            run_iterations: self.run_iterations,
            payload_size: self.payload_size,
        }
    }
}

impl<T: BilinearGroup, C: BilinearGroup> fmt::Display for BenchmarkConfig<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} iterations :: messageLength {} :: {} pre-warm",
            self.run_iterations, self.payload_size, self.prewarm_iterations
        )
    }
}

pub(crate) fn validate_iterations(
    prewarm_iterations: usize,
    run_iterations: usize,
) -> Result<(), BenchmarkError> {
    if run_iterations == 0 {
        return Err(BenchmarkError::InvalidConfiguration(
            "at least one measured iteration is required".to_owned(),
        ));
    }
    // pre-warm calls index the same slots as measured calls
    if prewarm_iterations > run_iterations {
        return Err(BenchmarkError::InvalidConfiguration(format!(
            "the amount of pre-warm iterations ({prewarm_iterations}) may not \
             be larger than the amount of measured iterations \
             ({run_iterations})"
        )));
    }
    Ok(())
}

/// Iteration counts, payload size and seed as read from the environment.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BenchmarkSettings {
    pub prewarm_iterations: usize,
    pub run_iterations: usize,
    pub payload_size: usize,
    pub deterministic: bool,
    pub seed: u64,
}

impl Default for BenchmarkSettings {
    fn default() -> Self {
        Self {
            prewarm_iterations: DEFAULT_PREWARM_ITERATIONS,
            run_iterations: DEFAULT_RUN_ITERATIONS,
            payload_size: DEFAULT_MESSAGE_LENGTH,
            deterministic: true,
            seed: seed_from_str(DEFAULT_SEED_LABEL),
        }
    }
}

impl BenchmarkSettings {
    pub fn from_env() -> Result<Self, BenchmarkError> {
        let deterministic = parse_bool_env("SPS_DETERMINISTIC", true);
        let seed = if deterministic {
            seed_from_str(DEFAULT_SEED_LABEL)
        } else {
            random_seed(DEFAULT_SEED_LABEL)
        };
        let settings = Self {
            prewarm_iterations: parse_usize_env(
                "SPS_PREWARM",
                DEFAULT_PREWARM_ITERATIONS,
            )?,
            run_iterations: parse_usize_env(
                "SPS_ITERATIONS",
                DEFAULT_RUN_ITERATIONS,
            )?,
            payload_size: parse_usize_env(
                "SPS_MESSAGE_LENGTH",
                DEFAULT_MESSAGE_LENGTH,
            )?,
            deterministic,
            seed,
        };
        validate_iterations(
            settings.prewarm_iterations,
            settings.run_iterations,
        )?;
        Ok(settings)
    }
}

pub fn parse_usize_env(
    name: &str,
    default: usize,
) -> Result<usize, BenchmarkError> {
    match env::var(name) {
        Ok(value) => value.trim().parse::<usize>().map_err(|_| {
            BenchmarkError::InvalidConfiguration(format!(
                "{name}={value} is not a non-negative integer"
            ))
        }),
        Err(_) => Ok(default),
    }
}

pub fn parse_bool_env(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(value) => {
            matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES")
        }
        Err(_) => default,
    }
}

pub fn seed_from_str(seed: &str) -> u64 {
    let digest = Sha256::digest(seed.as_bytes());
    let mut seed_bytes = [0_u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}

pub fn random_seed(label: &str) -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let pid = std::process::id() as u64;
    let mix = now.as_nanos() as u64 ^ (pid << 32);
    mix ^ seed_from_str(label)
}
