use crate::config::validate_iterations;
use crate::error::BenchmarkError;
use crate::memory;
use crate::stage::Stage;
use std::time::Instant;
use tracing::debug;

const NANOS_PER_MILLI: f64 = 1_000_000.0;

/// Aggregate wall-clock statistics of one stage, in nanoseconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BenchmarkTimes {
    min: f64,
    max: f64,
    sum: f64,
    avg: f64,
    std_dev: f64,
    samples: usize,
}

impl BenchmarkTimes {
    /// `None` for an empty sample set.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let sum: f64 = samples.iter().sum();
        let count = samples.len() as f64;
        let avg = (sum / count).clamp(min, max);
        let std_dev = if samples.len() > 1 {
            let variance = samples
                .iter()
                .map(|sample| (sample - avg).powi(2))
                .sum::<f64>()
                / (count - 1.0);
            variance.sqrt()
        } else {
            0.0
        };

        Some(Self {
            min,
            max,
            sum,
            avg,
            std_dev,
            samples: samples.len(),
        })
    }

    pub fn min_nanos(&self) -> f64 {
        self.min
    }

    pub fn max_nanos(&self) -> f64 {
        self.max
    }

    pub fn sum_nanos(&self) -> f64 {
        self.sum
    }

    pub fn avg_nanos(&self) -> f64 {
        self.avg
    }

    pub fn std_dev_nanos(&self) -> f64 {
        self.std_dev
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn min_millis(&self) -> f64 {
        self.min / NANOS_PER_MILLI
    }

    pub fn max_millis(&self) -> f64 {
        self.max / NANOS_PER_MILLI
    }

    pub fn sum_millis(&self) -> f64 {
        self.sum / NANOS_PER_MILLI
    }

    pub fn avg_millis(&self) -> f64 {
        self.avg / NANOS_PER_MILLI
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimedStage {
    pub times: BenchmarkTimes,
    pub peak_heap_bytes: usize,
}

/// Runs a stage `prewarm` times unmeasured, then `run` times with each call
/// timed on its own.
#[derive(Clone, Copy, Debug)]
pub struct TimingEngine {
    prewarm_iterations: usize,
    run_iterations: usize,
}

impl TimingEngine {
    pub fn new(
        prewarm_iterations: usize,
        run_iterations: usize,
    ) -> Result<Self, BenchmarkError> {
        validate_iterations(prewarm_iterations, run_iterations)?;
        Ok(Self {
            prewarm_iterations,
            run_iterations,
        })
    }

    /// Whatever `step` returns is dropped only after the clock was read, so
    /// a step can hand back the values it displaced instead of dropping
    /// them inside the timed window.
    pub fn measure<F, T>(
        &self,
        stage: Stage,
        mut step: F,
    ) -> Result<TimedStage, BenchmarkError>
    where
        F: FnMut(usize) -> Result<T, BenchmarkError>,
    {
        debug!(%stage, iterations = self.prewarm_iterations, "pre-warm");
        for iteration in 0..self.prewarm_iterations {
            step(iteration)?;
        }

        let mut samples = Vec::with_capacity(self.run_iterations);
        memory::reset_peak();
        for iteration in 0..self.run_iterations {
            let start = Instant::now();
            let outcome = step(iteration);
            let elapsed = start.elapsed();
            let displaced = outcome?;
            samples.push(elapsed.as_nanos() as f64);
            drop(displaced);
        }
        let peak_heap_bytes = memory::peak_bytes();

        let times = BenchmarkTimes::from_samples(&samples).ok_or_else(|| {
            BenchmarkError::InvalidConfiguration(
                "no measured samples were collected".to_owned(),
            )
        })?;
        debug!(
            %stage,
            avg_ms = times.avg_millis(),
            peak_heap_bytes,
            "measured"
        );
        Ok(TimedStage {
            times,
            peak_heap_bytes,
        })
    }
}
