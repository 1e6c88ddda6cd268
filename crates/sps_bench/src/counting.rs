use crate::error::BenchmarkError;
use crate::stage::Stage;
use bilinear::{BilinearGroup, BucketCounts, CountingBilinearGroup};
use tracing::debug;

/// Calls attributed to a stage's bucket after pre-warm. Counts do not
/// depend on timing noise, so one representative call suffices.
pub const ATTRIBUTED_CALLS: usize = 1;

/// Attributes the primitive operations of one stage call to the stage's
/// bucket.
pub struct CountingEngine<'a, B: BilinearGroup> {
    group: &'a CountingBilinearGroup<B>,
    prewarm_iterations: usize,
}

impl<'a, B: BilinearGroup> CountingEngine<'a, B> {
    pub fn new(
        group: &'a CountingBilinearGroup<B>,
        prewarm_iterations: usize,
    ) -> Self {
        Self {
            group,
            prewarm_iterations,
        }
    }

    pub fn measure<F, T>(
        &self,
        stage: Stage,
        mut step: F,
    ) -> Result<BucketCounts, BenchmarkError>
    where
        F: FnMut(usize) -> Result<T, BenchmarkError>,
    {
        debug!(%stage, iterations = self.prewarm_iterations, "pre-warm");
        for iteration in 0..self.prewarm_iterations {
            step(iteration)?;
        }

        self.group.set_bucket(stage.bucket());
        self.group.reset_counters();
        for iteration in 0..ATTRIBUTED_CALLS {
            step(iteration)?;
        }
        let counts = self.group.bucket_counts(stage.bucket());
        debug!(%stage, %counts, "counted");
        Ok(counts)
    }
}
