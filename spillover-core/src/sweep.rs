//! Sweep runtime: nested parameter loops driving bootstrap trials.
//!
//! A [`Sweep`] iterates every `(s, c, n)` parameter combination in its
//! configured ranges, builds one population graph per combination, and
//! invokes a [`Sampler`] for each sample size and bootstrap iteration,
//! collecting one trial record per invocation.

use std::{num::NonZeroUsize, sync::Arc};

use rand::{SeedableRng, rngs::SmallRng};
use tracing::{debug, instrument};

use crate::{
    Result,
    error::SweepError,
    population::PopulationGraph,
    sampler::Sampler,
    table::{TrialRecord, TrialTable},
};

/// Step of the cluster-size axis: `n` is swept `10, 20, .., N`.
pub(crate) const CLUSTER_SIZE_STEP: usize = 10;

/// Entry point for running the simulation sweep.
///
/// Constructed through [`crate::SweepBuilder`], which validates every
/// parameter; a `Sweep` therefore always describes a runnable configuration.
///
/// # Examples
/// ```
/// use spillover_core::{CrossPairSampler, SweepBuilder};
///
/// let sweep = SweepBuilder::new()
///     .with_cluster_size_max(20)
///     .with_bridge_count_max(1)
///     .with_sample_size_max(2)
///     .with_iterations(3)
///     .with_seed(7)
///     .build()
///     .expect("configuration is valid");
/// let table = sweep.run(&CrossPairSampler).expect("sweep must succeed");
/// assert_eq!(table.records().len(), sweep.trial_count());
/// ```
#[derive(Debug, Clone)]
pub struct Sweep {
    cluster_count_max: usize,
    cluster_size_max: usize,
    bridge_count_max: usize,
    sample_size_max: usize,
    iterations: NonZeroUsize,
    seed: Option<u64>,
}

impl Sweep {
    pub(crate) fn new(
        cluster_count_max: usize,
        cluster_size_max: usize,
        bridge_count_max: usize,
        sample_size_max: usize,
        iterations: NonZeroUsize,
        seed: Option<u64>,
    ) -> Self {
        Self {
            cluster_count_max,
            cluster_size_max,
            bridge_count_max,
            sample_size_max,
            iterations,
            seed,
        }
    }

    /// Returns the inclusive maximum cluster count (`S`).
    #[must_use]
    pub fn cluster_count_max(&self) -> usize {
        self.cluster_count_max
    }

    /// Returns the inclusive maximum nodes per cluster (`N`).
    #[must_use]
    pub fn cluster_size_max(&self) -> usize {
        self.cluster_size_max
    }

    /// Returns the inclusive maximum bridge count (`C`).
    #[must_use]
    pub fn bridge_count_max(&self) -> usize {
        self.bridge_count_max
    }

    /// Returns the inclusive maximum per-group sample size (`K`).
    #[must_use]
    pub fn sample_size_max(&self) -> usize {
        self.sample_size_max
    }

    /// Returns the bootstrap iterations per parameter combination.
    #[must_use]
    pub fn iterations(&self) -> NonZeroUsize {
        self.iterations
    }

    /// Returns the explicit seed, if one was configured.
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Returns the exact number of trials a run will produce:
    /// `(S-1) * C * (N/10) * K * iterations`.
    #[must_use]
    pub fn trial_count(&self) -> usize {
        (self.cluster_count_max - 1)
            * self.bridge_count_max
            * (self.cluster_size_max / CLUSTER_SIZE_STEP)
            * self.sample_size_max
            * self.iterations.get()
    }

    /// Runs the sweep with the given sampler and collects every trial.
    ///
    /// Loop order is deterministic, outer to inner: cluster count `s` from 2,
    /// bridge count `c` from 1, cluster size `n` from 10 in steps of 10, then
    /// sample size `k` from 1 and the bootstrap iteration index. Exactly one
    /// population graph is built per `(n, s, c)` combination and shared
    /// read-only across its inner `k`/iteration trials.
    ///
    /// # Errors
    /// Propagates [`SweepError::Population`] when graph construction fails
    /// and [`SweepError::Sampler`] carrying the sampler's name and its error
    /// unchanged when an invocation fails. The run halts at the point of
    /// failure; no partial table is returned.
    #[instrument(
        name = "sweep.run",
        err,
        skip(self, sampler),
        fields(
            sampler = %sampler.name(),
            cluster_count_max = self.cluster_count_max,
            cluster_size_max = self.cluster_size_max,
            bridge_count_max = self.bridge_count_max,
            sample_size_max = self.sample_size_max,
            iterations = %self.iterations,
        ),
    )]
    pub fn run<P: Sampler + ?Sized>(&self, sampler: &P) -> Result<TrialTable> {
        let mut rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let mut records = Vec::with_capacity(self.trial_count());

        for cluster_count in 2..=self.cluster_count_max {
            for bridge_count in 1..=self.bridge_count_max {
                for cluster_size in
                    (CLUSTER_SIZE_STEP..=self.cluster_size_max).step_by(CLUSTER_SIZE_STEP)
                {
                    let population = PopulationGraph::build(
                        cluster_size,
                        cluster_count,
                        bridge_count,
                        &mut rng,
                    )?;
                    debug!(
                        cluster_size,
                        cluster_count,
                        bridge_count,
                        edges = population.edge_count(),
                        "population graph built"
                    );
                    for sample_size in 1..=self.sample_size_max {
                        for _ in 0..self.iterations.get() {
                            let bias = sampler
                                .sample(&population, sample_size, cluster_count, &mut rng)
                                .map_err(|error| SweepError::Sampler {
                                    sampler: Arc::from(sampler.name()),
                                    error,
                                })?;
                            records.push(TrialRecord::new(
                                cluster_size,
                                cluster_count,
                                bridge_count,
                                sample_size,
                                bias,
                            ));
                        }
                    }
                }
            }
        }

        debug!(trials = records.len(), "sweep completed");
        Ok(TrialTable::new(records, self.iterations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{
        builder::SweepBuilder,
        error::{SamplerError, SweepErrorCode},
        sampler::{CrossPairSampler, DegreeAwareSampler},
        test_utils::CountingSampler,
    };
    use std::sync::{Arc, atomic::AtomicUsize};

    fn small_sweep() -> Sweep {
        SweepBuilder::new()
            .with_cluster_size_max(20)
            .with_bridge_count_max(1)
            .with_sample_size_max(2)
            .with_iterations(3)
            .with_seed(1234)
            .build()
            .expect("configuration is valid")
    }

    #[test]
    fn run_produces_exactly_the_guaranteed_trial_count() {
        let sweep = small_sweep();
        let table = sweep.run(&CrossPairSampler).expect("sweep must succeed");

        // (2-1) * 1 * (20/10) * 2 * 3 trials.
        assert_eq!(sweep.trial_count(), 12);
        assert_eq!(table.records().len(), 12);
        for record in table.records() {
            assert!([10, 20].contains(&record.cluster_size()));
            assert_eq!(record.cluster_count(), 2);
            assert_eq!(record.bridge_count(), 1);
            assert!([1, 2].contains(&record.sample_size()));
        }
    }

    #[test]
    fn rows_follow_the_outer_to_inner_loop_order() {
        let table = small_sweep()
            .run(&CrossPairSampler)
            .expect("sweep must succeed");

        let keys: Vec<_> = table
            .records()
            .iter()
            .map(|r| (r.cluster_size(), r.sample_size()))
            .collect();
        let expected: Vec<_> = [10, 20]
            .into_iter()
            .flat_map(|n| [1, 2].into_iter().flat_map(move |k| [(n, k); 3]))
            .collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn the_sampler_is_invoked_once_per_trial() {
        let calls = Arc::new(AtomicUsize::new(0));
        let sampler = CountingSampler::new(1, Arc::clone(&calls));
        let sweep = small_sweep();

        let table = sweep.run(&sampler).expect("sweep must succeed");
        assert_eq!(table.records().len(), sweep.trial_count());
        assert_eq!(
            calls.load(std::sync::atomic::Ordering::Relaxed),
            sweep.trial_count(),
        );
    }

    #[test]
    fn sampler_failures_propagate_wrapped_with_the_sampler_name() {
        let err = small_sweep()
            .run(&DegreeAwareSampler)
            .expect_err("the extension point has no algorithm");

        assert_eq!(err.code(), SweepErrorCode::Sampler);
        match err {
            SweepError::Sampler { sampler, error } => {
                assert_eq!(sampler.as_ref(), "degree-aware");
                assert!(matches!(error, SamplerError::NotImplemented { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn identical_seeds_reproduce_identical_tables() {
        let first = small_sweep().run(&CrossPairSampler).expect("sweep must succeed");
        let second = small_sweep().run(&CrossPairSampler).expect("sweep must succeed");
        assert_eq!(first, second);
    }

    #[test]
    fn aggregating_a_run_yields_one_row_per_combination() {
        let sweep = small_sweep();
        let aggregated = sweep
            .run(&CrossPairSampler)
            .expect("sweep must succeed")
            .aggregate();

        // 2 cluster sizes x 2 sample sizes, everything else fixed.
        assert_eq!(aggregated.rows().len(), 4);
        assert_eq!(aggregated.iterations(), sweep.iterations());
    }
}
