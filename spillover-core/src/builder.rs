//! Builder utilities for configuring simulation sweeps.
//!
//! Exposes the parameter surface and validation used before constructing
//! [`Sweep`] runtimes. All preconditions are checked here, before any
//! population graph exists.

use std::num::NonZeroUsize;

use crate::{
    Result,
    error::SweepError,
    sweep::{CLUSTER_SIZE_STEP, Sweep},
};

const DEFAULT_CLUSTER_COUNT_MAX: usize = 2;
const DEFAULT_CLUSTER_SIZE_MAX: usize = 100;
const DEFAULT_BRIDGE_COUNT_MAX: usize = 10;
const DEFAULT_SAMPLE_SIZE_MAX: usize = 10;
const DEFAULT_ITERATIONS: usize = 10;

/// Configures and constructs [`Sweep`] instances.
///
/// Each `*_max` parameter is the inclusive upper end of one sweep axis: the
/// runtime iterates cluster counts `2..=S`, bridge counts `1..=C`, cluster
/// sizes `10..=N` in steps of 10, and sample sizes `1..=K`.
///
/// # Examples
/// ```
/// use spillover_core::SweepBuilder;
///
/// let sweep = SweepBuilder::new()
///     .with_cluster_size_max(20)
///     .with_bridge_count_max(1)
///     .with_sample_size_max(2)
///     .with_iterations(3)
///     .build()
///     .expect("configuration is valid");
/// assert_eq!(sweep.trial_count(), 12);
/// ```
#[derive(Debug, Clone)]
pub struct SweepBuilder {
    cluster_count_max: usize,
    cluster_size_max: usize,
    bridge_count_max: usize,
    sample_size_max: usize,
    iterations: usize,
    seed: Option<u64>,
}

impl Default for SweepBuilder {
    fn default() -> Self {
        Self {
            cluster_count_max: DEFAULT_CLUSTER_COUNT_MAX,
            cluster_size_max: DEFAULT_CLUSTER_SIZE_MAX,
            bridge_count_max: DEFAULT_BRIDGE_COUNT_MAX,
            sample_size_max: DEFAULT_SAMPLE_SIZE_MAX,
            iterations: DEFAULT_ITERATIONS,
            seed: None,
        }
    }
}

impl SweepBuilder {
    /// Creates a builder populated with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the inclusive maximum cluster count (`S`, swept from 2).
    #[must_use]
    pub fn with_cluster_count_max(mut self, cluster_count_max: usize) -> Self {
        self.cluster_count_max = cluster_count_max;
        self
    }

    /// Sets the inclusive maximum nodes per cluster (`N`, swept from 10 in
    /// steps of 10).
    #[must_use]
    pub fn with_cluster_size_max(mut self, cluster_size_max: usize) -> Self {
        self.cluster_size_max = cluster_size_max;
        self
    }

    /// Sets the inclusive maximum bridge count (`C`, swept from 1).
    #[must_use]
    pub fn with_bridge_count_max(mut self, bridge_count_max: usize) -> Self {
        self.bridge_count_max = bridge_count_max;
        self
    }

    /// Sets the inclusive maximum per-group sample size (`K`, swept from 1).
    #[must_use]
    pub fn with_sample_size_max(mut self, sample_size_max: usize) -> Self {
        self.sample_size_max = sample_size_max;
        self
    }

    /// Sets the bootstrap iterations per parameter combination.
    #[must_use]
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Seeds the sweep's random source so runs are reproducible.
    ///
    /// Without a seed the runtime draws one from entropy, so bias values
    /// vary run to run while row order stays deterministic.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration and constructs a [`Sweep`].
    ///
    /// # Errors
    /// Returns [`SweepError::TooFewClusters`] when the cluster-count maximum
    /// is below 2, [`SweepError::ClusterSizeNotStepAligned`] when the
    /// cluster-size maximum is not a positive multiple of 10,
    /// [`SweepError::NoBridges`] / [`SweepError::NoSamples`] /
    /// [`SweepError::NoIterations`] when the respective parameter is zero.
    ///
    /// # Examples
    /// ```
    /// use spillover_core::SweepBuilder;
    ///
    /// let err = SweepBuilder::new()
    ///     .with_cluster_size_max(15)
    ///     .build()
    ///     .expect_err("15 is not a multiple of 10");
    /// assert_eq!(err.code().as_str(), "SWEEP_CLUSTER_SIZE_NOT_STEP_ALIGNED");
    /// ```
    pub fn build(self) -> Result<Sweep> {
        if self.cluster_count_max < 2 {
            return Err(SweepError::TooFewClusters {
                got: self.cluster_count_max,
            });
        }
        if self.cluster_size_max == 0 || self.cluster_size_max % CLUSTER_SIZE_STEP != 0 {
            return Err(SweepError::ClusterSizeNotStepAligned {
                got: self.cluster_size_max,
                step: CLUSTER_SIZE_STEP,
            });
        }
        if self.bridge_count_max < 1 {
            return Err(SweepError::NoBridges);
        }
        if self.sample_size_max < 1 {
            return Err(SweepError::NoSamples);
        }
        let iterations =
            NonZeroUsize::new(self.iterations).ok_or(SweepError::NoIterations)?;

        Ok(Sweep::new(
            self.cluster_count_max,
            self.cluster_size_max,
            self.bridge_count_max,
            self.sample_size_max,
            iterations,
            self.seed,
        ))
    }
}
