//! Shared test utilities for `spillover-core`.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use rand::rngs::SmallRng;

use crate::{error::SamplerError, population::PopulationGraph, sampler::Sampler};

/// [`Sampler`] implementation that records invocations and reports a fixed
/// bias, for asserting how the sweep drives its collaborator.
pub(crate) struct CountingSampler {
    bias: u64,
    calls: Arc<AtomicUsize>,
}

impl CountingSampler {
    pub(crate) fn new(bias: u64, calls: Arc<AtomicUsize>) -> Self {
        Self { bias, calls }
    }
}

impl Sampler for CountingSampler {
    fn name(&self) -> &str {
        "counting"
    }

    fn sample(
        &self,
        _population: &PopulationGraph,
        _sample_size: usize,
        _group_count: usize,
        _rng: &mut SmallRng,
    ) -> Result<u64, SamplerError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.bias)
    }
}
