//! Trial and aggregate tables produced by a sweep.
//!
//! The sweep appends one [`TrialRecord`] per sampler invocation to a growable
//! [`TrialTable`]; aggregation groups the records by their exact parameter
//! tuple and collapses bias by summation into an [`AggregatedTable`].

use std::{collections::BTreeMap, num::NonZeroUsize};

/// One bootstrap trial: the parameter combination it ran under and the bias
/// the sampler reported.
///
/// Records are immutable once created. Column names follow the conventional
/// `N, S, C, K, Bias` labelling of the aggregated output: `cluster_size` is
/// `N`, `cluster_count` is `S`, `bridge_count` is `C`, `sample_size` is `K`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialRecord {
    cluster_size: usize,
    cluster_count: usize,
    bridge_count: usize,
    sample_size: usize,
    bias: u64,
}

impl TrialRecord {
    /// Creates a record for one sampler invocation.
    #[must_use]
    pub fn new(
        cluster_size: usize,
        cluster_count: usize,
        bridge_count: usize,
        sample_size: usize,
        bias: u64,
    ) -> Self {
        Self {
            cluster_size,
            cluster_count,
            bridge_count,
            sample_size,
            bias,
        }
    }

    /// Returns the nodes per cluster (`N`) the trial ran under.
    #[must_use]
    pub fn cluster_size(&self) -> usize {
        self.cluster_size
    }

    /// Returns the cluster count (`S`) the trial ran under.
    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.cluster_count
    }

    /// Returns the bridges per adjacent cluster pair (`C`) the trial ran under.
    #[must_use]
    pub fn bridge_count(&self) -> usize {
        self.bridge_count
    }

    /// Returns the per-group sample size (`K`) the trial ran under.
    #[must_use]
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Returns the bias the sampler reported for this trial.
    #[must_use]
    pub fn bias(&self) -> u64 {
        self.bias
    }

    fn key(&self) -> (usize, usize, usize, usize) {
        (
            self.cluster_size,
            self.cluster_count,
            self.bridge_count,
            self.sample_size,
        )
    }
}

/// The raw output of [`crate::Sweep::run`]: every trial in deterministic
/// outer-to-inner loop order, plus the iteration count that produced them.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use spillover_core::{TrialRecord, TrialTable};
///
/// let table = TrialTable::new(
///     vec![
///         TrialRecord::new(10, 2, 1, 1, 1),
///         TrialRecord::new(10, 2, 1, 1, 0),
///         TrialRecord::new(10, 2, 1, 2, 3),
///     ],
///     NonZeroUsize::new(2).expect("iterations are positive"),
/// );
/// let aggregated = table.aggregate();
/// assert_eq!(aggregated.rows().len(), 2);
/// assert_eq!(aggregated.rows()[0].bias_sum(), 1);
/// assert_eq!(aggregated.rows()[1].bias_sum(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialTable {
    records: Vec<TrialRecord>,
    iterations: NonZeroUsize,
}

impl TrialTable {
    /// Wraps collected trial records together with the iteration count used
    /// to produce them.
    #[must_use]
    pub fn new(records: Vec<TrialRecord>, iterations: NonZeroUsize) -> Self {
        Self {
            records,
            iterations,
        }
    }

    /// Returns the trial records in collection order.
    #[must_use]
    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    /// Returns the bootstrap iterations performed per parameter combination.
    #[must_use]
    pub fn iterations(&self) -> NonZeroUsize {
        self.iterations
    }

    /// Groups the records by their exact `(N, S, C, K)` tuple and sums bias
    /// per group.
    ///
    /// The output holds exactly one row per distinct tuple present in the
    /// input, in key-sorted order; every record contributes to exactly one
    /// row, and summation order cannot affect the result. Aggregating an
    /// already-aggregated table again is a no-op because each key is already
    /// unique.
    #[must_use]
    pub fn aggregate(&self) -> AggregatedTable {
        let mut sums: BTreeMap<(usize, usize, usize, usize), u64> = BTreeMap::new();
        for record in &self.records {
            *sums.entry(record.key()).or_insert(0) += record.bias;
        }
        let rows = sums
            .into_iter()
            .map(
                |((cluster_size, cluster_count, bridge_count, sample_size), bias_sum)| {
                    AggregateRow {
                        cluster_size,
                        cluster_count,
                        bridge_count,
                        sample_size,
                        bias_sum,
                    }
                },
            )
            .collect();
        AggregatedTable {
            rows,
            iterations: self.iterations,
        }
    }
}

/// One row of the aggregated statistics table: a parameter combination and
/// the summed bias of every trial that ran under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateRow {
    cluster_size: usize,
    cluster_count: usize,
    bridge_count: usize,
    sample_size: usize,
    bias_sum: u64,
}

impl AggregateRow {
    /// Returns the nodes per cluster (`N`).
    #[must_use]
    pub fn cluster_size(&self) -> usize {
        self.cluster_size
    }

    /// Returns the cluster count (`S`).
    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.cluster_count
    }

    /// Returns the bridges per adjacent cluster pair (`C`).
    #[must_use]
    pub fn bridge_count(&self) -> usize {
        self.bridge_count
    }

    /// Returns the per-group sample size (`K`).
    #[must_use]
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Returns the integer bias sum (`Bias`) across all trials for this
    /// combination.
    #[must_use]
    pub fn bias_sum(&self) -> u64 {
        self.bias_sum
    }

    /// Derives the empirical bias probability, `bias_sum / iterations`.
    ///
    /// Only meaningful for indicator-valued samplers; for count-valued
    /// samplers this is a mean rather than a probability.
    ///
    /// # Examples
    /// ```
    /// use std::num::NonZeroUsize;
    /// use spillover_core::{TrialRecord, TrialTable};
    ///
    /// let iterations = NonZeroUsize::new(4).expect("iterations are positive");
    /// let table = TrialTable::new(vec![TrialRecord::new(10, 2, 1, 1, 3)], iterations);
    /// let aggregated = table.aggregate();
    /// assert_eq!(aggregated.rows()[0].probability(iterations), 0.75);
    /// ```
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "Bias sums and iteration counts stay far below f64's exact integer range"
    )]
    pub fn probability(&self, iterations: NonZeroUsize) -> f64 {
        self.bias_sum as f64 / iterations.get() as f64
    }
}

/// The reduced statistics table: one [`AggregateRow`] per distinct parameter
/// combination, in key-sorted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedTable {
    rows: Vec<AggregateRow>,
    iterations: NonZeroUsize,
}

impl AggregatedTable {
    /// Returns the aggregated rows in key-sorted order.
    #[must_use]
    pub fn rows(&self) -> &[AggregateRow] {
        &self.rows
    }

    /// Returns the bootstrap iterations behind each row's bias sum.
    #[must_use]
    pub fn iterations(&self) -> NonZeroUsize {
        self.iterations
    }
}
