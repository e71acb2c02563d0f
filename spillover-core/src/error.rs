//! Error types for the spillover core library.
//!
//! Every failure in the core is a precondition violation: parameters are
//! validated before any graph is built and errors propagate to the caller
//! unchanged. Each public error enum carries a companion code enum with a
//! stable machine-readable representation.

use std::{fmt, sync::Arc};

use thiserror::Error;

macro_rules! error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $Variant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $Variant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$Variant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            /// Retrieve the stable code for this error.
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$Variant $( { $($pattern)* } )? => $CodeTy::$Variant,)+
                }
            }
        }
    };
}

/// An error produced while constructing a population graph.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum PopulationError {
    /// At least one cluster is required.
    #[error("cluster count must be at least 1 (got {got})")]
    NoClusters {
        /// Cluster count supplied by the caller.
        got: usize,
    },
    /// Clusters must contain at least one node.
    #[error("cluster size must be at least 1")]
    EmptyCluster,
    /// Adjacent clusters must be joined by at least one bridge edge.
    #[error("bridge count must be at least 1")]
    NoBridges,
    /// Bridge endpoints are drawn without replacement, so a cluster of `n`
    /// nodes cannot anchor more than `n` bridges.
    #[error("cannot draw {bridges} distinct bridge endpoints from a cluster of {cluster_size} nodes")]
    TooManyBridges {
        /// Requested bridges per adjacent cluster pair.
        bridges: usize,
        /// Nodes available on each side of the pair.
        cluster_size: usize,
    },
}

error_codes! {
    /// Stable codes describing [`PopulationError`] variants.
    enum PopulationErrorCode for PopulationError {
        /// At least one cluster is required.
        NoClusters { .. } => "POPULATION_NO_CLUSTERS",
        /// Clusters must contain at least one node.
        EmptyCluster => "POPULATION_EMPTY_CLUSTER",
        /// Adjacent clusters must be joined by at least one bridge edge.
        NoBridges => "POPULATION_NO_BRIDGES",
        /// More bridges were requested than a cluster has nodes.
        TooManyBridges { .. } => "POPULATION_TOO_MANY_BRIDGES",
    }
}

/// An error produced by [`crate::Sampler`] implementations.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SamplerError {
    /// The sampler only supports a specific number of groups.
    #[error("sampler supports exactly {expected} groups (got {got})")]
    UnsupportedGroupCount {
        /// Group count the sampler is defined for.
        expected: usize,
        /// Group count supplied by the caller.
        got: usize,
    },
    /// The requested draw exceeds the nodes available in one group.
    #[error("cannot draw {requested} distinct nodes from a group of {available}")]
    SampleTooLarge {
        /// Nodes requested for a single without-replacement draw.
        requested: usize,
        /// Nodes available in the group being sampled.
        available: usize,
    },
    /// The sampler is a declared extension point without a defined algorithm.
    #[error("sampler `{sampler}` is not implemented yet")]
    NotImplemented {
        /// Name of the unimplemented sampler.
        sampler: Arc<str>,
    },
}

error_codes! {
    /// Stable codes describing [`SamplerError`] variants.
    enum SamplerErrorCode for SamplerError {
        /// The sampler only supports a specific number of groups.
        UnsupportedGroupCount { .. } => "SAMPLER_UNSUPPORTED_GROUP_COUNT",
        /// The requested draw exceeds the nodes available in one group.
        SampleTooLarge { .. } => "SAMPLER_SAMPLE_TOO_LARGE",
        /// The sampler is a declared extension point without a defined algorithm.
        NotImplemented { .. } => "SAMPLER_NOT_IMPLEMENTED",
    }
}

/// Error type produced when configuring or running a [`crate::Sweep`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SweepError {
    /// A sweep needs at least two clusters so groups can interact.
    #[error("cluster count must be at least 2 (got {got})")]
    TooFewClusters {
        /// Cluster count supplied by the caller.
        got: usize,
    },
    /// The cluster-size axis walks in fixed steps, so its maximum must be a
    /// positive multiple of the step.
    #[error("cluster size must be a positive multiple of {step} (got {got})")]
    ClusterSizeNotStepAligned {
        /// Cluster size supplied by the caller.
        got: usize,
        /// Step of the cluster-size axis.
        step: usize,
    },
    /// The bridge-count axis must reach at least 1.
    #[error("bridge count must be at least 1")]
    NoBridges,
    /// The sample-size axis must reach at least 1.
    #[error("sample size must be at least 1")]
    NoSamples,
    /// Each parameter combination needs at least one bootstrap iteration.
    #[error("iterations must be at least 1")]
    NoIterations,
    /// Population graph construction failed mid-sweep.
    #[error("population graph construction failed: {error}")]
    Population {
        /// Underlying construction error.
        #[from]
        error: PopulationError,
    },
    /// A sampler invocation failed mid-sweep.
    #[error("sampler `{sampler}` failed: {error}")]
    Sampler {
        /// Name reported by the failing sampler.
        sampler: Arc<str>,
        /// Underlying sampler error, propagated unchanged.
        #[source]
        error: SamplerError,
    },
}

error_codes! {
    /// Stable codes describing [`SweepError`] variants.
    enum SweepErrorCode for SweepError {
        /// A sweep needs at least two clusters.
        TooFewClusters { .. } => "SWEEP_TOO_FEW_CLUSTERS",
        /// The cluster-size maximum was not a positive multiple of the step.
        ClusterSizeNotStepAligned { .. } => "SWEEP_CLUSTER_SIZE_NOT_STEP_ALIGNED",
        /// The bridge-count axis must reach at least 1.
        NoBridges => "SWEEP_NO_BRIDGES",
        /// The sample-size axis must reach at least 1.
        NoSamples => "SWEEP_NO_SAMPLES",
        /// Each parameter combination needs at least one bootstrap iteration.
        NoIterations => "SWEEP_NO_ITERATIONS",
        /// Population graph construction failed mid-sweep.
        Population { .. } => "SWEEP_POPULATION_FAILURE",
        /// A sampler invocation failed mid-sweep.
        Sampler { .. } => "SWEEP_SAMPLER_FAILURE",
    }
}

impl SweepError {
    /// Retrieve the inner [`SamplerErrorCode`] when the error originated in a
    /// [`crate::Sampler`].
    pub const fn sampler_code(&self) -> Option<SamplerErrorCode> {
        match self {
            Self::Sampler { error, .. } => Some(error.code()),
            _ => None,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, SweepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable_strings() {
        let err = PopulationError::TooManyBridges {
            bridges: 12,
            cluster_size: 10,
        };
        assert_eq!(err.code().as_str(), "POPULATION_TOO_MANY_BRIDGES");
        assert_eq!(err.code().to_string(), "POPULATION_TOO_MANY_BRIDGES");
    }

    #[test]
    fn sweep_error_exposes_inner_sampler_code() {
        let err = SweepError::Sampler {
            sampler: Arc::from("ideal"),
            error: SamplerError::SampleTooLarge {
                requested: 11,
                available: 10,
            },
        };
        assert_eq!(err.sampler_code(), Some(SamplerErrorCode::SampleTooLarge));
        assert_eq!(err.code(), SweepErrorCode::Sampler);
    }

    #[test]
    fn population_errors_convert_into_sweep_errors() {
        let err = SweepError::from(PopulationError::NoBridges);
        assert_eq!(err.code(), SweepErrorCode::Population);
        assert!(err.sampler_code().is_none());
    }
}
