//! Spillover core library.
//!
//! Simulates "imperfect treatment" bias in network experiments. A synthetic
//! population of complete clusters joined by random bridge edges stands in
//! for treatment and control groups with imperfect isolation; sampling
//! strategies reconstruct what an experimenter would observe from limited
//! draws, and a nested parameter sweep aggregates bootstrap trials into a
//! per-combination statistics table.

mod builder;
mod error;
mod population;
mod sampler;
mod sweep;
mod table;
#[cfg(test)]
mod test_utils;

pub use crate::{
    builder::SweepBuilder,
    error::{
        PopulationError, PopulationErrorCode, Result, SamplerError, SamplerErrorCode, SweepError,
        SweepErrorCode,
    },
    population::PopulationGraph,
    sampler::{CrossPairSampler, DegreeAwareSampler, IdealSampler, Sampler},
    sweep::Sweep,
    table::{AggregateRow, AggregatedTable, TrialRecord, TrialTable},
};
