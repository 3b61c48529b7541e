//! Order Selection Core
//!
//! This crate assembles work orders ("jobs") from flat record streams and
//! prioritizes them for downstream selection. Each job is scored by the sum
//! of its items' rewards and labelled with a cancellation prediction learned
//! from historical outcomes with a per-item Naive Bayes model.
//!
//! Architecture:
//! - `records`: parsing of the flat record streams (items, locations, jobs,
//!   outcome labels)
//! - `config`: priors, smoothing floor and reward policy, overridable from
//!   the environment
//! - `catalog`: static item lookup built from positionally aligned records
//! - `prediction`: historical outcome tables, per-item conditional
//!   likelihoods and job classification
//! - `queue`: reward-ordered priority queue with stable tie-breaking
//! - `registry`: job assembly, prediction attachment and the `pop_next`
//!   selection primitive
//!
//! The whole pipeline is synchronous and batch-oriented: the catalog, the
//! model and the registry are each built to completion before any query
//! method is invoked.

pub mod catalog;
pub mod config;
pub mod prediction;
pub mod queue;
pub mod records;
pub mod registry;
pub mod types;

pub use catalog::Catalog;
pub use config::{ConfigError, RewardPolicy, SelectionConfig};
pub use prediction::{CancellationModel, HistoricalOutcomes, ItemLikelihood};
pub use queue::RewardQueue;
pub use registry::JobRegistry;
pub use types::{Item, ItemId, Job, JobId, Location, Outcome, Task};

/// Result type for selection operations
pub type Result<T> = std::result::Result<T, SelectionError>;

/// Custom error types
#[derive(thiserror::Error, Debug)]
pub enum SelectionError {
    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("Misaligned {context} streams: {expected} rows against {found}")]
    MisalignedRecords {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Job {job} references unknown item {item}")]
    UnresolvedItem { job: JobId, item: ItemId },

    #[error("No trained probability for item {0}")]
    UnresolvedProbability(ItemId),

    #[error("No jobs available to evaluate")]
    NoData,

    #[error("Record I/O error: {0}")]
    Io(#[from] std::io::Error),
}
