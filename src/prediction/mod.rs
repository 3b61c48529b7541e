//! Cancellation prediction
//!
//! A Naive Bayes model over the items a job orders. Training partitions the
//! historical jobs into a cancelled and a completed class and derives, for
//! every catalog item, the conditional likelihood of that item's presence
//! given each class:
//!
//! ```text
//! P(item | cancelled) = qty of item across cancelled jobs / total qty in cancelled class
//! P(item | completed) = qty of item across completed jobs / total qty in completed class
//! ```
//!
//! A raw estimate of zero is replaced by a small configured floor so a
//! single unseen item cannot zero out the whole product. Classification
//! multiplies the class priors by the per-task likelihoods under the usual
//! conditional-independence assumption and picks the larger accumulator.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::config::SelectionConfig;
use crate::records::{JobRecord, LabelRecord};
use crate::registry::JobRegistry;
use crate::types::{ItemId, JobId, Outcome, Task};
use crate::{Result, SelectionError};

/// Conditional likelihoods of one item's presence per outcome class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemLikelihood {
    /// P(item present | job cancelled)
    pub cancelled: f64,
    /// P(item present | job completed)
    pub completed: f64,
}

/// Historical job outcomes partitioned by class
///
/// Built once from the row-aligned training and label streams; read-only
/// afterward.
#[derive(Debug, Clone, Default)]
pub struct HistoricalOutcomes {
    cancelled: HashMap<JobId, HashMap<ItemId, u32>>,
    completed: HashMap<JobId, HashMap<ItemId, u32>>,
    cancelled_quantity: u64,
    completed_quantity: u64,
}

impl HistoricalOutcomes {
    /// Partition the training jobs by their row-aligned outcome labels
    pub fn from_records(jobs: &[JobRecord], labels: &[LabelRecord]) -> Result<Self> {
        if jobs.len() != labels.len() {
            return Err(SelectionError::MisalignedRecords {
                context: "training/label record",
                expected: jobs.len(),
                found: labels.len(),
            });
        }

        let mut history = Self::default();

        for (job, label) in jobs.iter().zip(labels) {
            if job.id != label.id {
                // Alignment is positional; a differing id is tolerated but
                // suspicious enough to surface.
                warn!(
                    "Training row for job {} is labelled under id {}",
                    job.id, label.id
                );
            }

            let mut tasks: HashMap<ItemId, u32> = HashMap::with_capacity(job.tasks.len());
            for (item_id, quantity) in &job.tasks {
                *tasks.entry(item_id.clone()).or_insert(0) += *quantity;
                match label.outcome {
                    Outcome::Cancelled => history.cancelled_quantity += u64::from(*quantity),
                    Outcome::Completed => history.completed_quantity += u64::from(*quantity),
                }
            }

            match label.outcome {
                Outcome::Cancelled => history.cancelled.insert(job.id.clone(), tasks),
                Outcome::Completed => history.completed.insert(job.id.clone(), tasks),
            };
        }

        info!(
            "Partitioned history: {} cancelled jobs (qty {}), {} completed jobs (qty {})",
            history.cancelled.len(),
            history.cancelled_quantity,
            history.completed.len(),
            history.completed_quantity
        );

        Ok(history)
    }

    /// Total quantity of one item across the cancelled class
    pub fn cancelled_item_quantity(&self, item_id: &ItemId) -> u64 {
        Self::item_quantity(&self.cancelled, item_id)
    }

    /// Total quantity of one item across the completed class
    pub fn completed_item_quantity(&self, item_id: &ItemId) -> u64 {
        Self::item_quantity(&self.completed, item_id)
    }

    pub fn cancelled_quantity(&self) -> u64 {
        self.cancelled_quantity
    }

    pub fn completed_quantity(&self) -> u64 {
        self.completed_quantity
    }

    pub fn is_cancelled_job(&self, id: &JobId) -> bool {
        self.cancelled.contains_key(id)
    }

    pub fn is_completed_job(&self, id: &JobId) -> bool {
        self.completed.contains_key(id)
    }

    pub fn is_empty(&self) -> bool {
        self.cancelled.is_empty() && self.completed.is_empty()
    }

    fn item_quantity(table: &HashMap<JobId, HashMap<ItemId, u32>>, item_id: &ItemId) -> u64 {
        table
            .values()
            .filter_map(|tasks| tasks.get(item_id))
            .map(|quantity| u64::from(*quantity))
            .sum()
    }
}

/// Trained Naive Bayes cancellation predictor
///
/// The likelihood table is fully computed at construction, before any
/// classification call.
#[derive(Debug, Clone)]
pub struct CancellationModel {
    history: HistoricalOutcomes,
    likelihoods: HashMap<ItemId, ItemLikelihood>,
    config: SelectionConfig,
}

impl CancellationModel {
    /// Derive per-item likelihoods for every item in the catalog
    pub fn train(history: HistoricalOutcomes, catalog: &Catalog, config: &SelectionConfig) -> Self {
        let mut likelihoods = HashMap::with_capacity(catalog.len());

        for (item_id, _) in catalog.iter() {
            let cancelled = ratio(
                history.cancelled_item_quantity(item_id),
                history.cancelled_quantity,
            );
            let completed = ratio(
                history.completed_item_quantity(item_id),
                history.completed_quantity,
            );

            likelihoods.insert(
                item_id.clone(),
                ItemLikelihood {
                    cancelled: smoothed(cancelled, config.smoothing_floor),
                    completed: smoothed(completed, config.smoothing_floor),
                },
            );
        }

        info!(
            "Trained cancellation model over {} items ({} cancelled / {} completed training jobs)",
            likelihoods.len(),
            history.cancelled.len(),
            history.completed.len()
        );

        Self {
            history,
            likelihoods,
            config: config.clone(),
        }
    }

    /// Classify a task list as cancelled or completed
    ///
    /// Starts both accumulators at the configured class priors and folds in
    /// each task's conditional likelihood. Returns `Cancelled` only when the
    /// cancelled accumulator strictly exceeds the completed one.
    pub fn classify(&self, tasks: &[Task]) -> Result<Outcome> {
        let mut cancelled = self.config.cancelled_prior;
        let mut completed = self.config.completed_prior;

        for task in tasks {
            let likelihood = self
                .likelihoods
                .get(&task.item_id)
                .ok_or_else(|| SelectionError::UnresolvedProbability(task.item_id.clone()))?;

            cancelled *= likelihood.cancelled;
            completed *= likelihood.completed;
        }

        if cancelled > completed {
            Ok(Outcome::Cancelled)
        } else {
            Ok(Outcome::Completed)
        }
    }

    /// Fraction of registered jobs whose prediction matches their recorded
    /// class, as a percentage in [0, 100]
    ///
    /// Self-check over a registry built from the training jobs; a job found
    /// in neither class counts as evaluated and unmatched.
    pub fn evaluate(&self, registry: &JobRegistry) -> Result<f64> {
        if registry.is_empty() {
            return Err(SelectionError::NoData);
        }

        let mut matches = 0usize;
        for (id, job) in registry.iter() {
            let predicted = self.classify(&job.tasks)?;
            let matched = match predicted {
                Outcome::Cancelled => self.history.is_cancelled_job(id),
                Outcome::Completed => self.history.is_completed_job(id),
            };
            if matched {
                matches += 1;
            }
        }

        Ok(matches as f64 / registry.len() as f64 * 100.0)
    }

    /// Trained likelihood entry for one item
    pub fn likelihood(&self, item_id: &ItemId) -> Option<&ItemLikelihood> {
        self.likelihoods.get(item_id)
    }

    pub fn history(&self) -> &HistoricalOutcomes {
        &self.history
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }
}

fn ratio(quantity: u64, class_total: u64) -> f64 {
    if class_total == 0 {
        0.0
    } else {
        quantity as f64 / class_total as f64
    }
}

/// Replace estimates indistinguishable from zero with the configured floor
fn smoothed(raw: f64, floor: f64) -> f64 {
    if raw < f64::MIN_POSITIVE {
        floor
    } else {
        raw
    }
}
