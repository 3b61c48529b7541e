//! Job registry
//!
//! Assembles jobs from parsed job records: every (item, quantity) pair is
//! resolved against the catalog, the total reward is derived under the
//! configured policy, and the cancellation model labels the task list. Each
//! finished job lands in the identifier map and in the reward queue, which
//! stay mutually consistent; `pop_next` is the only mutation exposed after
//! the build.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::config::{RewardPolicy, SelectionConfig};
use crate::prediction::CancellationModel;
use crate::queue::RewardQueue;
use crate::records::{self, JobRecord};
use crate::types::{Job, JobId, Task};
use crate::{Result, SelectionError};

/// Identifier map plus reward-ordered selection queue
#[derive(Debug, Clone)]
pub struct JobRegistry {
    jobs: HashMap<JobId, Job>,
    queue: RewardQueue,
}

impl JobRegistry {
    /// Build the registry from parsed job records
    ///
    /// Any task referencing an item absent from the catalog aborts the whole
    /// build: a partial registry is never published. Duplicate job
    /// identifiers are resolved last-write-wins, in the map and the queue
    /// alike.
    pub fn build(
        job_records: &[JobRecord],
        catalog: &Catalog,
        model: &CancellationModel,
        config: &SelectionConfig,
    ) -> Result<Self> {
        let mut jobs = HashMap::with_capacity(job_records.len());
        let mut queue = RewardQueue::new();

        for record in job_records {
            let mut tasks = Vec::with_capacity(record.tasks.len());
            let mut total_reward = 0.0;

            for (item_id, quantity) in &record.tasks {
                let item =
                    catalog
                        .get(item_id)
                        .ok_or_else(|| SelectionError::UnresolvedItem {
                            job: record.id.clone(),
                            item: item_id.clone(),
                        })?;

                total_reward += match config.reward_policy {
                    RewardPolicy::PerTask => item.reward,
                    RewardPolicy::QuantityWeighted => item.reward * f64::from(*quantity),
                };

                tasks.push(Task {
                    item_id: item_id.clone(),
                    quantity: *quantity,
                    item,
                });
            }

            let predicted = model.classify(&tasks)?;

            debug!(
                job_id = %record.id,
                total_reward,
                predicted = %predicted,
                "Job assembled"
            );

            let job = Job {
                id: record.id.clone(),
                tasks,
                total_reward,
                predicted,
            };

            if jobs.insert(record.id.clone(), job).is_some() {
                warn!(job_id = %record.id, "Duplicate job record, keeping the later one");
            }
            queue.push(record.id.clone(), total_reward);
        }

        info!("Registered {} jobs", jobs.len());

        Ok(Self { jobs, queue })
    }

    /// Parse a job record stream, then build the registry
    pub fn from_reader(
        reader: impl BufRead,
        catalog: &Catalog,
        model: &CancellationModel,
        config: &SelectionConfig,
    ) -> Result<Self> {
        Self::build(&records::read_job_records(reader)?, catalog, model, config)
    }

    pub fn from_path(
        path: impl AsRef<Path>,
        catalog: &Catalog,
        model: &CancellationModel,
        config: &SelectionConfig,
    ) -> Result<Self> {
        Self::build(
            &records::read_job_records_from_path(path)?,
            catalog,
            model,
            config,
        )
    }

    pub fn get(&self, id: &JobId) -> Option<&Job> {
        self.jobs.get(id)
    }

    /// Task list of a registered job
    pub fn tasks(&self, id: &JobId) -> Option<&[Task]> {
        self.jobs.get(id).map(|job| job.tasks.as_slice())
    }

    /// Derived total reward of a registered job
    pub fn total_reward(&self, id: &JobId) -> Option<f64> {
        self.jobs.get(id).map(|job| job.total_reward)
    }

    /// Remove and return the highest-reward job still queued
    ///
    /// Destructively advances the queue; returns `None` once the queue is
    /// exhausted and keeps returning `None` afterwards. The identifier map
    /// is not affected, so `get` keeps resolving popped jobs.
    pub fn pop_next(&mut self) -> Option<Job> {
        let id = self.queue.pop()?;
        let job = self.jobs.get(&id).cloned();

        debug!(job_id = %id, pending = self.queue.len(), "Job selected");

        job
    }

    /// Highest-reward queued job without removing it
    pub fn peek_next(&self) -> Option<&Job> {
        self.queue.peek().and_then(|id| self.jobs.get(id))
    }

    /// Number of jobs still queued for selection
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Number of registered jobs
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&JobId, &Job)> {
        self.jobs.iter()
    }
}
