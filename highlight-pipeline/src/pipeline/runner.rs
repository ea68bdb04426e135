//! Sequential pipeline orchestrator.
//!
//! Stages run strictly in order; a stage only starts after its
//! predecessor's handoff record is durably visible, and a terminal stage
//! failure halts the run without touching downstream stages. There is no
//! cross-stage compensation: records already written stay written, and a
//! later full re-run relies on stage idempotency.

use super::retry::{run_with_retry, RetryPolicy};
use crate::errors::PipelineError;
use crate::stages::Stage;
use crate::store::HandoffStore;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// How the orchestrator bridges a stage's commit and the next stage's
/// read in an eventually consistent store.
#[derive(Debug, Clone)]
pub enum Settle {
    /// Advance immediately.
    None,
    /// Unconditional fixed wait.
    Fixed(Duration),
    /// Poll the store until the stage's record is visible, bounded by
    /// `max_wait`. Fails the run with a settle timeout if the record
    /// never appears.
    UntilVisible {
        /// The handoff key the stage committed.
        key: String,
        /// Interval between visibility polls.
        poll_interval: Duration,
        /// Upper bound on the total wait.
        max_wait: Duration,
    },
}

impl Settle {
    /// Convenience constructor for the poll-until-visible variant.
    #[must_use]
    pub fn until_visible(
        key: impl Into<String>,
        poll_interval: Duration,
        max_wait: Duration,
    ) -> Self {
        Self::UntilVisible {
            key: key.into(),
            poll_interval,
            max_wait,
        }
    }
}

/// One stage with its retry policy and post-stage settle step.
struct StagePlan {
    stage: Arc<dyn Stage>,
    retry: RetryPolicy,
    settle: Settle,
}

/// Orchestrator run state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    /// Not started.
    Pending,
    /// Executing the stage at this index.
    Running(usize),
    /// All stages succeeded.
    Completed,
    /// A stage failed terminally; later stages never ran.
    Failed,
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Identifier of this run, present on every log line it emitted.
    pub run_id: Uuid,
    /// Number of stages that completed.
    pub stages_completed: usize,
    /// Wall-clock duration of the run.
    pub duration: Duration,
}

/// Builder for a [`Pipeline`].
pub struct PipelineBuilder {
    name: String,
    store: Arc<dyn HandoffStore>,
    stages: Vec<StagePlan>,
}

impl PipelineBuilder {
    /// Creates a builder over the store the settle checks poll.
    #[must_use]
    pub fn new(name: impl Into<String>, store: Arc<dyn HandoffStore>) -> Self {
        Self {
            name: name.into(),
            store,
            stages: Vec::new(),
        }
    }

    /// Appends a stage with its retry policy and settle step.
    #[must_use]
    pub fn stage(mut self, stage: Arc<dyn Stage>, retry: RetryPolicy, settle: Settle) -> Self {
        self.stages.push(StagePlan { stage, retry, settle });
        self
    }

    /// Finalizes the pipeline. The stage sequence is immutable from here.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            name: self.name,
            store: self.store,
            stages: self.stages,
        }
    }
}

/// An ordered sequence of retry-wrapped stages sharing a handoff store.
pub struct Pipeline {
    name: String,
    store: Arc<dyn HandoffStore>,
    stages: Vec<StagePlan>,
}

impl Pipeline {
    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Runs every stage in order.
    ///
    /// # Errors
    ///
    /// Returns the first [`PipelineError`]; stages after the failing one
    /// are never invoked.
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        let run_id = Uuid::new_v4();
        let start = Instant::now();
        let mut state = RunState::Pending;

        tracing::info!(
            pipeline = %self.name,
            %run_id,
            stages = self.stages.len(),
            "pipeline run starting"
        );

        for (index, plan) in self.stages.iter().enumerate() {
            transition(run_id, &mut state, RunState::Running(index));
            tracing::info!(
                %run_id,
                stage = plan.stage.name(),
                index,
                "stage starting"
            );

            if let Err(err) = run_with_retry(plan.stage.as_ref(), &plan.retry).await {
                transition(run_id, &mut state, RunState::Failed);
                tracing::error!(
                    pipeline = %self.name,
                    %run_id,
                    stage = err.stage(),
                    error = %err,
                    "pipeline halted"
                );
                return Err(err);
            }

            // The final stage has nothing downstream to settle for.
            if index + 1 < self.stages.len() {
                if let Err(err) = self.settle(run_id, plan).await {
                    transition(run_id, &mut state, RunState::Failed);
                    tracing::error!(
                        pipeline = %self.name,
                        %run_id,
                        error = %err,
                        "pipeline halted waiting for record visibility"
                    );
                    return Err(err);
                }
            }
        }

        transition(run_id, &mut state, RunState::Completed);
        let report = RunReport {
            run_id,
            stages_completed: self.stages.len(),
            duration: start.elapsed(),
        };
        tracing::info!(
            pipeline = %self.name,
            %run_id,
            stages = report.stages_completed,
            duration_ms = report.duration.as_millis() as u64,
            "pipeline run completed"
        );
        Ok(report)
    }

    async fn settle(&self, run_id: Uuid, plan: &StagePlan) -> Result<(), PipelineError> {
        match &plan.settle {
            Settle::None => Ok(()),
            Settle::Fixed(delay) => {
                tracing::debug!(
                    %run_id,
                    stage = plan.stage.name(),
                    delay_ms = delay.as_millis() as u64,
                    "fixed settle wait"
                );
                tokio::time::sleep(*delay).await;
                Ok(())
            }
            Settle::UntilVisible {
                key,
                poll_interval,
                max_wait,
            } => {
                let started = Instant::now();
                loop {
                    match self.store.exists(key).await {
                        Ok(true) => {
                            tracing::debug!(
                                %run_id,
                                stage = plan.stage.name(),
                                key = %key,
                                waited_ms = started.elapsed().as_millis() as u64,
                                "record visible"
                            );
                            return Ok(());
                        }
                        Ok(false) => {}
                        // A flaky visibility check is indistinguishable
                        // from not-yet-visible; keep polling until the
                        // bound expires.
                        Err(err) => {
                            tracing::warn!(
                                %run_id,
                                key = %key,
                                error = %err,
                                "visibility check failed"
                            );
                        }
                    }

                    if started.elapsed() >= *max_wait {
                        return Err(PipelineError::SettleTimeout {
                            stage: plan.stage.name().to_string(),
                            key: key.clone(),
                            waited: started.elapsed(),
                        });
                    }
                    tokio::time::sleep(*poll_interval).await;
                }
            }
        }
    }
}

fn transition(run_id: Uuid, state: &mut RunState, next: RunState) {
    tracing::debug!(%run_id, from = ?state, to = ?next, "run state transition");
    *state = next;
}
