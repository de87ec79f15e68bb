//! Temporary container lifecycle orchestration
//!
//! A temporary run moves through these phases:
//!
//! ```text
//! Pending -> Created -> Started -> Waited -> LogsFetched -> Decoded -> Succeeded
//!    \          \          \          \            \                  /
//!     +----------+----------+----------+------------+---> Failed     /
//!                                                            \       /
//!                                                    CleanupScheduled
//!                                                            |
//!                                                    CleanupAttempted
//! ```
//!
//! Cleanup is scheduled exactly once per run, on success and on failure.
//! It runs in a detached `tokio::spawn` task that yields to the scheduler first,
//! so it proceeds after the caller has its result. Errors during cleanup only
//! show up in logs and metrics.

use std::fmt;
use std::sync::Arc;

use metrics::counter;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use hoist_core::metrics::{CLEANUP_FAILURES_TOTAL, LABEL_RESULT, TEMPORARY_RUNS_TOTAL};

use crate::engine::ContainerEngine;
use crate::error::EngineError;
use crate::frame::{DecodedOutput, collect_output};
use crate::params::ContainerParams;

/// Phase of a temporary run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Pending,
    Created,
    Started,
    Waited,
    LogsFetched,
    Decoded,
    Succeeded,
    Failed,
    CleanupScheduled,
    CleanupAttempted,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Created => "created",
            Self::Started => "started",
            Self::Waited => "waited",
            Self::LogsFetched => "logs_fetched",
            Self::Decoded => "decoded",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::CleanupScheduled => "cleanup_scheduled",
            Self::CleanupAttempted => "cleanup_attempted",
        };
        f.write_str(s)
    }
}

/// One temporary container run
///
/// Owned solely by the orchestrator and consumed by moving it into the cleanup task.
#[derive(Debug)]
pub struct TemporaryContainerRun {
    run_id: Uuid,
    handle: Option<String>,
    phase: RunPhase,
}

impl TemporaryContainerRun {
    fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            handle: None,
            phase: RunPhase::Pending,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// ID of the created container (`None` before creation or if it failed)
    pub fn handle(&self) -> Option<&str> {
        self.handle.as_deref()
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    fn advance(&mut self, next: RunPhase) {
        debug!(
            run_id = %self.run_id,
            from = %self.phase,
            to = %next,
            "temporary run phase"
        );
        self.phase = next;
    }
}

/// Creates and starts a container, returning its ID.
///
/// Neither waits for it to exit nor removes it.
pub async fn run_container<E: ContainerEngine>(
    engine: &E,
    params: &ContainerParams,
) -> Result<String, EngineError> {
    let created = engine.create_container(params).await?;
    for warning in &created.warnings {
        warn!(container_id = %created.id, warning = %warning, "engine warning on create");
    }
    engine.start_container(&created.id).await?;
    info!(container_id = %created.id, image = %params.image, "container started");
    Ok(created.id)
}

/// Runs a temporary container and returns its decoded output.
///
/// Steps are create, start, wait, fetch logs, decode.
/// Start is awaited, so a start failure is returned from the start step and the
/// wait is never reached. Whatever step fails, its original error is returned.
/// A non-zero exit code is not a failure.
///
/// Cleanup runs once in the background right after this returns.
pub async fn run_temporary<E: ContainerEngine>(
    engine: Arc<E>,
    params: &ContainerParams,
) -> Result<DecodedOutput, EngineError> {
    let (result, _cleanup) = run_and_schedule_cleanup(engine, params).await;
    result
}

/// Same as [`run_temporary`] but also returns the cleanup task's handle.
///
/// A process about to exit should await it after handling the result, or the
/// container may be left behind.
pub async fn run_and_schedule_cleanup<E: ContainerEngine>(
    engine: Arc<E>,
    params: &ContainerParams,
) -> (Result<DecodedOutput, EngineError>, JoinHandle<()>) {
    let mut run = TemporaryContainerRun::new();
    debug!(run_id = %run.run_id, image = %params.image, "temporary run starting");

    let result = drive(engine.as_ref(), params, &mut run).await;
    match &result {
        Ok(output) => {
            run.advance(RunPhase::Succeeded);
            counter!(TEMPORARY_RUNS_TOTAL, LABEL_RESULT => "success").increment(1);
            debug!(run_id = %run.run_id, frames = output.len(), "temporary run succeeded");
        }
        Err(e) => {
            run.advance(RunPhase::Failed);
            counter!(TEMPORARY_RUNS_TOTAL, LABEL_RESULT => "failure").increment(1);
            debug!(run_id = %run.run_id, error = %e, "temporary run failed");
        }
    }

    let cleanup = schedule_cleanup(engine, run);
    (result, cleanup)
}

async fn drive<E: ContainerEngine>(
    engine: &E,
    params: &ContainerParams,
    run: &mut TemporaryContainerRun,
) -> Result<DecodedOutput, EngineError> {
    let created = engine.create_container(params).await?;
    let id = created.id;
    run.handle = Some(id.clone());
    run.advance(RunPhase::Created);

    engine.start_container(&id).await?;
    run.advance(RunPhase::Started);

    let exit_code = engine.wait_container(&id).await?;
    debug!(run_id = %run.run_id, container_id = %id, exit_code, "temporary container exited");
    run.advance(RunPhase::Waited);

    let stream = engine.container_logs(&id).await?;
    run.advance(RunPhase::LogsFetched);

    let output = collect_output(stream).await?;
    run.advance(RunPhase::Decoded);

    Ok(output)
}

fn schedule_cleanup<E: ContainerEngine>(
    engine: Arc<E>,
    mut run: TemporaryContainerRun,
) -> JoinHandle<()> {
    run.advance(RunPhase::CleanupScheduled);
    tokio::spawn(async move {
        // let the caller see the result first
        tokio::task::yield_now().await;
        cleanup(engine.as_ref(), run).await;
    })
}

async fn cleanup<E: ContainerEngine>(engine: &E, mut run: TemporaryContainerRun) {
    run.advance(RunPhase::CleanupAttempted);

    let Some(id) = run.handle.take() else {
        debug!(run_id = %run.run_id, "no container was created, nothing to clean up");
        return;
    };

    if let Err(e) = engine.wait_container(&id).await {
        warn!(
            run_id = %run.run_id,
            container_id = %id,
            error = %e,
            "wait before removal failed, removing anyway"
        );
    }

    match engine.remove_container(&id).await {
        Ok(()) => debug!(run_id = %run.run_id, container_id = %id, "temporary container removed"),
        Err(e) => {
            counter!(CLEANUP_FAILURES_TOTAL).increment(1);
            warn!(
                run_id = %run.run_id,
                container_id = %id,
                error = %e,
                "failed to remove temporary container"
            );
        }
    }
}
