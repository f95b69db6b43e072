//! Background worker entry point: the consumer side of the pipeline.
//!
//! One job at a time through to completion or failure; no intra-job
//! concurrency. Multiple worker processes may run against the same queue,
//! each claiming jobs independently. Failed jobs are never retried
//! automatically; operators re-enqueue.

use domain::pipeline::{self, Stage, StageContext};
use domain::queue::{self, WORKER_LANES};
use log::*;
use service::config::Config;
use service::logging::Logger;
use std::time::Duration;
use tokio::time::Instant;

/// How often finished jobs past their retention window get pruned.
const PRUNE_EVERY: Duration = Duration::from_secs(600);

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config);

    info!(
        "Starting pipeline worker ({} environment), draining lanes: {:?}",
        config.runtime_env(),
        WORKER_LANES
    );

    let db = service::init_database(&config)
        .await
        .expect("Failed to connect to the database");

    let poll_interval = Duration::from_secs(config.worker_poll_interval_secs.max(1));
    let mut last_prune = Instant::now();

    loop {
        match queue::claim_next(&db, &WORKER_LANES).await {
            Ok(Some(job)) => {
                info!(
                    "Claimed {} job {} for meeting {} (timeout: {}s)",
                    job.stage,
                    job.id,
                    job.args.meeting_id,
                    job.timeout.as_secs()
                );

                let stage = Stage::from_job_stage(job.stage);
                let ctx = StageContext {
                    db: &db,
                    config: &config,
                    meeting_id: job.args.meeting_id,
                    task_id: job.args.task_id,
                };

                match tokio::time::timeout(job.timeout, pipeline::run_stage(stage, &ctx)).await {
                    Ok(Ok(())) => {
                        info!("{stage} job {} succeeded", job.id);
                        if let Err(err) = queue::complete(&db, job.id).await {
                            warn!("Failed to mark job {} as succeeded: {err}", job.id);
                        }
                    }
                    Ok(Err(err)) => {
                        // The stage already marked the meeting and task as
                        // failed; the job is dropped, not retried.
                        error!("{stage} job {} failed: {err}", job.id);
                        if let Err(mark_err) = queue::fail(&db, job.id, err.to_string()).await {
                            warn!("Failed to mark job {} as failed: {mark_err}", job.id);
                        }
                    }
                    Err(_elapsed) => {
                        error!(
                            "{stage} job {} exceeded its {}s budget; abandoning",
                            job.id,
                            job.timeout.as_secs()
                        );
                        pipeline::mark_stage_timed_out(stage, &ctx, job.timeout).await;
                        if let Err(mark_err) = queue::fail(
                            &db,
                            job.id,
                            format!("Job exceeded its {}s budget", job.timeout.as_secs()),
                        )
                        .await
                        {
                            warn!("Failed to mark job {} as failed: {mark_err}", job.id);
                        }
                    }
                }
            }
            Ok(None) => {
                tokio::time::sleep(poll_interval).await;
            }
            Err(err) => {
                error!("Queue claim failed: {err}");
                tokio::time::sleep(poll_interval).await;
            }
        }

        if last_prune.elapsed() >= PRUNE_EVERY {
            match queue::prune_expired(&db).await {
                Ok(pruned) if pruned > 0 => info!("Pruned {pruned} expired queue jobs"),
                Ok(_) => {}
                Err(err) => warn!("Queue prune failed: {err}"),
            }
            last_prune = Instant::now();
        }
    }
}
