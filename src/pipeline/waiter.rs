// src/pipeline/waiter.rs

//! Local orchestrator loop around the completion poller.

use std::time::Duration;

use log::{debug, info};
use tokio::time::{Instant, sleep};

use crate::error::{AppError, Result};
use crate::models::{Completion, CompletionQuery};

use super::poller::CompletionPoller;

/// Poll every `interval` until the endpoint settles or `timeout` elapses.
///
/// The last sleep is cut short so one final poll lands exactly on the
/// deadline. Returns the completing poll's outcome. Errors from the poller
/// (including a terminal `FAILED` endpoint) end the wait immediately.
pub async fn wait_for_completion(
    poller: &CompletionPoller,
    query: &CompletionQuery,
    interval: Duration,
    timeout: Duration,
) -> Result<Completion> {
    let started = Instant::now();
    let mut attempt = 1u32;

    loop {
        let completion = poller.poll(query).await?;
        debug!(
            "Poll #{} for {}: {:?}",
            attempt, query.resource_identifier, completion
        );

        if completion.is_complete() {
            info!(
                "{} settled after {} poll(s) in {}s",
                query.resource_identifier,
                attempt,
                started.elapsed().as_secs()
            );
            return Ok(completion);
        }

        let elapsed = started.elapsed();
        if elapsed >= timeout {
            return Err(AppError::Timeout {
                arn: query.resource_identifier.clone(),
                waited_secs: elapsed.as_secs(),
            });
        }

        sleep(interval.min(timeout - elapsed)).await;
        attempt += 1;
    }
}
