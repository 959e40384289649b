// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Condition-wait poller run after a resource has been applied or deleted.

use crate::constants::wait::UNBOUNDED_TIMEOUT;
use crate::duration::{parse_poll_interval, DurationValue, Timeout};
use crate::error::{ProviderError, Result};
use crate::jsonpath::JsonPath;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// What has to hold for a wait to be satisfied
#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    /// The path resolves to a non-empty value, or exactly `expected` when set
    Matches {
        path: JsonPath,
        expected: Option<String>,
    },
    /// The object no longer exists
    Gone,
}

impl Condition {
    /// Evaluate against a fetched document, `None` meaning "not found"
    pub fn is_met(&self, doc: Option<&Value>) -> bool {
        match (self, doc) {
            (Condition::Gone, found) => found.is_none(),
            (Condition::Matches { .. }, None) => false,
            (Condition::Matches { path, expected }, Some(doc)) => {
                match (path.resolve(doc), expected) {
                    (None, _) => false,
                    (Some(actual), None) => !actual.is_empty(),
                    (Some(actual), Some(expected)) => actual == *expected,
                }
            }
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Matches {
                path,
                expected: Some(value),
            } => write!(f, "'{}' == '{}'", path, value),
            Condition::Matches {
                path,
                expected: None,
            } => write!(f, "'{}' is set", path),
            Condition::Gone => f.write_str("'deleted'"),
        }
    }
}

/// A single wait, built fresh for every create, update or delete
#[derive(Clone, Debug, PartialEq)]
pub struct WaitSpec {
    pub condition: Condition,
    pub timeout: Timeout,
    pub poll_interval: Duration,
}

impl WaitSpec {
    /// Wait for a JSONPath to resolve (to `expected`, when given)
    pub fn upsert(
        jsonpath: &str,
        expected: Option<String>,
        timeout: &DurationValue,
        poll_interval: &DurationValue,
    ) -> Result<Self> {
        Ok(WaitSpec {
            condition: Condition::Matches {
                path: jsonpath.parse()?,
                expected,
            },
            timeout: Timeout::parse(timeout)?,
            poll_interval: parse_poll_interval(poll_interval)?,
        })
    }

    /// Wait for the object to disappear
    pub fn delete(timeout: &DurationValue, poll_interval: &DurationValue) -> Result<Self> {
        Ok(WaitSpec {
            condition: Condition::Gone,
            timeout: Timeout::parse(timeout)?,
            poll_interval: parse_poll_interval(poll_interval)?,
        })
    }
}

/// Terminal result of a wait
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitOutcome {
    Satisfied { attempts: u32 },
    TimedOut { attempts: u32, elapsed: Duration },
    /// No wait configured, or a zero timeout with the condition not yet met
    Skipped,
}

impl WaitOutcome {
    pub fn is_timed_out(&self) -> bool {
        matches!(self, WaitOutcome::TimedOut { .. })
    }
}

/// Runs waits; one poller can be shared by every operation of a handler
#[derive(Clone, Debug, Default)]
pub struct Poller {
    cancel: CancellationToken,
}

impl Poller {
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    /// Poll `fetch` until the condition holds, the timeout passes or the
    /// poller is cancelled.
    ///
    /// `fetch` returns `Ok(None)` when the object does not exist. Any error it
    /// returns ends the wait immediately.
    pub async fn wait<F, Fut>(&self, spec: &WaitSpec, mut fetch: F) -> Result<WaitOutcome>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<Value>>>,
    {
        let started = Instant::now();
        // budgets past the clock's range fall back to the unbounded deadline
        let deadline = started
            .checked_add(spec.timeout.budget())
            .unwrap_or_else(|| started + UNBOUNDED_TIMEOUT);
        let mut attempts = 0u32;

        loop {
            if self.cancel.is_cancelled() {
                return Err(ProviderError::WaitCancelled(spec.condition.to_string()));
            }

            attempts = next_attempt(attempts);
            let doc = fetch().await?;

            if spec.condition.is_met(doc.as_ref()) {
                info!(
                    "Condition {} met after {} attempt(s)",
                    spec.condition, attempts
                );
                return Ok(WaitOutcome::Satisfied { attempts });
            }

            if spec.timeout == Timeout::CheckOnce {
                debug!("Condition {} not met, timeout is zero so not waiting", spec.condition);
                return Ok(WaitOutcome::Skipped);
            }

            let now = Instant::now();
            if now >= deadline {
                let elapsed = now - started;
                info!(
                    "Condition {} not met after {} attempt(s) in {:?}",
                    spec.condition, attempts, elapsed
                );
                return Ok(WaitOutcome::TimedOut { attempts, elapsed });
            }

            let pause = spec.poll_interval.min(deadline - now);
            debug!(
                "Condition {} not met yet, polling again in {:?}",
                spec.condition, pause
            );

            tokio::select! {
                _ = sleep(pause) => {}
                _ = self.cancel.cancelled() => {
                    return Err(ProviderError::WaitCancelled(spec.condition.to_string()));
                }
            }
        }
    }
}

/// Attempt counter for a wait; saturates on very long waits with tiny intervals
fn next_attempt(attempts: u32) -> u32 {
    attempts.saturating_add(1)
}
