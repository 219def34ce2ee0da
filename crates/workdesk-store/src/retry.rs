//! Retry Policy
//!
//! Bounded retry with linear backoff for remote mutations.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::gateway::{GatewayError, GatewayResult};

/// Which mutations the policy applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RetryScope {
    /// Only creates are retried
    #[default]
    CreateOnly,
    /// Creates, updates, deletes and reorders
    AllMutations,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay before retry `n` is `backoff_ms * n`
    pub backoff_ms: u64,
    pub scope: RetryScope,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff_ms: 500,
            scope: RetryScope::CreateOnly,
        }
    }
}

/// Mutation kinds as seen by the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Create,
    Update,
    Delete,
    Reorder,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn applies_to(&self, mutation: Mutation) -> bool {
        match self.scope {
            RetryScope::CreateOnly => mutation == Mutation::Create,
            RetryScope::AllMutations => true,
        }
    }

    /// Delay before the given retry (1-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        Duration::from_millis(self.backoff_ms.saturating_mul(retry as u64))
    }

    /// Run `op` under this policy. Only transient gateway errors are retried.
    pub async fn run<T, F, Fut>(&self, mutation: Mutation, clock: &dyn Clock, mut op: F) -> GatewayResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = GatewayResult<T>>,
    {
        let attempts = if self.applies_to(mutation) { self.max_attempts.max(1) } else { 1 };
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < attempts && err.is_transient() => {
                    let delay = self.delay_for(attempt);
                    log::warn!("{:?} attempt {} failed ({}), retrying in {:?}", mutation, attempt, err, delay);
                    clock.sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(last_error(err, attempt)),
            }
        }
    }
}

fn last_error(err: GatewayError, attempts: u32) -> GatewayError {
    if attempts > 1 {
        log::error!("giving up after {} attempts: {}", attempts, err);
    }
    err
}
