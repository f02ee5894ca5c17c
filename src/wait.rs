// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Bounded polling shared by every readiness condition.

use crate::error::{Result, ScenarioError};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::{self, sleep, Instant};
use tracing::{debug, warn};

/// Poll `check` every `interval` until it reports `true` or `timeout` elapses.
///
/// The first check runs immediately. A check returning `Err` is logged and
/// polled again; the last such error is carried in the timeout error. A check
/// still running when the budget runs out is abandoned.
pub async fn poll_until<F, Fut, E>(
    what: &str,
    interval: Duration,
    timeout: Duration,
    mut check: F,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<bool, E>>,
    E: Display,
{
    poll_for(what, interval, timeout, || {
        let done = check();
        async move { done.await.map(|done| done.then_some(())) }
    })
    .await
}

/// Like [`poll_until`], but the check hands back a value once it is satisfied.
pub async fn poll_for<T, F, Fut, E>(
    what: &str,
    interval: Duration,
    timeout: Duration,
    mut check: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<Option<T>, E>>,
    E: Display,
{
    let start = Instant::now();
    let mut last_error = None;

    loop {
        // a check that hangs must not outlive the budget
        let remaining = timeout.saturating_sub(start.elapsed());
        match time::timeout(remaining, check()).await {
            Ok(Ok(Some(value))) => {
                debug!("{} satisfied after {:?}", what, start.elapsed());
                return Ok(value);
            }
            Ok(Ok(None)) => {}
            Ok(Err(e)) => {
                warn!("Error while waiting for {}: {}", what, e);
                last_error = Some(e.to_string());
            }
            Err(_) => {
                warn!("Check for {} did not finish within {:?}", what, remaining);
                last_error = Some(format!("check did not finish within {:?}", remaining));
            }
        }

        if start.elapsed() >= timeout {
            return Err(ScenarioError::Timeout {
                what: what.to_string(),
                timeout,
                last_error,
            });
        }

        sleep(interval).await;
    }
}

/// Poll `fetch` until its output contains `expected` and return that output.
pub async fn look_for_string<F, Fut>(
    what: &str,
    expected: &str,
    interval: Duration,
    timeout: Duration,
    mut fetch: F,
) -> Result<String>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String>>,
{
    poll_for(what, interval, timeout, || {
        let output = fetch();
        async move {
            let output = output.await?;
            if output.contains(expected) {
                Ok::<_, ScenarioError>(Some(output))
            } else {
                debug!("Output {:?} does not contain {:?} yet", output.trim(), expected);
                Ok(None)
            }
        }
    })
    .await
}
