// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Fixed-interval polling until a condition holds or a deadline passes.

use crate::error::{Result, SystemTestError};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Poll `check` every `interval` until it returns `true`.
///
/// Fails with [`SystemTestError::Timeout`] once `timeout` has elapsed without success,
/// and with [`SystemTestError::Cancelled`] as soon as `cancel` fires. Errors returned by
/// `check` abort the wait immediately.
pub async fn wait_for<F, Fut>(
    description: &str,
    interval: Duration,
    timeout: Duration,
    cancel: &CancellationToken,
    mut check: F,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    if interval.is_zero() || interval > timeout {
        return Err(SystemTestError::InvalidWait {
            description: description.to_string(),
            reason: format!(
                "poll interval {:?} must be non-zero and not exceed timeout {:?}",
                interval, timeout
            ),
        });
    }

    debug!(
        "Waiting up to {}s for {} (polling every {}ms)",
        timeout.as_secs(),
        description,
        interval.as_millis()
    );

    let start = Instant::now();
    let mut attempt = 0u32;

    loop {
        if cancel.is_cancelled() {
            return Err(SystemTestError::Cancelled(description.to_string()));
        }

        attempt += 1;
        if check().await? {
            debug!("{} satisfied after {} attempt(s)", description, attempt);
            return Ok(());
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Err(SystemTestError::Timeout {
                description: description.to_string(),
                timeout,
            });
        }

        let delay = interval.min(timeout - elapsed);
        trace!("{} not ready yet, next check in {}ms", description, delay.as_millis());

        tokio::select! {
            _ = cancel.cancelled() => {
                return Err(SystemTestError::Cancelled(description.to_string()));
            }
            _ = sleep(delay) => {}
        }
    }
}

/// Sleep for `duration` unless `cancel` fires first.
pub async fn pause(duration: Duration, cancel: &CancellationToken) -> Result<()> {
    tokio::select! {
        _ = cancel.cancelled() => Err(SystemTestError::Cancelled(format!("pause of {:?}", duration))),
        _ = sleep(duration) => Ok(()),
    }
}
