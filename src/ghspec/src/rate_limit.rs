//! Core API rate limit checks.
//!
//! Every remediation reads the core rate limit before its first mutating call
//! and sleeps until the window resets when the budget is nearly spent.

mod info;

pub use info::RateLimitInfo;

use crate::client::{ClientError, HostingClient};
use chrono::Utc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Longest sleep before giving the API another try.
const MAX_WAIT: Duration = Duration::from_secs(3600);

/// Remaining requests below which a call waits for the reset.
const MIN_REMAINING_THRESHOLD: u32 = 5;

/// Reads the core rate limit.
///
/// # Errors
///
/// Returns an error if the rate limit cannot be fetched.
pub async fn check_core_rate_limit(
    client: &dyn HostingClient,
) -> Result<RateLimitInfo, ClientError> {
    let info = client.rate_limit().await?;
    debug!(
        remaining = info.remaining,
        limit = info.limit,
        "Core rate limit"
    );
    Ok(info)
}

/// Sleeps until the window resets if fewer than five requests remain.
///
/// The sleep is capped at one hour.
///
/// # Returns
///
/// `true` if it slept.
pub async fn wait_if_needed(info: &RateLimitInfo) -> bool {
    if info.remaining >= MIN_REMAINING_THRESHOLD {
        return false;
    }
    let Some(until_reset) = info.time_until_reset(Utc::now()) else {
        return false;
    };

    if until_reset > MAX_WAIT {
        warn!(
            wait_secs = until_reset.as_secs(),
            max_wait_secs = MAX_WAIT.as_secs(),
            "Rate limit resets too far in the future, capping wait"
        );
    }
    let wait = until_reset.min(MAX_WAIT);
    info!(
        remaining = info.remaining,
        wait_secs = wait.as_secs(),
        "Rate limit low, waiting for reset"
    );
    tokio::time::sleep(wait).await;
    true
}

/// Reads the core rate limit and waits for the reset when it is low.
///
/// # Errors
///
/// Returns an error if the rate limit cannot be fetched.
pub async fn ensure_core_rate_limit(client: &dyn HostingClient) -> Result<(), ClientError> {
    let info = check_core_rate_limit(client).await?;
    wait_if_needed(&info).await;
    Ok(())
}
