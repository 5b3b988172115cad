//! Finding and creating forks of repositories the user cannot push to.
//!
//! Forks are created asynchronously by GitHub. After requesting one,
//! [`wait_until_ready`] polls its default branch with exponential backoff
//! until the branch head commit can be read or the deadline passes.

use super::ForkError;
use crate::client::{HostingClient, RepoRecord};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, info, info_span, warn, Instrument};

/// Deadline used when a zero timeout is configured.
pub const DEFAULT_FORK_TIMEOUT: Duration = Duration::from_secs(60);

/// First sleep between readiness probes when none is configured.
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Deadline and initial backoff for fork readiness polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForkWait {
    timeout: Duration,
    initial_backoff: Duration,
}

impl Default for ForkWait {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_FORK_TIMEOUT,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
        }
    }
}

impl ForkWait {
    /// Zero values fall back to [`DEFAULT_FORK_TIMEOUT`] and [`DEFAULT_INITIAL_BACKOFF`].
    #[must_use]
    pub fn new(timeout: Duration, initial_backoff: Duration) -> Self {
        Self {
            timeout: if timeout.is_zero() {
                DEFAULT_FORK_TIMEOUT
            } else {
                timeout
            },
            initial_backoff: if initial_backoff.is_zero() {
                DEFAULT_INITIAL_BACKOFF
            } else {
                initial_backoff
            },
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn initial_backoff(&self) -> Duration {
        self.initial_backoff
    }
}

/// Progress of a readiness wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForkWaitState {
    Waiting,
    Ready,
    TimedOut,
}

/// Doubling sleep schedule whose total never exceeds the deadline.
#[derive(Debug, Clone)]
pub struct Backoff {
    current: Duration,
    waited: Duration,
    timeout: Duration,
}

impl Backoff {
    #[must_use]
    pub fn new(wait: ForkWait) -> Self {
        Self {
            current: wait.initial_backoff(),
            waited: Duration::ZERO,
            timeout: wait.timeout(),
        }
    }

    /// True once the accumulated sleep reaches the deadline.
    #[must_use]
    pub fn exhausted(&self) -> bool {
        self.waited >= self.timeout
    }

    /// Next sleep, clamped to the remaining budget. Doubles the following one.
    pub fn next_sleep(&mut self) -> Duration {
        let sleep = self.current.min(self.timeout.saturating_sub(self.waited));
        self.waited += sleep;
        self.current = self.current.saturating_mul(2);
        sleep
    }

    /// Total sleep scheduled so far.
    #[must_use]
    pub fn waited(&self) -> Duration {
        self.waited
    }
}

/// Finds a repository owned by the authenticated user that is a fork of `target`.
///
/// # Errors
///
/// Returns [`ForkError::Lookup`] if listing or fetching repositories fails.
pub async fn find_user_fork(
    client: &dyn HostingClient,
    target: &RepoRecord,
) -> Result<Option<RepoRecord>, ForkError> {
    let lookup_error = |source| ForkError::Lookup {
        repository: target.full_name.clone(),
        source,
    };

    let owned = client.list_owned_repos().await.map_err(lookup_error)?;
    for candidate in owned.into_iter().filter(|r| r.fork) {
        // Listings omit `source`, so fetch each fork individually.
        let detailed = client
            .get_repo_by_id(candidate.id)
            .await
            .map_err(lookup_error)?;
        if detailed.source.as_ref().is_some_and(|s| s.id == target.id) {
            debug!(fork = %detailed.full_name, "Found existing fork");
            return Ok(Some(detailed));
        }
    }
    Ok(None)
}

/// Forks `target` into the authenticated user's account and waits until it is usable.
///
/// # Errors
///
/// Returns [`ForkError::Create`] if the fork request fails and
/// [`ForkError::TimedOut`] if the fork is not ready before the deadline.
pub async fn create_fork(
    client: &Arc<dyn HostingClient>,
    target: &RepoRecord,
    wait: ForkWait,
) -> Result<RepoRecord, ForkError> {
    let span = info_span!("create_fork", repo = %target.full_name);

    async {
        let fork = client
            .create_fork(&target.owner.login, &target.name)
            .await
            .map_err(|source| ForkError::Create {
                repository: target.full_name.clone(),
                source,
            })?;
        info!(fork = %fork.full_name, "Fork requested");

        let branch = fork
            .default_branch
            .clone()
            .or_else(|| target.default_branch.clone())
            .unwrap_or_else(|| "main".to_string());
        wait_until_ready(Arc::clone(client), fork.clone(), branch, wait).await?;
        Ok(fork)
    }
    .instrument(span)
    .await
}

/// Polls `fork` on a background task until its `branch` head commit is readable.
///
/// # Errors
///
/// Returns [`ForkError::TimedOut`] when the deadline passes first.
pub async fn wait_until_ready(
    client: Arc<dyn HostingClient>,
    fork: RepoRecord,
    branch: String,
    wait: ForkWait,
) -> Result<(), ForkError> {
    let (done, outcome) = oneshot::channel();
    tokio::spawn(async move {
        let state = poll_until_ready(client.as_ref(), &fork, &branch, wait).await;
        // The receiver only disappears if the caller was dropped.
        let _ = done.send(state);
    });

    match outcome.await {
        Ok(ForkWaitState::Ready) => Ok(()),
        Ok(_) => Err(ForkError::TimedOut {
            timeout_secs: wait.timeout().as_secs(),
        }),
        Err(_) => Err(ForkError::WaiterDropped),
    }
}

async fn poll_until_ready(
    client: &dyn HostingClient,
    fork: &RepoRecord,
    branch: &str,
    wait: ForkWait,
) -> ForkWaitState {
    let mut backoff = Backoff::new(wait);
    let mut attempts = 0u32;
    let mut state = ForkWaitState::Waiting;

    while state == ForkWaitState::Waiting {
        if backoff.exhausted() {
            state = ForkWaitState::TimedOut;
            continue;
        }
        attempts += 1;
        if is_ready(client, fork, branch).await {
            state = ForkWaitState::Ready;
            continue;
        }
        let sleep = backoff.next_sleep();
        debug!(
            fork = %fork.full_name,
            attempts,
            sleep_ms = sleep.as_millis() as u64,
            "Fork not ready yet"
        );
        tokio::time::sleep(sleep).await;
    }

    if state == ForkWaitState::TimedOut {
        warn!(fork = %fork.full_name, attempts, "Fork did not become ready");
    } else {
        debug!(fork = %fork.full_name, attempts, "Fork ready");
    }
    state
}

async fn is_ready(client: &dyn HostingClient, fork: &RepoRecord, branch: &str) -> bool {
    let Ok(head) = client
        .get_branch(&fork.owner.login, &fork.name, branch)
        .await
    else {
        return false;
    };
    client
        .get_commit(&fork.owner.login, &fork.name, &head.commit.sha)
        .await
        .is_ok()
}
