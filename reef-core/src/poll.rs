//! Poll - Wait for an asynchronous backend operation to settle
//!
//! Cluster creation and deletion are accepted immediately by the control
//! plane and finish minutes later. `wait_for` repeatedly runs a probe
//! against the backend until it reports a terminal observation, sleeping
//! with exponential backoff between attempts and giving up once the
//! policy timeout elapses. Dropping the returned future cancels the
//! wait; no request survives past the drop.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::provider::ProviderError;

/// Controls pacing and bounds of a poll loop
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    /// Delay before the second probe (the first probe runs immediately)
    pub initial_interval: Duration,
    /// Upper bound on the delay between probes
    pub max_interval: Duration,
    /// Factor applied to the delay after each probe; values below 1.0
    /// are treated as 1.0
    pub multiplier: f64,
    /// Total time budget; `None` polls until a terminal observation
    pub timeout: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(15),
            max_interval: Duration::from_secs(60),
            multiplier: 2.0,
            timeout: Some(Duration::from_secs(45 * 60)),
        }
    }
}

impl PollPolicy {
    /// Fixed-interval policy without backoff
    pub fn fixed(interval: Duration, timeout: Option<Duration>) -> Self {
        Self {
            initial_interval: interval,
            max_interval: interval,
            multiplier: 1.0,
            timeout,
        }
    }

    fn next_interval(&self, current: Duration) -> Duration {
        let multiplier = self.multiplier.max(1.0);
        current.mul_f64(multiplier).min(self.max_interval)
    }
}

/// What one probe saw
#[derive(Debug, Clone, PartialEq)]
pub enum Observation<T> {
    /// The operation reached its terminal state
    Ready(T),
    /// Still in progress, probe again later
    Pending,
    /// The resource vanished while we were waiting for it; terminal
    Gone,
}

/// Why a poll loop stopped without success
#[derive(Debug)]
pub enum PollError {
    /// The policy timeout elapsed before a terminal observation
    Timeout { waited: Duration },
    /// A probe observed `Observation::Gone`
    Gone,
    /// A probe itself failed
    Probe(ProviderError),
}

impl std::fmt::Display for PollError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollError::Timeout { waited } => {
                write!(f, "timed out after {:.0?} waiting for operation to settle", waited)
            }
            PollError::Gone => write!(f, "resource disappeared while waiting for it"),
            PollError::Probe(err) => write!(f, "poll probe failed: {}", err),
        }
    }
}

impl std::error::Error for PollError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PollError::Probe(err) => Some(err),
            _ => None,
        }
    }
}

/// Run `probe` until it reports a terminal observation
///
/// The first probe runs immediately; subsequent probes are spaced by the
/// policy's backoff schedule. `Gone` and probe errors end the loop at
/// once.
pub async fn wait_for<T, F, Fut>(policy: &PollPolicy, mut probe: F) -> Result<T, PollError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Observation<T>, ProviderError>>,
{
    let started = Instant::now();
    let mut interval = policy.initial_interval;

    loop {
        match probe().await.map_err(PollError::Probe)? {
            Observation::Ready(value) => return Ok(value),
            Observation::Gone => return Err(PollError::Gone),
            Observation::Pending => {}
        }

        if let Some(timeout) = policy.timeout {
            let waited = started.elapsed();
            if waited + interval >= timeout {
                return Err(PollError::Timeout { waited });
            }
        }

        tokio::time::sleep(interval).await;
        interval = policy.next_interval(interval);
    }
}
