//! Fixed-interval reconnection logic.

use std::future::Future;
use std::time::Duration;

use backon::{BackoffBuilder, ConstantBuilder};
use tracing::{info, warn};

use crate::common::error::{ConnectionError, ConnectionResult};

/// Delay between reconnection attempts.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(10);

/// Configuration for reconnection attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay between two failed attempts. Never grows.
    pub interval: Duration,
    /// Maximum number of retries after the first failure (None = infinite).
    pub max_attempts: Option<usize>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_RETRY_INTERVAL,
            max_attempts: None,
        }
    }
}

impl ReconnectPolicy {
    /// Iterator over the delays to wait between attempts.
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        ConstantBuilder::default()
            .with_delay(self.interval)
            .with_max_times(self.max_attempts.unwrap_or(usize::MAX))
            .build()
    }
}

/// Keep calling `connect` until it succeeds.
///
/// Between failures the loop awaits `sleep` with the next delay from the
/// policy. Returns `MaxReconnectAttempts` once a bounded policy runs dry.
pub async fn retry_connect<T, C, CF, S, SF>(
    policy: &ReconnectPolicy,
    mut connect: C,
    mut sleep: S,
) -> ConnectionResult<T>
where
    C: FnMut() -> CF,
    CF: Future<Output = ConnectionResult<T>>,
    S: FnMut(Duration) -> SF,
    SF: Future<Output = ()>,
{
    let mut delays = policy.delays();
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        match connect().await {
            Ok(connection) => {
                if attempt > 1 {
                    info!("Reconnected after {} attempts", attempt);
                }
                return Ok(connection);
            }
            Err(e) => {
                warn!("Connection attempt {} failed: {}", attempt, e);
                let Some(delay) = delays.next() else {
                    return Err(ConnectionError::MaxReconnectAttempts);
                };
                info!("Reconnecting in {:.1} seconds...", delay.as_secs_f64());
                sleep(delay).await;
            }
        }
    }
}
