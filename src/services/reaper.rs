//! Background eviction of sources that stopped reporting

use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::RegistryConfig;
use crate::registry::SourceRegistry;

const MIN_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Outcome of a single sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub inspected: usize,
    pub evicted: Vec<String>,
}

/// Periodically evicts sources whose last report is older than `max_age`
pub struct Reaper {
    registry: SourceRegistry,
    max_age: Duration,
    check_interval: Duration,
}

impl Reaper {
    pub fn new(registry: SourceRegistry, max_age: Duration, check_interval: Duration) -> Self {
        Self {
            registry,
            max_age,
            check_interval,
        }
    }

    pub fn from_config(registry: SourceRegistry, config: &RegistryConfig) -> Self {
        Self::new(registry, config.max_age, config.check_interval)
    }

    /// Sweep every `check_interval` until `cancellation_token` fires.
    ///
    /// Sweeps run inline in this loop, so two sweeps never overlap; ticks
    /// missed during a slow sweep are skipped.
    pub async fn run(self, cancellation_token: CancellationToken) {
        if self.check_interval < MIN_CHECK_INTERVAL {
            warn!(
                "Reaper check interval {:?} too short, using {:?}",
                self.check_interval, MIN_CHECK_INTERVAL
            );
        }
        let mut ticker = interval(self.check_interval.max(MIN_CHECK_INTERVAL));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            "Starting reaper: max age {}, check interval {}",
            humantime::format_duration(self.max_age),
            humantime::format_duration(self.check_interval)
        );

        // The first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep().await;
                }
                _ = cancellation_token.cancelled() => {
                    info!("Reaper received cancellation signal, shutting down");
                    break;
                }
            }
        }
    }

    pub async fn sweep(&self) -> SweepStats {
        self.sweep_at(Utc::now()).await
    }

    /// Evict every source with `now - last_seen >= max_age`
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> SweepStats {
        let cutoff = match chrono::Duration::from_std(self.max_age) {
            Ok(max_age) => now - max_age,
            Err(e) => {
                warn!("Reaper max age {:?} out of range: {}", self.max_age, e);
                return SweepStats::default();
            }
        };

        let sources = self.registry.last_seen_all().await;
        let mut stats = SweepStats {
            inspected: sources.len(),
            evicted: Vec::new(),
        };

        for (source_id, last_seen) in sources {
            if last_seen > cutoff {
                continue;
            }
            // Re-checked under the registry lock in case the source reported meanwhile
            if self.registry.remove_if_stale(&source_id, cutoff).await {
                debug!(source_id = %source_id, last_seen = %last_seen, "Evicted stale source");
                stats.evicted.push(source_id);
            }
        }

        if stats.evicted.is_empty() {
            trace!("Reaper sweep inspected {} sources, none stale", stats.inspected);
        } else {
            info!(
                "Reaper evicted {} of {} sources",
                stats.evicted.len(),
                stats.inspected
            );
        }

        stats
    }
}
