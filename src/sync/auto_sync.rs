//! Background and opportunistic sync.
//!
//! Neither function returns an error: failures are logged and the next
//! trigger simply tries again.

use std::future::Future;
use std::time::Duration;

use super::SyncClient;
use crate::config::SyncConfig;
use crate::store::LocalStore;

/// Pushes after a write command when `auto_sync` is enabled, a session
/// exists and the server answers. Returns true if a push happened.
pub async fn try_auto_push(config: &SyncConfig, store: &LocalStore) -> bool {
    if !config.auto_sync {
        return false;
    }
    let Some(base_url) = config.api_base_url() else {
        return false;
    };

    let client = SyncClient::new(base_url, store.clone());
    if !client.is_authenticated() {
        return false;
    }

    // Fast fail when the server is down
    if !client.check_online().await {
        tracing::warn!("Auto-sync: server unreachable, skipping");
        return false;
    }

    match client.push().await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!("Auto-sync: {}", e);
            false
        }
    }
}

/// Counters reported when [`watch`] stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchStats {
    pub ticks: u64,
    pub pulls: u64,
    pub pushes: u64,
    pub failures: u64,
}

/// Runs until `shutdown` resolves.
///
/// Every `interval` the server health is checked. Coming back online (including the
/// first successful check) pulls then pushes; staying online pushes. Nothing
/// happens without a session.
pub async fn watch(
    client: &SyncClient,
    interval: Duration,
    shutdown: impl Future<Output = ()>,
) -> WatchStats {
    let mut stats = WatchStats::default();
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut was_online = false;

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {}
        }
        stats.ticks += 1;

        let online = client.check_online().await;
        let reconnected = online && !was_online;
        was_online = online;

        if !online {
            tracing::debug!("Watch: server unreachable");
            continue;
        }
        if !client.is_authenticated() {
            tracing::debug!("Watch: not logged in");
            continue;
        }

        if reconnected {
            match client.pull().await {
                Ok(pulled) => {
                    stats.pulls += 1;
                    tracing::info!("Watch: pulled after reconnect ({:?})", pulled);
                }
                Err(e) => {
                    stats.failures += 1;
                    tracing::warn!("Watch: pull failed: {}", e);
                    continue;
                }
            }
        }

        match client.push().await {
            Ok(_) => stats.pushes += 1,
            Err(e) => {
                stats.failures += 1;
                tracing::warn!("Watch: push failed: {}", e);
            }
        }
    }

    tracing::info!(
        ticks = stats.ticks,
        pulls = stats.pulls,
        pushes = stats.pushes,
        failures = stats.failures,
        "Watch stopped"
    );
    stats
}
