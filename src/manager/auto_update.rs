//! Background reload + update loop.

use super::PackLifecycleManager;
use crate::di::ConfigProvider;
use std::sync::{Arc, PoisonError, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default interval between background passes (one hour).
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(3600);

/// How the background loop runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoUpdateSettings {
    pub interval: Duration,
    /// Update enabled packs after each reload. When off, passes only reload.
    pub update_packs: bool,
    /// Reinstall packs even when they are up to date.
    pub force: bool,
}

impl Default for AutoUpdateSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_UPDATE_INTERVAL,
            update_packs: true,
            force: false,
        }
    }
}

impl AutoUpdateSettings {
    pub fn from_config(config: &dyn ConfigProvider) -> Self {
        Self {
            interval: config.update_interval(),
            update_packs: config.auto_update(),
            force: config.force_update(),
        }
    }
}

/// The running background task and the token that stops it.
pub struct AutoUpdateHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl AutoUpdateHandle {
    /// Stop the loop and wait for it. A pass already running finishes its
    /// current operation first.
    pub async fn join(self) {
        self.token.cancel();
        if let Err(e) = self.task.await {
            warn!(error = %e, "Auto-update task ended abnormally");
        }
    }
}

impl PackLifecycleManager {
    /// Start the background loop: every `settings.interval`, reload and,
    /// when `settings.update_packs` is set, update each enabled pack. The
    /// first pass runs one interval after start. Failures are logged and
    /// never stop the schedule.
    ///
    /// Returns `false` if the loop was already running or the manager has
    /// been shut down.
    pub fn start_auto_update(self: &Arc<Self>, settings: AutoUpdateSettings) -> bool {
        if self.is_shut_down() {
            return false;
        }
        let mut slot = self
            .auto_update
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            debug!("Auto-update already running");
            return false;
        }

        let token = self.shutdown.child_token();
        let task = tokio::spawn(run(Arc::downgrade(self), settings, token.clone()));
        *slot = Some(AutoUpdateHandle { token, task });

        info!(
            interval_secs = settings.interval.as_secs(),
            update_packs = settings.update_packs,
            force = settings.force,
            "Auto-update started"
        );
        true
    }

    /// Whether the background loop is running.
    pub fn auto_update_running(&self) -> bool {
        self.auto_update
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.task.is_finished())
    }
}

async fn run(
    manager: Weak<PackLifecycleManager>,
    settings: AutoUpdateSettings,
    shutdown: CancellationToken,
) {
    let mut interval = tokio::time::interval(settings.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Skip the first immediate tick
    interval.tick().await;

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                info!("Auto-update shutting down");
                break;
            }

            _ = interval.tick() => {
                let Some(manager) = manager.upgrade() else {
                    debug!("Manager dropped, stopping auto-update");
                    break;
                };
                manager.run_update_pass(settings.update_packs, settings.force).await;
            }
        }
    }
}
