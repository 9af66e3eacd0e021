pub mod config;
pub mod enable;
pub mod hub;
pub mod install;
pub mod list;
pub mod remove;
pub mod update;
pub mod watch;

use stickerpack::core::StickerResult;
use stickerpack::di::ServiceContainer;
use stickerpack::manager::PackLifecycleManager;

/// Build the production services and a manager whose index reflects disk.
///
/// Packs that fail to load are reported on stderr but do not abort the
/// command.
pub async fn open_manager() -> StickerResult<(ServiceContainer, PackLifecycleManager)> {
    let container = ServiceContainer::new()?;
    let manager = container.manager()?;
    let report = manager.reload().await?;
    for (name, error) in &report.failed {
        eprintln!("⚠ Pack '{}' failed to load: {}", name, error);
    }
    Ok((container, manager))
}
