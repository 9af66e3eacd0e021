use super::open_manager;
use stickerpack::core::StickerResult;

/// Enable or disable a pack for background updates.
pub async fn run(name: &str, enabled: bool) -> StickerResult<()> {
    let (_, manager) = open_manager().await?;
    manager.set_pack_enabled(name, enabled)?;
    if enabled {
        println!("✓ Enabled {}", name);
    } else {
        println!("✓ Disabled {}", name);
    }
    Ok(())
}
