use super::open_manager;
use stickerpack::core::StickerResult;

pub async fn run(name: &str) -> StickerResult<()> {
    let (_, manager) = open_manager().await?;
    manager.delete_pack(name).await?;
    println!("✓ Removed {}", name);
    Ok(())
}
