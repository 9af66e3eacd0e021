use super::open_manager;
use stickerpack::core::StickerResult;
use stickerpack::manager::UpdateOutcome;

pub async fn run(name: &str, update: bool) -> StickerResult<()> {
    let (container, manager) = open_manager().await?;
    let info = container.hub().fetch_pack_info(name, false).await?;

    if update {
        match manager.install_or_update(&info, false).await? {
            UpdateOutcome::Installed { version } => {
                println!("✓ Installed {} {}", name, version)
            }
            UpdateOutcome::Updated { from, to } => {
                println!("✓ Updated {} {} -> {}", name, from, to)
            }
            UpdateOutcome::UpToDate { version } => {
                println!("{} {} is already up to date", name, version)
            }
        }
        return Ok(());
    }

    let manifest = manager.install_pack(&info).await?;
    println!(
        "✓ Installed {} {} ({} sticker(s))",
        manifest.name,
        manifest.version,
        manifest.stickers.len()
    );
    Ok(())
}

pub async fn run_from_index(slug: &str) -> StickerResult<()> {
    let (_, manager) = open_manager().await?;
    let manifest = manager.install_from_hub(slug).await?;
    println!(
        "✓ Installed {} {} ({} sticker(s))",
        manifest.name,
        manifest.version,
        manifest.stickers.len()
    );
    Ok(())
}
