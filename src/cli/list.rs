use super::open_manager;
use stickerpack::core::StickerResult;

pub async fn run() -> StickerResult<()> {
    let (_, manager) = open_manager().await?;

    let mut names = manager.list_packs();
    if names.is_empty() {
        println!("No sticker packs installed");
        return Ok(());
    }
    names.sort();

    println!("Installed packs:");
    for name in names {
        let state = manager
            .pack_state(&name)
            .map(|s| s.to_string())
            .unwrap_or_default();
        let enabled = if manager.is_enabled(&name) { "" } else { " (disabled)" };
        match manager.get_manifest(&name) {
            Some(manifest) => println!(
                "  {} {} - {} sticker(s) [{}]{}",
                name,
                manifest.version,
                manifest.stickers.len(),
                state,
                enabled
            ),
            None => {
                let error = manager.pack_error(&name).unwrap_or_default();
                println!("  {} [{}] {}", name, state, error);
            }
        }
    }

    Ok(())
}
