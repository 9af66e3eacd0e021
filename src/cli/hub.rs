use super::open_manager;
use stickerpack::core::StickerResult;

pub async fn run(refresh: bool) -> StickerResult<()> {
    let (_, manager) = open_manager().await?;
    let packs = manager.fetch_hub_packs(refresh).await?;

    if packs.is_empty() {
        println!("The hub has no packs");
        return Ok(());
    }

    println!("Available packs ({}):", packs.len());
    for pack in packs {
        let marker = match manager.get_manifest(&pack.name) {
            Some(local) if local.version == pack.version => " (installed)",
            Some(_) => " (update available)",
            None => "",
        };
        println!("  {} {} by {}{}", pack.name, pack.version, pack.author, marker);
        if !pack.description.is_empty() {
            println!("      {}", pack.description);
        }
    }

    Ok(())
}

pub async fn run_index() -> StickerResult<()> {
    let (_, manager) = open_manager().await?;
    let packs = manager.fetch_hub_index().await?;

    if packs.is_empty() {
        println!("The hub index is empty");
        return Ok(());
    }

    println!("Indexed packs ({}):", packs.len());
    for pack in packs {
        let source = &pack.source;
        let marker = if manager.get_manifest(&pack.slug).is_some() {
            " (installed)"
        } else {
            ""
        };
        println!(
            "  {} github:{}/{}@{}/{}{}",
            pack.slug, source.owner, source.repo, source.branch, source.path, marker
        );
    }

    Ok(())
}
