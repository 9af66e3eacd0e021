use super::open_manager;
use stickerpack::core::StickerResult;
use stickerpack::manager::{UpdateCheck, UpdateOutcome};

pub async fn run(name: Option<&str>, force: bool) -> StickerResult<()> {
    let (_, manager) = open_manager().await?;

    let results = match name {
        Some(name) => vec![(name.to_string(), manager.update_pack(name, force).await)],
        None => manager.update_all(force).await,
    };

    if results.is_empty() {
        println!("No enabled packs to update");
        return Ok(());
    }

    let mut first_error = None;
    for (name, result) in results {
        match result {
            Ok(UpdateOutcome::Updated { from, to }) => println!("✓ {} {} -> {}", name, from, to),
            Ok(UpdateOutcome::Installed { version }) => println!("✓ {} {}", name, version),
            Ok(UpdateOutcome::UpToDate { version }) => {
                println!("  {} {} is up to date", name, version)
            }
            Err(e) => {
                eprintln!("✗ {}: {}", name, e);
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Report available updates without downloading anything.
pub async fn check(name: Option<&str>, force: bool) -> StickerResult<()> {
    let (_, manager) = open_manager().await?;

    let names = match name {
        Some(name) => vec![name.to_string()],
        None => manager
            .list_manifests()
            .into_iter()
            .map(|m| m.name)
            .filter(|name| manager.is_enabled(name))
            .collect(),
    };

    if names.is_empty() {
        println!("No enabled packs to check");
        return Ok(());
    }

    let mut available = 0;
    let mut first_error = None;
    for name in names {
        match manager.check_update(&name, force).await {
            Ok(UpdateCheck::Available { from, to }) => {
                available += 1;
                println!("↑ {} {} -> {}", name, from, to)
            }
            Ok(UpdateCheck::UpToDate { version }) => {
                println!("  {} {} is up to date", name, version)
            }
            Err(e) => {
                eprintln!("✗ {}: {}", name, e);
                first_error.get_or_insert(e);
            }
        }
    }
    println!("{} update(s) available", available);

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
