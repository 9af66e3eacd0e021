use super::open_manager;
use std::sync::Arc;
use stickerpack::core::StickerResult;
use stickerpack::manager::{AutoUpdateSettings, PackEvent};

pub async fn run() -> StickerResult<()> {
    let (container, manager) = open_manager().await?;
    let manager = Arc::new(manager);

    manager.on_pack_state_change(|event: &PackEvent| match &event.error {
        Some(error) => eprintln!("  {} -> {} ({})", event.pack_name, event.state, error),
        None => println!("  {} -> {}", event.pack_name, event.state),
    });

    let settings = AutoUpdateSettings::from_config(container.config());
    if !settings.update_packs {
        println!("auto_update is off in the config; packs will only be reloaded");
    }
    manager.start_auto_update(settings);
    println!(
        "Watching {} pack(s), checking every {}s. Press Ctrl-C to stop.",
        manager.list_packs().len(),
        settings.interval.as_secs()
    );

    let signal = tokio::signal::ctrl_c().await;
    manager.shutdown().await;
    signal?;

    println!("Stopped");
    Ok(())
}
