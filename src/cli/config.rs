use stickerpack::config::Config;
use stickerpack::core::path::config_file;
use stickerpack::core::StickerResult;

pub fn show() -> StickerResult<()> {
    let config = Config::load()?;
    let yaml = serde_yaml::to_string(&config)?;
    print!("{}", yaml);
    println!("# base directory: {}", config.get_base_dir()?.display());
    Ok(())
}

pub fn path() -> StickerResult<()> {
    println!("{}", config_file()?.display());
    Ok(())
}
