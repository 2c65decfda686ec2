use anyhow::Result;
use owo_colors::OwoColorize;
use prioritize_core::PrioritizeConfig;

pub fn run(init: bool) -> Result<()> {
    let config_path = PrioritizeConfig::config_path().map_err(|e| anyhow::anyhow!(e))?;

    if init {
        if config_path.exists() {
            anyhow::bail!("Config file already exists at {}", config_path.display());
        }
        PrioritizeConfig::create_default_config(&config_path).map_err(|e| anyhow::anyhow!(e))?;
        println!("{} Created {}", "✓".green(), config_path.display());
        return Ok(());
    }

    let config = PrioritizeConfig::load_from(&config_path).map_err(|e| anyhow::anyhow!(e))?;

    println!("{}", "Paths".bold());
    println!("  Config:  {}", config_path.display());
    println!("  Output:  {}", config.output.display());
    println!();
    println!("{}", "Settings".bold());
    println!("  Calendar name:  {}", config.calendar_name);
    println!("  Sort:           {:?}", config.sort);
    println!("  Feeds:          {}", config.feeds.len());

    Ok(())
}
