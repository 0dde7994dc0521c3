//! Show, initialize, or locate the application config.

use gestura_common::config::{config_file_path, AppConfig};

use crate::ConfigAction;

pub fn run(app: &AppConfig, action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(app)?);
        }
        ConfigAction::Init { force } => {
            let path = config_file_path();
            if path.exists() && !force {
                anyhow::bail!(
                    "Config already exists at {} (use --force to overwrite)",
                    path.display()
                );
            }
            AppConfig::default().save()?;
            println!("Config written to: {}", path.display());
        }
        ConfigAction::Path => {
            println!("{}", config_file_path().display());
        }
    }
    Ok(())
}
