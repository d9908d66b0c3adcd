mod config;

pub use config::{ArrangeConfig, Config, WindowConfig};

use std::path::PathBuf;

/// Returns the configuration directory.
///
/// `GITAUTH_CONFIG_DIR` wins outright. Otherwise `~/.config/gitauth[-dev]/`,
/// with `GITAUTH_ENV=dev` selecting the development directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let dir = match std::env::var_os("GITAUTH_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("GITAUTH_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("gitauth-dev")
            } else {
                base_dir.join("gitauth")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
