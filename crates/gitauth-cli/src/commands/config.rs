//! `gitauth config`: inspect and edit `config.toml`.

use clap::Subcommand;
use gitauth_core::{resolve_zone, Config, ConfigError};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "window.start_time", "arrange.tie_break")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Show the window `arrange` and `plan` use when no flags are given
    Window,
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key).ok_or(ConfigError::UnknownKey(key))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            let stored = config.get(&key).unwrap_or(value);
            tracing::info!(%key, value = %stored, "config updated");
            println!("{key} = {stored}");
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let json = serde_json::to_string_pretty(&config)?;
            println!("{json}");
        }
        ConfigAction::Window => {
            let config = Config::load()?;
            let today = chrono::Local::now().date_naive();
            for line in window_summary(&config, today)? {
                println!("{line}");
            }
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}

/// Human-readable lines describing the default scheduling window.
fn window_summary(
    config: &Config,
    today: chrono::NaiveDate,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let (start, end) = config.default_date_range(today);
    let zone = resolve_zone(&config.timezone())?;
    let options = config.schedule_options();
    Ok(vec![
        format!("dates:          {start} .. {end}"),
        format!("hours:          {} - {}", config.daily_start()?, config.daily_end()?),
        format!("timezone:       {zone}"),
        format!("skip weekends:  {}", config.window.skip_weekends),
        format!("missing weight: {:?}", options.missing_weight),
        format!("tie break:      {:?}", options.tie_break),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn window_summary_reflects_config() {
        let mut config = Config::default();
        config.apply("window.timezone", "Asia/Karachi").unwrap();
        config.apply("window.default_span_days", "7").unwrap();
        config.apply("window.skip_weekends", "false").unwrap();

        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let lines = window_summary(&config, today).unwrap();
        assert_eq!(lines[0], "dates:          2024-03-08 .. 2024-03-15");
        assert_eq!(lines[1], "hours:          09:00 - 17:00");
        assert_eq!(lines[2], "timezone:       Asia/Karachi");
        assert_eq!(lines[3], "skip weekends:  false");
    }

    #[test]
    fn window_summary_rejects_unknown_zone() {
        let mut config = Config::default();
        config.apply("window.timezone", "Mars/Olympus").unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let err = window_summary(&config, today).unwrap_err();
        assert!(err.to_string().contains("Unknown timezone"));
    }
}
