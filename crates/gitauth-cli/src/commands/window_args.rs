use chrono::NaiveDate;
use clap::Args;
use gitauth_core::{ClockTime, Config, ScheduleOptions, ScheduleWindow, TieBreak, TimeZoneSpec};

/// Window flags shared by `arrange` and `plan`. Absent flags fall back to config.
#[derive(Args, Debug, Clone, Default)]
pub struct WindowArgs {
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: Option<NaiveDate>,
    /// Daily start time (HH:MM)
    #[arg(long)]
    pub start_time: Option<ClockTime>,
    /// Daily end time (HH:MM)
    #[arg(long)]
    pub end_time: Option<ClockTime>,
    /// Timezone (e.g. 'UTC', 'Asia/Karachi'); empty or 'local' for the local zone
    #[arg(long)]
    pub timezone: Option<String>,
    /// Skip Saturdays and Sundays
    #[arg(long, conflicts_with = "no_skip_weekends")]
    pub skip_weekends: bool,
    /// Keep Saturdays and Sundays
    #[arg(long)]
    pub no_skip_weekends: bool,
    /// Give every item a distinct second, even zero-weight ones
    #[arg(long)]
    pub strict: bool,
}

impl WindowArgs {
    pub fn to_window(
        &self,
        config: &Config,
        today: NaiveDate,
    ) -> Result<ScheduleWindow, Box<dyn std::error::Error>> {
        let (default_start, default_end) = config.default_date_range(today);
        let daily_start = match self.start_time {
            Some(t) => t,
            None => config.daily_start()?,
        };
        let daily_end = match self.end_time {
            Some(t) => t,
            None => config.daily_end()?,
        };
        let timezone = match &self.timezone {
            Some(name) => TimeZoneSpec::parse(name),
            None => config.timezone(),
        };
        let skip_weekends = if self.skip_weekends {
            true
        } else if self.no_skip_weekends {
            false
        } else {
            config.window.skip_weekends
        };

        Ok(ScheduleWindow {
            start_date: self.start_date.unwrap_or(default_start),
            end_date: self.end_date.unwrap_or(default_end),
            daily_start,
            daily_end,
            timezone,
            skip_weekends,
        })
    }

    pub fn to_options(&self, config: &Config) -> ScheduleOptions {
        let mut options = config.schedule_options();
        if self.strict {
            options.tie_break = TieBreak::StrictSeconds;
        }
        options
    }
}
