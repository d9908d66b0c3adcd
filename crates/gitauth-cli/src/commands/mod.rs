pub mod arrange;
pub mod config;
pub mod plan;
mod window_args;

use gitauth_core::{RewriteEngine, Schedule};

pub use window_args::WindowArgs;

/// Print the first `count` entries, or the whole schedule as JSON.
pub(crate) fn print_schedule(
    schedule: &Schedule,
    count: usize,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(schedule)?);
        return Ok(());
    }

    println!("Scheduled {} items.", schedule.len());
    println!("Preview (first {}):", count.min(schedule.len()));
    for (id, ts) in schedule.iter().take(count) {
        let short: String = id.chars().take(8).collect();
        println!("  {short} -> {}", ts.to_rfc3339());
    }
    Ok(())
}

/// Hand the schedule to the JSON writer when an output path was given.
pub(crate) fn export_schedule(
    schedule: &Schedule,
    output: Option<&std::path::Path>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(path) = output else {
        return Ok(());
    };
    let mut writer = gitauth_core::JsonScheduleWriter::new(path);
    writer.apply_schedule(schedule)?;
    tracing::info!(path = %path.display(), entries = schedule.len(), "schedule exported");
    // stdout carries only the JSON document in --json mode
    if json {
        eprintln!("schedule written to {}", path.display());
    } else {
        println!("schedule written to {}", path.display());
    }
    Ok(())
}
