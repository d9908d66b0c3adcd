//! `gitauth plan`: schedule arbitrary items read from a JSON file.

use clap::Args;
use gitauth_core::{Config, CoreError, Item, ScheduleBuilder, StaticWeights};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::{export_schedule, print_schedule, WindowArgs};

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// JSON array of `{"id": ..., "weight": ...}` objects, oldest first
    #[arg(long)]
    pub items: PathBuf,

    #[command(flatten)]
    pub window: WindowArgs,

    /// Write the schedule as JSON to this file
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Print the full schedule as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Deserialize)]
struct PlanItem {
    id: String,
    #[serde(default)]
    weight: Option<f64>,
}

fn read_items(path: &Path) -> Result<Vec<PlanItem>, CoreError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn run(args: PlanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let entries = read_items(&args.items)?;

    let config = Config::load()?;
    let today = chrono::Local::now().date_naive();
    let window = args.window.to_window(&config, today)?;
    let options = args.window.to_options(&config);

    // items without a weight are left to the missing-weight policy
    let weights: StaticWeights = entries
        .iter()
        .filter_map(|e| e.weight.map(|w| (e.id.clone(), w)))
        .collect();
    let items = Item::from_oldest_first(entries.iter().map(|e| e.id.clone()));
    tracing::debug!(items = items.len(), weighted = weights.len(), "planning");

    let schedule = ScheduleBuilder::new()
        .with_options(options)
        .build(&items, &weights, &window)?;

    print_schedule(&schedule, schedule.len(), args.json)?;
    export_schedule(&schedule, args.output.as_deref(), args.json)
}
