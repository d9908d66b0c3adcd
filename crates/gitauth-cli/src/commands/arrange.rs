//! `gitauth arrange`: spread a commit range over the configured timeline.

use clap::Args;
use gitauth_core::{commit_weight, Config, Item, ScheduleBuilder, StaticWeights};
use std::path::PathBuf;

use super::{export_schedule, print_schedule, WindowArgs};
use crate::git::{commits_shortcut, GitRepo};

#[derive(Args, Debug)]
pub struct ArrangeArgs {
    /// Repository path (defaults to the current directory)
    #[arg(long, short)]
    pub path: Option<PathBuf>,

    /// Commit range ('A..B') or a number N for the last N commits
    #[arg(long, conflicts_with_all = ["start_commit", "end_commit"])]
    pub commits: Option<String>,

    /// Oldest commit to include
    #[arg(long)]
    pub start_commit: Option<String>,

    /// Newest commit to include
    #[arg(long)]
    pub end_commit: Option<String>,

    #[command(flatten)]
    pub window: WindowArgs,

    /// Write the schedule as JSON to this file
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Print the full schedule as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ArrangeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let repo = GitRepo::open(args.path.as_deref())?;
    if !repo.has_commits()? {
        return Err("repository has no commits".into());
    }

    let range = match &args.commits {
        Some(spec) => commits_shortcut(spec),
        None => {
            let start = args.start_commit.as_deref().unwrap_or("HEAD~10");
            let end = args.end_commit.as_deref().unwrap_or("HEAD");
            repo.inclusive_range(start, end)?
        }
    };
    tracing::debug!(%range, "resolved commit range");

    let hashes = repo.list_commits(&range)?;
    if hashes.is_empty() {
        return Err(format!("no commits found in range {range}").into());
    }

    let mut weights = StaticWeights::new();
    for hash in &hashes {
        match repo.numstat(hash) {
            Ok(output) => weights.insert(hash.clone(), commit_weight(&output)),
            Err(e) => tracing::warn!(commit = %hash, error = %e, "could not size commit"),
        }
    }

    let config = Config::load()?;
    let today = chrono::Local::now().date_naive();
    let window = args.window.to_window(&config, today)?;
    let options = args.window.to_options(&config);

    let items = Item::from_newest_first(hashes);
    let schedule = ScheduleBuilder::new()
        .with_options(options)
        .build(&items, &weights, &window)?;
    tracing::info!(commits = schedule.len(), "schedule built");

    print_schedule(&schedule, config.arrange.preview_count as usize, args.json)?;
    export_schedule(&schedule, args.output.as_deref(), args.json)
}
