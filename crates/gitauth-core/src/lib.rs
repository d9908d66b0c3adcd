//! # gitauth Core Library
//!
//! This library provides the scheduling engine behind `gitauth arrange`:
//! it assigns new timestamps to an ordered sequence of weighted commits so
//! they fall inside a calendar window, respect a daily active period,
//! optionally skip weekends, and keep their original order.
//!
//! ## Architecture
//!
//! - **Window**: calendar range + daily clock window → active days
//! - **Allocator**: cumulative-weight mapping onto the concatenated timeline
//! - **Timezone**: zone resolution and timezone-correct timestamps
//! - **Schedule**: fail-fast composition of the above
//! - **Weights / Rewrite**: injected capabilities at either end of a run
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`ScheduleBuilder`]: builds a [`Schedule`] from items, weights and a window
//! - [`WeightProvider`]: trait supplying per-item weights
//! - [`RewriteEngine`]: trait consuming a finished schedule
//! - [`Config`]: application configuration management

pub mod allocator;
pub mod error;
pub mod rewrite;
pub mod schedule;
pub mod storage;
pub mod timezone;
pub mod weight;
pub mod window;

pub use allocator::{Placement, TieBreak, TimelineAllocator, WeightedItem};
pub use error::{ConfigError, CoreError, RewriteError, ScheduleError};
pub use rewrite::{JsonScheduleWriter, MemoryRewriteEngine, RewriteEngine};
pub use schedule::{Item, Schedule, ScheduleBuilder, ScheduleOptions, ScheduleWindow};
pub use storage::Config;
pub use timezone::{resolve_timestamp, resolve_zone, ResolvedZone, TimeZoneSpec};
pub use weight::{commit_weight, parse_numstat, MissingWeightPolicy, StaticWeights, UniformWeights, WeightProvider};
pub use window::{is_weekend, resolve_window, ActiveWindow, ClockTime, DayWindow};
