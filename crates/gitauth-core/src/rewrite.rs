//! Rewrite engine seam.
//!
//! The scheduler hands its finished [`Schedule`] to a [`RewriteEngine`]
//! and has no further say in how history is changed. The engines shipped
//! here only persist or record the schedule; rewriting commits is left to
//! an external tool reading the exported JSON.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::RewriteError;
use crate::schedule::Schedule;

/// Applies a finished schedule somewhere outside the core.
pub trait RewriteEngine {
    /// Apply `schedule` in full, or fail without partial effect.
    fn apply_schedule(&mut self, schedule: &Schedule) -> Result<(), RewriteError>;
}

/// Writes the schedule as a pretty-printed JSON object `{ id: timestamp }`.
#[derive(Debug, Clone)]
pub struct JsonScheduleWriter {
    path: PathBuf,
}

impl JsonScheduleWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RewriteEngine for JsonScheduleWriter {
    fn apply_schedule(&mut self, schedule: &Schedule) -> Result<(), RewriteError> {
        if schedule.is_empty() {
            return Err(RewriteError::Rejected("schedule is empty".into()));
        }
        let json = serde_json::to_string_pretty(schedule)?;

        // Readers see either the previous file or the complete new one.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| RewriteError::WriteFailed {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| RewriteError::WriteFailed {
            path: self.path.clone(),
            source,
        })
    }
}

/// Keeps every applied schedule in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryRewriteEngine {
    applied: Vec<Schedule>,
}

impl MemoryRewriteEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn applied(&self) -> &[Schedule] {
        &self.applied
    }

    pub fn last(&self) -> Option<&Schedule> {
        self.applied.last()
    }
}

impl RewriteEngine for MemoryRewriteEngine {
    fn apply_schedule(&mut self, schedule: &Schedule) -> Result<(), RewriteError> {
        self.applied.push(schedule.clone());
        Ok(())
    }
}
