//! Schedule assembly.
//!
//! [`ScheduleBuilder`] composes window resolution, timeline allocation and
//! timestamp resolution into one fail-fast run. It either returns a complete
//! [`Schedule`] covering every input item or the first error it hit.

use chrono::{DateTime, FixedOffset, NaiveDate};
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;

use crate::allocator::{TieBreak, TimelineAllocator, WeightedItem};
use crate::error::ScheduleError;
use crate::timezone::{resolve_timestamp, resolve_zone, TimeZoneSpec};
use crate::weight::{MissingWeightPolicy, WeightProvider, MINIMUM_WEIGHT};
use crate::window::{resolve_window, ClockTime};

/// A unit of work to be scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Opaque identifier, e.g. a commit hash.
    pub id: String,
    /// Position in the original sequence, 0 = oldest.
    pub sequence: usize,
}

impl Item {
    pub fn new(id: impl Into<String>, sequence: usize) -> Self {
        Self {
            id: id.into(),
            sequence,
        }
    }

    /// Number identifiers given oldest first.
    pub fn from_oldest_first<I, S>(ids: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ids.into_iter()
            .enumerate()
            .map(|(sequence, id)| Self::new(id, sequence))
            .collect()
    }

    /// Number identifiers given newest first, as `git log` lists them.
    pub fn from_newest_first<I, S>(ids: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        Self::from_oldest_first(ids.into_iter().rev())
    }
}

/// Calendar and clock bounds for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub daily_start: ClockTime,
    pub daily_end: ClockTime,
    #[serde(default)]
    pub timezone: TimeZoneSpec,
    #[serde(default)]
    pub skip_weekends: bool,
}

/// Policies applied while building a schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleOptions {
    #[serde(default)]
    pub missing_weight: MissingWeightPolicy,
    #[serde(default)]
    pub tie_break: TieBreak,
}

/// Item identifier to assigned timestamp, in original oldest-first order.
///
/// Serializes as a JSON object of RFC 3339 strings, the same text
/// [`Schedule::entries`] produces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    entries: IndexMap<String, DateTime<FixedOffset>>,
}

impl Serialize for Schedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, ts) in &self.entries {
            map.serialize_entry(id, &ts.to_rfc3339())?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Schedule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = IndexMap::<String, String>::deserialize(deserializer)?;
        let entries = raw
            .into_iter()
            .map(|(id, text)| {
                DateTime::parse_from_rfc3339(&text)
                    .map(|ts| (id, ts))
                    .map_err(serde::de::Error::custom)
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { entries })
    }
}

impl Schedule {
    pub fn get(&self, item_id: &str) -> Option<&DateTime<FixedOffset>> {
        self.entries.get(item_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.entries.contains_key(item_id)
    }

    /// Entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DateTime<FixedOffset>)> {
        self.entries.iter().map(|(id, ts)| (id.as_str(), ts))
    }

    /// Entries as `(id, RFC 3339 timestamp)` pairs, oldest first.
    pub fn entries(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(id, ts)| (id.clone(), ts.to_rfc3339()))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = (&'a String, &'a DateTime<FixedOffset>);
    type IntoIter = indexmap::map::Iter<'a, String, DateTime<FixedOffset>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Builds schedules from items, weights and a window.
#[derive(Debug, Clone, Default)]
pub struct ScheduleBuilder {
    options: ScheduleOptions,
}

impl ScheduleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: ScheduleOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_missing_weight(mut self, policy: MissingWeightPolicy) -> Self {
        self.options.missing_weight = policy;
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.options.tie_break = tie_break;
        self
    }

    pub fn options(&self) -> &ScheduleOptions {
        &self.options
    }

    /// Build the schedule for `items`.
    ///
    /// Items are ordered by their `sequence`; weights are looked up once per
    /// item. Window resolution runs before allocation, which runs before the
    /// zone is resolved and timestamps are built.
    ///
    /// # Errors
    /// Any [`ScheduleError`]; no partial schedule is returned.
    pub fn build<W>(
        &self,
        items: &[Item],
        weights: &W,
        window: &ScheduleWindow,
    ) -> Result<Schedule, ScheduleError>
    where
        W: WeightProvider + ?Sized,
    {
        let active = resolve_window(
            window.start_date,
            window.end_date,
            window.daily_start,
            window.daily_end,
            window.skip_weekends,
        )?;

        let weighted = self.weigh(items, weights)?;
        let placements = TimelineAllocator::new()
            .with_tie_break(self.options.tie_break)
            .allocate(&weighted, &active)?;

        let zone = resolve_zone(&window.timezone)?;

        let mut entries = IndexMap::with_capacity(placements.len());
        for placement in placements {
            let day = active.days()[placement.day_index];
            let timestamp = resolve_timestamp(
                day,
                placement.seconds_into_day,
                window.daily_start,
                &zone,
            )?;
            entries.insert(placement.item_id, timestamp);
        }

        Ok(Schedule { entries })
    }

    /// Order items oldest first and attach their weights.
    fn weigh<W>(&self, items: &[Item], weights: &W) -> Result<Vec<WeightedItem>, ScheduleError>
    where
        W: WeightProvider + ?Sized,
    {
        if items.is_empty() {
            return Err(ScheduleError::EmptyItems);
        }

        let mut seen = HashSet::with_capacity(items.len());
        for item in items {
            if !seen.insert(item.id.as_str()) {
                return Err(ScheduleError::DuplicateItem(item.id.clone()));
            }
        }

        let mut ordered: Vec<&Item> = items.iter().collect();
        ordered.sort_by_key(|item| item.sequence);

        ordered
            .into_iter()
            .map(|item| {
                let weight = match weights.weight_of(&item.id) {
                    Some(weight) => weight,
                    None => match self.options.missing_weight {
                        MissingWeightPolicy::MinimumPositive => MINIMUM_WEIGHT,
                        MissingWeightPolicy::Error => {
                            return Err(ScheduleError::MissingWeight(item.id.clone()))
                        }
                    },
                };
                Ok(WeightedItem::new(item.id.clone(), weight))
            })
            .collect()
    }
}
