//! Cumulative-weight timeline allocation.
//!
//! Active days are concatenated into one continuous offset axis of
//! `days * day_duration` seconds. Each item is placed at the fraction of
//! that axis equal to the share of total weight consumed by the items
//! before it, so the heaviest items leave the widest gap behind them and
//! the original order is never changed.

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::window::ActiveWindow;

/// An item identifier paired with its weight, in oldest-first order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedItem {
    pub id: String,
    pub weight: f64,
}

impl WeightedItem {
    pub fn new(id: impl Into<String>, weight: f64) -> Self {
        Self {
            id: id.into(),
            weight,
        }
    }
}

/// Where an item landed on the timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub item_id: String,
    /// Index into the active days.
    pub day_index: usize,
    /// Whole seconds after the daily window start.
    pub seconds_into_day: u32,
    /// Whole seconds from the start of the concatenated timeline.
    pub offset_secs: u64,
}

/// How to treat items whose whole-second placements coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Keep coinciding placements; order stays non-decreasing.
    #[default]
    None,
    /// Move a colliding item one second after its predecessor, up to the
    /// last second of the timeline.
    StrictSeconds,
}

/// Maps ordered weighted items onto an [`ActiveWindow`].
#[derive(Debug, Clone, Default)]
pub struct TimelineAllocator {
    tie_break: TieBreak,
}

impl TimelineAllocator {
    /// Create an allocator that keeps ties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tie-break policy
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Place every item, oldest first.
    ///
    /// # Errors
    /// - [`ScheduleError::EmptyItems`] if `items` is empty
    /// - [`ScheduleError::NegativeWeight`] for a negative or non-finite weight
    /// - [`ScheduleError::DegenerateWeights`] if all weights are zero
    pub fn allocate(
        &self,
        items: &[WeightedItem],
        window: &ActiveWindow,
    ) -> Result<Vec<Placement>, ScheduleError> {
        if items.is_empty() {
            return Err(ScheduleError::EmptyItems);
        }
        if let Some(bad) = items.iter().find(|i| !i.weight.is_finite() || i.weight < 0.0) {
            return Err(ScheduleError::NegativeWeight {
                id: bad.id.clone(),
                weight: bad.weight,
            });
        }

        let total_weight: f64 = items.iter().map(|i| i.weight).sum();
        if total_weight <= 0.0 || !total_weight.is_finite() {
            return Err(ScheduleError::DegenerateWeights);
        }

        let day_duration = u64::from(window.day_duration());
        let total_duration = window.total_duration();
        let last_second = total_duration - 1;

        let mut placements = Vec::with_capacity(items.len());
        let mut cumulative_weight = 0.0_f64;
        let mut previous: Option<u64> = None;

        for item in items {
            let target = (cumulative_weight / total_weight) * total_duration as f64;
            // Only the trailing items can reach the end of the axis.
            let mut offset = (target.floor() as u64).min(last_second);

            if self.tie_break == TieBreak::StrictSeconds {
                if let Some(prev) = previous {
                    if offset <= prev {
                        offset = (prev + 1).min(last_second);
                    }
                }
            }

            placements.push(Placement {
                item_id: item.id.clone(),
                day_index: (offset / day_duration) as usize,
                seconds_into_day: (offset % day_duration) as u32,
                offset_secs: offset,
            });

            previous = Some(offset);
            cumulative_weight += item.weight;
        }

        Ok(placements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::{resolve_window, ClockTime};
    use chrono::NaiveDate;

    fn two_day_window() -> ActiveWindow {
        resolve_window(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            ClockTime::parse("09:00").unwrap(),
            ClockTime::parse("17:00").unwrap(),
            true,
        )
        .unwrap()
    }

    fn items(weights: &[f64]) -> Vec<WeightedItem> {
        weights
            .iter()
            .enumerate()
            .map(|(i, w)| WeightedItem::new(format!("c{i}"), *w))
            .collect()
    }

    #[test]
    fn test_worked_example() {
        let window = two_day_window();
        let placements = TimelineAllocator::new()
            .allocate(&items(&[1.0, 1.0, 2.0]), &window)
            .unwrap();

        let got: Vec<_> = placements
            .iter()
            .map(|p| (p.day_index, p.seconds_into_day))
            .collect();
        assert_eq!(got, vec![(0, 0), (0, 14_400), (1, 0)]);
        assert_eq!(placements[2].offset_secs, 28_800);
    }

    #[test]
    fn test_first_item_starts_at_zero() {
        let window = two_day_window();
        let placements = TimelineAllocator::new()
            .allocate(&items(&[500.0, 1.0]), &window)
            .unwrap();
        assert_eq!(placements[0].offset_secs, 0);
        assert!(placements[1].offset_secs > 57_000);
    }

    #[test]
    fn test_trailing_zero_weight_is_clamped() {
        let window = two_day_window();
        let placements = TimelineAllocator::new()
            .allocate(&items(&[1.0, 0.0]), &window)
            .unwrap();
        let last = &placements[1];
        assert_eq!(last.day_index, 1);
        assert_eq!(last.seconds_into_day, 28_799);
    }

    #[test]
    fn test_zero_weights_tie_by_default() {
        let window = two_day_window();
        let placements = TimelineAllocator::new()
            .allocate(&items(&[0.0, 0.0, 1.0]), &window)
            .unwrap();
        assert_eq!(placements[0].offset_secs, 0);
        assert_eq!(placements[1].offset_secs, 0);
        assert_eq!(placements[2].offset_secs, 0);
    }

    #[test]
    fn test_strict_seconds_breaks_ties() {
        let window = two_day_window();
        let placements = TimelineAllocator::new()
            .with_tie_break(TieBreak::StrictSeconds)
            .allocate(&items(&[0.0, 0.0, 1.0]), &window)
            .unwrap();
        let offsets: Vec<_> = placements.iter().map(|p| p.offset_secs).collect();
        assert_eq!(offsets, vec![0, 1, 2]);
    }

    #[test]
    fn test_strict_seconds_saturates_at_end() {
        let window = two_day_window();
        let placements = TimelineAllocator::new()
            .with_tie_break(TieBreak::StrictSeconds)
            .allocate(&items(&[1.0, 0.0, 0.0]), &window)
            .unwrap();
        assert_eq!(placements[1].offset_secs, 57_599);
        assert_eq!(placements[2].offset_secs, 57_599);
        assert_eq!(placements[2].day_index, 1);
    }

    #[test]
    fn test_rejects_empty_items() {
        let window = two_day_window();
        let err = TimelineAllocator::new().allocate(&[], &window).unwrap_err();
        assert_eq!(err, ScheduleError::EmptyItems);
    }

    #[test]
    fn test_rejects_all_zero_weights() {
        let window = two_day_window();
        let err = TimelineAllocator::new()
            .allocate(&items(&[0.0, 0.0]), &window)
            .unwrap_err();
        assert_eq!(err, ScheduleError::DegenerateWeights);
    }

    #[test]
    fn test_rejects_negative_and_nan_weights() {
        let window = two_day_window();
        let err = TimelineAllocator::new()
            .allocate(&items(&[1.0, -2.0]), &window)
            .unwrap_err();
        assert!(matches!(err, ScheduleError::NegativeWeight { ref id, .. } if id == "c1"));

        let err = TimelineAllocator::new()
            .allocate(&items(&[f64::NAN]), &window)
            .unwrap_err();
        assert!(matches!(err, ScheduleError::NegativeWeight { .. }));
    }
}
