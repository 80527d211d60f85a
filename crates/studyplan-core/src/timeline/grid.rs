//! Single-day time grid with greedy left-packing placement.
//!
//! Times are minutes since midnight. Placed intervals never overlap and
//! always lie inside the day window.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Half-open interval `[start, end)` in minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Interval {
    pub start: u32,
    pub end: u32,
}

impl Interval {
    /// Returns `None` unless `start < end`.
    pub fn new(start: u32, end: u32) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn duration_minutes(&self) -> u32 {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn can_fit(&self, minutes: u32) -> bool {
        self.duration_minutes() >= minutes
    }
}

/// No free run of the requested length exists before the end of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no {requested}-minute slot at or after minute {not_before} before minute {day_end}")]
pub struct OutOfSpace {
    pub requested: u32,
    pub not_before: u32,
    pub day_end: u32,
}

#[derive(Debug, Clone)]
pub struct TimeGrid {
    day_start: u32,
    day_end: u32,
    /// Sorted by start.
    placed: Vec<Interval>,
}

impl TimeGrid {
    pub fn new(day_start: u32, day_end: u32) -> Self {
        let mut grid = Self {
            day_start: 0,
            day_end: 0,
            placed: Vec::new(),
        };
        grid.reset(day_start, day_end);
        grid
    }

    /// Clear all placements and set a new window. An inverted window is empty.
    pub fn reset(&mut self, day_start: u32, day_end: u32) {
        self.day_start = day_start;
        self.day_end = day_end.max(day_start);
        self.placed.clear();
    }

    pub fn day_start(&self) -> u32 {
        self.day_start
    }

    pub fn day_end(&self) -> u32 {
        self.day_end
    }

    pub fn placed(&self) -> &[Interval] {
        &self.placed
    }

    /// End of the latest placement, or the day start on an empty grid.
    pub fn cursor(&self) -> u32 {
        self.placed
            .last()
            .map(|i| i.end)
            .unwrap_or(self.day_start)
    }

    /// Free runs inside the window, in time order.
    pub fn gaps(&self) -> Vec<Interval> {
        let mut gaps = Vec::new();
        let mut last_end = self.day_start;

        for interval in &self.placed {
            if let Some(gap) = Interval::new(last_end, interval.start) {
                gaps.push(gap);
            }
            last_end = last_end.max(interval.end);
        }
        if let Some(gap) = Interval::new(last_end, self.day_end) {
            gaps.push(gap);
        }

        gaps
    }

    /// Earliest free run starting at or after `not_before`, clipped to it.
    pub fn first_gap(&self, not_before: u32) -> Option<Interval> {
        self.gaps()
            .into_iter()
            .filter_map(|g| Interval::new(g.start.max(not_before), g.end))
            .next()
    }

    /// Place a block at the earliest start `>= not_before` that fits.
    ///
    /// # Errors
    /// `OutOfSpace` when no free run of `duration` minutes exists before the
    /// end of the day, or when `duration` is zero.
    pub fn place(&mut self, duration: u32, not_before: u32) -> Result<Interval, OutOfSpace> {
        let out_of_space = OutOfSpace {
            requested: duration,
            not_before,
            day_end: self.day_end,
        };
        if duration == 0 {
            return Err(out_of_space);
        }

        let slot = self
            .gaps()
            .into_iter()
            .filter_map(|g| Interval::new(g.start.max(not_before), g.end))
            .find(|g| g.can_fit(duration))
            .ok_or(out_of_space)?;

        let interval = Interval {
            start: slot.start,
            end: slot.start + duration,
        };
        let index = self.placed.partition_point(|p| p.start < interval.start);
        self.placed.insert(index, interval);
        Ok(interval)
    }

    /// Free minutes left anywhere in the window.
    pub fn remaining_minutes(&self) -> u32 {
        self.gaps().iter().map(Interval::duration_minutes).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn places_left_packed() {
        let mut grid = TimeGrid::new(480, 600);
        let a = grid.place(30, 480).unwrap();
        let b = grid.place(45, 0).unwrap();
        assert_eq!(a, Interval { start: 480, end: 510 });
        assert_eq!(b, Interval { start: 510, end: 555 });
        assert_eq!(grid.cursor(), 555);
        assert_eq!(grid.remaining_minutes(), 45);
    }

    #[test]
    fn respects_not_before() {
        let mut grid = TimeGrid::new(480, 600);
        let a = grid.place(20, 500).unwrap();
        assert_eq!(a.start, 500);
        // The hole before 500 still takes a block that fits it.
        let b = grid.place(20, 480).unwrap();
        assert_eq!(b, Interval { start: 480, end: 500 });
        assert_eq!(grid.placed(), &[b, a]);
    }

    #[test]
    fn skips_holes_that_are_too_small() {
        let mut grid = TimeGrid::new(0, 100);
        grid.place(10, 10).unwrap();
        let c = grid.place(15, 0).unwrap();
        assert_eq!(c.start, 20);
    }

    #[test]
    fn out_of_space_at_day_end() {
        let mut grid = TimeGrid::new(480, 540);
        grid.place(50, 480).unwrap();
        let err = grid.place(15, 480).unwrap_err();
        assert_eq!(err.requested, 15);
        assert_eq!(err.day_end, 540);
        assert_eq!(grid.first_gap(480), Interval::new(530, 540));
        assert!(grid.place(10, 480).is_ok());
        assert!(grid.first_gap(480).is_none());
        assert_eq!(grid.remaining_minutes(), 0);
    }

    #[test]
    fn zero_duration_is_rejected() {
        let mut grid = TimeGrid::new(0, 60);
        assert!(grid.place(0, 0).is_err());
    }

    #[test]
    fn reset_clears_placements() {
        let mut grid = TimeGrid::new(0, 60);
        grid.place(60, 0).unwrap();
        grid.reset(100, 160);
        assert!(grid.placed().is_empty());
        assert_eq!(grid.remaining_minutes(), 60);
        assert_eq!(grid.cursor(), 100);
    }

    #[test]
    fn interval_overlap() {
        let a = Interval::new(0, 10).unwrap();
        let b = Interval::new(10, 20).unwrap();
        let c = Interval::new(5, 15).unwrap();
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(Interval::new(5, 5).is_none());
    }
}
