//! Study streaks from logged activity dates.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakSummary {
    /// Consecutive days ending today, or yesterday if nothing is logged today yet.
    pub current: u32,
    pub longest: u32,
    pub last_activity: Option<NaiveDate>,
}

impl StreakSummary {
    /// Dates may repeat and come in any order. Dates after `today` are ignored.
    pub fn from_dates<I>(dates: I, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let days: BTreeSet<NaiveDate> = dates.into_iter().filter(|d| *d <= today).collect();
        let Some(&last) = days.last() else {
            return Self::default();
        };

        let mut longest = 0;
        let mut run = 0;
        let mut previous: Option<NaiveDate> = None;
        for &day in &days {
            run = match previous {
                Some(p) if day - p == Duration::days(1) => run + 1,
                _ => 1,
            };
            longest = longest.max(run);
            previous = Some(day);
        }

        // `run` is the streak ending at `last`.
        let current = if today - last <= Duration::days(1) { run } else { 0 };

        Self {
            current,
            longest,
            last_activity: Some(last),
        }
    }
}
