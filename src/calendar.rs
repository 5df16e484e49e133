use crate::constants::HOURS_EPSILON;
use crate::entry::ScheduleEntry;
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;

/// Running tally of study hours committed per day.
///
/// Lives for one scheduling or rebalancing call and is then discarded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyUsage {
    hours: HashMap<NaiveDate, f64>,
}

impl DailyUsage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the tally from existing sessions
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a ScheduleEntry>,
    {
        let mut usage = Self::new();
        for entry in entries {
            usage.add(entry.date, entry.hours);
        }
        usage
    }

    /// Hours already committed on a day
    pub fn used(&self, date: NaiveDate) -> f64 {
        self.hours.get(&date).copied().unwrap_or(0.0)
    }

    /// Spare capacity left on a day under the given budget, never negative
    pub fn available(&self, date: NaiveDate, budget: f64) -> f64 {
        (budget - self.used(date)).max(0.0)
    }

    /// Check whether a session of `hours` still fits on a day
    pub fn fits(&self, date: NaiveDate, hours: f64, budget: f64) -> bool {
        self.used(date) + hours <= budget + HOURS_EPSILON
    }

    pub fn add(&mut self, date: NaiveDate, hours: f64) {
        *self.hours.entry(date).or_insert(0.0) += hours;
    }

    /// Days that carry any committed hours, sorted
    pub fn days(&self) -> Vec<NaiveDate> {
        let mut days: Vec<NaiveDate> = self.hours.keys().copied().collect();
        days.sort();
        days
    }

    /// Days whose tally exceeds the budget, sorted
    pub fn overloaded_days(&self, budget: f64) -> Vec<NaiveDate> {
        self.days()
            .into_iter()
            .filter(|day| self.used(*day) > budget + HOURS_EPSILON)
            .collect()
    }
}

/// Consecutive days starting at `start`, inclusive, `count` of them.
/// Stops early at the end of the representable date range.
pub fn days_from(start: NaiveDate, count: u32) -> impl Iterator<Item = NaiveDate> {
    (0..i64::from(count))
        .map_while(move |offset| start.checked_add_signed(Duration::days(offset)))
}

/// Days from `start` up to but excluding `end`. Empty when `end` is not after `start`.
pub fn days_before(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let span = (end - start).num_days().max(0);
    (0..span).map(move |offset| start + Duration::days(offset))
}
