use crate::calendar::{DailyUsage, days_from};
use crate::constants::REBALANCE_HORIZON_DAYS;
use crate::entry::ScheduleEntry;
use crate::ids::IdGenerator;
use chrono::NaiveDate;
use log::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RebalanceOutcome {
    /// Kept sessions in their original order, followed by the moved ones.
    pub schedule: Vec<ScheduleEntry>,
    pub rescheduled: usize,
    /// Missed sessions that found no free day within the horizon.
    pub dropped: Vec<ScheduleEntry>,
}

/// Moves incomplete past sessions forward into days with spare capacity.
///
/// Every missed session restarts its search at `today`, so earlier sessions
/// in the input get the first free slots. Exam dates are not consulted.
pub struct Rebalancer<'a> {
    schedule: &'a [ScheduleEntry],
    daily_hour_budget: f64,
}

impl<'a> Rebalancer<'a> {
    pub fn new(schedule: &'a [ScheduleEntry], daily_hour_budget: f64) -> Self {
        Self {
            schedule,
            daily_hour_budget,
        }
    }

    pub fn execute(&self, today: NaiveDate, ids: &mut dyn IdGenerator) -> RebalanceOutcome {
        let (missed, kept): (Vec<&ScheduleEntry>, Vec<&ScheduleEntry>) = self
            .schedule
            .iter()
            .partition(|entry| entry.is_missed(today));

        if missed.is_empty() {
            debug!("no missed sessions before {today}");
            return RebalanceOutcome {
                schedule: self.schedule.to_vec(),
                rescheduled: 0,
                dropped: Vec::new(),
            };
        }

        let budget = super::effective_budget(self.daily_hour_budget);
        let mut usage = DailyUsage::from_entries(kept.iter().copied());
        let mut moved = Vec::with_capacity(missed.len());
        let mut dropped = Vec::new();

        for entry in missed {
            let slot = days_from(today, REBALANCE_HORIZON_DAYS)
                .find(|day| usage.fits(*day, entry.hours, budget));
            match slot {
                Some(day) => {
                    usage.add(day, entry.hours);
                    moved.push(entry.moved_to(ids.next_id(), day));
                }
                None => {
                    warn!(
                        "no free slot within {REBALANCE_HORIZON_DAYS} days for session '{}' ({}h, was {})",
                        entry.topic_name, entry.hours, entry.date
                    );
                    dropped.push(entry.clone());
                }
            }
        }

        debug!(
            "rebalanced {} missed sessions, {} dropped",
            moved.len(),
            dropped.len()
        );

        let rescheduled = moved.len();
        let mut schedule: Vec<ScheduleEntry> = kept.into_iter().cloned().collect();
        schedule.extend(moved);
        RebalanceOutcome {
            schedule,
            rescheduled,
            dropped,
        }
    }
}

pub fn reschedule_missed(
    schedule: &[ScheduleEntry],
    daily_hour_budget: f64,
    today: NaiveDate,
    ids: &mut dyn IdGenerator,
) -> RebalanceOutcome {
    Rebalancer::new(schedule, daily_hour_budget).execute(today, ids)
}
