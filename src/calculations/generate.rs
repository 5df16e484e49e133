use crate::calendar::{DailyUsage, days_before};
use crate::constants::{HOURS_EPSILON, SESSION_CAP_HOURS, floor_hours, round_hours};
use crate::entry::ScheduleEntry;
use crate::ids::IdGenerator;
use crate::subject::{Subject, Topic};
use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Hours of a topic that did not fit before its exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnallocatedTopic {
    pub subject_id: String,
    pub topic_id: String,
    pub topic_name: String,
    pub unallocated_hours: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOutcome {
    pub entries: Vec<ScheduleEntry>,
    pub unallocated: Vec<UnallocatedTopic>,
}

impl GenerationOutcome {
    pub fn is_complete(&self) -> bool {
        self.unallocated.is_empty()
    }
}

struct PendingTopic<'a> {
    subject: &'a Subject,
    topic: &'a Topic,
}

/// Greedy earliest-deadline-first packing of topic hours into days.
///
/// Topics are visited in exam order. Each one fills the earliest days that
/// still have room under the daily budget, one session of at most
/// [`SESSION_CAP_HOURS`] per day, stopping the day before its exam.
pub struct ScheduleGenerator<'a> {
    subjects: &'a [Subject],
    daily_hour_budget: f64,
}

impl<'a> ScheduleGenerator<'a> {
    pub fn new(subjects: &'a [Subject], daily_hour_budget: f64) -> Self {
        Self {
            subjects,
            daily_hour_budget,
        }
    }

    pub fn execute(&self, today: NaiveDate, ids: &mut dyn IdGenerator) -> GenerationOutcome {
        let budget = super::effective_budget(self.daily_hour_budget);
        let pending = self.pending_topics();
        debug!(
            "generating schedule for {} topics from {today} with budget {budget}h",
            pending.len()
        );

        let mut usage = DailyUsage::new();
        let mut outcome = GenerationOutcome::default();

        for PendingTopic { subject, topic } in pending {
            // Sessions are stored at tenth-of-an-hour precision, so plan in tenths too.
            let needed = if topic.hours_needed.is_finite() {
                round_hours(topic.hours_needed)
            } else {
                0.0
            };
            if needed <= HOURS_EPSILON {
                debug!("skipping topic {} with no hours to plan", topic.id);
                continue;
            }

            let mut remaining = needed;
            for day in days_before(today, subject.exam_date) {
                if remaining <= HOURS_EPSILON {
                    break;
                }
                let available = usage.available(day, budget);
                if available <= HOURS_EPSILON {
                    continue;
                }
                let allocated = floor_hours(remaining.min(available).min(SESSION_CAP_HOURS));
                if allocated <= HOURS_EPSILON {
                    continue;
                }
                outcome.entries.push(ScheduleEntry {
                    id: ids.next_id(),
                    subject_id: subject.id.clone(),
                    subject_name: subject.name.clone(),
                    topic_id: topic.id.clone(),
                    topic_name: topic.name.clone(),
                    date: day,
                    hours: allocated,
                    completed: false,
                    color: subject.color.clone(),
                });
                usage.add(day, allocated);
                remaining -= allocated;
            }

            if remaining > HOURS_EPSILON {
                warn!(
                    "topic '{}' of subject '{}' has {:.1}h left that do not fit before {}",
                    topic.name, subject.name, remaining, subject.exam_date
                );
                outcome.unallocated.push(UnallocatedTopic {
                    subject_id: subject.id.clone(),
                    topic_id: topic.id.clone(),
                    topic_name: topic.name.clone(),
                    unallocated_hours: round_hours(remaining),
                });
            }
        }

        debug!(
            "generated {} sessions, {} topics short",
            outcome.entries.len(),
            outcome.unallocated.len()
        );
        outcome
    }

    fn pending_topics(&self) -> Vec<PendingTopic<'a>> {
        let mut pending: Vec<PendingTopic<'a>> = self
            .subjects
            .iter()
            .flat_map(|subject| {
                subject
                    .topics
                    .iter()
                    .map(move |topic| PendingTopic { subject, topic })
            })
            .collect();
        // Stable: topics sharing an exam date keep registry order.
        pending.sort_by_key(|item| item.subject.exam_date);
        pending
    }
}

/// Builds a fresh schedule for every topic in `subjects`, replacing nothing in place.
pub fn generate_schedule(
    subjects: &[Subject],
    daily_hour_budget: f64,
    today: NaiveDate,
    ids: &mut dyn IdGenerator,
) -> GenerationOutcome {
    ScheduleGenerator::new(subjects, daily_hour_budget).execute(today, ids)
}
