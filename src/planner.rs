use crate::calculations::{Rebalancer, ScheduleGenerator, UnallocatedTopic};
use crate::calendar::{DailyUsage, days_from};
use crate::clock::{Clock, SystemClock};
use crate::constants::{DEFAULT_DAILY_HOURS, HOURS_EPSILON, round_hours};
use crate::entry::ScheduleEntry;
use crate::error::{PlannerError, PlannerResult};
use crate::ids::{IdGenerator, UuidGenerator};
use crate::registry::SubjectRegistry;
use crate::subject::{Subject, Topic};
use crate::validation::{self, ValidationError};
use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};

/// Everything the planner persists, under the three storage keys
/// `subjects`, `schedule` and `dailyHourBudget`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlannerState {
    pub subjects: Vec<Subject>,
    pub schedule: Vec<ScheduleEntry>,
    pub daily_hour_budget: f64,
}

impl Default for PlannerState {
    fn default() -> Self {
        Self {
            subjects: Vec::new(),
            schedule: Vec::new(),
            daily_hour_budget: DEFAULT_DAILY_HOURS,
        }
    }
}

impl PlannerState {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_daily_budget(self.daily_hour_budget)?;
        validation::validate_collections(&self.subjects, &self.schedule)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    pub sessions: usize,
    pub planned_hours: f64,
    pub unallocated: Vec<UnallocatedTopic>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceReport {
    pub missed: usize,
    pub rescheduled: usize,
    pub dropped: Vec<ScheduleEntry>,
}

/// One column of the day-by-day timetable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableDay {
    pub date: NaiveDate,
    pub entries: Vec<ScheduleEntry>,
    pub total_hours: f64,
    pub overloaded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerSummary {
    pub subject_count: usize,
    pub topic_count: usize,
    pub session_count: usize,
    pub completed_count: usize,
    pub missed_count: usize,
    pub planned_hours: f64,
    pub completed_hours: f64,
}

impl PlannerSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("subjects={}", self.subject_count));
        parts.push(format!("topics={}", self.topic_count));
        parts.push(format!("sessions={}", self.session_count));
        if self.session_count > 0 {
            parts.push(format!(
                "done={}/{}",
                self.completed_count, self.session_count
            ));
            parts.push(format!(
                "hours={}/{}",
                round_hours(self.completed_hours),
                round_hours(self.planned_hours)
            ));
        }
        if self.missed_count > 0 {
            parts.push(format!("missed={}", self.missed_count));
        }
        parts.join(", ")
    }
}

/// The study planner: subjects, the generated schedule and the daily budget,
/// together with the clock and id source every action runs against.
pub struct StudyPlanner {
    registry: SubjectRegistry,
    schedule: Vec<ScheduleEntry>,
    daily_hour_budget: f64,
    clock: Box<dyn Clock + Send + Sync>,
    ids: Box<dyn IdGenerator + Send + Sync>,
}

impl Default for StudyPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl StudyPlanner {
    pub fn new() -> Self {
        Self::with_collaborators(SystemClock, UuidGenerator)
    }

    pub fn with_collaborators<C, G>(clock: C, ids: G) -> Self
    where
        C: Clock + Send + Sync + 'static,
        G: IdGenerator + Send + Sync + 'static,
    {
        Self {
            registry: SubjectRegistry::new(),
            schedule: Vec::new(),
            daily_hour_budget: DEFAULT_DAILY_HOURS,
            clock: Box::new(clock),
            ids: Box::new(ids),
        }
    }

    /// Builds a planner from stored state after validating it.
    pub fn from_state<C, G>(state: PlannerState, clock: C, ids: G) -> Result<Self, ValidationError>
    where
        C: Clock + Send + Sync + 'static,
        G: IdGenerator + Send + Sync + 'static,
    {
        let mut planner = Self::with_collaborators(clock, ids);
        planner.restore(state)?;
        Ok(planner)
    }

    /// Replaces subjects, schedule and budget wholesale.
    pub fn restore(&mut self, state: PlannerState) -> Result<(), ValidationError> {
        state.validate()?;
        self.registry = SubjectRegistry::from_subjects(state.subjects);
        self.schedule = state.schedule;
        self.daily_hour_budget = state.daily_hour_budget;
        Ok(())
    }

    pub fn state(&self) -> PlannerState {
        PlannerState {
            subjects: self.registry.subjects().to_vec(),
            schedule: self.schedule.clone(),
            daily_hour_budget: self.daily_hour_budget,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn subjects(&self) -> &[Subject] {
        self.registry.subjects()
    }

    pub fn registry(&self) -> &SubjectRegistry {
        &self.registry
    }

    pub fn schedule(&self) -> &[ScheduleEntry] {
        &self.schedule
    }

    pub fn daily_hour_budget(&self) -> f64 {
        self.daily_hour_budget
    }

    pub fn find_subject(&self, subject_id: &str) -> Option<&Subject> {
        self.registry.find(subject_id)
    }

    pub fn find_entry(&self, entry_id: &str) -> Option<&ScheduleEntry> {
        self.schedule.iter().find(|entry| entry.id == entry_id)
    }

    fn find_entry_mut(&mut self, entry_id: &str) -> PlannerResult<&mut ScheduleEntry> {
        self.schedule
            .iter_mut()
            .find(|entry| entry.id == entry_id)
            .ok_or_else(|| PlannerError::not_found("session", entry_id))
    }

    pub fn set_daily_hour_budget(&mut self, hours: f64) -> PlannerResult<()> {
        validation::validate_daily_budget(hours)
            .map_err(|err| PlannerError::invalid("daily hour budget", err.to_string()))?;
        info!("daily hour budget set to {hours}h");
        self.daily_hour_budget = hours;
        Ok(())
    }

    pub fn add_subject(&mut self, name: &str, exam_date: NaiveDate) -> PlannerResult<&Subject> {
        let today = self.clock.today();
        self.registry
            .add_subject(name, exam_date, today, self.ids.as_mut())
    }

    /// Removes a subject together with every session planned for it.
    pub fn remove_subject(&mut self, subject_id: &str) -> PlannerResult<Subject> {
        let removed = self.registry.remove_subject(subject_id)?;
        self.schedule.retain(|entry| entry.subject_id != subject_id);
        Ok(removed)
    }

    pub fn add_topic(
        &mut self,
        subject_id: &str,
        name: &str,
        hours_needed: f64,
    ) -> PlannerResult<&Topic> {
        self.registry
            .add_topic(subject_id, name, hours_needed, self.ids.as_mut())
    }

    /// Removes a topic together with every session planned for it.
    pub fn remove_topic(&mut self, subject_id: &str, topic_id: &str) -> PlannerResult<Topic> {
        let removed = self.registry.remove_topic(subject_id, topic_id)?;
        self.schedule.retain(|entry| entry.topic_id != topic_id);
        Ok(removed)
    }

    /// Regenerates the whole schedule from the registry.
    ///
    /// Fails without touching the current schedule when no subject has topics.
    pub fn generate(&mut self) -> PlannerResult<GenerationReport> {
        if !self.registry.has_topics() {
            return Err(PlannerError::invalid(
                "subjects",
                "add subjects and topics before generating a plan",
            ));
        }
        let today = self.clock.today();
        let outcome = ScheduleGenerator::new(self.registry.subjects(), self.daily_hour_budget)
            .execute(today, self.ids.as_mut());

        let planned_hours: f64 = outcome.entries.iter().map(|entry| entry.hours).sum();
        info!(
            "generated {} study sessions ({}h)",
            outcome.entries.len(),
            round_hours(planned_hours)
        );
        self.schedule = outcome.entries;
        Ok(GenerationReport {
            sessions: self.schedule.len(),
            planned_hours,
            unallocated: outcome.unallocated,
        })
    }

    /// Moves every missed session forward into days with room.
    pub fn reschedule_missed(&mut self) -> RebalanceReport {
        let today = self.clock.today();
        let missed = self.missed_count();
        if missed == 0 {
            return RebalanceReport {
                missed: 0,
                rescheduled: 0,
                dropped: Vec::new(),
            };
        }
        let outcome = Rebalancer::new(&self.schedule, self.daily_hour_budget)
            .execute(today, self.ids.as_mut());
        info!(
            "rescheduled {} of {} missed sessions",
            outcome.rescheduled, missed
        );
        self.schedule = outcome.schedule;
        RebalanceReport {
            missed,
            rescheduled: outcome.rescheduled,
            dropped: outcome.dropped,
        }
    }

    /// Flips a session's completion flag and returns the new value.
    pub fn toggle_completed(&mut self, entry_id: &str) -> PlannerResult<bool> {
        let entry = self.find_entry_mut(entry_id)?;
        entry.completed = !entry.completed;
        Ok(entry.completed)
    }

    /// Puts a session on another day. Capacity is not checked, see [`Self::is_overloaded`].
    pub fn move_entry(&mut self, entry_id: &str, date: NaiveDate) -> PlannerResult<&ScheduleEntry> {
        let entry = self.find_entry_mut(entry_id)?;
        info!("moved session {} from {} to {date}", entry.id, entry.date);
        entry.date = date;
        Ok(entry)
    }

    pub fn missed_count(&self) -> usize {
        let today = self.clock.today();
        self.schedule
            .iter()
            .filter(|entry| entry.is_missed(today))
            .count()
    }

    pub fn day_load(&self, date: NaiveDate) -> f64 {
        self.schedule
            .iter()
            .filter(|entry| entry.date == date)
            .map(|entry| entry.hours)
            .sum()
    }

    pub fn is_overloaded(&self, date: NaiveDate) -> bool {
        self.day_load(date) > self.daily_hour_budget + HOURS_EPSILON
    }

    /// Days currently over budget, sorted.
    pub fn overloaded_days(&self) -> Vec<NaiveDate> {
        DailyUsage::from_entries(&self.schedule).overloaded_days(self.daily_hour_budget)
    }

    /// `days` consecutive days from today with their sessions.
    pub fn timetable(&self, days: u32) -> Vec<TimetableDay> {
        days_from(self.clock.today(), days)
            .map(|date| {
                let entries: Vec<ScheduleEntry> = self
                    .schedule
                    .iter()
                    .filter(|entry| entry.date == date)
                    .cloned()
                    .collect();
                let total_hours: f64 = entries.iter().map(|entry| entry.hours).sum();
                TimetableDay {
                    date,
                    entries,
                    total_hours,
                    overloaded: total_hours > self.daily_hour_budget + HOURS_EPSILON,
                }
            })
            .collect()
    }

    pub fn summary(&self) -> PlannerSummary {
        let completed: Vec<&ScheduleEntry> =
            self.schedule.iter().filter(|entry| entry.completed).collect();
        PlannerSummary {
            subject_count: self.registry.len(),
            topic_count: self.registry.topic_count(),
            session_count: self.schedule.len(),
            completed_count: completed.len(),
            missed_count: self.missed_count(),
            planned_hours: self.schedule.iter().map(|entry| entry.hours).sum(),
            completed_hours: completed.iter().map(|entry| entry.hours).sum(),
        }
    }
}
