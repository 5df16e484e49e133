use crate::calendar::{DailyUsage, days_from};
use crate::constants::HOURS_EPSILON;
use crate::entry::ScheduleEntry;
use crate::subject::Subject;
use chrono::NaiveDate;
use polars::prelude::PlSmallStr;
use polars::prelude::*;

/// Per-day load over a window: `date, sessions, hours, budget, overloaded`.
pub fn daily_load_frame(
    schedule: &[ScheduleEntry],
    daily_hour_budget: f64,
    start: NaiveDate,
    days: u32,
) -> PolarsResult<DataFrame> {
    let usage = DailyUsage::from_entries(schedule);
    let dates: Vec<NaiveDate> = days_from(start, days).collect();

    let mut sessions: Vec<u32> = Vec::with_capacity(dates.len());
    let mut hours: Vec<f64> = Vec::with_capacity(dates.len());
    let mut overloaded: Vec<bool> = Vec::with_capacity(dates.len());
    for date in &dates {
        let count = schedule.iter().filter(|entry| entry.date == *date).count();
        let used = usage.used(*date);
        sessions.push(u32::try_from(count).unwrap_or(u32::MAX));
        hours.push(used);
        overloaded.push(used > daily_hour_budget + HOURS_EPSILON);
    }
    let budget = vec![daily_hour_budget; dates.len()];

    let columns: Vec<Column> = vec![
        date_series("date", &dates)?.into_column(),
        Series::new(PlSmallStr::from_static("sessions"), sessions).into_column(),
        Series::new(PlSmallStr::from_static("hours"), hours).into_column(),
        Series::new(PlSmallStr::from_static("budget"), budget).into_column(),
        Series::new(PlSmallStr::from_static("overloaded"), overloaded).into_column(),
    ];
    DataFrame::new(columns)
}

/// One row per subject with its deadline and how much of it is planned and done.
pub fn subject_progress_frame(
    subjects: &[Subject],
    schedule: &[ScheduleEntry],
    today: NaiveDate,
) -> PolarsResult<DataFrame> {
    let names: Vec<&str> = subjects.iter().map(|s| s.name.as_str()).collect();
    let exam_dates: Vec<NaiveDate> = subjects.iter().map(|s| s.exam_date).collect();
    let days_left: Vec<i64> = subjects.iter().map(|s| s.days_until_exam(today)).collect();
    let topics: Vec<u32> = subjects
        .iter()
        .map(|s| u32::try_from(s.topics.len()).unwrap_or(u32::MAX))
        .collect();
    let needed: Vec<f64> = subjects.iter().map(Subject::total_hours_needed).collect();

    let mut scheduled = Vec::with_capacity(subjects.len());
    let mut completed = Vec::with_capacity(subjects.len());
    for subject in subjects {
        let own = schedule.iter().filter(|entry| entry.subject_id == subject.id);
        let (planned, done) = own.fold((0.0_f64, 0.0_f64), |(planned, done), entry| {
            let done = if entry.completed { done + entry.hours } else { done };
            (planned + entry.hours, done)
        });
        scheduled.push(planned);
        completed.push(done);
    }

    let columns: Vec<Column> = vec![
        Series::new(PlSmallStr::from_static("subject"), names).into_column(),
        date_series("exam_date", &exam_dates)?.into_column(),
        Series::new(PlSmallStr::from_static("days_until_exam"), days_left).into_column(),
        Series::new(PlSmallStr::from_static("topics"), topics).into_column(),
        Series::new(PlSmallStr::from_static("hours_needed"), needed).into_column(),
        Series::new(PlSmallStr::from_static("hours_scheduled"), scheduled).into_column(),
        Series::new(PlSmallStr::from_static("hours_completed"), completed).into_column(),
    ];
    DataFrame::new(columns)
}

fn date_series(name: &'static str, dates: &[NaiveDate]) -> PolarsResult<Series> {
    let days = dates
        .iter()
        .map(|date| date_to_i32(*date))
        .collect::<PolarsResult<Vec<i32>>>()?;
    Series::new(PlSmallStr::from_static(name), days).cast(&DataType::Date)
}

fn date_to_i32(date: NaiveDate) -> PolarsResult<i32> {
    // NaiveDate::default() is the Unix epoch, which polars dates count from.
    let days = (date - NaiveDate::default()).num_days();
    i32::try_from(days)
        .map_err(|_| PolarsError::ComputeError(format!("date {date} out of range").into()))
}
