use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use study_planner::{SequentialIds, Subject, Topic, generate_schedule};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn hours_by_day(entries: &[study_planner::ScheduleEntry]) -> HashMap<NaiveDate, f64> {
    let mut map = HashMap::new();
    for entry in entries {
        *map.entry(entry.date).or_insert(0.0) += entry.hours;
    }
    map
}

#[test]
fn five_hours_over_three_days_splits_two_two_one() {
    let today = d(2026, 5, 4);
    let math = Subject::new("s1", "Math", today + Duration::days(3), "red")
        .with_topic(Topic::new("t1", "Algebra", 5.0));

    let outcome = generate_schedule(&[math], 2.0, today, &mut SequentialIds::new("e"));

    let placed: Vec<(NaiveDate, f64)> = outcome.entries.iter().map(|e| (e.date, e.hours)).collect();
    assert_eq!(
        placed,
        vec![
            (today, 2.0),
            (today + Duration::days(1), 2.0),
            (today + Duration::days(2), 1.0),
        ]
    );
    assert!(outcome.is_complete());
    assert_eq!(outcome.entries[0].id, "e-1");
    assert_eq!(outcome.entries[0].subject_name, "Math");
    assert_eq!(outcome.entries[0].color, "red");
    assert!(outcome.entries.iter().all(|e| !e.completed));
}

#[test]
fn two_topics_share_the_only_day() {
    let today = d(2026, 5, 4);
    let physics = Subject::new("s1", "Physics", today + Duration::days(1), "blue")
        .with_topic(Topic::new("t1", "Optics", 2.0))
        .with_topic(Topic::new("t2", "Waves", 2.0));

    let outcome = generate_schedule(&[physics], 4.0, today, &mut SequentialIds::new("e"));

    assert_eq!(outcome.entries.len(), 2);
    assert!(outcome.entries.iter().all(|e| e.date == today));
    assert_eq!(outcome.entries[0].topic_name, "Optics");
    assert_eq!(outcome.entries[1].topic_name, "Waves");
    assert_eq!(hours_by_day(&outcome.entries)[&today], 4.0);
}

#[test]
fn hours_beyond_the_exam_window_are_reported_unallocated() {
    let today = d(2026, 5, 4);
    let chem = Subject::new("s1", "Chemistry", today + Duration::days(2), "green")
        .with_topic(Topic::new("t1", "Organic", 10.0));

    let outcome = generate_schedule(&[chem], 2.0, today, &mut SequentialIds::new("e"));

    let total: f64 = outcome.entries.iter().map(|e| e.hours).sum();
    assert_eq!(total, 4.0);
    assert_eq!(outcome.unallocated.len(), 1);
    assert_eq!(outcome.unallocated[0].topic_id, "t1");
    assert!((outcome.unallocated[0].unallocated_hours - 6.0).abs() < 1e-9);
}

#[test]
fn sessions_respect_deadline_cap_budget_and_hours() {
    let today = d(2026, 9, 1);
    let subjects = vec![
        Subject::new("bio", "Biology", d(2026, 9, 20), "a")
            .with_topic(Topic::new("b1", "Cells", 3.5))
            .with_topic(Topic::new("b2", "Genetics", 6.0)),
        Subject::new("his", "History", d(2026, 9, 8), "b")
            .with_topic(Topic::new("h1", "Rome", 4.3)),
        Subject::new("lit", "Literature", d(2026, 9, 15), "c")
            .with_topic(Topic::new("l1", "Poetry", 2.7))
            .with_topic(Topic::new("l2", "Novels", 5.0)),
    ];
    let budget = 3.0;

    let outcome = generate_schedule(&subjects, budget, today, &mut SequentialIds::new("e"));
    assert!(outcome.is_complete());

    let exam_of: HashMap<&str, NaiveDate> = subjects
        .iter()
        .map(|s| (s.id.as_str(), s.exam_date))
        .collect();
    for entry in &outcome.entries {
        assert!(entry.date < exam_of[entry.subject_id.as_str()]);
        assert!(entry.date >= today);
        assert!(entry.hours <= 2.0);
        assert!(entry.hours > 0.0);
    }
    for (_, hours) in hours_by_day(&outcome.entries) {
        assert!(hours <= budget + 1e-6, "day over budget: {hours}");
    }
    for subject in &subjects {
        for topic in &subject.topics {
            let planned: f64 = outcome
                .entries
                .iter()
                .filter(|e| e.topic_id == topic.id)
                .map(|e| e.hours)
                .sum();
            assert!(
                (planned - topic.hours_needed).abs() < 0.15,
                "{} planned {planned} of {}",
                topic.name,
                topic.hours_needed
            );
        }
    }
}

#[test]
fn earliest_exam_is_packed_first() {
    let today = d(2026, 9, 1);
    let later = Subject::new("late", "Art", d(2026, 9, 3), "a")
        .with_topic(Topic::new("a1", "Sketching", 2.0));
    let sooner = Subject::new("soon", "Music", d(2026, 9, 2), "b")
        .with_topic(Topic::new("m1", "Scales", 2.0));

    let outcome = generate_schedule(&[later, sooner], 2.0, today, &mut SequentialIds::new("e"));

    assert_eq!(outcome.entries[0].subject_id, "soon");
    assert_eq!(outcome.entries[0].date, today);
    assert_eq!(outcome.entries[1].subject_id, "late");
    assert_eq!(outcome.entries[1].date, d(2026, 9, 2));
}

#[test]
fn exam_today_or_earlier_schedules_nothing() {
    let today = d(2026, 9, 1);
    let due = Subject::new("s1", "Latin", today, "a").with_topic(Topic::new("t1", "Verbs", 3.0));

    let outcome = generate_schedule(&[due], 4.0, today, &mut SequentialIds::new("e"));

    assert!(outcome.entries.is_empty());
    assert_eq!(outcome.unallocated.len(), 1);
    assert_eq!(outcome.unallocated[0].unallocated_hours, 3.0);
}

#[test]
fn zero_budget_schedules_nothing() {
    let today = d(2026, 9, 1);
    let s = Subject::new("s1", "Latin", d(2026, 9, 10), "a")
        .with_topic(Topic::new("t1", "Verbs", 3.0));

    let outcome = generate_schedule(&[s], 0.0, today, &mut SequentialIds::new("e"));

    assert!(outcome.entries.is_empty());
    assert!(!outcome.is_complete());
}

#[test]
fn fractional_topics_keep_stored_days_within_budget() {
    let today = d(2026, 9, 1);
    let subjects = vec![
        Subject::new("s1", "Physics", d(2026, 9, 4), "a")
            .with_topic(Topic::new("p1", "Optics", 0.25))
            .with_topic(Topic::new("p2", "Waves", 1.35))
            .with_topic(Topic::new("p3", "Heat", 2.04)),
        Subject::new("s2", "Latin", d(2026, 9, 6), "b")
            .with_topic(Topic::new("l1", "Verbs", 0.75))
            .with_topic(Topic::new("l2", "Nouns", 3.33)),
    ];
    let budget = 1.25;

    let outcome = generate_schedule(&subjects, budget, today, &mut SequentialIds::new("e"));

    assert!(outcome.entries.iter().all(|e| e.hours > 0.0));
    for entry in &outcome.entries {
        assert_eq!(entry.hours, (entry.hours * 10.0).round() / 10.0);
    }
    for (day, hours) in hours_by_day(&outcome.entries) {
        assert!(hours <= budget + 1e-6, "{day} stored {hours}h over budget");
    }
}
