use std::io::{self, Write};

use chrono::NaiveDate;
use polars::prelude::{AnyValue, DataFrame};
use study_planner::constants::{DEFAULT_TOPIC_HOURS, TIMETABLE_DAYS, round_hours};
use study_planner::logging::init_logging;
use study_planner::{
    PlannerConfig, ScheduleEntry, StudyPlanner, daily_load_frame, load_planner_from_json,
    load_schedule_from_csv, save_planner_to_json, save_schedule_to_csv, subject_progress_frame,
};

fn cell_text(av: &AnyValue) -> String {
    match av {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::Float64(v) => round_hours(*v).to_string(),
        AnyValue::Boolean(true) => "yes".to_string(),
        AnyValue::Boolean(false) => String::new(),
        _ => av.to_string(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut rows: Vec<Vec<String>> = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        let row = columns
            .iter()
            .map(|col| col.get(row_idx).map(|av| cell_text(&av)).unwrap_or_default())
            .collect();
        rows.push(row);
    }

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for row in &rows {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.len());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let push_row = |out: &mut String, cells: &[String]| {
        out.push('|');
        for (ci, cell) in cells.iter().enumerate() {
            out.push(' ');
            out.push_str(cell);
            out.push_str(&" ".repeat(widths[ci].saturating_sub(cell.len())));
            out.push_str(" |");
        }
        out.push('\n');
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    push_row(&mut out, &col_names);
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        push_row(&mut out, row);
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show the next 14 days\n  load                               Daily load table for the next 14 days\n  subjects                           List subjects and topics\n  subject add <YYYY-MM-DD> <name...> Add a subject with its exam date\n  subject rm <n>                     Remove subject n and its sessions\n  topic add <n> [hours] <name...>    Add a topic to subject n\n  topic rm <n> <m>                   Remove topic m of subject n\n  budget [hours]                     Show or set the daily hour budget\n  generate                           Build the study plan\n  rebalance                          Move missed sessions forward\n  sessions                           List all sessions\n  done <n>                           Toggle completion of session n\n  move <n> <YYYY-MM-DD>              Move session n to another day\n  summary                            One-line progress summary\n  progress                           Per-subject progress table\n  save json <path>                   Save planner state\n  load json <path>                   Load planner state\n  export csv <path>                  Export sessions\n  import csv <path>                  Replace sessions from a CSV file\n  quit|exit                          Exit"
    );
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// 1-based index from user input into a 0-based index below `len`.
fn parse_index(s: Option<&str>, len: usize) -> Option<usize> {
    let n: usize = s?.parse().ok()?;
    (1..=len).contains(&n).then(|| n - 1)
}

/// Sessions in display order: by date, then by plan order.
fn sorted_sessions(planner: &StudyPlanner) -> Vec<&ScheduleEntry> {
    let mut sessions: Vec<&ScheduleEntry> = planner.schedule().iter().collect();
    sessions.sort_by_key(|entry| entry.date);
    sessions
}

fn print_subjects(planner: &StudyPlanner) {
    if planner.subjects().is_empty() {
        println!("No subjects yet.");
        return;
    }
    let today = planner.today();
    for (si, subject) in planner.subjects().iter().enumerate() {
        println!(
            "{}. {} (exam {}, {} days left)",
            si + 1,
            subject.name,
            subject.exam_date,
            subject.days_until_exam(today)
        );
        for (ti, topic) in subject.topics.iter().enumerate() {
            println!("   {}. {} ({}h)", ti + 1, topic.name, topic.hours_needed);
        }
    }
}

fn print_sessions(planner: &StudyPlanner) {
    let sessions = sorted_sessions(planner);
    if sessions.is_empty() {
        println!("No sessions scheduled.");
        return;
    }
    let today = planner.today();
    for (i, entry) in sessions.iter().enumerate() {
        let status = if entry.completed {
            "[x]"
        } else if entry.is_missed(today) {
            "[!]"
        } else {
            "[ ]"
        };
        println!(
            "{:>3}. {} {} {} - {} ({}h)",
            i + 1,
            status,
            entry.date,
            entry.subject_name,
            entry.topic_name,
            entry.hours
        );
    }
}

fn print_timetable(planner: &StudyPlanner) {
    let budget = planner.daily_hour_budget();
    for day in planner.timetable(TIMETABLE_DAYS) {
        let flag = if day.overloaded { " OVERLOADED" } else { "" };
        println!(
            "{} {}  {}h/{}h{}",
            day.date.format("%a"),
            day.date,
            round_hours(day.total_hours),
            budget,
            flag
        );
        for entry in &day.entries {
            let mark = if entry.completed { "x" } else { " " };
            println!(
                "    [{mark}] {} - {} ({}h)",
                entry.subject_name, entry.topic_name, entry.hours
            );
        }
    }
    let missed = planner.missed_count();
    if missed > 0 {
        println!("{missed} missed session(s). Type 'rebalance' to reschedule.");
    }
}

#[cfg(feature = "sqlite")]
type Store = study_planner::SqlitePlannerStore;

#[cfg(feature = "sqlite")]
fn open_store(config: &PlannerConfig, planner: &mut StudyPlanner) -> Option<Store> {
    use study_planner::PlannerStore;

    let path = config.db_path.as_ref()?;
    let store = match Store::new(path) {
        Ok(store) => store,
        Err(e) => {
            println!("Could not open {}: {}", path.display(), e);
            return None;
        }
    };
    match store.load_state() {
        Ok(Some(state)) => match planner.restore(state) {
            Ok(()) => println!("Loaded planner from {}", path.display()),
            Err(e) => println!("Stored planner is invalid: {}", e),
        },
        Ok(None) => {}
        Err(e) => println!("Load error: {}", e),
    }
    Some(store)
}

#[cfg(feature = "sqlite")]
fn persist(store: &Option<Store>, planner: &StudyPlanner) {
    use study_planner::PlannerStore;

    if let Some(store) = store {
        if let Err(e) = store.save_state(&planner.state()) {
            println!("Save error: {}", e);
        }
    }
}

#[cfg(not(feature = "sqlite"))]
type Store = ();

#[cfg(not(feature = "sqlite"))]
fn open_store(config: &PlannerConfig, _planner: &mut StudyPlanner) -> Option<Store> {
    if config.db_path.is_some() {
        println!("Built without the `sqlite` feature; state will not be saved.");
    }
    None
}

#[cfg(not(feature = "sqlite"))]
fn persist(_store: &Option<Store>, _planner: &StudyPlanner) {}

fn main() {
    let config = match PlannerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(2);
        }
    };
    let _logger = init_logging(&config.log_spec).ok();

    let mut planner = StudyPlanner::new();
    if let Err(e) = planner.set_daily_hour_budget(config.daily_hours) {
        println!("Error: {}", e);
    }
    let store = open_store(&config, &mut planner);

    println!("Study Planner (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");
        let mut mutated = false;

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => print_timetable(&planner),
            "load" if input.split_whitespace().nth(1).is_none() => {
                match daily_load_frame(
                    planner.schedule(),
                    planner.daily_hour_budget(),
                    planner.today(),
                    TIMETABLE_DAYS,
                ) {
                    Ok(df) => println!("{}", render_df_as_text_table(&df)),
                    Err(e) => println!("Report error: {}", e),
                }
            }
            "subjects" => print_subjects(&planner),
            "subject" => match parts.next() {
                Some("add") => {
                    let date_s = parts.next();
                    let name = parts.collect::<Vec<_>>().join(" ");
                    match (date_s.and_then(parse_date), name.is_empty()) {
                        (Some(date), false) => match planner.add_subject(&name, date) {
                            Ok(subject) => {
                                println!("Added subject {} (exam {})", subject.name, subject.exam_date);
                                mutated = true;
                            }
                            Err(e) => println!("Error: {}", e),
                        },
                        _ => println!("Usage: subject add <YYYY-MM-DD> <name...>"),
                    }
                }
                Some("rm") => match parse_index(parts.next(), planner.subjects().len()) {
                    Some(idx) => {
                        let id = planner.subjects()[idx].id.clone();
                        match planner.remove_subject(&id) {
                            Ok(subject) => {
                                println!("Removed subject {}", subject.name);
                                mutated = true;
                            }
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    None => println!("Usage: subject rm <n>"),
                },
                _ => println!("Usage: subject add <YYYY-MM-DD> <name...> | subject rm <n>"),
            },
            "topic" => match parts.next() {
                Some("add") => {
                    let subject_idx = parse_index(parts.next(), planner.subjects().len());
                    let mut words: Vec<&str> = parts.collect();
                    // A leading number is the hour count; otherwise the whole tail is the name.
                    let hours = match words.first().and_then(|w| w.parse::<f64>().ok()) {
                        Some(h) => {
                            words.remove(0);
                            h
                        }
                        None => DEFAULT_TOPIC_HOURS,
                    };
                    let name = words.join(" ");
                    match (subject_idx, name.is_empty()) {
                        (Some(idx), false) => {
                            let subject_id = planner.subjects()[idx].id.clone();
                            match planner.add_topic(&subject_id, &name, hours) {
                                Ok(topic) => {
                                    println!("Added topic {} ({}h)", topic.name, topic.hours_needed);
                                    mutated = true;
                                }
                                Err(e) => println!("Error: {}", e),
                            }
                        }
                        _ => println!("Usage: topic add <n> [hours] <name...>"),
                    }
                }
                Some("rm") => {
                    let subject_idx = parse_index(parts.next(), planner.subjects().len());
                    let ids = subject_idx.and_then(|si| {
                        let subject = &planner.subjects()[si];
                        parse_index(parts.next(), subject.topics.len())
                            .map(|ti| (subject.id.clone(), subject.topics[ti].id.clone()))
                    });
                    match ids {
                        Some((subject_id, topic_id)) => {
                            match planner.remove_topic(&subject_id, &topic_id) {
                                Ok(topic) => {
                                    println!("Removed topic {}", topic.name);
                                    mutated = true;
                                }
                                Err(e) => println!("Error: {}", e),
                            }
                        }
                        None => println!("Usage: topic rm <n> <m>"),
                    }
                }
                _ => println!("Usage: topic add <n> [hours] <name...> | topic rm <n> <m>"),
            },
            "budget" => match parts.next() {
                None => println!("Daily budget: {}h", planner.daily_hour_budget()),
                Some(h) => {
                    let hours: f64 = match h.parse() {
                        Ok(v) => v,
                        Err(_) => {
                            println!("Invalid hours");
                            continue;
                        }
                    };
                    match planner.set_daily_hour_budget(hours) {
                        Ok(()) => {
                            println!("Daily budget set to {}h", hours);
                            mutated = true;
                        }
                        Err(e) => println!("Error: {}", e),
                    }
                }
            },
            "generate" => match planner.generate() {
                Ok(report) => {
                    println!(
                        "Generated {} study sessions ({}h)",
                        report.sessions,
                        round_hours(report.planned_hours)
                    );
                    for topic in &report.unallocated {
                        println!(
                            "Warning: {} has {}h that does not fit before the exam",
                            topic.topic_name,
                            round_hours(topic.unallocated_hours)
                        );
                    }
                    mutated = true;
                }
                Err(e) => println!("Error: {}", e),
            },
            "rebalance" => {
                let report = planner.reschedule_missed();
                if report.missed == 0 {
                    println!("No missed sessions to reschedule.");
                } else {
                    println!(
                        "Rescheduled {} of {} missed sessions",
                        report.rescheduled, report.missed
                    );
                    for entry in &report.dropped {
                        println!(
                            "Dropped {} - {} ({}h): no free day found",
                            entry.subject_name, entry.topic_name, entry.hours
                        );
                    }
                    mutated = true;
                }
            }
            "sessions" => print_sessions(&planner),
            "done" => {
                let id = parse_index(parts.next(), planner.schedule().len())
                    .map(|idx| sorted_sessions(&planner)[idx].id.clone());
                match id {
                    Some(id) => match planner.toggle_completed(&id) {
                        Ok(true) => {
                            println!("Session marked done.");
                            mutated = true;
                        }
                        Ok(false) => {
                            println!("Session marked not done.");
                            mutated = true;
                        }
                        Err(e) => println!("Error: {}", e),
                    },
                    None => println!("Usage: done <n>"),
                }
            }
            "move" => {
                let id = parse_index(parts.next(), planner.schedule().len())
                    .map(|idx| sorted_sessions(&planner)[idx].id.clone());
                match (id, parts.next().and_then(parse_date)) {
                    (Some(id), Some(date)) => match planner.move_entry(&id, date).map(|_| ()) {
                        Ok(()) => {
                            println!("Session moved to {}", date);
                            if planner.is_overloaded(date) {
                                println!(
                                    "Warning: {} is over budget ({}h/{}h)",
                                    date,
                                    round_hours(planner.day_load(date)),
                                    planner.daily_hour_budget()
                                );
                            }
                            mutated = true;
                        }
                        Err(e) => println!("Error: {}", e),
                    },
                    _ => println!("Usage: move <n> <YYYY-MM-DD>"),
                }
            }
            "summary" => println!("{}", planner.summary().to_cli_summary()),
            "progress" => {
                match subject_progress_frame(planner.subjects(), planner.schedule(), planner.today()) {
                    Ok(df) => println!("{}", render_df_as_text_table(&df)),
                    Err(e) => println!("Report error: {}", e),
                }
            }
            "save" | "load" | "export" | "import" => {
                let format = parts.next();
                let path = parts.collect::<Vec<_>>().join(" ");
                if path.is_empty() {
                    println!("Usage: {} <json|csv> <path>", cmd);
                    continue;
                }
                match (cmd, format) {
                    ("save", Some("json")) => match save_planner_to_json(&planner.state(), &path) {
                        Ok(()) => println!("Planner saved to {}", path),
                        Err(e) => println!("Save error: {}", e),
                    },
                    ("load", Some("json")) => match load_planner_from_json(&path) {
                        Ok(state) => match planner.restore(state) {
                            Ok(()) => {
                                println!("Planner loaded from {}", path);
                                mutated = true;
                            }
                            Err(e) => println!("Load error: {}", e),
                        },
                        Err(e) => println!("Load error: {}", e),
                    },
                    ("export", Some("csv")) => match save_schedule_to_csv(planner.schedule(), &path) {
                        Ok(()) => println!("Sessions exported to {}", path),
                        Err(e) => println!("Export error: {}", e),
                    },
                    ("import", Some("csv")) => match load_schedule_from_csv(&path) {
                        Ok(schedule) => {
                            let mut state = planner.state();
                            state.schedule = schedule;
                            match planner.restore(state) {
                                Ok(()) => {
                                    println!("Sessions imported from {}", path);
                                    mutated = true;
                                }
                                Err(e) => println!("Import error: {}", e),
                            }
                        }
                        Err(e) => println!("Import error: {}", e),
                    },
                    _ => println!("Usage: save json | load json | export csv | import csv <path>"),
                }
            }
            _ => {
                println!("Unknown command. Type 'help'.");
            }
        }

        if mutated {
            persist(&store, &planner);
        }
    }
}
