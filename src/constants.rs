/// Longest single study session, in hours.
pub const SESSION_CAP_HOURS: f64 = 2.0;

/// How many days ahead the rebalancer searches for a free slot.
pub const REBALANCE_HORIZON_DAYS: u32 = 60;

pub const DEFAULT_DAILY_HOURS: f64 = 4.0;
pub const MAX_DAILY_HOURS: f64 = 24.0;
pub const DEFAULT_TOPIC_HOURS: f64 = 2.0;

/// Width of the timetable view, in days.
pub const TIMETABLE_DAYS: u32 = 14;
/// Widest timetable the HTTP API will render in one request.
pub const MAX_TIMETABLE_DAYS: u32 = 366;

/// Tolerance for comparing hour sums.
pub const HOURS_EPSILON: f64 = 1e-6;

/// Display colors handed out to subjects in registration order.
pub const SUBJECT_COLORS: [&str; 6] = [
    "hsl(168, 70%, 38%)",
    "hsl(262, 60%, 55%)",
    "hsl(43, 96%, 56%)",
    "hsl(200, 70%, 50%)",
    "hsl(340, 65%, 55%)",
    "hsl(25, 80%, 55%)",
];

/// Rounds an hour value to one decimal place, the precision sessions are stored at.
pub fn round_hours(hours: f64) -> f64 {
    (hours * 10.0).round() / 10.0
}

/// Rounds an hour value down to one decimal place, absorbing float noise below [`HOURS_EPSILON`].
pub fn floor_hours(hours: f64) -> f64 {
    ((hours + HOURS_EPSILON) * 10.0).floor() / 10.0
}
