pub mod generate;
pub mod rebalance;

pub use generate::{GenerationOutcome, ScheduleGenerator, UnallocatedTopic, generate_schedule};
pub use rebalance::{RebalanceOutcome, Rebalancer, reschedule_missed};

/// Non-finite or negative budgets leave no capacity on any day.
pub(crate) fn effective_budget(daily_hour_budget: f64) -> f64 {
    if daily_hour_budget.is_finite() {
        daily_hour_budget.max(0.0)
    } else {
        0.0
    }
}
