pub mod annuity;
pub mod schedule;
pub mod summary;

pub use annuity::AnnuityCalculator;
pub use schedule::{
    due_events, AmortizationState, PeriodContext, PeriodOutcome, Schedule, ScheduleEntry,
    ScheduleGenerator, Termination, Transition,
};
pub use summary::{RepaymentSavings, ScheduleSummary};
