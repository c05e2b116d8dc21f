//! Message automation - turning rules into concrete send times
//!
//! Everything here is a pure function of the rule, the reservation's
//! timeline and the current time, so the planner and the tests share it.

mod timing;

pub use timing::{
    compute_run_at, local_instant, parse_timezone, plan, ReservationTimeline, SchedulePlan,
};
