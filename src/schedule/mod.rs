//! Running order and timing.
//!
//! `order` decides which performances run and in what sequence; `timing`
//! turns that sequence into wall-clock start times.

pub mod order;
pub mod timing;

pub use order::{billed_sub_rosters, billing_order, ordered_performances};
pub use timing::{
    ScheduledPerformance, TimingPolicy, compute_schedule, format_clock, show_end,
};
