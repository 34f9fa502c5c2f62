pub mod runtime;
pub mod schedule;
pub mod status;

pub use runtime::{JobHandlers, Scheduler};
pub use schedule::next_run_at_ms;
pub use status::{JobStatusView, SchedulerStatus};
