mod engine;

pub use engine::{TimeTracking, TimerState};
