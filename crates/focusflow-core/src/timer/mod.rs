mod engine;

pub use engine::{SessionEngine, TimerState};
