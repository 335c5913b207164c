pub mod growth;
pub mod scheduler;
pub mod weather;

pub use growth::advance;
pub use scheduler::{DEFAULT_HISTORY_LIMIT, GrowthTickReport, Scheduler, Simulation, TimerState};
