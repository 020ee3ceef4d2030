pub mod event_bus;
pub mod scheduler;

pub use event_bus::*;
pub use scheduler::*;
