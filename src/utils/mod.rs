//! Shared helpers: logging, timing and interrupt handling

mod logger;
mod signal;
mod timer;

pub use logger::{init_logger, LogLevel};
pub use signal::{own_process_group, spawn_interrupt_listener};
pub use timer::Timer;
