//! Suite execution
//!
//! Emulator supervision, result classification and the sequential driver
//! loop that ties them to the build step.

mod classify;
mod emulator;
mod runner;

pub use emulator::QemuRunner;
pub use runner::SuiteRunner;
