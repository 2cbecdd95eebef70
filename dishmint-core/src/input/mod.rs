//! Button input handling
//!
//! Edges come in from GPIO tasks with a timestamp. Each input has its own
//! debouncer; accepted edges become press events for the player wired to
//! that input.

pub mod debounce;
pub mod monitor;

pub use debounce::Debouncer;
pub use monitor::{ButtonMonitor, PressEvent};
