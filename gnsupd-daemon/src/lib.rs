//! gnsupd daemon runtime: trigger bus + single pass worker + signal handling.

mod error;
pub mod logging;
mod runtime;
pub mod trigger;

pub use error::DaemonError;
pub use logging::init_tracing;
pub use runtime::{run, run_pass, run_with, start_blocking};
pub use trigger::{Delivery, Trigger, TriggerBus, QUEUE_DEPTH};
