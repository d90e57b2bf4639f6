//! Log lines and progress bars

pub mod log;
pub mod progress;

pub use log::TimedOperation;
pub use progress::{create_main_progress_bar, create_spinner, finish_progress_bar};
