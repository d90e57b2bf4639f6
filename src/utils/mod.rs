//! Shared utilities: logging, progress bars, random draws and test fixtures

pub mod logging;
pub mod random;

#[doc(hidden)]
pub mod test_utils;
