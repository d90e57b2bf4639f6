//! Utility functions for error handling
//!
//! This module provides path checks that fail with usage errors carrying
//! the path and the reason it was needed.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{PmiError, Result};

/// Safely open a file with rich error information
///
/// # Arguments
/// * `path` - The path to the file to open
/// * `purpose` - Why the file is being opened (for error context)
pub fn safe_open_file(path: &Path, purpose: &str) -> Result<fs::File> {
    if !path.exists() {
        return Err(PmiError::Usage(format!(
            "file not found: {} (needed for {purpose})",
            path.display()
        )));
    }

    if !path.is_file() {
        return Err(PmiError::Usage(format!(
            "path is not a file: {} (expected a file for {purpose})",
            path.display()
        )));
    }

    fs::File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::PermissionDenied => PmiError::Usage(format!(
            "permission denied opening {} for {purpose}",
            path.display()
        )),
        _ => PmiError::Io(e),
    })
}

/// Check if a directory exists and is readable
pub fn validate_directory(path: &Path, purpose: &str) -> Result<()> {
    if !path.exists() {
        return Err(PmiError::Usage(format!(
            "directory not found: {} (needed for {purpose})",
            path.display()
        )));
    }

    if !path.is_dir() {
        return Err(PmiError::Usage(format!(
            "path is not a directory: {} (expected a directory for {purpose})",
            path.display()
        )));
    }

    match fs::read_dir(path) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => Err(PmiError::Usage(format!(
            "permission denied reading {} for {purpose}",
            path.display()
        ))),
        Err(e) => Err(PmiError::Io(e)),
    }
}
