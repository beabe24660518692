//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

#![allow(dead_code)]

/// Success - operation completed without errors
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Check mode found files or directories that would change
pub const CHANGES_PENDING: i32 = 2;

/// Template error - template missing or rendering failed
pub const TEMPLATE_ERROR: i32 = 3;

/// Config error - invalid configuration file, flags or variables
pub const CONFIG_ERROR: i32 = 4;

/// IO error - disk full, path conflict, etc.
pub const IO_ERROR: i32 = 5;

/// Permission denied (sysexits.h EX_NOPERM)
pub const PERMISSION_ERROR: i32 = 77;
