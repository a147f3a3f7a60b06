//! Error types for sandbox policy operations

use std::io;
use thiserror::Error;

/// Result type for sandbox policy operations
pub type Result<T> = std::result::Result<T, SandboxError>;

/// Errors that can occur while building or consulting a syscall policy.
///
/// Only construction-time problems travel through `Result`. Runtime outcomes
/// (deny, kill) are verdicts, not errors.
#[derive(Error, Debug)]
pub enum SandboxError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Unknown syscall '{name}' for architectures [{arches}]")]
    UnknownSyscall { name: String, arches: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Tracee access error: {0}")]
    TraceeAccess(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
