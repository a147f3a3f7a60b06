//! sandbox-core: shared types and errors for the sandbox syscall policy
//!
//! This crate provides the foundational types used by the other crates:
//! - Error types and Result alias
//! - Target architecture identifiers used for syscall number resolution

pub mod arch;
pub mod error;

pub use arch::TargetArch;
pub use error::{Result, SandboxError};
