//! sandbox-policy: syscall decision policy for a seccomp + ptrace sandbox
//!
//! This crate decides, for every monitored syscall, whether the sandboxed
//! process may run it (`Allow`), gets an error back (`Errno`), is killed
//! (`Kill`), or is stopped so the tracer can decide at runtime (`Trace`).
//! It does not enforce anything itself: a filter compiler turns
//! [`Policy::rules`] into a kernel filter, and a tracer calls
//! [`Policy::on_trap`] for syscalls marked `Trace`.
//!
//! # Example
//!
//! ```
//! use sandbox_policy::{Policy, PolicyConfig, SyscallArgs, Verdict};
//!
//! let policy = Policy::new(&PolicyConfig::default())?;
//!
//! // stdin is never writable
//! assert!(policy.evaluate("write", &SyscallArgs::new([0, 0, 0, 0, 0, 0])).is_none());
//! let (_, verdict) = policy.evaluate("write", &SyscallArgs::new([1, 0, 0, 0, 0, 0])).unwrap();
//! assert_eq!(verdict, Verdict::Allow);
//! # Ok::<(), sandbox_policy::SandboxError>(())
//! ```

pub mod action;
pub mod decisions;
pub mod policy;
pub mod predicate;
pub mod rule;
pub mod syscall;
pub mod syscall_table;

pub use action::{Action, ActionKind, TraceAction, TraceDecision, TraceeView, Verdict};
pub use policy::{Policy, PolicyBuilder, PolicyConfig, ShadowedRule};
pub use predicate::{ArgIndex, Comparator, Predicate, SyscallArgs, arg};
pub use rule::Rule;
pub use sandbox_core::{Result, SandboxError, TargetArch};
pub use syscall::SyscallName;
