//! Argument predicates
//!
//! A predicate tests one syscall argument against a constant. Predicates are
//! built through [`arg`]:
//!
//! ```
//! use sandbox_policy::predicate::{arg, ArgIndex, SyscallArgs};
//!
//! let not_stdin = arg(ArgIndex::Arg0).greater_than(0);
//! assert!(not_stdin.evaluate(&SyscallArgs::new([1, 0, 0, 0, 0, 0])));
//! assert!(!not_stdin.evaluate(&SyscallArgs::new([0, 0, 0, 0, 0, 0])));
//! ```

use std::fmt;

use sandbox_core::{Result, SandboxError};
use serde::Serialize;

/// Maximum number of syscall arguments
pub const MAX_ARGS: usize = 6;

/// Index of one of the six syscall arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ArgIndex {
    Arg0,
    Arg1,
    Arg2,
    Arg3,
    Arg4,
    Arg5,
}

impl ArgIndex {
    pub fn all() -> [ArgIndex; MAX_ARGS] {
        [
            ArgIndex::Arg0,
            ArgIndex::Arg1,
            ArgIndex::Arg2,
            ArgIndex::Arg3,
            ArgIndex::Arg4,
            ArgIndex::Arg5,
        ]
    }

    pub fn as_usize(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for ArgIndex {
    type Error = SandboxError;

    fn try_from(index: usize) -> Result<Self> {
        ArgIndex::all().get(index).copied().ok_or_else(|| {
            SandboxError::InvalidArgument(format!(
                "Syscall argument index {} out of range (0-{})",
                index,
                MAX_ARGS - 1
            ))
        })
    }
}

impl fmt::Display for ArgIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "arg{}", self.as_usize())
    }
}

/// Comparison applied to an argument value.
///
/// Values compare as signed 64-bit integers, so a negative file descriptor
/// never satisfies a "descriptor is at least N" test and does satisfy
/// "descriptor is at most N". Seccomp BPF compares arguments unsigned; a
/// filter compiler must emit signed comparisons to keep these semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Comparator {
    /// Argument value is greater than the specified value.
    Gt,
    /// Argument value is greater than or equal to the specified value.
    Ge,
    /// Argument value is less than or equal to the specified value.
    Le,
    /// Argument value is equal to the specified value.
    Eq,
    /// Argument value is not equal to the specified value.
    Ne,
    /// Argument value masked with the given mask equals the specified value.
    MaskedEq(i64),
}

/// Boolean test over a single syscall argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Predicate {
    arg: ArgIndex,
    op: Comparator,
    value: i64,
}

impl Predicate {
    pub fn new(arg: ArgIndex, op: Comparator, value: i64) -> Self {
        Self { arg, op, value }
    }

    pub fn arg(&self) -> ArgIndex {
        self.arg
    }

    pub fn comparator(&self) -> Comparator {
        self.op
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    /// Test a raw argument value
    pub fn test(&self, arg: i64) -> bool {
        match self.op {
            Comparator::Gt => arg > self.value,
            Comparator::Ge => arg >= self.value,
            Comparator::Le => arg <= self.value,
            Comparator::Eq => arg == self.value,
            Comparator::Ne => arg != self.value,
            Comparator::MaskedEq(mask) => (arg & mask) == self.value,
        }
    }

    /// Evaluate against the full argument vector of a syscall
    pub fn evaluate(&self, args: &SyscallArgs) -> bool {
        self.test(args.get(self.arg))
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            Comparator::Gt => write!(f, "{} > {}", self.arg, self.value),
            Comparator::Ge => write!(f, "{} >= {}", self.arg, self.value),
            Comparator::Le => write!(f, "{} <= {}", self.arg, self.value),
            Comparator::Eq => write!(f, "{} == {}", self.arg, self.value),
            Comparator::Ne => write!(f, "{} != {}", self.arg, self.value),
            Comparator::MaskedEq(mask) => {
                write!(f, "({} & {:#x}) == {}", self.arg, mask, self.value)
            }
        }
    }
}

/// Predicate builder for one argument, see [`arg`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyscallArg(ArgIndex);

/// Start building a predicate over argument `index`
pub const fn arg(index: ArgIndex) -> SyscallArg {
    SyscallArg(index)
}

impl SyscallArg {
    pub fn greater_than(self, value: i64) -> Predicate {
        Predicate::new(self.0, Comparator::Gt, value)
    }

    pub fn greater_equal(self, value: i64) -> Predicate {
        Predicate::new(self.0, Comparator::Ge, value)
    }

    pub fn less_equal(self, value: i64) -> Predicate {
        Predicate::new(self.0, Comparator::Le, value)
    }

    pub fn equal(self, value: i64) -> Predicate {
        Predicate::new(self.0, Comparator::Eq, value)
    }

    pub fn not_equal(self, value: i64) -> Predicate {
        Predicate::new(self.0, Comparator::Ne, value)
    }

    /// `(arg & mask) == value`; with `value == 0` this tests that none of the
    /// mask bits are set.
    pub fn masked_equal(self, mask: i64, value: i64) -> Predicate {
        Predicate::new(self.0, Comparator::MaskedEq(mask), value)
    }
}

/// Concrete argument values of one syscall occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyscallArgs([i64; MAX_ARGS]);

impl SyscallArgs {
    pub fn new(args: [i64; MAX_ARGS]) -> Self {
        Self(args)
    }

    /// Build from up to six leading values; the rest are zero.
    pub fn from_slice(values: &[i64]) -> Result<Self> {
        if values.len() > MAX_ARGS {
            return Err(SandboxError::InvalidArgument(format!(
                "A syscall takes at most {} arguments, got {}",
                MAX_ARGS,
                values.len()
            )));
        }
        let mut args = [0; MAX_ARGS];
        args[..values.len()].copy_from_slice(values);
        Ok(Self(args))
    }

    pub fn get(&self, index: ArgIndex) -> i64 {
        self.0[index.as_usize()]
    }

    pub fn as_array(&self) -> &[i64; MAX_ARGS] {
        &self.0
    }
}

impl From<[i64; MAX_ARGS]> for SyscallArgs {
    fn from(args: [i64; MAX_ARGS]) -> Self {
        Self(args)
    }
}
