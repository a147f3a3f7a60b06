//! A single policy rule

use std::fmt;

use crate::action::{Action, TraceeView};
use crate::predicate::{Predicate, SyscallArgs};
use crate::syscall::SyscallName;
use sandbox_core::Result;

/// `(syscall, action, predicate?)`. Without a predicate the rule matches
/// every occurrence of the syscall.
#[derive(Debug, PartialEq, Eq)]
pub struct Rule {
    syscall: SyscallName,
    action: Action,
    predicate: Option<Predicate>,
}

impl Rule {
    pub fn new(syscall: SyscallName, action: Action, predicate: Option<Predicate>) -> Self {
        Self {
            syscall,
            action,
            predicate,
        }
    }

    pub fn syscall(&self) -> &SyscallName {
        &self.syscall
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    pub fn is_conditional(&self) -> bool {
        self.predicate.is_some()
    }

    pub fn is_traced(&self) -> bool {
        matches!(self.action, Action::Trace(_))
    }

    /// Whether the rule applies to an occurrence with these arguments
    pub fn matches(&self, args: &SyscallArgs) -> bool {
        self.predicate.as_ref().is_none_or(|p| p.evaluate(args))
    }

    /// Same as [`Rule::matches`], reading the argument from a live tracee
    pub fn matches_tracee(&self, tracee: &dyn TraceeView) -> Result<bool> {
        match &self.predicate {
            None => Ok(true),
            Some(p) => Ok(p.test(tracee.syscall_argument(p.arg())?)),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.predicate {
            Some(p) => write!(f, "{} -> {} if {}", self.syscall, self.action, p),
            None => write!(f, "{} -> {}", self.syscall, self.action),
        }
    }
}
