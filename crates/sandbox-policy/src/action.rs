//! Rule dispositions and the tracer-facing decision contract

use std::fmt;

use sandbox_core::Result;
use serde::Serialize;

use crate::predicate::{ArgIndex, SyscallArgs};

/// What the tracer does with a stopped tracee after a trace decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceAction {
    /// Resume the tracee; the syscall proceeds
    Continue,
    /// Terminate the tracee
    Kill,
}

impl fmt::Display for TraceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceAction::Continue => f.write_str("continue"),
            TraceAction::Kill => f.write_str("kill"),
        }
    }
}

/// Read-only view of a stopped tracee's current syscall.
///
/// Implemented by the tracer. Reads can fail (the tracee may have died);
/// decisions treat any failure as [`TraceAction::Kill`].
pub trait TraceeView {
    fn syscall_argument(&self, index: ArgIndex) -> Result<i64>;
}

impl TraceeView for SyscallArgs {
    fn syscall_argument(&self, index: ArgIndex) -> Result<i64> {
        Ok(self.get(index))
    }
}

/// Runtime decision attached to a [`Action::Trace`] rule.
///
/// Called synchronously by the tracer while the tracee is stopped. Must not
/// block and must not call back into the policy. Instances may keep state,
/// which lives as long as the policy that owns them: one sandboxed process.
pub trait TraceDecision: fmt::Debug + Send + Sync {
    /// Stable identifier, used for display and rule comparison
    fn name(&self) -> &'static str;

    fn decide(&self, tracee: &dyn TraceeView) -> TraceAction;
}

/// Disposition of a rule
#[derive(Debug)]
pub enum Action {
    /// Let the syscall run
    Allow,
    /// Skip the syscall and return the given errno to the tracee
    Errno(i32),
    /// Kill the tracee
    Kill,
    /// Stop the tracee and let the decision pick [`TraceAction`]
    Trace(Box<dyn TraceDecision>),
}

impl Action {
    pub fn trace(decision: impl TraceDecision + 'static) -> Self {
        Action::Trace(Box::new(decision))
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Allow => ActionKind::Allow,
            Action::Errno(_) => ActionKind::Errno,
            Action::Kill => ActionKind::Kill,
            Action::Trace(_) => ActionKind::Trace,
        }
    }

    /// Resolve to a verdict. Trace actions defer to their decision.
    pub fn decide(&self) -> Verdict<'_> {
        match self {
            Action::Allow => Verdict::Allow,
            Action::Errno(code) => Verdict::Deny(*code),
            Action::Kill => Verdict::Kill,
            Action::Trace(decision) => Verdict::Defer(decision.as_ref()),
        }
    }
}

impl PartialEq for Action {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Action::Allow, Action::Allow) | (Action::Kill, Action::Kill) => true,
            (Action::Errno(a), Action::Errno(b)) => a == b,
            (Action::Trace(a), Action::Trace(b)) => a.name() == b.name(),
            _ => false,
        }
    }
}

impl Eq for Action {}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Allow => f.write_str("allow"),
            Action::Errno(code) => write!(f, "errno({})", errno_name(*code)),
            Action::Kill => f.write_str("kill"),
            Action::Trace(decision) => write!(f, "trace({})", decision.name()),
        }
    }
}

/// Action variant without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Allow,
    Errno,
    Kill,
    Trace,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionKind::Allow => "allow",
            ActionKind::Errno => "errno",
            ActionKind::Kill => "kill",
            ActionKind::Trace => "trace",
        };
        f.write_str(s)
    }
}

/// Resolved disposition of one syscall occurrence
#[derive(Debug, Clone, Copy)]
pub enum Verdict<'a> {
    Allow,
    Deny(i32),
    Kill,
    /// Decided at runtime by the tracer through this decision
    Defer(&'a dyn TraceDecision),
}

impl Verdict<'_> {
    pub fn kind(&self) -> ActionKind {
        match self {
            Verdict::Allow => ActionKind::Allow,
            Verdict::Deny(_) => ActionKind::Errno,
            Verdict::Kill => ActionKind::Kill,
            Verdict::Defer(_) => ActionKind::Trace,
        }
    }
}

impl PartialEq for Verdict<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Verdict::Allow, Verdict::Allow) | (Verdict::Kill, Verdict::Kill) => true,
            (Verdict::Deny(a), Verdict::Deny(b)) => a == b,
            (Verdict::Defer(a), Verdict::Defer(b)) => a.name() == b.name(),
            _ => false,
        }
    }
}

impl fmt::Display for Verdict<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Allow => f.write_str("allow"),
            Verdict::Deny(code) => write!(f, "deny({})", errno_name(*code)),
            Verdict::Kill => f.write_str("kill"),
            Verdict::Defer(decision) => write!(f, "defer({})", decision.name()),
        }
    }
}

/// Symbolic name for the errno values the policy uses
pub fn errno_name(code: i32) -> String {
    match code {
        libc::EPERM => "EPERM".to_string(),
        libc::EACCES => "EACCES".to_string(),
        libc::ENOTTY => "ENOTTY".to_string(),
        libc::ESPIPE => "ESPIPE".to_string(),
        libc::ENOSYS => "ENOSYS".to_string(),
        other => other.to_string(),
    }
}
