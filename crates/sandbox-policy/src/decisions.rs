//! Built-in trace decisions

use std::sync::atomic::{AtomicBool, Ordering};

use log::{error, warn};

use crate::action::{TraceAction, TraceDecision, TraceeView};
use crate::predicate::ArgIndex;

/// Highest deliverable signal number (kernel `_NSIG - 1` on x86 and x86_64)
pub const MAX_SIGNAL: i64 = 64;

/// Whether `signal` names a real signal (`1..=MAX_SIGNAL`)
pub fn is_signal_valid(signal: i64) -> bool {
    (1..=MAX_SIGNAL).contains(&signal)
}

/// Lets the guarded syscall through once, kills on every later attempt.
///
/// Used for `execve`: the sandbox launcher execs the target exactly once,
/// anything after that comes from untrusted code.
#[derive(Debug, Default)]
pub struct OneShotGate {
    used: AtomicBool,
}

impl OneShotGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_used(&self) -> bool {
        self.used.load(Ordering::Acquire)
    }
}

impl TraceDecision for OneShotGate {
    fn name(&self) -> &'static str {
        "one-shot"
    }

    fn decide(&self, _tracee: &dyn TraceeView) -> TraceAction {
        if self.used.swap(true, Ordering::AcqRel) {
            warn!("one-shot syscall attempted again, killing tracee");
            TraceAction::Kill
        } else {
            TraceAction::Continue
        }
    }
}

/// Continues only when the signal argument is a valid signal number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalValidator {
    signal_arg: ArgIndex,
}

impl SignalValidator {
    /// `signal_arg` is the argument carrying the signal number:
    /// 1 for `kill` and `tkill`, 2 for `tgkill`.
    pub fn new(signal_arg: ArgIndex) -> Self {
        Self { signal_arg }
    }

    pub fn signal_arg(&self) -> ArgIndex {
        self.signal_arg
    }
}

impl TraceDecision for SignalValidator {
    fn name(&self) -> &'static str {
        match self.signal_arg {
            ArgIndex::Arg1 => "signal-arg1",
            ArgIndex::Arg2 => "signal-arg2",
            _ => "signal",
        }
    }

    fn decide(&self, tracee: &dyn TraceeView) -> TraceAction {
        match tracee.syscall_argument(self.signal_arg) {
            Ok(signal) if is_signal_valid(signal) => TraceAction::Continue,
            Ok(signal) => {
                warn!("invalid signal number {}, killing tracee", signal);
                TraceAction::Kill
            }
            Err(e) => {
                error!("cannot read signal argument {}: {}", self.signal_arg, e);
                TraceAction::Kill
            }
        }
    }
}

/// Always continues. Attached to `exit`/`exit_group` so the tracer sees the
/// exit status before the tracee is gone.
#[derive(Debug, Default, Clone, Copy)]
pub struct ObserveOnly;

impl TraceDecision for ObserveOnly {
    fn name(&self) -> &'static str {
        "observe"
    }

    fn decide(&self, _tracee: &dyn TraceeView) -> TraceAction {
        TraceAction::Continue
    }
}

/// Always continues. Trapping `set_thread_area` tells the tracer which ABI
/// the tracee runs (the call is made by 32-bit libc startup).
#[derive(Debug, Default, Clone, Copy)]
pub struct ArchProbe;

impl TraceDecision for ArchProbe {
    fn name(&self) -> &'static str {
        "arch-probe"
    }

    fn decide(&self, _tracee: &dyn TraceeView) -> TraceAction {
        TraceAction::Continue
    }
}
