//! Syscall policy assembly and first-match evaluation
//!
//! A [`Policy`] is an ordered list of [`Rule`]s. For a given syscall the first
//! rule whose predicate is absent or holds decides the outcome; rules for the
//! same syscall after an unconditional one are dead and reported by
//! [`Policy::unreachable_rules`].
//!
//! Policies are assembled by [`PolicyBuilder`] from five category builders,
//! always in the same order: execution control, memory management, system
//! information, filesystem access, input/output.

use log::{debug, error, info, warn};
use sandbox_core::arch::join_arches;
use sandbox_core::{Result, SandboxError, TargetArch};
use serde::{Deserialize, Serialize};

use crate::action::{Action, TraceAction, TraceeView, Verdict};
use crate::decisions::{ArchProbe, ObserveOnly, OneShotGate, SignalValidator};
use crate::predicate::{ArgIndex, Predicate, SyscallArgs, arg};
use crate::rule::Rule;
use crate::syscall::SyscallName;

/// Sandbox-mode flags a policy is built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    /// Allow the `fork` syscall
    pub allow_fork: bool,
    /// Deny filesystem mutation and read-write `open`
    pub read_only: bool,
    /// Architectures syscall names are resolved for
    pub arches: Vec<TargetArch>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            allow_fork: false,
            read_only: true,
            arches: TargetArch::all().to_vec(),
        }
    }
}

impl PolicyConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.arches.is_empty() {
            return Err(SandboxError::InvalidConfig(
                "At least one target architecture is required".to_string(),
            ));
        }

        for (i, arch) in self.arches.iter().enumerate() {
            if self.arches[..i].contains(arch) {
                return Err(SandboxError::InvalidConfig(format!(
                    "Architecture '{}' listed more than once",
                    arch
                )));
            }
        }

        Ok(())
    }
}

/// A rule that can never be selected because an earlier rule for the same
/// syscall always wins first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadowedRule {
    /// Index of the dead rule
    pub index: usize,
    /// Index of the earlier rule that shadows it
    pub shadowed_by: usize,
}

/// Builder pattern for policy creation
#[derive(Debug)]
pub struct PolicyBuilder {
    arches: Vec<TargetArch>,
    rules: Vec<Rule>,
}

impl PolicyBuilder {
    /// Create an empty builder resolving names for `arches`
    pub fn new(arches: &[TargetArch]) -> Self {
        Self {
            arches: arches.to_vec(),
            rules: Vec::new(),
        }
    }

    /// Append one rule. Fails if no supported architecture knows `syscall`;
    /// a name missing only from the configured architectures is kept without
    /// numbers.
    pub fn rule(
        mut self,
        syscall: &str,
        action: Action,
        predicate: Option<Predicate>,
    ) -> Result<Self> {
        self.push(syscall, action, predicate)?;
        Ok(self)
    }

    fn push(&mut self, syscall: &str, action: Action, predicate: Option<Predicate>) -> Result<()> {
        let name = SyscallName::resolve(syscall, &self.arches)?;
        let rule = Rule::new(name, action, predicate);
        debug!("policy rule #{}: {}", self.rules.len(), rule);
        self.rules.push(rule);
        Ok(())
    }

    fn allow_syscalls(&mut self, syscalls: &[&str]) -> Result<()> {
        for syscall in syscalls {
            self.push(syscall, Action::Allow, None)?;
        }
        Ok(())
    }

    /// Signals, threads, process lifecycle
    pub fn execution_control(mut self, allow_fork: bool) -> Result<Self> {
        self.allow_syscalls(&[
            "restart_syscall",
            "getpriority",
            "setpriority",
            "sigaction",
            "sigaltstack",
            "rt_sigaction",
            "rt_sigprocmask",
            "futex",
            "set_tid_address",
            "set_robust_list",
            "getpid",
            "getrandom",
            "sigsuspend",
        ])?;

        self.push("set_thread_area", Action::trace(ArchProbe), None)?;
        self.push("execve", Action::trace(OneShotGate::new()), None)?;

        for syscall in ["kill", "tkill"] {
            self.push(
                syscall,
                Action::trace(SignalValidator::new(ArgIndex::Arg1)),
                None,
            )?;
        }
        self.push(
            "tgkill",
            Action::trace(SignalValidator::new(ArgIndex::Arg2)),
            None,
        )?;

        for syscall in ["exit", "exit_group"] {
            self.push(syscall, Action::trace(ObserveOnly), None)?;
        }

        if allow_fork {
            self.allow_syscalls(&["fork"])?;
        }

        self.push("prlimit64", Action::Errno(libc::EPERM), None)?;

        Ok(self)
    }

    /// Heap and mappings
    pub fn memory_management(mut self) -> Result<Self> {
        self.allow_syscalls(&[
            "brk",
            "mmap",
            "mmap2",
            "munmap",
            "mremap",
            "mprotect",
            "arch_prctl",
        ])?;
        Ok(self)
    }

    /// Identity, clocks and resource-limit queries
    pub fn system_information(mut self) -> Result<Self> {
        self.allow_syscalls(&[
            "getuid",
            "getgid",
            "geteuid",
            "getegid",
            "getrlimit",
            "ugetrlimit",
            "getcpu",
            "gettid",
            "uname",
            "olduname",
            "oldolduname",
            "sysinfo",
            "clock_gettime",
            "gettimeofday",
            "time",
        ])?;
        Ok(self)
    }

    /// Metadata queries, `close`, and `open`/mutation depending on `read_only`
    pub fn filesystem_access(mut self, read_only: bool) -> Result<Self> {
        self.allow_syscalls(&[
            "stat",
            "stat64",
            "fstat",
            "fstat64",
            "lstat",
            "lstat64",
            "listxattr",
            "llistxattr",
            "flistxattr",
            "readlink",
            "access",
            "getdents",
        ])?;

        // 0-2 are the standard streams
        self.push(
            "close",
            Action::Allow,
            Some(arg(ArgIndex::Arg0).greater_equal(3)),
        )?;

        const MUTATIONS: [&str; 5] = ["unlink", "unlinkat", "symlink", "mkdir", "fsetxattr"];

        if read_only {
            self.push(
                "open",
                Action::Allow,
                Some(arg(ArgIndex::Arg1).masked_equal(libc::O_RDWR as i64, 0)),
            )?;
            for syscall in MUTATIONS {
                self.push(syscall, Action::Errno(libc::EPERM), None)?;
            }
        } else {
            self.allow_syscalls(&["open"])?;
            self.allow_syscalls(&MUTATIONS)?;
        }

        Ok(self)
    }

    /// Reads, writes to anything but stdin, seeks on regular descriptors
    pub fn input_output(mut self) -> Result<Self> {
        for syscall in ["write", "writev"] {
            self.push(
                syscall,
                Action::Allow,
                Some(arg(ArgIndex::Arg0).greater_than(0)),
            )?;
        }

        self.push(
            "dup2",
            Action::Allow,
            Some(arg(ArgIndex::Arg1).greater_equal(3)),
        )?;

        self.allow_syscalls(&["read", "readv", "dup", "fcntl", "fcntl64"])?;

        self.push("ioctl", Action::Errno(libc::ENOTTY), None)?;

        for syscall in ["lseek", "_llseek"] {
            self.push(
                syscall,
                Action::Errno(libc::ESPIPE),
                Some(arg(ArgIndex::Arg0).less_equal(2)),
            )?;
            self.push(
                syscall,
                Action::Allow,
                Some(arg(ArgIndex::Arg0).greater_equal(3)),
            )?;
        }

        Ok(self)
    }

    /// Freeze the rule list
    pub fn build(self) -> Policy {
        let policy = Policy {
            arches: self.arches,
            rules: self.rules,
        };

        for shadowed in policy.unreachable_rules() {
            warn!(
                "unreachable policy rule #{} ({}) is shadowed by rule #{} ({})",
                shadowed.index,
                policy.rules[shadowed.index],
                shadowed.shadowed_by,
                policy.rules[shadowed.shadowed_by]
            );
        }

        info!(
            "built syscall policy for [{}]: {} rules, {} traced, {} absent on these arches",
            join_arches(&policy.arches),
            policy.rules.len(),
            policy.rules.iter().filter(|r| r.is_traced()).count(),
            policy.rules.iter().filter(|r| !r.syscall().is_resolved()).count()
        );

        policy
    }
}

/// Ordered, immutable rule set for one sandboxed process.
///
/// Not `Clone`: trace decisions carry per-process state, so every sandboxed
/// process needs a freshly built policy.
#[derive(Debug)]
pub struct Policy {
    arches: Vec<TargetArch>,
    rules: Vec<Rule>,
}

impl Policy {
    /// Build the default rule set for `config`
    pub fn new(config: &PolicyConfig) -> Result<Self> {
        config.validate()?;

        let policy = PolicyBuilder::new(&config.arches)
            .execution_control(config.allow_fork)?
            .memory_management()?
            .system_information()?
            .filesystem_access(config.read_only)?
            .input_output()?
            .build();

        Ok(policy)
    }

    /// Build with [`PolicyConfig::default`]
    pub fn default_policy() -> Result<Self> {
        Self::new(&PolicyConfig::default())
    }

    /// Get all rules, in evaluation order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Architectures the rules were resolved for
    pub fn arches(&self) -> &[TargetArch] {
        &self.arches
    }

    /// Check if any rule names `syscall`
    pub fn contains(&self, syscall: &str) -> bool {
        self.rules.iter().any(|r| r.syscall().is(syscall))
    }

    /// Rules for one syscall, in evaluation order
    pub fn rules_for<'a>(&'a self, syscall: &'a str) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules.iter().filter(move |r| r.syscall().is(syscall))
    }

    /// Index of the first rule for `syscall` that matches `args`
    pub fn first_match(&self, syscall: &str, args: &SyscallArgs) -> Option<usize> {
        self.rules
            .iter()
            .position(|r| r.syscall().is(syscall) && r.matches(args))
    }

    /// First matching rule for `syscall` and its verdict. `None` means no
    /// rule applies; the default disposition is up to the enforcer.
    pub fn evaluate(&self, syscall: &str, args: &SyscallArgs) -> Option<(&Rule, Verdict<'_>)> {
        let rule = &self.rules[self.first_match(syscall, args)?];
        Some((rule, rule.action().decide()))
    }

    /// Same as [`Policy::evaluate`], keyed by syscall number
    pub fn evaluate_number(
        &self,
        arch: TargetArch,
        number: i64,
        args: &SyscallArgs,
    ) -> Option<(&Rule, Verdict<'_>)> {
        self.rules
            .iter()
            .filter(|r| r.syscall().number(arch) == Some(number))
            .find(|r| r.matches(args))
            .map(|r| (r, r.action().decide()))
    }

    /// Syscalls the tracer has to intercept, in first-appearance order
    pub fn traced_syscalls(&self) -> Vec<&SyscallName> {
        let mut traced: Vec<&SyscallName> = Vec::new();
        for rule in self.rules.iter().filter(|r| r.is_traced()) {
            if !traced.contains(&rule.syscall()) {
                traced.push(rule.syscall());
            }
        }
        traced
    }

    /// Tracer entry point for a trapped syscall.
    ///
    /// Fails closed: an unreadable argument, no matching rule, or a first
    /// match that is not a trace rule all kill the tracee.
    pub fn on_trap(&self, arch: TargetArch, number: i64, tracee: &dyn TraceeView) -> TraceAction {
        let candidates = self
            .rules
            .iter()
            .filter(|r| r.syscall().number(arch) == Some(number));

        for rule in candidates {
            match rule.matches_tracee(tracee) {
                Ok(false) => continue,
                Ok(true) => {
                    return match rule.action().decide() {
                        Verdict::Defer(decision) => decision.decide(tracee),
                        verdict => {
                            warn!(
                                "trapped {} ({} #{}) but first rule resolves to {}",
                                rule.syscall(),
                                arch,
                                number,
                                verdict
                            );
                            TraceAction::Kill
                        }
                    };
                }
                Err(e) => {
                    error!(
                        "cannot evaluate rule '{}' for trapped syscall: {}",
                        rule, e
                    );
                    return TraceAction::Kill;
                }
            }
        }

        warn!("trapped syscall {} #{} has no matching rule", arch, number);
        TraceAction::Kill
    }

    /// Rules that can never be selected
    pub fn unreachable_rules(&self) -> Vec<ShadowedRule> {
        let mut shadowed = Vec::new();
        for (index, rule) in self.rules.iter().enumerate() {
            let earlier = self.rules[..index].iter().position(|prev| {
                prev.syscall() == rule.syscall()
                    && (!prev.is_conditional() || prev.predicate() == rule.predicate())
            });
            if let Some(shadowed_by) = earlier {
                shadowed.push(ShadowedRule { index, shadowed_by });
            }
        }
        shadowed
    }
}
