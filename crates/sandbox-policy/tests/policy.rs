//! Default policy tests
//!
//! These tests build the default policy the way a sandbox session does and
//! check the rule sequence plus the first-match verdicts the filter compiler
//! and tracer will derive from it.

use sandbox_policy::{
    Action, ActionKind, ArgIndex, Comparator, Policy, PolicyConfig, SyscallArgs, TargetArch,
    TraceAction, Verdict,
};

fn build(allow_fork: bool, read_only: bool) -> Policy {
    Policy::new(&PolicyConfig {
        allow_fork,
        read_only,
        ..Default::default()
    })
    .expect("default policy must build")
}

fn args(values: &[i64]) -> SyscallArgs {
    SyscallArgs::from_slice(values).unwrap()
}

/// Verdict kinds of every rule for one syscall, in order
fn kinds_for(policy: &Policy, syscall: &str) -> Vec<(ActionKind, bool)> {
    policy
        .rules_for(syscall)
        .map(|r| (r.action().kind(), r.is_conditional()))
        .collect()
}

fn first_index(policy: &Policy, syscall: &str) -> usize {
    policy
        .rules()
        .iter()
        .position(|r| r.syscall().is(syscall))
        .unwrap_or_else(|| panic!("no rule for '{}'", syscall))
}

/// Every syscall the category builders document appears, and the categories
/// come in their documented relative order.
#[test]
fn default_policy_covers_documented_syscalls_in_order() {
    let policy = build(false, true);
    assert!(!policy.rules().is_empty());

    let categories: [&[&str]; 5] = [
        &[
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
            "set_thread_area",
            "execve",
            "kill",
            "tkill",
            "tgkill",
            "exit",
            "exit_group",
            "prlimit64",
        ],
        &["brk", "mmap", "mmap2", "munmap", "mremap", "mprotect", "arch_prctl"],
        &[
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
        ],
        &[
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
            "close",
            "open",
            "unlink",
            "unlinkat",
            "symlink",
            "mkdir",
            "fsetxattr",
        ],
        &[
            "write", "writev", "dup2", "read", "readv", "dup", "fcntl", "fcntl64", "ioctl",
            "lseek", "_llseek",
        ],
    ];

    let mut last = None;
    for syscall in categories.iter().flat_map(|c| c.iter()) {
        let index = first_index(&policy, syscall);
        if let Some((prev_name, prev_index)) = last {
            assert!(
                index > prev_index,
                "'{}' (#{}) should come after '{}' (#{})",
                syscall,
                index,
                prev_name,
                prev_index
            );
        }
        last = Some((*syscall, index));
    }
}

/// Building the same configuration twice yields element-wise equal rules.
#[test]
fn builds_are_deterministic() {
    for allow_fork in [false, true] {
        for read_only in [false, true] {
            let a = build(allow_fork, read_only);
            let b = build(allow_fork, read_only);
            assert_eq!(a.rules(), b.rules());
        }
    }
    assert_ne!(build(false, true).rules(), build(false, false).rules());
}

/// execve passes once and kills afterwards, regardless of arguments.
#[test]
fn execve_one_shot_gate() {
    let policy = build(false, true);
    let (_, verdict) = policy.evaluate("execve", &args(&[])).unwrap();
    let Verdict::Defer(gate) = verdict else {
        panic!("execve must be traced, got {}", verdict);
    };

    assert_eq!(gate.decide(&args(&[0x1000, 0x2000, 0x3000])), TraceAction::Continue);
    assert_eq!(gate.decide(&args(&[0x1000, 0x2000, 0x3000])), TraceAction::Kill);
    assert_eq!(gate.decide(&args(&[])), TraceAction::Kill);
}

/// Each build carries its own gate state.
#[test]
fn execve_gate_is_per_policy_instance() {
    let first = build(false, true);
    let second = build(false, true);
    let arch = TargetArch::X86_64;
    let execve = 59;

    assert_eq!(first.on_trap(arch, execve, &args(&[])), TraceAction::Continue);
    assert_eq!(first.on_trap(arch, execve, &args(&[])), TraceAction::Kill);
    assert_eq!(second.on_trap(arch, execve, &args(&[])), TraceAction::Continue);
}

/// kill/tkill validate argument 1, tgkill validates argument 2.
#[test]
fn signal_validators() {
    let policy = build(false, true);
    let decide = |syscall: &str, values: &[i64]| match policy.evaluate(syscall, &args(values)) {
        Some((_, Verdict::Defer(d))) => d.decide(&args(values)),
        other => panic!("{} must be traced, got {:?}", syscall, other.map(|(_, v)| v.kind())),
    };

    for syscall in ["kill", "tkill"] {
        assert_eq!(decide(syscall, &[100, libc::SIGUSR1 as i64]), TraceAction::Continue);
        assert_eq!(decide(syscall, &[100, 64]), TraceAction::Continue);
        assert_eq!(decide(syscall, &[100, 0]), TraceAction::Kill);
        assert_eq!(decide(syscall, &[100, -1]), TraceAction::Kill);
        assert_eq!(decide(syscall, &[100, 65]), TraceAction::Kill);
    }

    assert_eq!(decide("tgkill", &[100, 101, libc::SIGUSR1 as i64]), TraceAction::Continue);
    assert_eq!(decide("tgkill", &[100, 101, 0]), TraceAction::Kill);
    assert_eq!(decide("tgkill", &[100, 101, -3]), TraceAction::Kill);
    assert_eq!(decide("tgkill", &[100, 101, 65]), TraceAction::Kill);
    // a valid number in the wrong slot does not help
    assert_eq!(decide("tgkill", &[100, libc::SIGUSR1 as i64, 0]), TraceAction::Kill);
}

/// exit, exit_group and set_thread_area are traced but never denied.
#[test]
fn observation_traces_continue() {
    let policy = build(false, true);
    for syscall in ["exit", "exit_group", "set_thread_area"] {
        match policy.evaluate(syscall, &args(&[1])) {
            Some((_, Verdict::Defer(d))) => {
                assert_eq!(d.decide(&args(&[1])), TraceAction::Continue, "{}", syscall)
            }
            _ => panic!("{} must be traced", syscall),
        }
    }
}

/// write/writev: any descriptor but stdin.
#[test]
fn write_gating() {
    let policy = build(false, true);
    for syscall in ["write", "writev"] {
        for fd in [1, 2, 3, 42] {
            let (_, verdict) = policy.evaluate(syscall, &args(&[fd])).unwrap();
            assert_eq!(verdict, Verdict::Allow, "{} to fd {}", syscall, fd);
        }
        assert!(policy.evaluate(syscall, &args(&[0])).is_none());
    }
}

/// dup2 may not clobber the standard streams, close may not close them.
#[test]
fn standard_stream_protection() {
    let policy = build(false, true);
    for new_fd in [0, 1, 2] {
        assert!(policy.evaluate("dup2", &args(&[5, new_fd])).is_none());
        assert!(policy.evaluate("close", &args(&[new_fd])).is_none());
    }
    assert_eq!(policy.evaluate("dup2", &args(&[1, 3])).unwrap().1, Verdict::Allow);
    assert_eq!(policy.evaluate("close", &args(&[3])).unwrap().1, Verdict::Allow);
}

/// lseek/_llseek: ESPIPE on 0-2, allowed from 3 up.
#[test]
fn seek_gating() {
    let policy = build(false, true);
    for syscall in ["lseek", "_llseek"] {
        assert_eq!(
            kinds_for(&policy, syscall),
            vec![(ActionKind::Errno, true), (ActionKind::Allow, true)]
        );
        for fd in [0, 1, 2] {
            let (_, verdict) = policy.evaluate(syscall, &args(&[fd])).unwrap();
            assert_eq!(verdict, Verdict::Deny(libc::ESPIPE), "{} on fd {}", syscall, fd);
        }
        for fd in [3, 4, 1000] {
            let (_, verdict) = policy.evaluate(syscall, &args(&[fd])).unwrap();
            assert_eq!(verdict, Verdict::Allow, "{} on fd {}", syscall, fd);
        }
        // signed compare: a negative fd is "at most 2"
        let (_, verdict) = policy.evaluate(syscall, &args(&[-1])).unwrap();
        assert_eq!(verdict, Verdict::Deny(libc::ESPIPE));
    }
}

#[test]
fn ioctl_is_not_a_typewriter() {
    let policy = build(false, true);
    for fd in [0, 1, 7] {
        let (_, verdict) = policy.evaluate("ioctl", &args(&[fd])).unwrap();
        assert_eq!(verdict, Verdict::Deny(libc::ENOTTY));
    }
}

#[test]
fn prlimit64_is_denied() {
    let policy = build(true, false);
    let (_, verdict) = policy.evaluate("prlimit64", &args(&[0])).unwrap();
    assert_eq!(verdict, Verdict::Deny(libc::EPERM));
}

/// read-only: open only without O_RDWR, mutations get EPERM.
#[test]
fn read_only_filesystem() {
    let policy = build(false, true);

    let read_only_flags = (libc::O_RDONLY | libc::O_CLOEXEC) as i64;
    let (rule, verdict) = policy.evaluate("open", &args(&[0x1000, read_only_flags])).unwrap();
    assert_eq!(verdict, Verdict::Allow);
    let predicate = rule.predicate().expect("read-only open must be conditional");
    assert_eq!(predicate.arg(), ArgIndex::Arg1);
    assert_eq!(predicate.comparator(), Comparator::MaskedEq(libc::O_RDWR as i64));
    assert_eq!(predicate.value(), 0);

    let read_write_flags = (libc::O_RDWR | libc::O_CREAT) as i64;
    assert!(policy.evaluate("open", &args(&[0x1000, read_write_flags])).is_none());

    assert_eq!(
        policy.evaluate("unlink", &args(&[0x1000])).unwrap().1,
        Verdict::Deny(libc::EPERM)
    );
}

/// read-write: open and unlink are unconditional allows.
#[test]
fn read_write_filesystem() {
    let policy = build(false, false);
    for syscall in ["open", "unlink", "unlinkat", "symlink", "mkdir", "fsetxattr"] {
        assert_eq!(kinds_for(&policy, syscall), vec![(ActionKind::Allow, false)], "{}", syscall);
    }
    let flags = (libc::O_RDWR | libc::O_CREAT) as i64;
    assert_eq!(policy.evaluate("open", &args(&[0x1000, flags])).unwrap().1, Verdict::Allow);
}

#[test]
fn fork_only_when_enabled() {
    assert!(!build(false, true).contains("fork"));
    assert!(!build(false, false).contains("fork"));

    let policy = build(true, true);
    assert!(policy.contains("fork"));
    assert_eq!(kinds_for(&policy, "fork"), vec![(ActionKind::Allow, false)]);
}

/// End-to-end: allow_fork=false, read_only=true.
#[test]
fn strict_session_scenario() {
    let policy = build(false, true);

    assert!(!policy.contains("fork"));

    let open_rules: Vec<_> = policy.rules_for("open").collect();
    assert_eq!(open_rules.len(), 1);
    assert_eq!(*open_rules[0].action(), Action::Allow);
    assert!(open_rules[0].is_conditional());

    for syscall in ["unlink", "mkdir", "symlink", "fsetxattr"] {
        let actions: Vec<_> = policy.rules_for(syscall).map(|r| r.action()).collect();
        assert_eq!(actions, vec![&Action::Errno(libc::EPERM)], "{}", syscall);
        assert!(policy.rules_for(syscall).all(|r| !r.is_conditional()));
    }

    assert!(policy.unreachable_rules().is_empty());
}

/// Trap handling through syscall numbers on both ABIs.
#[test]
fn tracer_numbers_on_both_abis() {
    let policy = build(false, true);

    // tgkill: x86_64 234, i386 270
    let valid = args(&[10, 11, libc::SIGALRM as i64]);
    let invalid = args(&[10, 11, 0]);
    assert_eq!(policy.on_trap(TargetArch::X86_64, 234, &valid), TraceAction::Continue);
    assert_eq!(policy.on_trap(TargetArch::X86, 270, &valid), TraceAction::Continue);
    assert_eq!(policy.on_trap(TargetArch::X86_64, 234, &invalid), TraceAction::Kill);

    // set_thread_area: x86_64 205, i386 243
    assert_eq!(policy.on_trap(TargetArch::X86, 243, &args(&[])), TraceAction::Continue);
    assert_eq!(policy.on_trap(TargetArch::X86_64, 205, &args(&[])), TraceAction::Continue);

    // exit_group: x86_64 231, i386 252
    assert_eq!(policy.on_trap(TargetArch::X86_64, 231, &args(&[3])), TraceAction::Continue);
    assert_eq!(policy.on_trap(TargetArch::X86, 252, &args(&[3])), TraceAction::Continue);
}

/// The rule list is readable from several threads at once.
#[test]
fn concurrent_readers() {
    let policy = build(false, true);
    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..100 {
                    let (_, verdict) = policy.evaluate("lseek", &args(&[1])).unwrap();
                    assert_eq!(verdict, Verdict::Deny(libc::ESPIPE));
                }
            });
        }
    });
}
