//! Syscall name → number tables for the supported architectures
//!
//! Covers every syscall the default policy names plus their close relatives
//! (`*at` variants, 64-bit stat calls), so custom rules can reach them too.

use std::collections::HashMap;
use std::sync::OnceLock;

use sandbox_core::TargetArch;

static X86_64_SYSCALLS: &[(&str, i64)] = &[
    ("read", 0),
    ("write", 1),
    ("open", 2),
    ("close", 3),
    ("stat", 4),
    ("fstat", 5),
    ("lstat", 6),
    ("poll", 7),
    ("lseek", 8),
    ("mmap", 9),
    ("mprotect", 10),
    ("munmap", 11),
    ("brk", 12),
    ("rt_sigaction", 13),
    ("rt_sigprocmask", 14),
    ("rt_sigreturn", 15),
    ("ioctl", 16),
    ("pread64", 17),
    ("pwrite64", 18),
    ("readv", 19),
    ("writev", 20),
    ("access", 21),
    ("pipe", 22),
    ("select", 23),
    ("sched_yield", 24),
    ("mremap", 25),
    ("madvise", 28),
    ("dup", 32),
    ("dup2", 33),
    ("nanosleep", 35),
    ("getpid", 39),
    ("socket", 41),
    ("connect", 42),
    ("clone", 56),
    ("fork", 57),
    ("vfork", 58),
    ("execve", 59),
    ("exit", 60),
    ("wait4", 61),
    ("kill", 62),
    ("uname", 63),
    ("fcntl", 72),
    ("flock", 73),
    ("fsync", 74),
    ("getdents", 78),
    ("getcwd", 79),
    ("chdir", 80),
    ("rename", 82),
    ("mkdir", 83),
    ("rmdir", 84),
    ("link", 86),
    ("unlink", 87),
    ("symlink", 88),
    ("readlink", 89),
    ("chmod", 90),
    ("umask", 95),
    ("gettimeofday", 96),
    ("getrlimit", 97),
    ("getrusage", 98),
    ("sysinfo", 99),
    ("ptrace", 101),
    ("getuid", 102),
    ("getgid", 104),
    ("setuid", 105),
    ("setgid", 106),
    ("geteuid", 107),
    ("getegid", 108),
    ("getppid", 110),
    ("rt_sigsuspend", 130),
    ("sigaltstack", 131),
    ("getpriority", 140),
    ("setpriority", 141),
    ("prctl", 157),
    ("arch_prctl", 158),
    ("setrlimit", 160),
    ("mount", 165),
    ("gettid", 186),
    ("setxattr", 188),
    ("lsetxattr", 189),
    ("fsetxattr", 190),
    ("getxattr", 191),
    ("lgetxattr", 192),
    ("fgetxattr", 193),
    ("listxattr", 194),
    ("llistxattr", 195),
    ("flistxattr", 196),
    ("tkill", 200),
    ("time", 201),
    ("futex", 202),
    ("set_thread_area", 205),
    ("get_thread_area", 211),
    ("getdents64", 217),
    ("set_tid_address", 218),
    ("restart_syscall", 219),
    ("clock_gettime", 228),
    ("clock_getres", 229),
    ("clock_nanosleep", 230),
    ("exit_group", 231),
    ("tgkill", 234),
    ("openat", 257),
    ("mkdirat", 258),
    ("newfstatat", 262),
    ("unlinkat", 263),
    ("symlinkat", 266),
    ("readlinkat", 267),
    ("faccessat", 269),
    ("set_robust_list", 273),
    ("get_robust_list", 274),
    ("dup3", 292),
    ("pipe2", 293),
    ("prlimit64", 302),
    ("getcpu", 309),
    ("getrandom", 318),
    ("execveat", 322),
    ("statx", 332),
    ("rseq", 334),
    ("clone3", 435),
];

static X86_SYSCALLS: &[(&str, i64)] = &[
    ("restart_syscall", 0),
    ("exit", 1),
    ("fork", 2),
    ("read", 3),
    ("write", 4),
    ("open", 5),
    ("close", 6),
    ("waitpid", 7),
    ("unlink", 10),
    ("execve", 11),
    ("chdir", 12),
    ("time", 13),
    ("chmod", 15),
    ("lseek", 19),
    ("getpid", 20),
    ("mount", 21),
    ("setuid", 23),
    ("getuid", 24),
    ("ptrace", 26),
    ("access", 33),
    ("kill", 37),
    ("rename", 38),
    ("mkdir", 39),
    ("rmdir", 40),
    ("dup", 41),
    ("pipe", 42),
    ("brk", 45),
    ("setgid", 46),
    ("getgid", 47),
    ("geteuid", 49),
    ("getegid", 50),
    ("ioctl", 54),
    ("fcntl", 55),
    ("oldolduname", 59),
    ("umask", 60),
    ("dup2", 63),
    ("getppid", 64),
    ("sigaction", 67),
    ("sigsuspend", 72),
    ("setrlimit", 75),
    ("getrlimit", 76),
    ("getrusage", 77),
    ("gettimeofday", 78),
    ("symlink", 83),
    ("readlink", 85),
    ("mmap", 90),
    ("munmap", 91),
    ("getpriority", 96),
    ("setpriority", 97),
    ("stat", 106),
    ("lstat", 107),
    ("fstat", 108),
    ("olduname", 109),
    ("wait4", 114),
    ("sysinfo", 116),
    ("fsync", 118),
    ("sigreturn", 119),
    ("clone", 120),
    ("uname", 122),
    ("mprotect", 125),
    ("_llseek", 140),
    ("getdents", 141),
    ("flock", 143),
    ("readv", 145),
    ("writev", 146),
    ("sched_yield", 158),
    ("nanosleep", 162),
    ("mremap", 163),
    ("poll", 168),
    ("prctl", 172),
    ("rt_sigreturn", 173),
    ("rt_sigaction", 174),
    ("rt_sigprocmask", 175),
    ("rt_sigsuspend", 179),
    ("pread64", 180),
    ("pwrite64", 181),
    ("getcwd", 183),
    ("sigaltstack", 186),
    ("vfork", 190),
    ("ugetrlimit", 191),
    ("mmap2", 192),
    ("stat64", 195),
    ("lstat64", 196),
    ("fstat64", 197),
    ("madvise", 219),
    ("getdents64", 220),
    ("fcntl64", 221),
    ("gettid", 224),
    ("setxattr", 226),
    ("lsetxattr", 227),
    ("fsetxattr", 228),
    ("getxattr", 229),
    ("lgetxattr", 230),
    ("fgetxattr", 231),
    ("listxattr", 232),
    ("llistxattr", 233),
    ("flistxattr", 234),
    ("tkill", 238),
    ("futex", 240),
    ("set_thread_area", 243),
    ("get_thread_area", 244),
    ("exit_group", 252),
    ("set_tid_address", 258),
    ("clock_gettime", 265),
    ("clock_getres", 266),
    ("clock_nanosleep", 267),
    ("tgkill", 270),
    ("openat", 295),
    ("mkdirat", 296),
    ("unlinkat", 301),
    ("symlinkat", 304),
    ("readlinkat", 305),
    ("faccessat", 307),
    ("set_robust_list", 311),
    ("get_robust_list", 312),
    ("getcpu", 318),
    ("dup3", 330),
    ("pipe2", 331),
    ("prlimit64", 340),
    ("getrandom", 355),
    ("execveat", 358),
    ("socket", 359),
    ("connect", 362),
    ("statx", 383),
    ("arch_prctl", 384),
    ("rseq", 386),
    ("clone3", 435),
];

fn raw_table(arch: TargetArch) -> &'static [(&'static str, i64)] {
    match arch {
        TargetArch::X86_64 => X86_64_SYSCALLS,
        TargetArch::X86 => X86_SYSCALLS,
    }
}

fn name_index(arch: TargetArch) -> &'static HashMap<&'static str, i64> {
    static X86_64_INDEX: OnceLock<HashMap<&'static str, i64>> = OnceLock::new();
    static X86_INDEX: OnceLock<HashMap<&'static str, i64>> = OnceLock::new();

    let cell = match arch {
        TargetArch::X86_64 => &X86_64_INDEX,
        TargetArch::X86 => &X86_INDEX,
    };
    cell.get_or_init(|| raw_table(arch).iter().copied().collect())
}

/// Look up a syscall number by name
#[inline]
pub fn get_syscall_number_from_name(arch: TargetArch, name: &str) -> Option<i64> {
    name_index(arch).get(name).copied()
}

/// Look up the canonical (static) name of a syscall
#[inline]
pub fn canonical_name(arch: TargetArch, name: &str) -> Option<&'static str> {
    name_index(arch).get_key_value(name).map(|(k, _)| *k)
}

/// Reverse lookup: syscall number → name
pub fn get_syscall_name_from_number(arch: TargetArch, number: i64) -> Option<&'static str> {
    raw_table(arch)
        .iter()
        .find(|(_, nr)| *nr == number)
        .map(|(name, _)| *name)
}

/// Number of syscalls known for an architecture
pub fn len(arch: TargetArch) -> usize {
    raw_table(arch).len()
}
