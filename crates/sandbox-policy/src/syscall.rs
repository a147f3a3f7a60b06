//! Resolved syscall identifiers

use std::fmt;

use log::debug;
use sandbox_core::arch::join_arches;
use sandbox_core::{Result, SandboxError, TargetArch};
use serde::Serialize;

use crate::syscall_table::{canonical_name, get_syscall_number_from_name};

/// A syscall name resolved against a set of target architectures.
///
/// Holds the number on every configured architecture where the syscall
/// exists. Some names only exist on one ABI (`mmap2`, `_llseek` are i386
/// only), so a partial or even empty resolution is valid as long as some
/// supported architecture knows the name. A name no supported architecture
/// knows is a typo and fails.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SyscallName {
    name: &'static str,
    numbers: Vec<(TargetArch, i64)>,
}

impl SyscallName {
    /// Resolve `name` for each architecture in `arches`
    pub fn resolve(name: &str, arches: &[TargetArch]) -> Result<Self> {
        if arches.is_empty() {
            return Err(SandboxError::InvalidConfig(
                "At least one target architecture is required".to_string(),
            ));
        }

        let Some(canonical) = TargetArch::all()
            .into_iter()
            .find_map(|arch| canonical_name(arch, name))
        else {
            return Err(SandboxError::UnknownSyscall {
                name: name.to_string(),
                arches: join_arches(&TargetArch::all()),
            });
        };

        let mut numbers = Vec::with_capacity(arches.len());
        for &arch in arches {
            match get_syscall_number_from_name(arch, name) {
                Some(nr) => numbers.push((arch, nr)),
                None => debug!("syscall {} does not exist on {}, skipped", canonical, arch),
            }
        }

        Ok(Self {
            name: canonical,
            numbers,
        })
    }

    /// Whether the syscall exists on at least one configured architecture
    pub fn is_resolved(&self) -> bool {
        !self.numbers.is_empty()
    }

    /// Canonical syscall name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Syscall number on `arch`, if the syscall exists there
    pub fn number(&self, arch: TargetArch) -> Option<i64> {
        self.numbers
            .iter()
            .find(|(a, _)| *a == arch)
            .map(|(_, nr)| *nr)
    }

    /// All (architecture, number) pairs this name resolved to
    pub fn numbers(&self) -> &[(TargetArch, i64)] {
        &self.numbers
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }
}

impl fmt::Display for SyscallName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
