//! Target architectures a policy can be resolved for

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SandboxError;

/// Syscall ABI of a tracee.
///
/// A 64-bit x86 host can run tracees on either ABI, so a policy is usually
/// resolved for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TargetArch {
    /// x86_64 native ABI
    #[serde(rename = "x86_64", alias = "amd64")]
    X86_64,
    /// i386 ABI (also the compat ABI on x86_64 hosts)
    #[serde(rename = "x86", alias = "i386")]
    X86,
}

impl TargetArch {
    /// Get all supported architectures
    pub fn all() -> [TargetArch; 2] {
        [TargetArch::X86_64, TargetArch::X86]
    }

    /// Canonical lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            TargetArch::X86_64 => "x86_64",
            TargetArch::X86 => "x86",
        }
    }

    /// Width in bits of a syscall argument register
    pub fn word_bits(&self) -> u32 {
        match self {
            TargetArch::X86_64 => 64,
            TargetArch::X86 => 32,
        }
    }
}

impl fmt::Display for TargetArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TargetArch {
    type Err = SandboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x86_64" | "amd64" => Ok(TargetArch::X86_64),
            "x86" | "i386" | "i686" => Ok(TargetArch::X86),
            other => Err(SandboxError::InvalidConfig(format!(
                "Unsupported architecture: '{}'",
                other
            ))),
        }
    }
}

/// Join architecture names for messages ("x86_64, x86")
pub fn join_arches(arches: &[TargetArch]) -> String {
    arches
        .iter()
        .map(TargetArch::name)
        .collect::<Vec<_>>()
        .join(", ")
}
