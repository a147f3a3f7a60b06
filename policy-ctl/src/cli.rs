use clap::{Parser, Subcommand};
use sandbox_policy::TargetArch;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "policy-ctl")]
#[command(version, about = "Inspect and evaluate the sandbox syscall policy", long_about = None)]
#[command(after_help = "EXAMPLES:
    # Print the default (read-only, no fork) rule table
    policy-ctl rules
    policy-ctl rules --json --read-write --allow-fork

    # Evaluate a syscall occurrence
    policy-ctl check write 1 0x7ffd0000 12
    policy-ctl check lseek 2 0 0
    policy-ctl check tgkill 100 101 9

    # Find dead rules
    policy-ctl lint --arch x86_64 --config policy.json
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// JSON policy configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Allow the fork syscall
    #[arg(long, global = true)]
    pub allow_fork: bool,

    /// Allow filesystem mutation and read-write open
    #[arg(long, global = true)]
    pub read_write: bool,

    /// Target architecture (repeatable; default: x86_64 and x86)
    #[arg(short, long = "arch", value_name = "ARCH", global = true)]
    pub arches: Vec<TargetArch>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the ordered rule table
    Rules {
        /// Emit JSON records instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Evaluate the first matching rule for one syscall occurrence
    Check {
        /// Syscall name
        syscall: String,

        /// Argument values (decimal, 0x-hex, may be negative)
        #[arg(allow_hyphen_values = true, value_parser = parse_syscall_arg)]
        args: Vec<i64>,
    },

    /// Report rules shadowed by earlier rules
    Lint,

    /// List supported architectures
    Arches,
}

/// Parse a syscall argument: `42`, `-1`, `0x1ff`
pub fn parse_syscall_arg(s: &str) -> Result<i64, String> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };

    let magnitude = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).map(|v| v as i64),
        None => digits.parse::<i64>(),
    }
    .map_err(|e| format!("invalid syscall argument '{}': {}", s, e))?;

    Ok(if negative {
        magnitude.wrapping_neg()
    } else {
        magnitude
    })
}
