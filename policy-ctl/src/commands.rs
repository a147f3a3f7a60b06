use std::collections::BTreeMap;
use std::io;

use console::style;
use log::info;
use serde::Serialize;

use sandbox_policy::{
    Action, ActionKind, Policy, Result, Rule, SyscallArgs, SyscallName, TargetArch, Verdict,
};

/// Flat, serializable view of one rule
#[derive(Debug, Serialize)]
pub struct RuleRecord {
    pub index: usize,
    pub syscall: &'static str,
    pub numbers: BTreeMap<TargetArch, i64>,
    pub action: ActionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errno: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicate: Option<String>,
}

impl RuleRecord {
    pub fn new(index: usize, rule: &Rule) -> Self {
        let (errno, decision) = match rule.action() {
            Action::Errno(code) => (Some(*code), None),
            Action::Trace(d) => (None, Some(d.name())),
            Action::Allow | Action::Kill => (None, None),
        };
        Self {
            index,
            syscall: rule.syscall().name(),
            numbers: rule.syscall().numbers().iter().copied().collect(),
            action: rule.action().kind(),
            errno,
            decision,
            predicate: rule.predicate().map(|p| p.to_string()),
        }
    }
}

pub fn rule_records(policy: &Policy) -> Vec<RuleRecord> {
    policy
        .rules()
        .iter()
        .enumerate()
        .map(|(i, r)| RuleRecord::new(i, r))
        .collect()
}

fn styled_action(action: &Action) -> String {
    let text = action.to_string();
    match action.kind() {
        ActionKind::Allow => style(text).green().to_string(),
        ActionKind::Errno => style(text).yellow().to_string(),
        ActionKind::Kill => style(text).red().bold().to_string(),
        ActionKind::Trace => style(text).cyan().to_string(),
    }
}

fn numbers_column(name: &SyscallName, arches: &[TargetArch]) -> String {
    arches
        .iter()
        .map(|&arch| match name.number(arch) {
            Some(nr) => format!("{}:{}", arch, nr),
            None => format!("{}:-", arch),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn print_rules(policy: &Policy, json: bool) -> Result<()> {
    info!("Listing {} policy rules", policy.len());

    if json {
        let out = serde_json::to_string_pretty(&rule_records(policy)).map_err(io::Error::from)?;
        println!("{}", out);
        return Ok(());
    }

    for (i, rule) in policy.rules().iter().enumerate() {
        let condition = rule
            .predicate()
            .map(|p| format!("if {}", p))
            .unwrap_or_default();
        println!(
            "  {:>3}  {:18} {:24} {:24} {}",
            i,
            rule.syscall().name(),
            numbers_column(rule.syscall(), policy.arches()),
            styled_action(rule.action()),
            condition
        );
    }
    println!();
    println!(
        "{} rules, {} traced syscalls",
        policy.len(),
        policy.traced_syscalls().len()
    );
    Ok(())
}

/// Outcome of evaluating one syscall occurrence, as printed by `check`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    NoMatch,
    Matched { rule: usize, verdict: String },
}

pub fn evaluate(policy: &Policy, syscall: &str, values: &[i64]) -> Result<CheckOutcome> {
    // reject names the table does not know instead of reporting "no rule"
    SyscallName::resolve(syscall, policy.arches())?;
    let args = SyscallArgs::from_slice(values)?;

    let Some(index) = policy.first_match(syscall, &args) else {
        return Ok(CheckOutcome::NoMatch);
    };

    let verdict = match policy.rules()[index].action().decide() {
        Verdict::Defer(decision) => {
            format!("defer({}) -> {}", decision.name(), decision.decide(&args))
        }
        other => other.to_string(),
    };
    Ok(CheckOutcome::Matched {
        rule: index,
        verdict,
    })
}

pub fn check(policy: &Policy, syscall: &str, values: &[i64]) -> Result<()> {
    info!("Checking {} with arguments {:?}", syscall, values);
    match evaluate(policy, syscall, values)? {
        CheckOutcome::NoMatch => println!(
            "{} {}: no rule matches (default disposition applies)",
            style("?").yellow().bold(),
            syscall
        ),
        CheckOutcome::Matched { rule, verdict } => println!(
            "{} {}: rule #{} ({}) -> {}",
            style("✓").green().bold(),
            syscall,
            rule,
            policy.rules()[rule],
            verdict
        ),
    }
    Ok(())
}

/// Print unreachable rules. Returns true when the policy is clean.
pub fn lint(policy: &Policy) -> bool {
    info!("Linting policy");
    let shadowed = policy.unreachable_rules();
    if shadowed.is_empty() {
        println!("[✓] No unreachable rules ({} rules checked)", policy.len());
        return true;
    }

    for s in &shadowed {
        println!(
            "[✗] rule #{} ({}) is shadowed by rule #{} ({})",
            s.index,
            policy.rules()[s.index],
            s.shadowed_by,
            policy.rules()[s.shadowed_by]
        );
    }
    false
}

pub fn list_arches() {
    println!("Supported architectures:\n");
    for arch in TargetArch::all() {
        println!(
            "  {:8} - {}-bit syscall ABI, {} syscalls known",
            arch.name(),
            arch.word_bits(),
            sandbox_policy::syscall_table::len(arch)
        );
    }
    println!();
    println!("Use --arch <ARCH> (repeatable) to restrict resolution");
}
