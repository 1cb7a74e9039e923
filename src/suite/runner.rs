//! Sequential check runner
//!
//! Runs selected checks one at a time against one instance and prints a
//! colored line per check plus a summary.

use colored::Colorize;

use super::{all_checks, run_check, CheckContext, CheckOutcome};
use crate::common::{Error, Result};

/// Result of one executed check
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub outcome: Outcome,
}

#[derive(Debug)]
pub enum Outcome {
    Passed,
    Skipped(String),
    Failed(String),
}

/// Aggregate over a run
#[derive(Debug, Default)]
pub struct SuiteReport {
    pub results: Vec<CheckResult>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Passed))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Resolve the checks to run: `names` (empty means the full registry)
/// minus `skip`
///
/// Unknown names in either list fail fast before anything runs, so a typo
/// in a skip never silently runs the check it meant to exclude.
fn select_checks<'a>(names: &'a [String], skip: &[String]) -> Result<Vec<&'a str>> {
    for name in names.iter().chain(skip) {
        if !all_checks().iter().any(|c| c.name == name.as_str()) {
            return Err(Error::UnknownCheck(name.clone()));
        }
    }

    let base: Vec<&str> = if names.is_empty() {
        all_checks().iter().map(|c| c.name).collect()
    } else {
        names.iter().map(String::as_str).collect()
    };
    Ok(base
        .into_iter()
        .filter(|name| !skip.iter().any(|s| s == name))
        .collect())
}

/// Run the selected checks in order, continuing past failures
pub async fn run_checks(
    ctx: &CheckContext,
    names: &[String],
    skip: &[String],
) -> Result<SuiteReport> {
    let selected = select_checks(names, skip)?;

    println!(
        "\n{} {} check(s) against instance {}\n",
        "Running".blue().bold(),
        selected.len(),
        ctx.instance().white().bold()
    );

    let mut report = SuiteReport::default();

    for name in selected {
        tracing::info!(check = name, "starting check");
        let outcome = match run_check(ctx, name).await {
            Ok(CheckOutcome::Passed) => {
                println!("  {} {}", "✓".green(), name);
                Outcome::Passed
            }
            Ok(CheckOutcome::Skipped(reason)) => {
                println!("  {} {} ({})", "-".yellow(), name, reason.dimmed());
                Outcome::Skipped(reason)
            }
            Err(e) => {
                println!("  {} {}: {}", "✗".red(), name, e);
                Outcome::Failed(e.to_string())
            }
        };
        report.results.push(CheckResult {
            name: name.to_string(),
            outcome,
        });
    }

    let summary = format!(
        "{} passed, {} failed, {} skipped",
        report.passed(),
        report.failed(),
        report.skipped()
    );
    if report.all_passed() {
        println!("\n{} {}\n", "✓".green().bold(), summary.green());
    } else {
        println!("\n{} {}\n", "✗".red().bold(), summary.red());
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let report = SuiteReport {
            results: vec![
                CheckResult {
                    name: "a".to_string(),
                    outcome: Outcome::Passed,
                },
                CheckResult {
                    name: "b".to_string(),
                    outcome: Outcome::Skipped("not xenial".to_string()),
                },
                CheckResult {
                    name: "c".to_string(),
                    outcome: Outcome::Failed("boom".to_string()),
                },
            ],
        };
        assert_eq!(report.passed(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.all_passed());
    }

    #[test]
    fn test_select_skip_filters_full_registry() {
        let skip = vec!["ntp-sync".to_string(), "dev-tools-removed".to_string()];
        let selected = select_checks(&[], &skip).unwrap();
        assert_eq!(selected.len(), all_checks().len() - 2);
        assert!(!selected.contains(&"ntp-sync"));
        assert!(!selected.contains(&"dev-tools-removed"));
    }

    #[test]
    fn test_select_skip_applies_to_explicit_names() {
        let names = vec!["eth0-present".to_string(), "ipv6-disabled".to_string()];
        let skip = vec!["ipv6-disabled".to_string()];
        let selected = select_checks(&names, &skip).unwrap();
        assert_eq!(selected, vec!["eth0-present"]);
    }

    #[test]
    fn test_select_rejects_unknown_skip_name() {
        let skip = vec!["ntp-snyc".to_string()];
        let err = select_checks(&[], &skip).unwrap_err();
        assert!(matches!(err, Error::UnknownCheck(_)));
    }
}
