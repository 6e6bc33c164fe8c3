//! Plain-text scenario reports

use crate::runner::ScenarioReport;
use std::fmt::Write;

/// Render one scenario report
pub fn render(report: &ScenarioReport) -> String {
    let mut out = String::new();
    let passed = report.outcomes.iter().filter(|o| o.passed).count();
    let total = report.outcomes.len() + report.skipped;
    let status = if report.passed() { "PASS" } else { "FAIL" };

    let _ = writeln!(
        out,
        "[{}] {} ({}): {}/{} steps passed",
        status,
        report.name,
        report.path.display(),
        passed,
        total
    );

    for outcome in report.failures() {
        let _ = writeln!(
            out,
            "  step {} ({}): {}",
            outcome.index,
            outcome.operation,
            outcome.detail.as_deref().unwrap_or("failed")
        );
    }
    if report.skipped > 0 {
        let _ = writeln!(out, "  {} steps skipped", report.skipped);
    }

    out
}

/// One-line summary across every scenario
pub fn summary(reports: &[ScenarioReport]) -> String {
    let failed = reports.iter().filter(|r| !r.passed()).count();
    format!(
        "{} scenarios, {} passed, {} failed",
        reports.len(),
        reports.len() - failed,
        failed
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::StepOutcome;
    use hooks_mock::RegistrySnapshot;
    use std::path::PathBuf;

    fn report(outcomes: Vec<StepOutcome>, skipped: usize) -> ScenarioReport {
        ScenarioReport {
            name: "hooks".to_string(),
            path: PathBuf::from("hooks.toml"),
            outcomes,
            skipped,
            snapshot: RegistrySnapshot::default(),
        }
    }

    fn outcome(index: usize, passed: bool, detail: Option<&str>) -> StepOutcome {
        StepOutcome {
            index,
            operation: "assert_fired",
            passed,
            detail: detail.map(str::to_string),
        }
    }

    #[test]
    fn test_render_pass() {
        let text = render(&report(vec![outcome(1, true, None)], 0));
        assert_eq!(text, "[PASS] hooks (hooks.toml): 1/1 steps passed\n");
    }

    #[test]
    fn test_render_failures() {
        let text = render(&report(
            vec![
                outcome(1, true, None),
                outcome(2, false, Some("Hook assertion failed: init action was not fired")),
            ],
            3,
        ));
        assert!(text.starts_with("[FAIL] hooks (hooks.toml): 1/5 steps passed\n"));
        assert!(text.contains(
            "  step 2 (assert_fired): Hook assertion failed: init action was not fired\n"
        ));
        assert!(text.ends_with("  3 steps skipped\n"));
    }

    #[test]
    fn test_summary() {
        let reports = vec![
            report(vec![outcome(1, true, None)], 0),
            report(vec![outcome(1, false, None)], 0),
        ];
        assert_eq!(summary(&reports), "2 scenarios, 1 passed, 1 failed");
    }
}
