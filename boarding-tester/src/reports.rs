use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use crate::runner::ScenarioResult;

fn pass_counts(results: &[ScenarioResult]) -> (usize, usize, f64) {
    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    #[allow(clippy::cast_precision_loss)]
    let success_rate = if total == 0 {
        0.0
    } else {
        (passed as f64 / total as f64) * 100.0
    };
    (total, passed, success_rate)
}

pub fn generate_console_report(
    out: &mut dyn Write,
    results: &[ScenarioResult],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Boarding Test Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "================================".cyan())?;

    let (total, passed, success_rate) = pass_counts(results);
    writeln!(out, "Total runs: {total}")?;
    writeln!(out, "Passed: {}", passed.to_string().green())?;
    writeln!(out, "Failed: {}", (total - passed).to_string().red())?;
    writeln!(out, "Success rate: {success_rate:.1}%")?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(
            out,
            "{} {} [{} seed {}]",
            status,
            result.scenario_name.bold(),
            result.duel,
            result.seed
        )?;
        writeln!(
            out,
            "   Iterations: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(
            out,
            "   Boarder wins: {:.0}% (invasion odds {:.0}%), {:.1} turns on average",
            result.boarder_win_rate * 100.0,
            result.predicted_invasion_victory * 100.0,
            result.mean_turns
        )?;
        if result.stalemates > 0 {
            writeln!(
                out,
                "   Stalemates: {}",
                result.stalemates.to_string().yellow()
            )?;
        }
        if !result.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &result.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }

    let fastest = results.iter().min_by_key(|r| r.average_duration);
    let slowest = results.iter().max_by_key(|r| r.average_duration);
    if let (Some(fastest), Some(slowest)) = (fastest, slowest) {
        writeln!(out, "{}", "⚡ Performance Summary".bright_yellow().bold())?;
        writeln!(out, "{}", "=====================".yellow())?;
        writeln!(
            out,
            "Fastest: {} ({:?})",
            fastest.duel.green(),
            fastest.average_duration
        )?;
        writeln!(
            out,
            "Slowest: {} ({:?})",
            slowest.duel.yellow(),
            slowest.average_duration
        )?;
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    let json_output = serde_json::to_string_pretty(results)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    writeln!(out, "# Boarding Test Results\n")?;

    let (total, passed, success_rate) = pass_counts(results);
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total runs**: {total}")?;
    writeln!(out, "- **Passed**: {passed}")?;
    writeln!(out, "- **Failed**: {}", total - passed)?;
    writeln!(out, "- **Success rate**: {success_rate:.1}%\n")?;

    writeln!(out, "## Outcomes\n")?;
    writeln!(
        out,
        "| Scenario | Duel | Seed | Boarder wins | Invasion odds | Mean turns |"
    )?;
    writeln!(out, "|---|---|---|---|---|---|")?;
    for result in results {
        writeln!(
            out,
            "| {} | {} | {} | {:.0}% | {:.0}% | {:.1} |",
            result.scenario_name,
            result.duel,
            result.seed,
            result.boarder_win_rate * 100.0,
            result.predicted_invasion_victory * 100.0,
            result.mean_turns
        )?;
    }
    writeln!(out)?;

    writeln!(out, "## Detailed Results\n")?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };
        writeln!(
            out,
            "### {} {} (seed {})\n",
            status, result.duel, result.seed
        )?;
        writeln!(
            out,
            "- **Iterations**: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(out, "- **Average time**: {:?}", result.average_duration)?;
        if !result.failures.is_empty() {
            writeln!(out, "- **Failures**:")?;
            for failure in &result.failures {
                writeln!(out, "  - {failure}")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result(passed: bool) -> ScenarioResult {
        ScenarioResult {
            scenario_name: "raid".to_string(),
            duel: "Marauder Raider vs Bulk Freighter".to_string(),
            seed: 1337,
            passed,
            iterations_run: 3,
            successful_iterations: if passed { 3 } else { 2 },
            failures: if passed {
                Vec::new()
            } else {
                vec!["Iteration 3 (seed 1339, 4 turns recorded): boom".to_string()]
            },
            boarder_win_rate: 2.0 / 3.0,
            predicted_invasion_victory: 0.9,
            mean_turns: 4.5,
            stalemates: 0,
            average_duration: Duration::from_millis(2),
        }
    }

    fn render(report: impl FnOnce(&mut dyn Write) -> Result<()>) -> String {
        let mut buffer = Vec::new();
        report(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn console_report_lists_failures() {
        colored::control::set_override(false);
        let results = vec![sample_result(true), sample_result(false)];
        let text = render(|out| generate_console_report(out, &results, Duration::from_secs(1)));
        assert!(text.contains("Total runs: 2"));
        assert!(text.contains("Success rate: 50.0%"));
        assert!(text.contains("Boarder wins: 67%"));
        assert!(text.contains("boom"));
        assert!(text.contains("Fastest: Marauder Raider vs Bulk Freighter"));
    }

    #[test]
    fn json_report_round_trips() {
        let results = vec![sample_result(false)];
        let text = render(|out| generate_json_report(out, &results));
        let parsed: Vec<ScenarioResult> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].failures, results[0].failures);
        assert_eq!(parsed[0].average_duration, Duration::from_millis(2));
    }

    #[test]
    fn markdown_report_has_outcome_table() {
        let results = vec![sample_result(true)];
        let text = render(|out| generate_markdown_report(out, &results));
        assert!(text.starts_with("# Boarding Test Results"));
        assert!(text.contains("| raid | Marauder Raider vs Bulk Freighter | 1337 | 67% | 90% | 4.5 |"));
        assert!(text.contains("### ✅ Marauder Raider vs Bulk Freighter (seed 1337)"));
    }

    #[test]
    fn empty_results_do_not_divide_by_zero() {
        let text = render(|out| generate_console_report(out, &[], Duration::ZERO));
        assert!(text.contains("Success rate: 0.0%"));
        assert!(!text.contains("Performance Summary"));
    }
}
