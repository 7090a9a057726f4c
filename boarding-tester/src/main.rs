mod reports;
mod runner;
mod scenarios;
mod util;

use anyhow::{Context, Result};
use boarding_game::BoardingEngine;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use runner::{MatchupRunner, ScenarioResult};
use scenarios::{ScenarioCatalog, TesterAssets, expand_scenarios, list_scenarios};
use util::{parse_seeds, split_csv};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "boarding-tester", version = "0.1.0")]
#[command(about = "Seeded AI-versus-AI boarding runs with invariant checks")]
struct Args {
    /// Scenarios to run (comma-separated, `all` for every one)
    #[arg(long, default_value = "raid")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated; `a..b` for a range)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of combats per duel and seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Allow negotiations in every duel
    #[arg(long)]
    negotiations: bool,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let seeds = parse_seeds(&args.seeds)?;
    let scenarios = expand_scenarios(&split_csv(&args.scenarios));
    let catalog = ScenarioCatalog::load(&BoardingEngine::new(TesterAssets))?;
    log::info!("roster holds {} ships", catalog.roster().len());

    let results = run_scenarios(&args, &catalog, &scenarios, &seeds)?;
    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:20} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "⚔️  Boarding Combat Tester".bright_cyan().bold());
    println!("{}", "==========================".cyan());
}

fn run_scenarios(
    args: &Args,
    catalog: &ScenarioCatalog,
    scenarios: &[String],
    seeds: &[u64],
) -> Result<Vec<ScenarioResult>> {
    let runner = MatchupRunner::new(args.verbose);
    let mut results = Vec::new();

    for scenario_name in scenarios {
        match catalog.duels(scenario_name, args.negotiations) {
            Some(duels) => {
                let duels = duels.with_context(|| format!("building scenario {scenario_name}"))?;
                results.extend(runner.run_scenario(scenario_name, &duels, seeds, args.iterations));
            }
            None => eprintln!("⚠️  Unknown scenario: {}", scenario_name.yellow()),
        }
    }

    Ok(results)
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report {
        ReportFormat::Json => reports::generate_json_report(&mut output_target, results)?,
        ReportFormat::Markdown => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Boarding Test Results\n\n_No scenarios executed._"
                )?;
            } else {
                reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        ReportFormat::Console => {
            if results.is_empty() {
                writeln!(&mut output_target, "No scenarios executed.")?;
            } else {
                reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
            writeln!(&mut output_target)?;
            writeln!(
                &mut output_target,
                "🏁 Total time: {:?}",
                start_time.elapsed()
            )?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            scenarios: "raid".to_string(),
            list_scenarios: false,
            seeds: "1337".to_string(),
            iterations: 1,
            negotiations: false,
            report: ReportFormat::Json,
            verbose: false,
            output: None,
        }
    }

    fn temp_path(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "boarding-tester-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    fn catalog() -> ScenarioCatalog {
        ScenarioCatalog::load(&BoardingEngine::new(TesterAssets)).unwrap()
    }

    #[test]
    fn unknown_scenarios_are_skipped() {
        let args = base_args();
        let scenarios = vec!["boarding-party".to_string(), "raid".to_string()];
        let results = run_scenarios(&args, &catalog(), &scenarios, &[3]).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].scenario_name, "raid");
    }

    #[test]
    fn forced_negotiations_still_pass() {
        let args = Args {
            negotiations: true,
            iterations: 3,
            ..base_args()
        };
        let results = run_scenarios(&args, &catalog(), &["militia".to_string()], &[11]).unwrap();
        assert!(results.iter().all(|r| r.passed), "{results:?}");
    }

    #[test]
    fn write_reports_emits_json_output() {
        let path = temp_path("report.json");
        let args = Args {
            output: Some(path.clone()),
            ..base_args()
        };
        write_reports(&args, &[], Instant::now()).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content.trim(), "[]");
    }

    #[test]
    fn write_reports_marks_empty_markdown() {
        let path = temp_path("report.md");
        let args = Args {
            output: Some(path.clone()),
            report: ReportFormat::Markdown,
            ..base_args()
        };
        write_reports(&args, &[], Instant::now()).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("_No scenarios executed._"));
    }

    #[test]
    fn maybe_list_scenarios_writes_output() {
        let path = temp_path("scenarios.txt");
        let args = Args {
            list_scenarios: true,
            output: Some(path.clone()),
            ..base_args()
        };
        assert!(maybe_list_scenarios(&args).unwrap());
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("Available scenarios"));
        assert!(content.contains("sweep"));
    }

    #[test]
    fn maybe_list_scenarios_is_a_no_op_by_default() {
        assert!(!maybe_list_scenarios(&base_args()).unwrap());
    }
}
