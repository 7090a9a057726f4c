use boarding_game::{BoardingCombat, BoardingError, CombatState, CombatSummary, Side, Turn};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::scenarios::Duel;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub duel: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    /// Share of iterations the boarder won.
    pub boarder_win_rate: f64,
    /// Opening-turn odds of a boarder invasion succeeding.
    pub predicted_invasion_victory: f64,
    pub mean_turns: f64,
    pub stalemates: usize,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
}

pub struct MatchupRunner {
    verbose: bool,
}

impl MatchupRunner {
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn run_scenario(
        &self,
        scenario_name: &str,
        duels: &[Duel],
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::new();
        for duel in duels {
            for &seed in seeds {
                if self.verbose {
                    println!(
                        "🧪 Testing scenario: {} ({} seed: {})",
                        scenario_name.bright_white(),
                        duel.label,
                        seed
                    );
                }
                results.push(self.run_duel(scenario_name, duel, seed, iterations));
            }
        }
        results
    }

    fn run_duel(
        &self,
        scenario_name: &str,
        duel: &Duel,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let mut failures = Vec::new();
        let mut successes = 0;
        let mut stalemates = 0;
        let mut boarder_wins = 0_u32;
        let mut total_turns = 0;
        let mut elapsed = Duration::ZERO;
        let mut predicted_invasion_victory = 0.0;

        for i in 0..iterations {
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));
            let start = Instant::now();
            let mut combat = BoardingCombat::new(
                duel.boarder.clone(),
                duel.target.clone(),
                duel.rules.clone(),
                iteration_seed,
            );
            predicted_invasion_victory = combat
                .latest()
                .report(Side::Boarder)
                .invasion_victory_probability;
            let outcome = combat.resolve_automatically();
            elapsed += start.elapsed();

            let problem = match outcome {
                Ok(summary) => {
                    total_turns += summary.turns;
                    if summary.victor == Some(Side::Boarder) {
                        boarder_wins += 1;
                    }
                    check_combat(combat.history(), &summary).err()
                }
                Err(err @ BoardingError::Stalemate { .. }) => {
                    stalemates += 1;
                    Some(err.to_string())
                }
                Err(err) => Some(err.to_string()),
            };

            match problem {
                None => successes += 1,
                Some(problem) => {
                    log::warn!("{} seed {iteration_seed}: {problem}", duel.label);
                    if self.verbose {
                        println!(
                            "  ❌ Iteration {}/{} failed: {}",
                            i + 1,
                            iterations,
                            problem.clone().red()
                        );
                    }
                    failures.push(format!(
                        "Iteration {} (seed {}, {} turns recorded): {}",
                        i + 1,
                        iteration_seed,
                        combat.history().len(),
                        problem
                    ));
                }
            }
        }

        let runs = u32::try_from(iterations).unwrap_or(u32::MAX).max(1);
        ScenarioResult {
            scenario_name: scenario_name.to_string(),
            duel: duel.label.clone(),
            seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            boarder_win_rate: f64::from(boarder_wins) / f64::from(runs),
            predicted_invasion_victory,
            mean_turns: usize_to_f64(total_turns) / f64::from(runs),
            stalemates,
            average_duration: elapsed / runs,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
const fn usize_to_f64(value: usize) -> f64 {
    value as f64
}

/// Check one finished combat's history against the engine's invariants.
pub fn check_combat(history: &[Turn], summary: &CombatSummary) -> Result<(), String> {
    if summary.state != CombatState::Ended {
        return Err(format!("combat stopped in state {}", summary.state));
    }
    if let Some(turn) = history
        .iter()
        .rev()
        .skip(1)
        .find(|turn| turn.state.is_ended())
    {
        return Err(format!("turn {} ended the combat but play went on", turn.index));
    }

    for pair in history.windows(2) {
        let (before, after) = (&pair[0], &pair[1]);
        if after.index != before.index + 1 {
            return Err(format!("turn {} follows turn {}", after.index, before.index));
        }
        for side in Side::BOTH {
            let expected = i64::from(before.report(side).crew) - i64::from(after.casualties[side])
                + i64::from(after.crew_transfers[side]);
            let actual = i64::from(after.report(side).crew);
            if actual != expected {
                return Err(format!(
                    "{side} crew went from {} to {actual} on turn {} but {expected} was accounted for",
                    before.report(side).crew,
                    after.index
                ));
            }
        }
    }

    for side in Side::BOTH {
        let counted: u32 = history.iter().map(|turn| turn.casualties[side]).sum();
        if counted != summary.casualties[side] {
            return Err(format!(
                "{side} casualties sum to {counted} but the summary reports {}",
                summary.casualties[side]
            ));
        }
        if summary.plunder_value[side] < 0 {
            return Err(format!("{side} plundered a negative value"));
        }
    }

    if summary.captured && summary.victor.is_none() {
        return Err("a ship was captured without a victor".to_string());
    }
    Ok(())
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_micros().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let micros = u128::deserialize(deserializer)?;
        Ok(Duration::from_micros(u64::try_from(micros).unwrap_or(0)))
    }
}
