//! Whole-combat outcome estimates for the five ways two crews can fight.

use serde::{Deserialize, Serialize};

use super::power::PowerTable;
use crate::vocabulary::{Side, Sides};

/// Attack and defense power of one ship, plus its self-destruct chance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForcePower {
    pub attack: PowerTable,
    pub defense: PowerTable,
    pub self_destruct: f64,
}

/// Crew counts a report is taken for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forces {
    pub invaders: u32,
    pub defenders: u32,
}

/// Which crews fight where, and who tries to blow up their own ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    BoarderInvadesTargetDefends,
    BoarderInvadesTargetSelfDestructs,
    TargetInvadesBoarderDefends,
    TargetInvadesBoarderSelfDestructs,
    BothAttack,
}

impl Strategy {
    pub const ALL: [Self; 5] = [
        Self::BoarderInvadesTargetDefends,
        Self::BoarderInvadesTargetSelfDestructs,
        Self::TargetInvadesBoarderDefends,
        Self::TargetInvadesBoarderSelfDestructs,
        Self::BothAttack,
    ];

    const fn index(self) -> usize {
        match self {
            Self::BoarderInvadesTargetDefends => 0,
            Self::BoarderInvadesTargetSelfDestructs => 1,
            Self::TargetInvadesBoarderDefends => 2,
            Self::TargetInvadesBoarderSelfDestructs => 3,
            Self::BothAttack => 4,
        }
    }

    /// Whether `side` fights with its invaders in this strategy.
    const fn invades(self, side: Side) -> bool {
        match (self, side) {
            (Self::BothAttack, _)
            | (
                Self::BoarderInvadesTargetDefends | Self::BoarderInvadesTargetSelfDestructs,
                Side::Boarder,
            )
            | (
                Self::TargetInvadesBoarderDefends | Self::TargetInvadesBoarderSelfDestructs,
                Side::Target,
            ) => true,
            _ => false,
        }
    }

    const fn self_destructing(self) -> Option<Side> {
        match self {
            Self::BoarderInvadesTargetSelfDestructs => Some(Side::Target),
            Self::TargetInvadesBoarderSelfDestructs => Some(Side::Boarder),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BoarderInvadesTargetDefends => "boarder_invades_target_defends",
            Self::BoarderInvadesTargetSelfDestructs => "boarder_invades_target_self_destructs",
            Self::TargetInvadesBoarderDefends => "target_invades_boarder_defends",
            Self::TargetInvadesBoarderSelfDestructs => "target_invades_boarder_self_destructs",
            Self::BothAttack => "both_attack",
        }
    }
}

/// Outcome estimate for one pair of crew counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Chance this side wins the next casualty roll.
    pub action_chance: Sides<f64>,
    pub victory_chance: Sides<f64>,
    pub self_destruct_chance: Sides<f64>,
    /// Expected crew lost from here until the fight ends.
    pub expected_casualties: Sides<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ScenarioTable {
    boarder_max: u32,
    target_max: u32,
    /// Indexed by `target + boarder * (target_max + 1)`.
    cells: Vec<Scenario>,
}

impl ScenarioTable {
    fn build(
        strategy: Strategy,
        forces: &Sides<ForcePower>,
        self_destruct_multiplier: f64,
    ) -> Self {
        let tables = Sides::new(
            Self::table_for(strategy, Side::Boarder, forces),
            Self::table_for(strategy, Side::Target, forces),
        );
        let multipliers = Sides::from_fn(|side| {
            if strategy.self_destructing() == Some(side) {
                self_destruct_multiplier
            } else {
                1.0
            }
        });
        let boarder_max = tables.boarder.members();
        let target_max = tables.target.members();
        let width = target_max as usize + 1;
        let mut cells = vec![Scenario::default(); (boarder_max as usize + 1) * width];

        for b in 0..=boarder_max {
            for t in 0..=target_max {
                let here = t as usize + b as usize * width;
                cells[here] = match (b, t) {
                    (0, 0) => Scenario::default(),
                    (_, 0) => Scenario {
                        victory_chance: Sides::new(1.0, 0.0),
                        ..Scenario::default()
                    },
                    (0, _) => Scenario {
                        victory_chance: Sides::new(0.0, 1.0),
                        ..Scenario::default()
                    },
                    _ => {
                        let boarder_lost = cells[here - width];
                        let target_lost = cells[here - 1];
                        Self::step(
                            strategy,
                            Sides::new(
                                tables.boarder.at(b) * multipliers.boarder,
                                tables.target.at(t) * multipliers.target,
                            ),
                            Sides::new(b, t),
                            forces,
                            &boarder_lost,
                            &target_lost,
                        )
                    }
                };
            }
        }

        Self {
            boarder_max,
            target_max,
            cells,
        }
    }

    fn table_for(strategy: Strategy, side: Side, forces: &Sides<ForcePower>) -> PowerTable {
        if strategy.invades(side) {
            forces[side].attack.clone()
        } else {
            forces[side].defense.clone()
        }
    }

    fn step(
        strategy: Strategy,
        power: Sides<f64>,
        crew: Sides<u32>,
        forces: &Sides<ForcePower>,
        boarder_lost: &Scenario,
        target_lost: &Scenario,
    ) -> Scenario {
        let total = power.boarder + power.target;
        let boarder_action = if total > 0.0 {
            power.boarder / total
        } else {
            0.5
        };
        let action_chance = Sides::new(boarder_action, 1.0 - boarder_action);

        // The side that is blown up loses whoever is left aboard.
        let (explode, exploder) = match strategy.self_destructing() {
            Some(side) => (action_chance[side] * forces[side].self_destruct, Some(side)),
            None => (0.0, None),
        };
        // A boarder roll lost costs the boarder a member and vice versa.
        let mut p_boarder_loses = action_chance.target;
        let mut p_target_loses = action_chance.boarder;
        match exploder {
            Some(Side::Boarder) => p_target_loses -= explode,
            Some(Side::Target) => p_boarder_loses -= explode,
            None => {}
        }
        // Only an exploding ship's own crew die with it.
        let explosion_casualties = Sides::from_fn(|side| {
            if exploder == Some(side) {
                f64::from(crew[side])
            } else {
                0.0
            }
        });

        let combine = |pick: fn(&Scenario) -> Sides<f64>, on_explode: Sides<f64>| {
            let after_boarder = pick(boarder_lost);
            let after_target = pick(target_lost);
            Sides::from_fn(|side| {
                p_boarder_loses * after_boarder[side]
                    + p_target_loses * after_target[side]
                    + explode * on_explode[side]
            })
        };
        let self_destruct_on_explode =
            Sides::from_fn(|side| if exploder == Some(side) { 1.0 } else { 0.0 });

        let mut expected_casualties = combine(|s| s.expected_casualties, explosion_casualties);
        expected_casualties.boarder += p_boarder_loses;
        expected_casualties.target += p_target_loses;

        Scenario {
            action_chance,
            victory_chance: combine(|s| s.victory_chance, Sides::splat(0.0)),
            self_destruct_chance: combine(|s| s.self_destruct_chance, self_destruct_on_explode),
            expected_casualties,
        }
    }

    fn lookup(&self, boarder: u32, target: u32) -> Scenario {
        let b = boarder.min(self.boarder_max) as usize;
        let t = target.min(self.target_max) as usize;
        self.cells
            .get(t + b * (self.target_max as usize + 1))
            .copied()
            .unwrap_or_default()
    }
}

/// One scenario per strategy, taken at the crew counts asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityReport {
    pub forces: Sides<Forces>,
    pub boarder_invades_target_defends: Scenario,
    pub boarder_invades_target_self_destructs: Scenario,
    pub target_invades_boarder_defends: Scenario,
    pub target_invades_boarder_self_destructs: Scenario,
    pub both_attack: Scenario,
}

impl ProbabilityReport {
    #[must_use]
    pub const fn scenario(&self, strategy: Strategy) -> &Scenario {
        match strategy {
            Strategy::BoarderInvadesTargetDefends => &self.boarder_invades_target_defends,
            Strategy::BoarderInvadesTargetSelfDestructs => {
                &self.boarder_invades_target_self_destructs
            }
            Strategy::TargetInvadesBoarderDefends => &self.target_invades_boarder_defends,
            Strategy::TargetInvadesBoarderSelfDestructs => {
                &self.target_invades_boarder_self_destructs
            }
            Strategy::BothAttack => &self.both_attack,
        }
    }
}

/// Outcome tables for every strategy, built once per combat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardingProbability {
    tables: Vec<ScenarioTable>,
}

impl BoardingProbability {
    #[must_use]
    pub fn new(forces: &Sides<ForcePower>, self_destruct_multiplier: f64) -> Self {
        let tables = Strategy::ALL
            .iter()
            .map(|strategy| ScenarioTable::build(*strategy, forces, self_destruct_multiplier))
            .collect();
        Self { tables }
    }

    /// Scenario for one strategy at the given crew counts. Counts beyond
    /// the starting crews are treated as full crews.
    #[must_use]
    pub fn scenario(&self, strategy: Strategy, forces: Sides<Forces>) -> Scenario {
        let count = |side: Side| {
            if strategy.invades(side) {
                forces[side].invaders
            } else {
                forces[side].defenders
            }
        };
        self.tables
            .get(strategy.index())
            .map(|table| table.lookup(count(Side::Boarder), count(Side::Target)))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn report(&self, forces: Sides<Forces>) -> ProbabilityReport {
        ProbabilityReport {
            forces,
            boarder_invades_target_defends: self
                .scenario(Strategy::BoarderInvadesTargetDefends, forces),
            boarder_invades_target_self_destructs: self
                .scenario(Strategy::BoarderInvadesTargetSelfDestructs, forces),
            target_invades_boarder_defends: self
                .scenario(Strategy::TargetInvadesBoarderDefends, forces),
            target_invades_boarder_self_destructs: self
                .scenario(Strategy::TargetInvadesBoarderSelfDestructs, forces),
            both_attack: self.scenario(Strategy::BothAttack, forces),
        }
    }
}
