//! Named matchups the tester knows how to run.

use anyhow::{Context, Result, anyhow};
use boarding_game::{BoardingEngine, BoardingRules, DataLoader, ShipRecord};
use serde::de::DeserializeOwned;
use thiserror::Error;

const RULES_JSON: &str = include_str!("../../boarding-game/assets/rules.json");
const SHIPS_JSON: &str = include_str!("../../boarding-game/assets/ships.json");

pub const ROSTER: &str = "ships";

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("no bundled asset named '{0}'")]
    Unknown(String),
    #[error("bundled asset is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Serves the rules and roster bundled with the game crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct TesterAssets;

impl DataLoader for TesterAssets {
    type Error = AssetError;

    fn load_rules(&self) -> Result<BoardingRules, Self::Error> {
        Ok(BoardingRules::from_json(RULES_JSON)?)
    }

    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: DeserializeOwned,
    {
        match config_name {
            ROSTER => Ok(serde_json::from_str(SHIPS_JSON)?),
            other => Err(AssetError::Unknown(other.to_string())),
        }
    }
}

struct MatchupSpec {
    key: &'static str,
    description: &'static str,
    boarder: &'static str,
    target: &'static str,
    negotiations: bool,
}

const MATCHUPS: &[MatchupSpec] = &[
    MatchupSpec {
        key: "raid",
        description: "Marauder Raider boards a Bulk Freighter for its cargo",
        boarder: "Marauder Raider",
        target: "Bulk Freighter",
        negotiations: false,
    },
    MatchupSpec {
        key: "prize",
        description: "Boarding Cutter tries to take a Bulk Freighter intact",
        boarder: "Boarding Cutter",
        target: "Bulk Freighter",
        negotiations: false,
    },
    MatchupSpec {
        key: "militia",
        description: "Marauder Raider against a Militia Gunboat that would rather scuttle",
        boarder: "Marauder Raider",
        target: "Militia Gunboat",
        negotiations: false,
    },
    MatchupSpec {
        key: "drone",
        description: "Marauder Raider strips an uncrewed Courier Drone",
        boarder: "Marauder Raider",
        target: "Courier Drone",
        negotiations: false,
    },
    MatchupSpec {
        key: "counter-boarding",
        description: "Militia Gunboat boards the Marauder Raider",
        boarder: "Militia Gunboat",
        target: "Marauder Raider",
        negotiations: false,
    },
    MatchupSpec {
        key: "parley",
        description: "Boarding Cutter against a Militia Gunboat with talks allowed",
        boarder: "Boarding Cutter",
        target: "Militia Gunboat",
        negotiations: true,
    },
];

pub const SWEEP: &str = "sweep";
const SWEEP_DESCRIPTION: &str = "Every crewed ship boards every ship in the roster";

/// One pairing of ships under fixed rules.
#[derive(Debug, Clone)]
pub struct Duel {
    pub label: String,
    pub boarder: ShipRecord,
    pub target: ShipRecord,
    pub rules: BoardingRules,
}

/// Every scenario key with its description, `sweep` last.
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    MATCHUPS
        .iter()
        .map(|spec| (spec.key, spec.description))
        .chain(std::iter::once((SWEEP, SWEEP_DESCRIPTION)))
        .collect()
}

/// The loaded roster and rules that duels are built from.
#[derive(Debug, Clone)]
pub struct ScenarioCatalog {
    rules: BoardingRules,
    roster: Vec<ShipRecord>,
}

impl ScenarioCatalog {
    pub fn load<L>(engine: &BoardingEngine<L>) -> Result<Self>
    where
        L: DataLoader,
        L::Error: Into<anyhow::Error>,
    {
        let rules = engine.rules().context("loading boarding rules")?;
        let roster: Result<Vec<ShipRecord>> = engine.load_roster(ROSTER).map_err(Into::into);
        let roster = roster.context("loading ship roster")?;
        Ok(Self { rules, roster })
    }

    pub fn roster(&self) -> &[ShipRecord] {
        &self.roster
    }

    fn ship(&self, name: &str) -> Result<ShipRecord> {
        self.roster
            .iter()
            .find(|ship| ship.name == name)
            .cloned()
            .ok_or_else(|| anyhow!("ship '{name}' is not in the roster"))
    }

    fn rules_with_talks(&self, negotiations: bool) -> BoardingRules {
        BoardingRules {
            negotiations: negotiations || self.rules.negotiations,
            ..self.rules.clone()
        }
    }

    /// Build the duels for `key`, or `None` if no such scenario exists.
    /// `force_talks` turns negotiations on for every duel.
    pub fn duels(&self, key: &str, force_talks: bool) -> Option<Result<Vec<Duel>>> {
        if key == SWEEP {
            return Some(Ok(self.sweep(force_talks)));
        }
        let spec = MATCHUPS.iter().find(|spec| spec.key == key)?;
        let duel = self.ship(spec.boarder).and_then(|boarder| {
            let target = self.ship(spec.target)?;
            Ok(Duel {
                label: format!("{} vs {}", boarder.name, target.name),
                boarder,
                target,
                rules: self.rules_with_talks(spec.negotiations || force_talks),
            })
        });
        Some(duel.map(|duel| vec![duel]))
    }

    fn sweep(&self, force_talks: bool) -> Vec<Duel> {
        let rules = self.rules_with_talks(force_talks);
        let rules = &rules;
        self.roster
            .iter()
            .filter(|boarder| boarder.crew > 0)
            .flat_map(|boarder| {
                self.roster
                    .iter()
                    .filter(move |target| target.name != boarder.name)
                    .map(move |target| Duel {
                        label: format!("{} vs {}", boarder.name, target.name),
                        boarder: boarder.clone(),
                        target: target.clone(),
                        rules: rules.clone(),
                    })
            })
            .collect()
    }
}

/// Expand `all` into every scenario key, keeping any others in order.
pub fn expand_scenarios(requested: &[String]) -> Vec<String> {
    let mut scenarios: Vec<String> = requested
        .iter()
        .filter(|name| name.as_str() != "all")
        .cloned()
        .collect();
    if requested.iter().any(|name| name == "all") {
        for (key, _) in list_scenarios() {
            if !scenarios.iter().any(|name| name == key) {
                scenarios.push(key.to_string());
            }
        }
    }
    scenarios
}
