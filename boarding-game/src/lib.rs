//! Boarding Combat Engine
//!
//! Platform-agnostic rules for two crews fighting over a disabled ship:
//! the turn state machine, the odds tables that predict how an invasion
//! ends, and the AI that plays either side. Ship storage, rendering and
//! player finances belong to the host game.

pub mod activity;
pub mod combat;
pub mod combatant;
pub mod constants;
pub mod error;
pub mod numbers;
pub mod odds;
pub mod offer;
pub mod plunder;
pub mod report;
pub mod rules;
pub mod ship;
pub mod turn;
pub mod vocabulary;

// Re-export commonly used types
pub use activity::{Action, Activity, Details, Effect, PlunderOrder};
pub use combat::{BoardingCombat, CombatSummary};
pub use combatant::{Attempt, Casualty, Combatant, PrizeValue};
pub use error::BoardingError;
pub use odds::{
    BoardingOdds, BoardingProbability, CaptureOdds, ForcePower, Forces, PowerTable,
    ProbabilityReport, Role, Scenario, Strategy,
};
pub use offer::{Offer, OfferError, Term, TermValue, TermValueKind};
pub use plunder::{PlunderError, PlunderItem, PlunderKind, PlunderSession, PlunderTotals};
pub use report::{SituationReport, Standing};
pub use rules::{BoardingRules, RulesError};
pub use ship::{CargoLot, Government, OutfitStack, Ship, ShipAttributes, ShipRecord};
pub use turn::{ActionResult, Settlement, Turn, TurnNote, TurnNoteSet};
pub use vocabulary::{
    AttackStrategy, BoardingGoal, CombatState, DefenseStrategy, Negotiation, Objective,
    ObjectiveSet, Side, Sides, first_actor, is_objective_valid, valid_objectives,
};

/// Trait for abstracting data loading operations
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the boarding rules in force for this game.
    ///
    /// # Errors
    ///
    /// Returns an error if the rules cannot be loaded.
    fn load_rules(&self) -> Result<BoardingRules, Self::Error>;

    /// Load configuration data for a specific system
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: serde::de::DeserializeOwned;
}

/// Starts boarding combats under rules supplied by a [`DataLoader`].
pub struct BoardingEngine<L>
where
    L: DataLoader,
{
    data_loader: L,
}

impl<L> BoardingEngine<L>
where
    L: DataLoader,
{
    pub const fn new(data_loader: L) -> Self {
        Self { data_loader }
    }

    /// Load and validate the rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the rules cannot be loaded or are out of range.
    pub fn rules(&self) -> Result<BoardingRules, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
    {
        let rules = self.data_loader.load_rules().map_err(Into::into)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Load a named roster of ships.
    ///
    /// # Errors
    ///
    /// Returns an error if the roster cannot be loaded or parsed.
    pub fn load_roster(&self, roster_name: &str) -> Result<Vec<ShipRecord>, L::Error> {
        self.data_loader.load_config(roster_name)
    }

    /// Start a seeded combat between `boarder` and `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the rules cannot be loaded or are out of range.
    pub fn create_combat<S: Ship>(
        &self,
        boarder: S,
        target: S,
        seed: u64,
    ) -> Result<BoardingCombat<S>, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
    {
        let rules = self.rules()?;
        Ok(BoardingCombat::new(boarder, target, rules, seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::DeserializeOwned;
    use std::convert::Infallible;

    #[derive(Clone, Copy, Default)]
    struct FixtureLoader {
        negotiations: bool,
    }

    impl DataLoader for FixtureLoader {
        type Error = Infallible;

        fn load_rules(&self) -> Result<BoardingRules, Self::Error> {
            Ok(BoardingRules {
                negotiations: self.negotiations,
                ..BoardingRules::default()
            })
        }

        fn load_config<T>(&self, _config_name: &str) -> Result<T, Self::Error>
        where
            T: DeserializeOwned,
        {
            let parsed = serde_json::from_str("[]")
                .or_else(|_| serde_json::from_str("null"))
                .unwrap();
            Ok(parsed)
        }
    }

    #[derive(Clone, Copy)]
    struct BrokenRules;

    impl DataLoader for BrokenRules {
        type Error = Infallible;

        fn load_rules(&self) -> Result<BoardingRules, Self::Error> {
            Ok(BoardingRules {
                casualty_percentage_per_action: 4.0,
                ..BoardingRules::default()
            })
        }

        fn load_config<T>(&self, _config_name: &str) -> Result<T, Self::Error>
        where
            T: DeserializeOwned,
        {
            Ok(serde_json::from_str("null").unwrap())
        }
    }

    #[test]
    fn engine_starts_combats_under_loaded_rules() {
        let engine = BoardingEngine::new(FixtureLoader { negotiations: true });
        let boarder = ShipRecord::new("Raider", Government::new("Pirate"), 8);
        let target = ShipRecord::new("Hauler", Government::new("Merchant"), 3);
        let combat = engine.create_combat(boarder, target, 11).unwrap();
        assert!(combat.rules().negotiations);
        assert_eq!(combat.latest().negotiation, Negotiation::NotAttempted);
        assert!(engine.load_roster("ships").unwrap().is_empty());
    }

    #[test]
    fn engine_refuses_out_of_range_rules() {
        let engine = BoardingEngine::new(BrokenRules);
        let boarder = ShipRecord::new("Raider", Government::new("Pirate"), 8);
        let target = ShipRecord::new("Hauler", Government::new("Merchant"), 3);
        let err = engine.create_combat(boarder, target, 11).unwrap_err();
        assert!(err.to_string().contains("casualty_percentage_per_action"));
    }
}
