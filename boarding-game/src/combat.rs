//! A boarding session: both combatants, the odds tables built when the
//! ships met, and the history of every turn since.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::activity::{Activity, PlunderOrder};
use crate::combatant::Combatant;
use crate::constants::{LOG_COMBAT_START, LOG_TALKS_NO_LANGUAGE};
use crate::error::BoardingError;
use crate::odds::BoardingOdds;
use crate::rules::BoardingRules;
use crate::ship::Ship;
use crate::turn::{Arena, Settlement, Turn, TurnNote, TurnNoteSet};
use crate::vocabulary::{CombatState, Negotiation, Objective, Side, Sides};

/// How a finished (or abandoned) combat turned out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatSummary {
    /// Turns resolved, not counting the opening entry.
    pub turns: usize,
    pub state: CombatState,
    pub negotiation: Negotiation,
    /// The side that conquered the other, if either did.
    pub victor: Option<Side>,
    pub casualties: Sides<u32>,
    pub automated_losses: Sides<u32>,
    pub crew_transfers: Sides<i32>,
    /// Value of everything each side carried off.
    pub plunder_value: Sides<i64>,
    pub captured: bool,
    pub destroyed: Sides<bool>,
    pub settlement: Option<Settlement>,
}

impl CombatSummary {
    fn from_history<S: Ship>(history: &[Turn], combatants: &Sides<Combatant<S>>) -> Self {
        let mut summary = Self {
            turns: history.len().saturating_sub(1),
            state: CombatState::Isolated,
            negotiation: Negotiation::NotAttempted,
            victor: None,
            casualties: Sides::splat(0),
            automated_losses: Sides::splat(0),
            crew_transfers: Sides::splat(0),
            plunder_value: Sides::splat(0),
            captured: false,
            destroyed: Sides::from_fn(|side| combatants[side].ship().is_destroyed()),
            settlement: None,
        };
        for turn in history {
            summary.state = turn.state;
            summary.negotiation = turn.negotiation;
            if let Some(victor) = turn.state.victor() {
                summary.victor = Some(victor);
            }
            for side in Side::BOTH {
                summary.casualties[side] += turn.casualties[side];
                summary.automated_losses[side] += turn.automated_losses[side];
                summary.crew_transfers[side] += turn.crew_transfers[side];
                summary.plunder_value[side] += turn.plunder_taken[side]
                    .iter()
                    .map(crate::plunder::PlunderItem::total_value)
                    .sum::<i64>();
                if turn.actions[side].actual == Activity::Capture {
                    summary.captured = true;
                }
            }
            if turn.settlement.is_some() {
                summary.settlement.clone_from(&turn.settlement);
            }
        }
        summary
    }
}

/// One boarding action between two ships.
///
/// The session owns both ships until [`into_ships`](Self::into_ships)
/// hands them back. Every call to a `step` method resolves exactly one
/// turn and appends it to the history.
#[derive(Debug)]
pub struct BoardingCombat<S: Ship, R: Rng = ChaCha20Rng> {
    combatants: Sides<Combatant<S>>,
    odds: BoardingOdds,
    rules: BoardingRules,
    shared_language: bool,
    rejected: Sides<bool>,
    /// Always starts with the opening turn.
    history: Vec<Turn>,
    rng: R,
}

impl<S: Ship> BoardingCombat<S, ChaCha20Rng> {
    /// Start a combat with a seeded generator.
    #[must_use]
    pub fn new(boarder: S, target: S, rules: BoardingRules, seed: u64) -> Self {
        Self::with_rng(boarder, target, rules, ChaCha20Rng::seed_from_u64(seed))
    }
}

impl<S: Ship, R: Rng> BoardingCombat<S, R> {
    /// Start a combat drawing from `rng`.
    #[must_use]
    pub fn with_rng(boarder: S, target: S, rules: BoardingRules, rng: R) -> Self {
        let shared_language = boarder.government().shares_language(target.government());
        let odds = BoardingOdds::for_ships(
            &boarder,
            &target,
            rules.self_destruct_casualty_power_multiplier,
        );
        let combatants = Sides::new(
            Combatant::new(boarder, Side::Boarder, &rules),
            Combatant::new(target, Side::Target, &rules),
        );

        let mut notes = TurnNoteSet::new();
        notes.push(TurnNote::new(LOG_COMBAT_START));
        let negotiation = if !rules.negotiations {
            Negotiation::Failed
        } else if shared_language {
            Negotiation::NotAttempted
        } else {
            notes.push(TurnNote::new(LOG_TALKS_NO_LANGUAGE));
            Negotiation::Failed
        };
        let opening = Turn::opening(&combatants, &odds, negotiation, notes);
        log::debug!(
            "boarding started: {} ({} crew) against {} ({} crew)",
            combatants.boarder.ship().name(),
            combatants.boarder.crew(),
            combatants.target.ship().name(),
            combatants.target.crew(),
        );

        Self {
            combatants,
            odds,
            rules,
            shared_language,
            rejected: Sides::splat(false),
            history: vec![opening],
            rng,
        }
    }

    #[must_use]
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// The most recent turn.
    #[must_use]
    pub fn latest(&self) -> &Turn {
        &self.history[self.history.len() - 1]
    }

    #[must_use]
    pub const fn combatant(&self, side: Side) -> &Combatant<S> {
        self.combatants.get(side)
    }

    #[must_use]
    pub const fn odds(&self) -> &BoardingOdds {
        &self.odds
    }

    #[must_use]
    pub const fn rules(&self) -> &BoardingRules {
        &self.rules
    }

    #[must_use]
    pub const fn shares_language(&self) -> bool {
        self.shared_language
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.latest().state.is_ended()
    }

    /// The side the player steers. The boarder wins a tie.
    #[must_use]
    pub fn player_side(&self) -> Option<Side> {
        Side::BOTH
            .into_iter()
            .find(|side| self.combatants[*side].is_player_controlled())
    }

    #[must_use]
    pub fn player_combatant(&self) -> Option<&Combatant<S>> {
        self.player_side().map(|side| &self.combatants[side])
    }

    #[must_use]
    pub fn player_enemy(&self) -> Option<&Combatant<S>> {
        self.player_side().map(|side| &self.combatants[side.opponent()])
    }

    /// The side that conquered the other at any point, surviving the
    /// final `Ended` transition.
    #[must_use]
    pub fn victor(&self) -> Option<Side> {
        self.history.iter().rev().find_map(|turn| turn.state.victor())
    }

    #[must_use]
    pub fn is_player_conquered(&self) -> bool {
        match (self.player_side(), self.victor()) {
            (Some(player), Some(victor)) => victor != player,
            _ => false,
        }
    }

    #[must_use]
    pub fn is_player_enemy_conquered(&self) -> bool {
        match (self.player_side(), self.victor()) {
            (Some(player), Some(victor)) => victor == player,
            _ => false,
        }
    }

    /// Frames an interface should idle to pace the turns so far.
    #[must_use]
    pub fn count_inactive_frames(&self) -> u64 {
        u64::try_from(self.history.len())
            .unwrap_or(u64::MAX)
            .saturating_mul(u64::from(self.rules.inactive_frames_per_turn))
    }

    /// What each combatant's AI would do next.
    #[must_use]
    pub fn ai_intents(&self) -> Sides<Activity> {
        let latest = self.latest();
        Sides::from_fn(|side| self.combatants[side].determine_intent(latest.report(side)))
    }

    /// Resolve a turn with the player's intent; the enemy decides for
    /// itself.
    ///
    /// # Errors
    ///
    /// Returns [`BoardingError::NoPlayerCombatant`] if neither ship is
    /// player controlled, or any error from [`step_with`](Self::step_with).
    pub fn step(&mut self, player_intent: Activity) -> Result<&Turn, BoardingError> {
        let player = self.player_side().ok_or(BoardingError::NoPlayerCombatant)?;
        let mut intents = self.ai_intents();
        intents[player] = player_intent;
        self.step_with(intents)
    }

    /// Resolve a turn with both sides left to their AI.
    ///
    /// # Errors
    ///
    /// Returns an error if the combat is already over.
    pub fn step_auto(&mut self) -> Result<&Turn, BoardingError> {
        let intents = self.ai_intents();
        self.step_with(intents)
    }

    /// Resolve a turn from explicit intents for both sides.
    ///
    /// # Errors
    ///
    /// Returns [`BoardingError::CombatOver`] once the combat has ended,
    /// and an objective or details error if either intent is not allowed
    /// by the latest situation report.
    pub fn step_with(&mut self, intents: Sides<Activity>) -> Result<&Turn, BoardingError> {
        let state = self.latest().state;
        if state.is_ended() {
            return Err(BoardingError::CombatOver { state });
        }
        for side in Side::BOTH {
            self.validate(side, &intents[side])?;
        }

        let previous = &self.history[self.history.len() - 1];
        let mut arena = Arena {
            combatants: &mut self.combatants,
            odds: &self.odds,
            shared_language: self.shared_language,
            rejected: &mut self.rejected,
            rng: &mut self.rng,
        };
        let turn = Turn::resolve(previous, intents, &mut arena);
        log::debug!(
            "boarding turn {}: {} -> {} (talks {}), boarder {} / target {}, casualties {}/{}",
            turn.index,
            turn.state_before,
            turn.state,
            turn.negotiation,
            turn.actions.boarder.actual.objective(),
            turn.actions.target.actual.objective(),
            turn.casualties.boarder,
            turn.casualties.target,
        );
        self.history.push(turn);
        Ok(self.latest())
    }

    /// Let both AIs fight until the combat ends.
    ///
    /// # Errors
    ///
    /// Returns [`BoardingError::Stalemate`] if the combat is still running
    /// after the rules' automatic turn cap.
    pub fn resolve_automatically(&mut self) -> Result<CombatSummary, BoardingError> {
        let cap = self.rules.max_automatic_turns;
        let mut turns = 0;
        while !self.is_over() {
            if turns >= cap {
                log::warn!("boarding gave up after {cap} automatic turns");
                return Err(BoardingError::Stalemate { turns: cap });
            }
            self.step_auto()?;
            turns += 1;
        }
        Ok(self.summary())
    }

    #[must_use]
    pub fn summary(&self) -> CombatSummary {
        CombatSummary::from_history(&self.history, &self.combatants)
    }

    /// End the session and hand both ships back, boarder first.
    #[must_use]
    pub fn into_ships(self) -> Sides<S> {
        self.combatants.map(|_, combatant| combatant.into_ship())
    }

    fn validate(&self, side: Side, activity: &Activity) -> Result<(), BoardingError> {
        let report = self.latest().report(side);
        let objective = activity.objective();
        if objective == Objective::Pending {
            return Err(BoardingError::UnresolvableObjective { side, objective });
        }
        if !report.can(objective) {
            return Err(BoardingError::InvalidObjective {
                side,
                objective,
                state: report.state,
            });
        }
        let details_fit = match activity {
            Activity::Plunder(PlunderOrder::Take { index, quantity }) => self.combatants
                [side.opponent()]
            .loot()
            .check_take(*index, *quantity, report.is_enemy_conquered)
            .is_ok(),
            Activity::Negotiate(offer) => !offer.is_empty(),
            Activity::Resolve(offer) => report.offer.as_ref() == Some(offer),
            _ => true,
        };
        if details_fit {
            Ok(())
        } else {
            Err(BoardingError::InvalidDetails { side, objective })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ship::{CargoLot, Government, ShipRecord};

    fn ships() -> (ShipRecord, ShipRecord) {
        let boarder = ShipRecord::new("Raider", Government::new("Pirate"), 12)
            .with_cargo_capacity(1.0)
            .player_controlled();
        let target = ShipRecord::new("Hauler", Government::new("Merchant"), 4)
            .with_cargo(CargoLot::commodity("Food", 30, 100));
        (boarder, target)
    }

    #[test]
    fn opening_turn_is_recorded() {
        let (boarder, target) = ships();
        let combat = BoardingCombat::new(boarder, target, BoardingRules::default(), 7);
        assert_eq!(combat.history().len(), 1);
        assert_eq!(combat.latest().state, CombatState::Isolated);
        assert!(combat.latest().has_note(LOG_COMBAT_START));
        assert_eq!(combat.player_side(), Some(Side::Boarder));
        assert_eq!(combat.count_inactive_frames(), 30);
    }

    #[test]
    fn target_cannot_plunder_from_isolation() {
        let (boarder, target) = ships();
        let mut combat = BoardingCombat::new(boarder, target, BoardingRules::default(), 7);
        let err = combat
            .step_with(Sides::new(Activity::Null, Activity::raid()))
            .unwrap_err();
        assert_eq!(
            err,
            BoardingError::InvalidObjective {
                side: Side::Target,
                objective: Objective::Plunder,
                state: CombatState::Isolated,
            }
        );
        assert_eq!(combat.history().len(), 1, "a rejected turn leaves no trace");
    }

    #[test]
    fn take_orders_are_checked_against_the_hold() {
        let (boarder, target) = ships();
        let mut combat = BoardingCombat::new(boarder, target, BoardingRules::default(), 7);
        let err = combat
            .step_with(Sides::new(Activity::take(9, 1), Activity::Defend))
            .unwrap_err();
        assert_eq!(
            err,
            BoardingError::InvalidDetails {
                side: Side::Boarder,
                objective: Objective::Plunder,
            }
        );
    }

    #[test]
    fn pending_has_no_resolution() {
        let (boarder, target) = ships();
        let mut combat = BoardingCombat::new(boarder, target, BoardingRules::default(), 7);
        assert!(matches!(
            combat.step(Activity::Pending),
            Err(BoardingError::UnresolvableObjective { .. })
        ));
    }

    #[test]
    fn leaving_ends_the_combat_for_good() {
        let (boarder, target) = ships();
        let mut combat = BoardingCombat::new(boarder, target, BoardingRules::default(), 7);
        let turn = combat.step(Activity::Leave).unwrap();
        assert_eq!(turn.state, CombatState::Ended);
        assert!(combat.is_over());
        assert_eq!(
            combat.step_auto().unwrap_err(),
            BoardingError::CombatOver {
                state: CombatState::Ended
            }
        );
    }

    #[test]
    fn automatic_resolution_respects_the_turn_cap() {
        let (boarder, target) = ships();
        let rules = BoardingRules {
            max_automatic_turns: 1,
            ..BoardingRules::default()
        };
        let mut combat = BoardingCombat::new(boarder, target, rules, 7);
        assert_eq!(
            combat.resolve_automatically().unwrap_err(),
            BoardingError::Stalemate { turns: 1 }
        );
    }

    #[test]
    fn no_player_means_no_player_step() {
        let boarder = ShipRecord::new("Raider", Government::new("Pirate"), 5);
        let target = ShipRecord::new("Hauler", Government::new("Merchant"), 5);
        let mut combat = BoardingCombat::new(boarder, target, BoardingRules::default(), 1);
        assert_eq!(
            combat.step(Activity::Null).unwrap_err(),
            BoardingError::NoPlayerCombatant
        );
        assert!(combat.player_combatant().is_none());
        assert!(!combat.is_player_conquered());
    }
}
