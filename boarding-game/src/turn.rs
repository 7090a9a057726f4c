//! One round of a boarding combat and the ledger entry it leaves behind.

use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::activity::{Action, Activity, Effect, PlunderOrder};
use crate::combatant::{Attempt, Casualty, Combatant};
use crate::constants::{
    LOG_ACTION_VOIDED, LOG_ADVANCE, LOG_CAPTURED, LOG_CASUALTIES, LOG_CONQUERED, LOG_DESTROYED,
    LOG_DISENGAGED, LOG_INVASION, LOG_LEFT, LOG_PLUNDER_EXHAUSTED, LOG_PLUNDER_TAKEN,
    LOG_REPELLED, LOG_SELF_DESTRUCT, LOG_SELF_DESTRUCT_FAILED, LOG_SETTLEMENT, LOG_TALKS_FAILED,
    LOG_TALKS_NO_LANGUAGE, LOG_TALKS_OPENED, LOG_TALKS_REJECTED, LOG_WITHDRAW,
};
use crate::numbers::u32_to_i32;
use crate::odds::BoardingOdds;
use crate::offer::{Offer, Term, TermValue};
use crate::plunder::PlunderItem;
use crate::report::{SituationReport, Standing};
use crate::ship::Ship;
use crate::vocabulary::{
    CombatState, Negotiation, Objective, Side, Sides, first_actor, is_objective_valid,
};

/// Notes stored inline without additional allocations.
pub type TurnNoteSet = SmallVec<[TurnNote; 4]>;

/// Log key describing something that happened during a turn.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnNote(pub String);

impl TurnNote {
    #[must_use]
    pub fn new(key: &str) -> Self {
        Self(key.trim().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// What applying one action did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub state: CombatState,
    pub negotiation: Negotiation,
    /// Crew the acting side lost to its own action.
    pub casualties: u32,
    /// Crew the enemy lost to it.
    pub enemy_casualties: u32,
}

/// Terms carried out when both sides resolved on the same offer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub offer: Offer,
    pub surrendered: Option<Side>,
    /// Credits each side owes. The host moves the money.
    pub credits_paid: Sides<i64>,
    pub crew_moved: Sides<u32>,
    pub passengers_released: Sides<u32>,
    pub prisoners_released: Sides<u32>,
    pub pacified: Sides<bool>,
}

/// Immutable ledger entry for one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Zero for the opening entry.
    pub index: usize,
    pub state_before: CombatState,
    pub negotiation_before: Negotiation,
    /// The side whose action was attempted first.
    pub first: Side,
    pub actions: Sides<Action>,
    pub results: Sides<ActionResult>,
    /// Crew members killed.
    pub casualties: Sides<u32>,
    /// Automated invaders and defenders knocked out.
    pub automated_losses: Sides<u32>,
    /// Net crew gained (or given up) through capture or settlement.
    pub crew_transfers: Sides<i32>,
    pub plunder_taken: Sides<Vec<PlunderItem>>,
    pub state: CombatState,
    pub negotiation: Negotiation,
    /// The offer on the table after this turn.
    pub offer: Option<Offer>,
    pub offer_from: Option<Side>,
    pub settlement: Option<Settlement>,
    pub reports: Sides<SituationReport>,
    #[serde(default)]
    pub notes: TurnNoteSet,
}

impl Turn {
    #[must_use]
    pub const fn report(&self, side: Side) -> &SituationReport {
        self.reports.get(side)
    }

    /// Total casualties across both sides, crew and automated.
    #[must_use]
    pub const fn total_losses(&self) -> u32 {
        self.casualties.boarder
            + self.casualties.target
            + self.automated_losses.boarder
            + self.automated_losses.target
    }

    #[must_use]
    pub fn has_note(&self, key: &str) -> bool {
        self.notes.iter().any(|note| note.as_str() == key)
    }

    /// The synthetic first entry, so the history is never empty.
    pub(crate) fn opening<S: Ship>(
        combatants: &Sides<Combatant<S>>,
        odds: &BoardingOdds,
        negotiation: Negotiation,
        notes: TurnNoteSet,
    ) -> Self {
        let state = CombatState::Isolated;
        let first = first_actor(state);
        Self {
            index: 0,
            state_before: state,
            negotiation_before: negotiation,
            first,
            actions: Sides::from_fn(|_| idle(state, negotiation)),
            results: Sides::splat(ActionResult {
                state,
                negotiation,
                ..ActionResult::default()
            }),
            casualties: Sides::splat(0),
            automated_losses: Sides::splat(0),
            crew_transfers: Sides::splat(0),
            plunder_taken: Sides::default(),
            state,
            negotiation,
            offer: None,
            offer_from: None,
            settlement: None,
            reports: build_reports(combatants, odds, state, negotiation, first, None),
            notes,
        }
    }

    /// Resolve one round from `intents`. The intents must already have
    /// been checked against the previous turn's valid objectives.
    pub(crate) fn resolve<S: Ship, R: Rng + ?Sized>(
        previous: &Self,
        intents: Sides<Activity>,
        arena: &mut Arena<'_, S, R>,
    ) -> Self {
        if previous.negotiation.is_active()
            && let (Activity::Resolve(boarder), Activity::Resolve(target)) =
                (&intents.boarder, &intents.target)
            && boarder == target
        {
            return Self::settle(previous, boarder.clone(), arena);
        }

        let first = first_actor(previous.state);
        let order = [first, first.opponent()];
        let mut resolution = Resolution::new(previous.state, previous.negotiation);
        let mut attempts = Sides::splat(Attempt {
            state: previous.state,
            negotiation: previous.negotiation,
            shared_language: arena.shared_language,
        });
        let mut actions = Sides::from_fn(|side| {
            Action::pending(intents[side].clone(), previous.state, previous.negotiation)
        });

        for side in order {
            let attempt = Attempt {
                state: resolution.state,
                negotiation: resolution.negotiation,
                shared_language: arena.shared_language,
            };
            let enemy_intent = &intents[side.opponent()];
            let enemy_power =
                arena.combatants[side.opponent()].action_power(enemy_intent.objective());
            let action = arena.combatants[side].attempt_action(
                attempt,
                &intents[side],
                enemy_intent,
                enemy_power,
                &mut *arena.rng,
            );
            resolution.note_attempt(side, attempt, &action);
            resolution.state = action.effect.state;
            resolution.negotiation = action.effect.negotiation;
            attempts[side] = attempt;
            actions[side] = action;
        }

        let mut results = Sides::<ActionResult>::default();
        for side in order {
            results[side] = resolution.apply(
                arena,
                side,
                &actions[side],
                &actions[side.opponent()],
                attempts[side].state,
            );
        }

        resolution.withdraw_if_passive(previous.state, &intents);
        resolution.track_rejections(arena.rejected, &actions);

        let mut offer = None;
        for side in order {
            if let Activity::Negotiate(made) | Activity::Resolve(made) = &actions[side].actual {
                offer = Some((side, made.clone()));
            }
        }
        if offer.is_none()
            && resolution.negotiation.is_active()
            && let (Some(side), Some(made)) = (previous.offer_from, &previous.offer)
        {
            offer = Some((side, made.clone()));
        }

        resolution.finish(previous, first, actions, results, offer, None, arena)
    }

    /// Both sides resolved on the same offer: carry out its terms.
    fn settle<S: Ship, R: Rng + ?Sized>(
        previous: &Self,
        offer: Offer,
        arena: &mut Arena<'_, S, R>,
    ) -> Self {
        let mut resolution = Resolution::new(previous.state, Negotiation::Successful);
        let mut settlement = Settlement {
            offer: offer.clone(),
            surrendered: offer.surrendering_side(),
            ..Settlement::default()
        };

        if let Some(side) = settlement.surrendered {
            resolution.state = side.opponent().victory_state();
        }
        for (term, value) in offer.terms() {
            let giver = term.giver();
            match (term, value) {
                (Term::BoarderPacified | Term::TargetPacified, TermValue::Flag(flag)) => {
                    settlement.pacified[giver] = flag;
                }
                (Term::CreditsFromBoarder | Term::CreditsFromTarget, TermValue::Credits(credits)) => {
                    settlement.credits_paid[giver] += credits;
                }
                (Term::CrewFromBoarder | Term::CrewFromTarget, TermValue::Count(count)) => {
                    settlement.crew_moved[giver] += resolution.move_crew(arena, giver, count, true);
                }
                (
                    Term::PassengersFromBoarder | Term::PassengersFromTarget,
                    TermValue::Count(count),
                ) => {
                    settlement.passengers_released[giver] +=
                        resolution.move_crew(arena, giver, count, false);
                }
                (
                    Term::PrisonersFromBoarder | Term::PrisonersFromTarget,
                    TermValue::Count(count),
                ) => {
                    settlement.prisoners_released[giver] +=
                        resolution.move_crew(arena, giver, count, false);
                }
                _ => {}
            }
        }
        if resolution.state.victor().is_none() {
            resolution.state = CombatState::Ended;
        }
        resolution.push_note(LOG_SETTLEMENT);

        let first = first_actor(previous.state);
        let actions = Sides::from_fn(|_| Action {
            intent: Activity::Resolve(offer.clone()),
            actual: Activity::Resolve(offer.clone()),
            effect: Effect {
                state: resolution.state,
                negotiation: Negotiation::Successful,
                casualty_objective: Objective::Resolve,
                casualty_rolls: 0,
            },
        });
        let results = Sides::splat(ActionResult {
            state: resolution.state,
            negotiation: Negotiation::Successful,
            ..ActionResult::default()
        });
        resolution.finish(
            previous,
            first,
            actions,
            results,
            Some((first, offer)),
            Some(settlement),
            arena,
        )
    }
}

fn idle(state: CombatState, negotiation: Negotiation) -> Action {
    Action {
        intent: Activity::Null,
        actual: Activity::Null,
        effect: Effect {
            state,
            negotiation,
            casualty_objective: Objective::Null,
            casualty_rolls: 0,
        },
    }
}

fn build_reports<S: Ship>(
    combatants: &Sides<Combatant<S>>,
    odds: &BoardingOdds,
    state: CombatState,
    negotiation: Negotiation,
    first: Side,
    offer: Option<(Side, &Offer)>,
) -> Sides<SituationReport> {
    Sides::from_fn(|side| {
        SituationReport::new(
            &combatants[side],
            &combatants[side.opponent()],
            odds,
            Standing {
                state,
                negotiation,
                acted_first: side == first,
                offer,
            },
        )
    })
}

/// Everything a turn works on besides its own bookkeeping.
pub(crate) struct Arena<'a, S: Ship, R: Rng + ?Sized> {
    pub combatants: &'a mut Sides<Combatant<S>>,
    pub odds: &'a BoardingOdds,
    pub shared_language: bool,
    /// Which sides have turned talks down at some point in the combat.
    pub rejected: &'a mut Sides<bool>,
    pub rng: &'a mut R,
}

/// Running bookkeeping for a turn in progress.
#[derive(Debug, Default)]
struct Resolution {
    state: CombatState,
    negotiation: Negotiation,
    casualties: Sides<u32>,
    automated_losses: Sides<u32>,
    crew_transfers: Sides<i32>,
    plunder_taken: Sides<Vec<PlunderItem>>,
    notes: TurnNoteSet,
}

impl Resolution {
    fn new(state: CombatState, negotiation: Negotiation) -> Self {
        Self {
            state,
            negotiation,
            ..Self::default()
        }
    }

    fn push_note(&mut self, key: &str) {
        let note = TurnNote::new(key);
        if note.is_empty() || self.notes.contains(&note) {
            return;
        }
        self.notes.push(note);
    }

    fn note_attempt(&mut self, side: Side, attempt: Attempt, action: &Action) {
        let intended = action.intent.objective();
        if intended == Objective::Null || action.succeeded() {
            if attempt.state != action.effect.state {
                match action.effect.state {
                    CombatState::Poised if attempt.state == CombatState::Isolated => {
                        self.push_note(LOG_ADVANCE);
                    }
                    CombatState::Poised => self.push_note(LOG_REPELLED),
                    CombatState::BoarderInvading | CombatState::TargetInvading => {
                        self.push_note(LOG_INVASION);
                    }
                    _ => {}
                }
            }
            return;
        }
        if !is_objective_valid(intended, attempt.state, attempt.negotiation, side) {
            self.push_note(LOG_ACTION_VOIDED);
        } else if intended == Objective::SelfDestruct {
            self.push_note(LOG_SELF_DESTRUCT_FAILED);
        } else if intended == Objective::Negotiate && !attempt.shared_language {
            self.push_note(LOG_TALKS_NO_LANGUAGE);
        }
    }

    /// Carry out an attempted action.
    fn apply<S: Ship, R: Rng + ?Sized>(
        &mut self,
        arena: &mut Arena<'_, S, R>,
        side: Side,
        action: &Action,
        enemy_action: &Action,
        attempted_in: CombatState,
    ) -> ActionResult {
        let enemy = side.opponent();
        let mut inflicted = Sides::splat(0_u32);
        let mut objectives = Sides::splat(Objective::Null);
        objectives[side] = action.effect.casualty_objective;
        objectives[enemy] = enemy_action.effect.casualty_objective;
        let rolls = action.effect.casualty_rolls;

        match &action.actual {
            Activity::Null | Activity::Pending | Activity::Resolve(_) => {}
            Activity::Negotiate(_) => self.push_note(LOG_TALKS_OPENED),
            Activity::Reject => self.push_note(LOG_TALKS_REJECTED),
            Activity::Attack | Activity::Defend => {
                if !self.state.is_terminal() {
                    let engaged = self.state;
                    if let Some(loser) =
                        self.roll_for_casualties(arena, rolls, engaged, objectives, &mut inflicted)
                    {
                        self.state = loser.opponent().victory_state();
                        self.push_note(LOG_CONQUERED);
                    }
                }
            }
            Activity::Plunder(order) => self.plunder(arena, side, *order, &mut inflicted),
            Activity::SelfDestruct => {
                self.roll_for_casualties(arena, rolls, attempted_in, objectives, &mut inflicted);
                let combatant = &mut arena.combatants[side];
                let lost = combatant.lose_all_crew();
                combatant.ship_mut().self_destruct();
                self.casualties[side] += lost;
                inflicted[side] += lost;
                self.state = CombatState::Ended;
                self.push_note(LOG_SELF_DESTRUCT);
            }
            Activity::Capture => {
                let before = Sides::from_fn(|s| arena.combatants[s].crew());
                let (captor, prize) = arena.combatants.pair_mut(side);
                prize.ship_mut().was_captured(captor.ship_mut());
                for s in Side::BOTH {
                    self.crew_transfers[s] +=
                        u32_to_i32(arena.combatants[s].crew()) - u32_to_i32(before[s]);
                }
                self.state = CombatState::Ended;
                self.push_note(LOG_CAPTURED);
            }
            Activity::Destroy => {
                let target = &mut arena.combatants[enemy];
                let lost = target.lose_all_crew();
                target.ship_mut().destroy();
                self.casualties[enemy] += lost;
                inflicted[enemy] += lost;
                self.state = CombatState::Ended;
                self.push_note(LOG_DESTROYED);
            }
            Activity::Leave => {
                self.state = CombatState::Ended;
                self.push_note(LOG_LEFT);
            }
        }

        if inflicted.boarder + inflicted.target > 0 {
            self.push_note(LOG_CASUALTIES);
        }
        ActionResult {
            state: self.state,
            negotiation: self.negotiation,
            casualties: inflicted[side],
            enemy_casualties: inflicted[enemy],
        }
    }

    /// Roll `rolls` times; each roll costs one side a member. Returns the
    /// side whose defenders ran out, if any.
    fn roll_for_casualties<S: Ship, R: Rng + ?Sized>(
        &mut self,
        arena: &mut Arena<'_, S, R>,
        rolls: u32,
        engaged: CombatState,
        objectives: Sides<Objective>,
        inflicted: &mut Sides<u32>,
    ) -> Option<Side> {
        for _ in 0..rolls {
            let power =
                Sides::from_fn(|side| arena.combatants[side].casualty_power(objectives[side]));
            let roll = arena.rng.r#gen::<f64>() * (power.boarder + power.target);
            let loser = if roll >= power.boarder {
                Side::Boarder
            } else {
                Side::Target
            };
            let combatant = &mut arena.combatants[loser];
            match combatant.apply_casualty(engaged == loser.invading_state()) {
                Casualty::Crew => {
                    self.casualties[loser] += 1;
                    inflicted[loser] += 1;
                }
                Casualty::Automated => self.automated_losses[loser] += 1,
                Casualty::Nobody => {}
            }
            if combatant.defenders() == 0 {
                return Some(loser);
            }
        }
        None
    }

    fn plunder<S: Ship, R: Rng + ?Sized>(
        &mut self,
        arena: &mut Arena<'_, S, R>,
        side: Side,
        order: PlunderOrder,
        inflicted: &mut Sides<u32>,
    ) {
        let conquered = self.state == side.victory_state();
        let (actor, enemy) = arena.combatants.pair_mut(side);
        let cargo_free = actor.ship().cargo_free();
        let lots = match order {
            PlunderOrder::Take { index, quantity } => {
                match enemy.loot_mut().take(index, quantity, conquered, cargo_free) {
                    Ok(lot) => vec![lot],
                    Err(err) => {
                        log::warn!("plunder order from {side} could not be carried out: {err}");
                        self.push_note(LOG_ACTION_VOIDED);
                        Vec::new()
                    }
                }
            }
            PlunderOrder::Raid => enemy.loot_mut().raid(conquered, cargo_free),
        };
        for lot in lots.into_iter().filter(|lot| lot.count > 0) {
            enemy.ship_mut().remove_plunder(&lot, lot.count);
            actor.ship_mut().stow_plunder(&lot, lot.count);
            self.plunder_taken[side].push(lot);
        }
        if !self.plunder_taken[side].is_empty() {
            self.push_note(LOG_PLUNDER_TAKEN);
        }

        if enemy.loot().is_exhausted() {
            let lost = enemy.lose_all_crew();
            enemy.ship_mut().destroy();
            self.casualties[side.opponent()] += lost;
            inflicted[side.opponent()] += lost;
            self.state = CombatState::Ended;
            self.push_note(LOG_PLUNDER_EXHAUSTED);
        }
    }

    /// Move up to `count` crew off `giver`, onto the other ship if
    /// `to_enemy`. Returns how many actually left.
    fn move_crew<S: Ship, R: Rng + ?Sized>(
        &mut self,
        arena: &mut Arena<'_, S, R>,
        giver: Side,
        count: u32,
        to_enemy: bool,
    ) -> u32 {
        let moved = count.min(arena.combatants[giver].crew());
        let delta = u32_to_i32(moved);
        arena.combatants[giver].ship_mut().add_crew(-delta);
        self.crew_transfers[giver] -= delta;
        if to_enemy {
            arena.combatants[giver.opponent()].ship_mut().add_crew(delta);
            self.crew_transfers[giver.opponent()] += delta;
        }
        moved
    }

    /// Neither side pressing the fight lets the crews drift apart.
    fn withdraw_if_passive(&mut self, state_before: CombatState, intents: &Sides<Activity>) {
        let passive = |activity: &Activity| {
            matches!(activity.objective(), Objective::Null | Objective::Defend)
        };
        if self.state != state_before
            || self.negotiation.is_active()
            || !passive(&intents.boarder)
            || !passive(&intents.target)
        {
            return;
        }
        self.state = match self.state {
            CombatState::Poised => {
                self.push_note(LOG_WITHDRAW);
                CombatState::Withdrawing
            }
            CombatState::Withdrawing => {
                self.push_note(LOG_DISENGAGED);
                CombatState::Isolated
            }
            CombatState::BoarderInvading | CombatState::TargetInvading => {
                self.push_note(LOG_REPELLED);
                CombatState::Poised
            }
            other => other,
        };
    }

    /// Talks fail for good once both sides have turned them down.
    fn track_rejections(&mut self, rejected: &mut Sides<bool>, actions: &Sides<Action>) {
        for side in Side::BOTH {
            if actions[side].actual == Activity::Reject {
                rejected[side] = true;
            }
        }
        if rejected.boarder
            && rejected.target
            && !matches!(self.negotiation, Negotiation::Failed | Negotiation::Successful)
        {
            self.negotiation = Negotiation::Failed;
            self.push_note(LOG_TALKS_FAILED);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn finish<S: Ship, R: Rng + ?Sized>(
        self,
        previous: &Turn,
        first: Side,
        actions: Sides<Action>,
        results: Sides<ActionResult>,
        offer: Option<(Side, Offer)>,
        settlement: Option<Settlement>,
        arena: &Arena<'_, S, R>,
    ) -> Turn {
        let reports = build_reports(
            arena.combatants,
            arena.odds,
            self.state,
            self.negotiation,
            first,
            offer.as_ref().map(|(side, made)| (*side, made)),
        );
        let (offer_from, offer) = match offer {
            Some((side, made)) => (Some(side), Some(made)),
            None => (None, None),
        };
        Turn {
            index: previous.index + 1,
            state_before: previous.state,
            negotiation_before: previous.negotiation,
            first,
            actions,
            results,
            casualties: self.casualties,
            automated_losses: self.automated_losses,
            crew_transfers: self.crew_transfers,
            plunder_taken: self.plunder_taken,
            state: self.state,
            negotiation: self.negotiation,
            offer,
            offer_from,
            settlement,
            reports,
            notes: self.notes,
        }
    }
}
