//! One side of a boarding combat: its ship, cached strategy and power,
//! and the actions it attempts.

pub mod ai;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activity::{Action, Activity, Effect};
use crate::numbers::{floor_f64_to_u32, i64_to_f64, round_f64_to_i64, u32_to_i32};
use crate::odds::ForcePower;
use crate::plunder::PlunderSession;
use crate::rules::BoardingRules;
use crate::ship::Ship;
use crate::vocabulary::{
    AttackStrategy, BoardingGoal, CombatState, DefenseStrategy, Negotiation, Objective, Side,
    is_objective_valid,
};

/// What a single casualty cost a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Casualty {
    /// An automated system was knocked out.
    Automated,
    /// A crew member died.
    Crew,
    /// Nobody was left to lose.
    Nobody,
}

/// The situation an action is attempted in. State and negotiation may
/// already reflect the other side's action this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    pub state: CombatState,
    pub negotiation: Negotiation,
    pub shared_language: bool,
}

/// Money figures a combatant's ship is worth to whoever takes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PrizeValue {
    pub capture_value: i64,
    pub chassis_value: i64,
    pub protected_value: i64,
    pub post_capture_survival: f64,
    pub cost_per_boarding_casualty: i64,
    pub expected_post_capture_casualty_costs: f64,
}

#[derive(Debug, Clone)]
pub struct Combatant<S: Ship> {
    ship: S,
    side: Side,
    attack_strategy: AttackStrategy,
    defense_strategy: DefenseStrategy,
    goal: BoardingGoal,
    player: bool,
    automated_invaders: u32,
    automated_defenders: u32,
    power: ForcePower,
    /// What the enemy can carry off from this ship.
    loot: PlunderSession,
    prize: PrizeValue,
    casualty_percentage: f64,
    self_destruct_multiplier: f64,
}

impl<S: Ship> Combatant<S> {
    #[must_use]
    pub fn new(ship: S, side: Side, rules: &BoardingRules) -> Self {
        let government = ship.government();
        let attributes = ship.attributes();
        let post_capture_survival = rules.post_capture_survival(ship.category());
        let loot = PlunderSession::new(ship.plunder());
        let prize = PrizeValue {
            capture_value: ship.cost(),
            chassis_value: ship.chassis_cost(),
            protected_value: loot.protected_value(),
            post_capture_survival,
            cost_per_boarding_casualty: rules.expected_cost_per_boarding_casualty,
            expected_post_capture_casualty_costs: f64::from(ship.required_crew())
                * (1.0 - post_capture_survival)
                * i64_to_f64(rules.expected_cost_per_post_capture_casualty),
        };
        Self {
            side,
            attack_strategy: government.attack_strategy,
            defense_strategy: government.defense_strategy,
            goal: ship.boarding_goal(),
            player: ship.is_player_controlled(),
            automated_invaders: attributes.automated_invaders,
            automated_defenders: attributes.automated_defenders,
            power: ForcePower::for_ship(&ship),
            loot,
            prize,
            casualty_percentage: rules.casualty_percentage_per_action,
            self_destruct_multiplier: rules.self_destruct_casualty_power_multiplier,
            ship,
        }
    }

    #[must_use]
    pub const fn ship(&self) -> &S {
        &self.ship
    }

    pub const fn ship_mut(&mut self) -> &mut S {
        &mut self.ship
    }

    #[must_use]
    pub fn into_ship(self) -> S {
        self.ship
    }

    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    #[must_use]
    pub const fn is_boarder(&self) -> bool {
        self.side.is_boarder()
    }

    #[must_use]
    pub const fn attack_strategy(&self) -> AttackStrategy {
        self.attack_strategy
    }

    #[must_use]
    pub const fn defense_strategy(&self) -> DefenseStrategy {
        self.defense_strategy
    }

    #[must_use]
    pub const fn goal(&self) -> BoardingGoal {
        self.goal
    }

    /// Whether the player steers this side. Fixed when the combat starts,
    /// so a captured ship keeps its original owner for reporting.
    #[must_use]
    pub const fn is_player_controlled(&self) -> bool {
        self.player
    }

    #[must_use]
    pub const fn force_power(&self) -> &ForcePower {
        &self.power
    }

    #[must_use]
    pub const fn loot(&self) -> &PlunderSession {
        &self.loot
    }

    pub const fn loot_mut(&mut self) -> &mut PlunderSession {
        &mut self.loot
    }

    #[must_use]
    pub const fn prize(&self) -> &PrizeValue {
        &self.prize
    }

    #[must_use]
    pub fn crew(&self) -> u32 {
        self.ship.crew()
    }

    #[must_use]
    pub const fn automated_invaders(&self) -> u32 {
        self.automated_invaders
    }

    #[must_use]
    pub const fn automated_defenders(&self) -> u32 {
        self.automated_defenders
    }

    /// Crew plus working automated invaders.
    #[must_use]
    pub fn invaders(&self) -> u32 {
        self.crew().saturating_add(self.automated_invaders)
    }

    /// Crew plus working automated defenders.
    #[must_use]
    pub fn defenders(&self) -> u32 {
        self.crew().saturating_add(self.automated_defenders)
    }

    #[must_use]
    pub fn attack_power(&self) -> f64 {
        self.power.attack.at(self.invaders())
    }

    #[must_use]
    pub fn defense_power(&self) -> f64 {
        self.power.defense.at(self.defenders())
    }

    /// Power this combatant brings to bear when pursuing `objective`.
    #[must_use]
    pub fn action_power(&self, objective: Objective) -> f64 {
        if objective.is_defensive() {
            self.defense_power()
        } else {
            self.attack_power()
        }
    }

    /// Power used when rolling for casualties. A crew that knows its ship
    /// is about to blow fights harder.
    #[must_use]
    pub fn casualty_power(&self, objective: Objective) -> f64 {
        let power = self.action_power(objective);
        if objective == Objective::SelfDestruct {
            power * self.self_destruct_multiplier
        } else {
            power
        }
    }

    /// How many casualty rolls an action with `objective` makes.
    #[must_use]
    pub fn casualty_rolls(
        &self,
        state: CombatState,
        negotiation: Negotiation,
        objective: Objective,
    ) -> u32 {
        if state.prevents_casualties()
            || negotiation.prevents_casualties()
            || objective.prevents_casualties()
        {
            return 0;
        }
        let crew = if objective.is_defensive() {
            self.defenders()
        } else {
            self.invaders()
        };
        floor_f64_to_u32(self.casualty_percentage * f64::from(crew)).max(1)
    }

    /// Take one casualty. Automated systems are knocked out before any
    /// crew member dies.
    pub fn apply_casualty(&mut self, is_invading: bool) -> Casualty {
        let automated = if is_invading {
            &mut self.automated_invaders
        } else {
            &mut self.automated_defenders
        };
        if *automated > 0 {
            *automated -= 1;
            return Casualty::Automated;
        }
        if self.ship.crew() == 0 {
            return Casualty::Nobody;
        }
        self.ship.add_crew(-1);
        Casualty::Crew
    }

    /// Everyone aboard dies with the ship. Returns the crew lost.
    pub(crate) fn lose_all_crew(&mut self) -> u32 {
        let crew = self.ship.crew();
        self.ship.add_crew(-u32_to_i32(crew));
        self.automated_invaders = 0;
        self.automated_defenders = 0;
        crew
    }

    /// Try to carry out `intent`. The intent is checked again against the
    /// situation at the moment of acting, since the enemy may already have
    /// changed it this turn.
    pub fn attempt_action<R: Rng + ?Sized>(
        &self,
        attempt: Attempt,
        intent: &Activity,
        enemy_intent: &Activity,
        enemy_power: f64,
        rng: &mut R,
    ) -> Action {
        let objective = intent.objective();
        if !is_objective_valid(objective, attempt.state, attempt.negotiation, self.side) {
            return Action {
                intent: intent.clone(),
                actual: Activity::Null,
                effect: Effect {
                    state: attempt.state,
                    negotiation: attempt.negotiation,
                    casualty_objective: objective,
                    casualty_rolls: 0,
                },
            };
        }

        let power = self.action_power(objective);
        let won_power_roll = rng.r#gen::<f64>() * (power + enemy_power) <= power;
        let performed = match objective {
            Objective::Defend => enemy_intent.objective() == Objective::Attack,
            Objective::Negotiate => attempt.shared_language,
            Objective::Resolve => enemy_intent.objective() != Objective::Reject,
            Objective::SelfDestruct => {
                won_power_roll
                    && rng.r#gen::<f64>() < self.ship.attributes().self_destruct
            }
            _ => true,
        };
        let actual = if performed {
            intent.clone()
        } else {
            Activity::Null
        };
        let actual_objective = actual.objective();

        let state =
            self.maybe_change_state(attempt.state, actual_objective, enemy_intent.objective());
        // Rolls happen where the fighting is: after an advance, but before
        // the combat ends.
        let engaged = if state.is_ended() {
            attempt.state
        } else {
            state
        };
        let casualty_rolls = self.casualty_rolls(engaged, attempt.negotiation, actual_objective);

        Action {
            intent: intent.clone(),
            actual,
            effect: Effect {
                state,
                negotiation: self.maybe_change_negotiation(attempt.negotiation, actual_objective),
                casualty_objective: actual_objective,
                casualty_rolls,
            },
        }
    }

    /// The combat state after this combatant succeeds at `objective`.
    #[must_use]
    pub fn maybe_change_state(
        &self,
        state: CombatState,
        objective: Objective,
        enemy_objective: Objective,
    ) -> CombatState {
        let own_invasion = self.side.invading_state();
        let enemy_attacking = enemy_objective == Objective::Attack;
        match objective {
            Objective::Attack if state == own_invasion => state,
            Objective::Attack if state == self.side.opponent().invading_state() => {
                if enemy_attacking {
                    state
                } else {
                    CombatState::Poised
                }
            }
            Objective::Attack => match state {
                CombatState::Isolated if self.side.is_boarder() => CombatState::Poised,
                CombatState::Poised | CombatState::Withdrawing if enemy_attacking => {
                    CombatState::Poised
                }
                CombatState::Poised | CombatState::Withdrawing => own_invasion,
                _ => state,
            },
            Objective::SelfDestruct
            | Objective::Capture
            | Objective::Destroy
            | Objective::Leave => CombatState::Ended,
            _ => state,
        }
    }

    /// The negotiation status after this combatant succeeds at `objective`.
    #[must_use]
    pub const fn maybe_change_negotiation(
        &self,
        negotiation: Negotiation,
        objective: Objective,
    ) -> Negotiation {
        match objective {
            Objective::Negotiate => Negotiation::Active,
            Objective::Reject => self.side.rejected_status(),
            _ => negotiation,
        }
    }

    /// Expected profit from capturing this ship, net of boarding losses
    /// and of the prize crew likely lost getting it home.
    #[must_use]
    pub fn expected_capture_profit(&self, invasion_casualties: f64, victory_odds: f64) -> i64 {
        round_f64_to_i64(
            i64_to_f64(self.prize.capture_value) * victory_odds
                - invasion_casualties * i64_to_f64(self.prize.cost_per_boarding_casualty)
                - self.prize.expected_post_capture_casualty_costs,
        )
    }

    /// Expected profit from conquering this ship for its protected outfits.
    #[must_use]
    pub fn expected_protected_plunder_profit(
        &self,
        invasion_casualties: f64,
        victory_odds: f64,
    ) -> i64 {
        round_f64_to_i64(
            i64_to_f64(self.prize.protected_value) * victory_odds
                - invasion_casualties * i64_to_f64(self.prize.cost_per_boarding_casualty),
        )
    }

    /// Value an enemy with `cargo_free` tons of space could raid from
    /// this ship right now.
    #[must_use]
    pub fn expected_plunder_profit(&self, conquered: bool, cargo_free: f64) -> i64 {
        self.loot.expected_total_raid_value(conquered, cargo_free)
    }

    /// What invading this ship is worth to an enemy with `enemy_goal`.
    #[must_use]
    pub fn expected_invasion_profit(
        enemy_goal: BoardingGoal,
        enemy_is_boarder: bool,
        capture: i64,
        plunder: i64,
        protected: i64,
    ) -> i64 {
        match enemy_goal {
            BoardingGoal::Capture => capture,
            BoardingGoal::Plunder => protected,
            BoardingGoal::CaptureManually | BoardingGoal::PlunderManually => capture.max(protected),
            // A target can only plunder after a successful counter-invasion,
            // which opens up everything aboard.
            BoardingGoal::Opportunistic => {
                capture.max(if enemy_is_boarder { protected } else { plunder })
            }
        }
    }

    /// Chance that one self-destruct attempt detonates the ship.
    #[must_use]
    pub fn self_destruct_probability(&self, enemy_attack_power: f64) -> f64 {
        let power = self.action_power(Objective::SelfDestruct);
        let total = power + enemy_attack_power;
        if total <= 0.0 {
            return 0.0;
        }
        self.ship.attributes().self_destruct * power / total
    }

    /// Casualties a self-destruct attempt is expected to inflict on an
    /// invading enemy before the ship blows.
    #[must_use]
    pub fn expected_self_destruct_casualties_inflicted(&self, enemy_attack_power: f64) -> f64 {
        let rolls = self.casualty_rolls(
            self.side.opponent().invading_state(),
            Negotiation::NotAttempted,
            Objective::SelfDestruct,
        );
        let power = self.casualty_power(Objective::SelfDestruct);
        let total = power + enemy_attack_power;
        if total <= 0.0 {
            return 0.0;
        }
        f64::from(rolls) * power / total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ship::{Government, ShipRecord};
    use rand::{Error, RngCore};

    /// Returns the same sample forever.
    struct StubRng {
        value: u64,
    }

    impl RngCore for StubRng {
        fn next_u32(&mut self) -> u32 {
            u32::try_from(self.value >> 32).unwrap_or(u32::MAX)
        }

        fn next_u64(&mut self) -> u64 {
            self.value
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    /// Zero on the 32-bit stream, all ones on the 64-bit stream.
    struct SplitRng;

    impl RngCore for SplitRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            u64::MAX
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    fn combatant(side: Side, crew: u32) -> Combatant<ShipRecord> {
        let ship = ShipRecord::new("Test", Government::new("Independent"), crew)
            .with_automation(1, 2)
            .with_self_destruct(0.5);
        Combatant::new(ship, side, &BoardingRules::default())
    }

    fn attempt(state: CombatState) -> Attempt {
        Attempt {
            state,
            negotiation: Negotiation::NotAttempted,
            shared_language: true,
        }
    }

    #[test]
    fn automated_systems_fall_first() {
        let mut target = combatant(Side::Target, 3);
        assert_eq!(target.defenders(), 5);
        assert_eq!(target.apply_casualty(false), Casualty::Automated);
        assert_eq!(target.apply_casualty(false), Casualty::Automated);
        assert_eq!(target.apply_casualty(false), Casualty::Crew);
        assert_eq!(target.defenders(), 2);
        assert_eq!(target.invaders(), 3);
        assert_eq!(target.apply_casualty(true), Casualty::Automated);
        assert_eq!(target.invaders(), 2);
    }

    #[test]
    fn casualty_rolls_scale_with_crew() {
        let boarder = combatant(Side::Boarder, 11);
        // 12 invaders at 25%.
        assert_eq!(
            boarder.casualty_rolls(CombatState::Poised, Negotiation::NotAttempted, Objective::Attack),
            3
        );
        assert_eq!(
            boarder.casualty_rolls(CombatState::Isolated, Negotiation::NotAttempted, Objective::Attack),
            0
        );
        assert_eq!(
            boarder.casualty_rolls(CombatState::Poised, Negotiation::Active, Objective::Attack),
            0
        );
        let lone = combatant(Side::Boarder, 0);
        assert_eq!(
            lone.casualty_rolls(CombatState::Poised, Negotiation::NotAttempted, Objective::Attack),
            1
        );
    }

    #[test]
    fn boarder_attack_from_isolation_engages() {
        let boarder = combatant(Side::Boarder, 5);
        let mut rng = StubRng { value: 0 };
        let action = boarder.attempt_action(
            attempt(CombatState::Isolated),
            &Activity::Attack,
            &Activity::Defend,
            1.0,
            &mut rng,
        );
        assert_eq!(action.actual, Activity::Attack);
        assert_eq!(action.effect.state, CombatState::Poised);
        assert!(action.effect.casualty_rolls >= 1);
    }

    #[test]
    fn defend_needs_an_attacker() {
        let target = combatant(Side::Target, 5);
        let mut rng = StubRng { value: 0 };
        let action = target.attempt_action(
            attempt(CombatState::Poised),
            &Activity::Defend,
            &Activity::Null,
            1.0,
            &mut rng,
        );
        assert_eq!(action.actual, Activity::Null);
        assert_eq!(action.effect.casualty_rolls, 0);
    }

    #[test]
    fn invalid_intent_keeps_its_casualty_objective() {
        let target = combatant(Side::Target, 5);
        let mut rng = StubRng { value: 0 };
        let action = target.attempt_action(
            attempt(CombatState::Ended),
            &Activity::SelfDestruct,
            &Activity::Null,
            1.0,
            &mut rng,
        );
        assert_eq!(action.actual, Activity::Null);
        assert_eq!(action.effect.casualty_objective, Objective::SelfDestruct);
        assert_eq!(action.effect.state, CombatState::Ended);
    }

    #[test]
    fn self_destruct_needs_both_rolls() {
        let target = combatant(Side::Target, 5);
        let mut lucky = StubRng { value: 0 };
        let action = target.attempt_action(
            attempt(CombatState::BoarderInvading),
            &Activity::SelfDestruct,
            &Activity::Attack,
            10.0,
            &mut lucky,
        );
        assert_eq!(action.effect.state, CombatState::Ended);
        // The fight aboard still happens before the blast.
        assert!(action.effect.casualty_rolls >= 1);

        let mut unlucky = StubRng { value: u64::MAX };
        let action = target.attempt_action(
            attempt(CombatState::BoarderInvading),
            &Activity::SelfDestruct,
            &Activity::Attack,
            10.0,
            &mut unlucky,
        );
        assert_eq!(action.actual, Activity::Null);
        assert_eq!(action.effect.state, CombatState::BoarderInvading);
    }

    #[test]
    fn power_rolls_draw_from_the_full_width_stream() {
        let target = combatant(Side::Target, 5);
        let action = target.attempt_action(
            attempt(CombatState::BoarderInvading),
            &Activity::SelfDestruct,
            &Activity::Attack,
            10.0,
            &mut SplitRng,
        );
        assert_eq!(action.actual, Activity::Null);
        assert_eq!(action.effect.state, CombatState::BoarderInvading);
    }

    #[test]
    fn attack_state_changes() {
        let boarder = combatant(Side::Boarder, 5);
        let target = combatant(Side::Target, 5);
        use CombatState as S;
        use Objective as O;
        assert_eq!(boarder.maybe_change_state(S::Poised, O::Attack, O::Defend), S::BoarderInvading);
        assert_eq!(boarder.maybe_change_state(S::Poised, O::Attack, O::Attack), S::Poised);
        assert_eq!(target.maybe_change_state(S::Withdrawing, O::Attack, O::Null), S::TargetInvading);
        assert_eq!(target.maybe_change_state(S::Isolated, O::Attack, O::Null), S::Isolated);
        assert_eq!(target.maybe_change_state(S::BoarderInvading, O::Attack, O::Defend), S::Poised);
        assert_eq!(target.maybe_change_state(S::BoarderInvading, O::Attack, O::Attack), S::BoarderInvading);
        assert_eq!(boarder.maybe_change_state(S::BoarderInvading, O::Attack, O::Attack), S::BoarderInvading);
        assert_eq!(boarder.maybe_change_state(S::BoarderVictory, O::Leave, O::Null), S::Ended);
        assert_eq!(
            target.maybe_change_negotiation(Negotiation::Active, O::Reject),
            Negotiation::TargetRejected
        );
    }

    #[test]
    fn invasion_profit_follows_the_enemy_goal() {
        let profit = |goal, boarder| {
            Combatant::<ShipRecord>::expected_invasion_profit(goal, boarder, 100, 300, 50)
        };
        assert_eq!(profit(BoardingGoal::Capture, true), 100);
        assert_eq!(profit(BoardingGoal::Plunder, true), 50);
        assert_eq!(profit(BoardingGoal::PlunderManually, true), 100);
        assert_eq!(profit(BoardingGoal::Opportunistic, true), 100);
        assert_eq!(profit(BoardingGoal::Opportunistic, false), 300);
    }

    #[test]
    fn capture_profit_weighs_losses() {
        let ship = ShipRecord::new("Prize", Government::new("Merchant"), 4)
            .with_required_crew(2)
            .with_category("Heavy Freighter")
            .with_cost(1_000_000, 400_000);
        let prize = Combatant::new(ship, Side::Target, &BoardingRules::default());
        // 1e6 * 0.5 - 2 * 20_000 - 2 * 0.5 * 10_000
        assert_eq!(prize.expected_capture_profit(2.0, 0.5), 450_000);
        assert!(prize.self_destruct_probability(1.0).abs() < f64::EPSILON);
    }
}
