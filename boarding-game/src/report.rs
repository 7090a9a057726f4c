//! Per-turn snapshot of everything a side knows about the fight.

use serde::{Deserialize, Serialize};

use crate::combatant::Combatant;
use crate::odds::{BoardingOdds, Forces, ProbabilityReport};
use crate::offer::Offer;
use crate::ship::Ship;
use crate::vocabulary::{
    CombatState, Negotiation, Objective, ObjectiveSet, Side, Sides, valid_objectives,
};

/// What one side knows at the end of a turn. Built once per turn per
/// side and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SituationReport {
    pub state: CombatState,
    pub negotiation: Negotiation,
    pub is_boarder: bool,
    pub acted_first: bool,
    pub is_conquered: bool,
    pub is_enemy_conquered: bool,
    pub is_enemy_invading: bool,

    pub crew: u32,
    pub extra_crew: u32,
    pub invaders: u32,
    pub defenders: u32,
    pub enemy_crew: u32,
    pub enemy_invaders: u32,
    pub enemy_defenders: u32,
    pub cargo_free: f64,

    pub attack_power: f64,
    pub defense_power: f64,
    pub enemy_attack_power: f64,
    pub enemy_defense_power: f64,

    /// Turns an invasion needs at best to wipe out the enemy's defenders.
    /// Infinite when the invasion cannot make progress; serialized as null.
    #[serde(with = "unbounded")]
    pub minimum_turns_to_victory: f64,
    /// Turns an enemy invasion needs at best to wipe out ours.
    #[serde(with = "unbounded")]
    pub minimum_turns_to_defeat: f64,

    pub self_destruct_probability: f64,
    pub enemy_self_destruct_probability: f64,
    /// Chance the enemy blows its ship before an invasion can finish.
    pub enemy_cumulative_self_destruct_probability: f64,
    /// Casualties our own self-destruct attempt would inflict on invaders.
    pub expected_self_destruct_casualties: f64,

    pub invasion_victory_probability: f64,
    pub expected_invasion_casualties: f64,
    pub defensive_victory_probability: f64,
    pub expected_defensive_casualties: f64,
    pub post_capture_survival_probability: f64,

    pub expected_capture_profit: i64,
    pub expected_plunder_profit: i64,
    pub expected_protected_plunder_profit: i64,
    pub expected_invasion_profit: i64,

    pub is_plunder_finished: bool,
    /// Enemy items that could be taken right now.
    pub plunder_options: usize,

    pub valid_objectives: ObjectiveSet,
    pub enemy_valid_objectives: ObjectiveSet,
    /// The offer on the table, if talks are underway.
    pub offer: Option<Offer>,
    pub offer_from: Option<Side>,
    pub probability: ProbabilityReport,
}

mod unbounded {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

/// Turns needed to remove `targets` members at `rolls` rolls per turn,
/// each won with `share`.
fn minimum_turns(targets: u32, rolls: u32, share: f64) -> f64 {
    if targets == 0 {
        return 0.0;
    }
    let per_turn = f64::from(rolls) * share;
    if per_turn <= 0.0 || !per_turn.is_finite() {
        return f64::INFINITY;
    }
    f64::from(targets) / per_turn
}

fn share(power: f64, against: f64) -> f64 {
    let total = power + against;
    if total > 0.0 { power / total } else { 0.0 }
}

/// Where a turn left the combat.
#[derive(Debug, Clone, Copy)]
pub struct Standing<'a> {
    pub state: CombatState,
    pub negotiation: Negotiation,
    pub acted_first: bool,
    /// The latest offer made and the side that made it.
    pub offer: Option<(Side, &'a Offer)>,
}

impl SituationReport {
    /// Build `combatant`'s report against `enemy`.
    #[must_use]
    pub fn new<S: Ship>(
        combatant: &Combatant<S>,
        enemy: &Combatant<S>,
        odds: &BoardingOdds,
        standing: Standing<'_>,
    ) -> Self {
        let side = combatant.side();
        let enemy_side = side.opponent();
        let Standing {
            state,
            negotiation,
            acted_first,
            offer,
        } = standing;

        let is_conquered = state == enemy_side.victory_state();
        let is_enemy_conquered = state == side.victory_state();
        let is_enemy_invading = state == enemy_side.invading_state();

        let invaders = combatant.invaders();
        let defenders = combatant.defenders();
        let enemy_invaders = enemy.invaders();
        let enemy_defenders = enemy.defenders();
        let cargo_free = combatant.ship().cargo_free();

        let attack_power = combatant.attack_power();
        let defense_power = combatant.defense_power();
        let enemy_attack_power = enemy.attack_power();
        let enemy_defense_power = enemy.defense_power();

        let minimum_turns_to_victory = minimum_turns(
            enemy_defenders,
            combatant.casualty_rolls(
                side.invading_state(),
                Negotiation::NotAttempted,
                Objective::Attack,
            ),
            share(attack_power, enemy_defense_power),
        );
        let minimum_turns_to_defeat = minimum_turns(
            defenders,
            enemy.casualty_rolls(
                enemy_side.invading_state(),
                Negotiation::NotAttempted,
                Objective::Attack,
            ),
            share(enemy_attack_power, defense_power),
        );

        let self_destruct_probability = combatant.self_destruct_probability(enemy_attack_power);
        let enemy_self_destruct_probability = enemy.self_destruct_probability(attack_power);
        let enemy_cumulative_self_destruct_probability =
            1.0 - (1.0 - enemy_self_destruct_probability).powf(minimum_turns_to_victory);
        let expected_self_destruct_casualties =
            combatant.expected_self_destruct_casualties_inflicted(enemy_attack_power);
        let enemy_self_destruct_casualties =
            enemy.expected_self_destruct_casualties_inflicted(attack_power);

        let invasion = &odds.invasion[side];
        let counter_invasion = &odds.invasion[enemy_side];
        let invasion_victory_probability = invasion.odds(invaders, enemy_defenders)
            * (1.0 - enemy_cumulative_self_destruct_probability);
        let expected_invasion_casualties = invasion.attacker_casualties(invaders, enemy_defenders)
            + enemy_cumulative_self_destruct_probability * enemy_self_destruct_casualties;
        let defensive_victory_probability =
            1.0 - counter_invasion.odds(enemy_invaders, defenders);
        let expected_defensive_casualties =
            counter_invasion.defender_casualties(enemy_invaders, defenders);

        let expected_capture_profit =
            enemy.expected_capture_profit(expected_invasion_casualties, invasion_victory_probability);
        let expected_plunder_profit = enemy.expected_plunder_profit(is_enemy_conquered, cargo_free);
        let expected_protected_plunder_profit = enemy.expected_protected_plunder_profit(
            expected_invasion_casualties,
            invasion_victory_probability,
        );
        let expected_invasion_profit = Combatant::<S>::expected_invasion_profit(
            combatant.goal(),
            combatant.is_boarder(),
            expected_capture_profit,
            expected_plunder_profit,
            expected_protected_plunder_profit,
        );

        let loot = enemy.loot();
        let plunder_options = loot
            .remaining()
            .iter()
            .filter(|item| {
                item.is_reachable(is_enemy_conquered) && item.units_that_fit(cargo_free) > 0
            })
            .count();

        let forces = Sides::from_fn(|side| {
            let c = if side == combatant.side() {
                combatant
            } else {
                enemy
            };
            Forces {
                invaders: c.invaders(),
                defenders: c.defenders(),
            }
        });

        Self {
            state,
            negotiation,
            is_boarder: combatant.is_boarder(),
            acted_first,
            is_conquered,
            is_enemy_conquered,
            is_enemy_invading,
            crew: combatant.crew(),
            extra_crew: combatant.ship().extra_crew(),
            invaders,
            defenders,
            enemy_crew: enemy.crew(),
            enemy_invaders,
            enemy_defenders,
            cargo_free,
            attack_power,
            defense_power,
            enemy_attack_power,
            enemy_defense_power,
            minimum_turns_to_victory,
            minimum_turns_to_defeat,
            self_destruct_probability,
            enemy_self_destruct_probability,
            enemy_cumulative_self_destruct_probability,
            expected_self_destruct_casualties,
            invasion_victory_probability,
            expected_invasion_casualties,
            defensive_victory_probability,
            expected_defensive_casualties,
            post_capture_survival_probability: combatant.prize().post_capture_survival,
            expected_capture_profit,
            expected_plunder_profit,
            expected_protected_plunder_profit,
            expected_invasion_profit,
            is_plunder_finished: plunder_options == 0,
            plunder_options,
            valid_objectives: valid_objectives(state, negotiation, side),
            enemy_valid_objectives: valid_objectives(state, negotiation, enemy_side),
            offer: offer.map(|(_, offer)| offer.clone()),
            offer_from: offer.map(|(from, _)| from),
            probability: odds.probability.report(forces),
        }
    }

    #[must_use]
    pub const fn can(&self, objective: Objective) -> bool {
        self.valid_objectives.contains(objective)
    }

    #[must_use]
    pub const fn enemy_can(&self, objective: Objective) -> bool {
        self.enemy_valid_objectives.contains(objective)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::BoardingRules;
    use crate::ship::{CargoLot, Government, ShipRecord};

    fn report_for(boarder_crew: u32, target_crew: u32, state: CombatState) -> SituationReport {
        let rules = BoardingRules::default();
        let boarder_ship = ShipRecord::new("Raider", Government::new("Pirate"), boarder_crew)
            .with_cargo_capacity(20.0);
        let target_ship = ShipRecord::new("Hauler", Government::new("Merchant"), target_crew)
            .with_cargo(CargoLot::commodity("Medical", 10, 900))
            .with_cost(800_000, 500_000);
        let odds = BoardingOdds::for_ships(&boarder_ship, &target_ship, 3.0);
        let boarder = Combatant::new(boarder_ship, Side::Boarder, &rules);
        let target = Combatant::new(target_ship, Side::Target, &rules);
        SituationReport::new(
            &boarder,
            &target,
            &odds,
            Standing {
                state,
                negotiation: Negotiation::NotAttempted,
                acted_first: false,
                offer: None,
            },
        )
    }

    #[test]
    fn overwhelming_boarder_expects_to_win() {
        let report = report_for(20, 2, CombatState::Isolated);
        assert!(report.invasion_victory_probability > 0.9);
        assert!(report.defensive_victory_probability > 0.9);
        assert!(report.minimum_turns_to_victory > 0.0);
        assert!(report.minimum_turns_to_victory.is_finite());
        assert_eq!(report.expected_plunder_profit, 9_000);
        assert_eq!(report.plunder_options, 1);
        assert!(!report.is_plunder_finished);
        assert!(report.can(Objective::Attack));
        assert!(report.can(Objective::Plunder));
        assert!(!report.enemy_can(Objective::Plunder));
    }

    #[test]
    fn conquest_flags_follow_the_state() {
        let report = report_for(5, 5, CombatState::BoarderVictory);
        assert!(report.is_enemy_conquered);
        assert!(!report.is_conquered);
        assert!(report.can(Objective::Capture));

        let report = report_for(5, 5, CombatState::TargetInvading);
        assert!(report.is_enemy_invading);
        assert!(!report.can(Objective::Plunder));
    }

    #[test]
    fn unbounded_turns_serialize_as_null() {
        let mut report = report_for(8, 4, CombatState::Poised);
        report.minimum_turns_to_defeat = f64::INFINITY;
        let value = serde_json::to_value(&report).unwrap();
        assert!(value["minimum_turns_to_defeat"].is_null());
        assert!(value["minimum_turns_to_victory"].is_number());
        let back: SituationReport = serde_json::from_value(value).unwrap();
        assert!(back.minimum_turns_to_defeat.is_infinite());
    }

    #[test]
    fn minimum_turns_edges() {
        assert!(minimum_turns(0, 0, 0.0).abs() < f64::EPSILON);
        assert!(minimum_turns(3, 0, 0.5).is_infinite());
        assert!((minimum_turns(4, 2, 0.5) - 4.0).abs() < f64::EPSILON);
    }
}
