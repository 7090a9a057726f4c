//! Decision making for combatants nobody is steering.
//!
//! Everything here reads the latest [`SituationReport`] and the
//! combatant's fixed strategies; nothing is remembered between turns.

use super::Combatant;
use crate::activity::Activity;
use crate::constants::{
    AGGRESSIVE_MIN_VICTORY, CAUTIOUS_MAX_CASUALTIES, CAUTIOUS_MIN_VICTORY, DEFENSE_POWER_FLOOR,
    FANATICAL_MIN_VICTORY, LAST_STAND_VICTORY, RECKLESS_MIN_VICTORY, SELF_DESTRUCT_NEGLIGIBLE,
    SURRENDER_VICTORY,
};
use crate::offer::Offer;
use crate::report::SituationReport;
use crate::ship::Ship;
use crate::vocabulary::{
    AttackStrategy, BoardingGoal, CombatState, DefenseStrategy, Objective,
};

impl<S: Ship> Combatant<S> {
    /// Whether this combatant is willing to attack.
    #[must_use]
    pub fn consider_attacking(&self, report: &SituationReport) -> bool {
        if !report.can(Objective::Attack) {
            return false;
        }

        // Deny crews only attack when it beats scuttling or holding out.
        if self.defense_strategy() == DefenseStrategy::Deny {
            if report.enemy_can(Objective::Plunder) {
                return report.invasion_victory_probability > report.self_destruct_probability;
            }
            if report.is_enemy_invading {
                return report.invasion_victory_probability > report.defensive_victory_probability
                    && report.invasion_victory_probability > report.self_destruct_probability;
            }
        }

        if report.is_enemy_invading {
            // Crews with more punch than staying power push back out.
            if report.attack_power > report.defense_power {
                return true;
            }
            if report.expected_invasion_casualties < report.expected_defensive_casualties {
                return true;
            }
        }

        if report.expected_invasion_profit <= 0 {
            return false;
        }

        // From the airlock, a Counter crew that does better at home waits
        // for the enemy to come to it.
        if self.defense_strategy() == DefenseStrategy::Counter
            && report.state == CombatState::Poised
            && (report.expected_invasion_casualties > report.expected_defensive_casualties
                || power_ratio(report.defense_power, report.enemy_attack_power)
                    > power_ratio(report.attack_power, report.enemy_defense_power))
        {
            return false;
        }

        match self.attack_strategy() {
            AttackStrategy::Cautious => {
                report.invasion_victory_probability > CAUTIOUS_MIN_VICTORY
                    && report.expected_invasion_casualties < CAUTIOUS_MAX_CASUALTIES
            }
            AttackStrategy::Aggressive => {
                report.invasion_victory_probability > AGGRESSIVE_MIN_VICTORY
                    && report.expected_invasion_casualties < f64::from(report.extra_crew)
            }
            AttackStrategy::Reckless => report.invasion_victory_probability > RECKLESS_MIN_VICTORY,
            AttackStrategy::Fanatical => {
                report.invasion_victory_probability > FANATICAL_MIN_VICTORY
            }
        }
    }

    /// Whether this combatant wants to take the conquered enemy ship.
    #[must_use]
    pub fn consider_capturing(&self, report: &SituationReport) -> bool {
        if !report.can(Objective::Capture) {
            return false;
        }
        if self.goal() == BoardingGoal::Capture {
            report.expected_capture_profit > 0
        } else {
            report.expected_capture_profit > report.expected_plunder_profit
        }
    }

    /// Destroy the enemy once there is nothing left worth taking.
    #[must_use]
    pub const fn consider_destroying(&self, report: &SituationReport) -> bool {
        report.can(Objective::Destroy) && report.plunder_options == 0
    }

    #[must_use]
    pub const fn consider_plundering(&self, report: &SituationReport) -> bool {
        report.can(Objective::Plunder) && report.expected_plunder_profit > 0
    }

    /// Whether this combatant would rather blow up its own ship.
    #[must_use]
    pub fn consider_self_destructing(&self, report: &SituationReport) -> bool {
        if report.self_destruct_probability < SELF_DESTRUCT_NEGLIGIBLE
            || !report.can(Objective::SelfDestruct)
        {
            return false;
        }
        let losing = report.is_enemy_invading
            && report.self_destruct_probability > report.defensive_victory_probability;
        match self.defense_strategy() {
            DefenseStrategy::Deny => report.enemy_can(Objective::Plunder) || losing,
            DefenseStrategy::Counter | DefenseStrategy::Repel => {
                losing && report.defensive_victory_probability < LAST_STAND_VICTORY
            }
        }
    }

    /// A crew that is about to be overrun and cannot scuttle asks for
    /// terms instead.
    #[must_use]
    pub fn is_desperate(&self, report: &SituationReport) -> bool {
        report.is_enemy_invading
            && report.defensive_victory_probability < SURRENDER_VICTORY
            && !self.consider_self_destructing(report)
    }

    /// The activity to attempt next turn.
    #[must_use]
    pub fn determine_intent(&self, report: &SituationReport) -> Activity {
        if report.negotiation.is_active() {
            return self.determine_negotiation_intent(report);
        }
        match self.goal() {
            BoardingGoal::Capture => self.determine_capture_intent(report),
            BoardingGoal::Plunder => self.determine_plunder_intent(report),
            BoardingGoal::Opportunistic
            | BoardingGoal::CaptureManually
            | BoardingGoal::PlunderManually => self.determine_default_intent(report),
        }
    }

    #[must_use]
    pub fn determine_capture_intent(&self, report: &SituationReport) -> Activity {
        if self.consider_capturing(report) {
            Activity::Capture
        } else if self.consider_attacking(report) {
            Activity::Attack
        } else if self.consider_self_destructing(report) {
            Activity::SelfDestruct
        } else if let Some(plea) = self.plea_for_terms(report) {
            plea
        } else {
            Self::fall_back(report)
        }
    }

    #[must_use]
    pub fn determine_default_intent(&self, report: &SituationReport) -> Activity {
        if self.consider_capturing(report) {
            Activity::Capture
        } else if self.consider_attacking(report) {
            Activity::Attack
        } else if self.consider_self_destructing(report) {
            Activity::SelfDestruct
        } else if let Some(plea) = self.plea_for_terms(report) {
            plea
        } else if self.consider_plundering(report) {
            Activity::raid()
        } else if self.consider_destroying(report) {
            Activity::Destroy
        } else {
            Self::fall_back(report)
        }
    }

    #[must_use]
    pub fn determine_plunder_intent(&self, report: &SituationReport) -> Activity {
        if self.consider_destroying(report) {
            Activity::Destroy
        } else if report.is_plunder_finished && report.can(Objective::Leave) {
            Activity::Leave
        } else if self.consider_attacking(report) {
            Activity::Attack
        } else if self.consider_self_destructing(report) {
            Activity::SelfDestruct
        } else if let Some(plea) = self.plea_for_terms(report) {
            plea
        } else if report.can(Objective::Plunder) {
            Activity::raid()
        } else {
            Self::fall_back(report)
        }
    }

    /// Answer the offer on the table: accept our enemy's surrender, accept
    /// our own when there is no way out, reject anything else.
    #[must_use]
    pub fn determine_negotiation_intent(&self, report: &SituationReport) -> Activity {
        let Some(offer) = &report.offer else {
            return Self::checked(report, Activity::Reject);
        };
        let side = self.side();
        let acceptable = match offer.surrendering_side() {
            Some(surrendering) if surrendering == side.opponent() => true,
            Some(_) => report.offer_from == Some(side) || self.is_desperate(report),
            None => false,
        };
        if acceptable {
            Self::checked(report, Activity::Resolve(offer.clone()))
        } else {
            Self::checked(report, Activity::Reject)
        }
    }

    fn plea_for_terms(&self, report: &SituationReport) -> Option<Activity> {
        (report.can(Objective::Negotiate) && self.is_desperate(report))
            .then(|| Activity::Negotiate(Offer::surrender(self.side())))
    }

    fn fall_back(report: &SituationReport) -> Activity {
        if report.can(Objective::Leave) {
            Activity::Leave
        } else if report.can(Objective::Defend) {
            Activity::Defend
        } else {
            Activity::Null
        }
    }

    fn checked(report: &SituationReport, activity: Activity) -> Activity {
        if report.can(activity.objective()) {
            activity
        } else {
            Activity::Null
        }
    }
}

/// `own` over `enemy`, with the enemy floored like a defense table so a
/// toothless enemy gives a large but finite ratio.
fn power_ratio(own: f64, enemy: f64) -> f64 {
    own / enemy.max(DEFENSE_POWER_FLOOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::odds::BoardingOdds;
    use crate::offer::{Term, TermValue};
    use crate::report::Standing;
    use crate::rules::BoardingRules;
    use crate::ship::{Government, ShipRecord};
    use crate::vocabulary::{Negotiation, Side};

    type Fixture = (Combatant<ShipRecord>, Combatant<ShipRecord>, BoardingOdds);

    fn pair(boarder: ShipRecord, target: ShipRecord) -> Fixture {
        let rules = BoardingRules::default();
        let odds = BoardingOdds::for_ships(
            &boarder,
            &target,
            rules.self_destruct_casualty_power_multiplier,
        );
        (
            Combatant::new(boarder, Side::Boarder, &rules),
            Combatant::new(target, Side::Target, &rules),
            odds,
        )
    }

    fn plain(name: &str, crew: u32) -> ShipRecord {
        ShipRecord::new(name, Government::new("Independent"), crew)
    }

    fn report(
        combatant: &Combatant<ShipRecord>,
        enemy: &Combatant<ShipRecord>,
        odds: &BoardingOdds,
        state: CombatState,
        negotiation: Negotiation,
        offer: Option<(Side, &Offer)>,
    ) -> SituationReport {
        SituationReport::new(
            combatant,
            enemy,
            odds,
            Standing {
                state,
                negotiation,
                acted_first: false,
                offer,
            },
        )
    }

    /// Leaves a defender with no good option left.
    fn overrun(report: &mut SituationReport) {
        report.is_enemy_invading = true;
        report.attack_power = 0.0;
        report.defense_power = 1.0;
        report.expected_invasion_casualties = 10.0;
        report.expected_defensive_casualties = 1.0;
        report.expected_invasion_profit = 0;
        report.defensive_victory_probability = 0.01;
        report.self_destruct_probability = 0.0;
    }

    #[test]
    fn power_ratios_stay_finite_against_unarmed_crews() {
        assert!((power_ratio(3.0, 1.5) - 2.0).abs() < f64::EPSILON);
        let ratio = power_ratio(2.0, 0.0);
        assert!(ratio.is_finite());
        assert!(ratio > power_ratio(2.0, 1.0));
    }

    #[test]
    fn desperate_defender_pleads_for_terms() {
        let (boarder, target, odds) = pair(plain("Raider", 20), plain("Hauler", 4));
        let mut situation = report(
            &target,
            &boarder,
            &odds,
            CombatState::BoarderInvading,
            Negotiation::NotAttempted,
            None,
        );
        overrun(&mut situation);
        assert!(target.is_desperate(&situation));
        assert_eq!(
            target.determine_intent(&situation),
            Activity::Negotiate(Offer::surrender(Side::Target))
        );
    }

    #[test]
    fn defender_holds_when_talks_are_off() {
        let (boarder, target, odds) = pair(plain("Raider", 20), plain("Hauler", 4));
        let mut situation = report(
            &target,
            &boarder,
            &odds,
            CombatState::BoarderInvading,
            Negotiation::Failed,
            None,
        );
        overrun(&mut situation);
        assert_eq!(target.determine_intent(&situation), Activity::Defend);
    }

    #[test]
    fn enemy_surrender_is_accepted() {
        let (boarder, target, odds) = pair(plain("Raider", 20), plain("Hauler", 4));
        let offer = Offer::surrender(Side::Target);
        let situation = report(
            &boarder,
            &target,
            &odds,
            CombatState::Poised,
            Negotiation::Active,
            Some((Side::Target, &offer)),
        );
        assert_eq!(
            boarder.determine_intent(&situation),
            Activity::Resolve(offer.clone())
        );

        // The side that offered stands by its own terms.
        let situation = report(
            &target,
            &boarder,
            &odds,
            CombatState::Poised,
            Negotiation::Active,
            Some((Side::Target, &offer)),
        );
        assert_eq!(target.determine_intent(&situation), Activity::Resolve(offer));
    }

    #[test]
    fn demands_without_surrender_are_rejected() {
        let (boarder, target, odds) = pair(plain("Raider", 20), plain("Hauler", 4));
        let demand = Offer::surrender(Side::Boarder);
        let situation = report(
            &boarder,
            &target,
            &odds,
            CombatState::Poised,
            Negotiation::Active,
            Some((Side::Target, &demand)),
        );
        assert_eq!(boarder.determine_intent(&situation), Activity::Reject);

        let ransom = Offer::new()
            .with(Term::CreditsFromTarget, TermValue::Credits(100))
            .unwrap();
        let situation = report(
            &target,
            &boarder,
            &odds,
            CombatState::Poised,
            Negotiation::Active,
            Some((Side::Boarder, &ransom)),
        );
        assert_eq!(target.determine_intent(&situation), Activity::Reject);
    }

    #[test]
    fn capture_crews_take_a_beaten_prize() {
        let boarder_ship = plain("Cutter", 12).with_goal(BoardingGoal::Capture);
        let (boarder, target, odds) = pair(boarder_ship, plain("Hauler", 0));
        let mut situation = report(
            &boarder,
            &target,
            &odds,
            CombatState::BoarderVictory,
            Negotiation::Failed,
            None,
        );
        situation.expected_capture_profit = 1;
        assert_eq!(boarder.determine_intent(&situation), Activity::Capture);

        situation.expected_capture_profit = 0;
        assert_eq!(
            boarder.determine_intent(&situation),
            Activity::Leave,
            "nothing worth having, so the cutter leaves"
        );
    }

    #[test]
    fn plunderers_leave_once_the_hold_is_empty() {
        let boarder_ship = plain("Raider", 12).with_goal(BoardingGoal::Plunder);
        let (boarder, target, odds) = pair(boarder_ship, plain("Hauler", 6));
        let mut situation = report(
            &boarder,
            &target,
            &odds,
            CombatState::Isolated,
            Negotiation::Failed,
            None,
        );
        situation.plunder_options = 1;
        situation.is_plunder_finished = true;
        assert_eq!(boarder.determine_intent(&situation), Activity::Leave);

        situation.is_plunder_finished = false;
        situation.expected_invasion_profit = 0;
        assert_eq!(boarder.determine_intent(&situation), Activity::raid());
    }

    #[test]
    fn deny_crews_scuttle_rather_than_be_robbed() {
        let government = Government::new("Militia")
            .with_strategies(AttackStrategy::Cautious, DefenseStrategy::Deny);
        let target_ship = ShipRecord::new("Gunboat", government, 6).with_self_destruct(0.5);
        let (boarder, target, odds) = pair(plain("Raider", 12), target_ship);
        let mut situation = report(
            &target,
            &boarder,
            &odds,
            CombatState::Isolated,
            Negotiation::Failed,
            None,
        );
        situation.self_destruct_probability = 0.5;
        assert!(situation.enemy_can(Objective::Plunder));
        assert_eq!(target.determine_intent(&situation), Activity::SelfDestruct);

        situation.self_destruct_probability = 0.0;
        assert_eq!(target.determine_intent(&situation), Activity::Defend);
    }
}
