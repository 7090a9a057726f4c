use serde::{Deserialize, Serialize};

use super::power::PowerTable;

/// Probability that an attacker conquers a defender for every pair of
/// crew counts, with expected casualties on both sides.
///
/// Each step one crew member falls: the attacker wins the step with
/// probability `A / (A + D)` where `A` and `D` are the total powers of
/// the crews still standing. An attacker needs one member left behind to
/// fly its own ship, so a lone attacker never wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureOdds {
    attack: PowerTable,
    defense: PowerTable,
    /// Row-major over `(attackers - 1, defenders - 1)`.
    capture: Vec<f64>,
    attacker_casualties: Vec<f64>,
    defender_casualties: Vec<f64>,
}

impl CaptureOdds {
    #[must_use]
    pub fn new(attack: PowerTable, defense: PowerTable) -> Self {
        let rows = attack.members() as usize;
        let width = defense.members() as usize;
        let cells = rows * width;
        let mut capture = vec![0.0; cells];
        let mut attacker_casualties = vec![0.0; cells];
        let mut defender_casualties = vec![0.0; cells];

        // Row for a single attacker stays zero.
        for a in 2..=rows {
            let row = (a - 1) * width;
            let above = (a - 2) * width;
            let attacker_power = attack.cumulative()[a - 1];
            for d in 1..=width {
                let defender_power = defense.cumulative()[d - 1];
                let total = attacker_power + defender_power;
                let p_attacker = if total > 0.0 {
                    attacker_power / total
                } else {
                    0.0
                };
                let p_defender = 1.0 - p_attacker;
                let here = row + d - 1;
                let lost_one = above + d - 1;

                let (won_capture, won_attacker, won_defender) = if d == 1 {
                    (1.0, 0.0, 0.0)
                } else {
                    (
                        capture[here - 1],
                        attacker_casualties[here - 1],
                        defender_casualties[here - 1],
                    )
                };
                capture[here] = p_attacker * won_capture + p_defender * capture[lost_one];
                attacker_casualties[here] = p_attacker * won_attacker
                    + p_defender * (attacker_casualties[lost_one] + 1.0);
                defender_casualties[here] = p_attacker * (won_defender + 1.0)
                    + p_defender * defender_casualties[lost_one];
            }
        }

        Self {
            attack,
            defense,
            capture,
            attacker_casualties,
            defender_casualties,
        }
    }

    fn index(&self, attackers: u32, defenders: u32) -> Option<usize> {
        if attackers < 1
            || defenders < 1
            || attackers > self.attack.members()
            || defenders > self.defense.members()
        {
            return None;
        }
        Some((attackers as usize - 1) * self.defense.members() as usize + defenders as usize - 1)
    }

    /// Chance that `attackers` conquer `defenders`. An undefended ship is
    /// already conquered.
    #[must_use]
    pub fn odds(&self, attackers: u32, defenders: u32) -> f64 {
        if defenders == 0 {
            return 1.0;
        }
        if attackers < 2 {
            return 0.0;
        }
        self.index(attackers, defenders)
            .map_or(0.0, |index| self.capture[index])
    }

    #[must_use]
    pub fn attacker_casualties(&self, attackers: u32, defenders: u32) -> f64 {
        self.index(attackers, defenders)
            .map_or(0.0, |index| self.attacker_casualties[index])
    }

    #[must_use]
    pub fn defender_casualties(&self, attackers: u32, defenders: u32) -> f64 {
        self.index(attackers, defenders)
            .map_or(0.0, |index| self.defender_casualties[index])
    }

    /// Total attack power of `attackers` members, or zero outside the table.
    #[must_use]
    pub fn attacker_power(&self, attackers: u32) -> f64 {
        if attackers < 1 || attackers > self.attack.members() {
            return 0.0;
        }
        self.attack.at(attackers)
    }

    /// Total defense power of `defenders` members, or zero outside the table.
    #[must_use]
    pub fn defender_power(&self, defenders: u32) -> f64 {
        if defenders < 1 || defenders > self.defense.members() {
            return 0.0;
        }
        self.defense.at(defenders)
    }

    #[must_use]
    pub const fn attack_table(&self) -> &PowerTable {
        &self.attack
    }

    #[must_use]
    pub const fn defense_table(&self) -> &PowerTable {
        &self.defense
    }
}
