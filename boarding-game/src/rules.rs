//! Game-wide boarding rules supplied by the host.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::constants::{DEFAULT_POST_CAPTURE_SURVIVAL, UNKNOWN_CATEGORY};

const DEFAULT_RULES_DATA: &str = include_str!("../assets/rules.json");

/// Errors raised when boarding rules are out of range.
#[derive(Debug, Error, PartialEq)]
pub enum RulesError {
    #[error("{field} must be between {min:.3} and {max:.3} (got {value:.3})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("{field} must not be negative (got {value})")]
    NegativeCost { field: &'static str, value: i64 },
    #[error("post-capture survival odds for {category} must be within 0..=1 (got {value:.3})")]
    SurvivalOdds { category: String, value: f64 },
    #[error("max_automatic_turns must be at least 1")]
    NoAutomaticTurns,
}

/// Tunables shared by every boarding combat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardingRules {
    /// Share of a side's acting crew that rolls for casualties each action.
    #[serde(default = "BoardingRules::default_casualty_percentage")]
    pub casualty_percentage_per_action: f64,
    /// Casualty power bonus for a crew whose ship is about to explode.
    #[serde(default = "BoardingRules::default_self_destruct_multiplier")]
    pub self_destruct_casualty_power_multiplier: f64,
    /// Pacing hint for interfaces that animate each turn.
    #[serde(default = "BoardingRules::default_inactive_frames")]
    pub inactive_frames_per_turn: u32,
    /// Whether combatants may negotiate at all.
    #[serde(default)]
    pub negotiations: bool,
    /// Chance, per ship category, that a freshly captured ship reaches safety.
    #[serde(default = "BoardingRules::default_survival_odds")]
    pub post_capture_survival_odds: BTreeMap<String, f64>,
    #[serde(default = "BoardingRules::default_boarding_casualty_cost")]
    pub expected_cost_per_boarding_casualty: i64,
    #[serde(default = "BoardingRules::default_post_capture_casualty_cost")]
    pub expected_cost_per_post_capture_casualty: i64,
    /// Turn cap for combats resolved without a player.
    #[serde(default = "BoardingRules::default_max_automatic_turns")]
    pub max_automatic_turns: u32,
}

impl BoardingRules {
    const fn default_casualty_percentage() -> f64 {
        0.25
    }

    const fn default_self_destruct_multiplier() -> f64 {
        3.0
    }

    const fn default_inactive_frames() -> u32 {
        30
    }

    fn default_survival_odds() -> BTreeMap<String, f64> {
        [
            ("Transport", 0.5),
            ("Space Liner", 0.6),
            ("Light Freighter", 0.5),
            ("Heavy Freighter", 0.5),
            ("Utility", 0.8),
            ("Interceptor", 0.5),
            ("Light Warship", 0.6),
            ("Medium Warship", 0.7),
            ("Heavy Warship", 0.8),
            ("Superheavy", 0.8),
            ("Fighter", 0.9),
            ("Drone", 0.9),
            (UNKNOWN_CATEGORY, DEFAULT_POST_CAPTURE_SURVIVAL),
        ]
        .into_iter()
        .map(|(category, odds)| (category.to_string(), odds))
        .collect()
    }

    const fn default_boarding_casualty_cost() -> i64 {
        20_000
    }

    const fn default_post_capture_casualty_cost() -> i64 {
        10_000
    }

    const fn default_max_automatic_turns() -> u32 {
        500
    }

    /// Rules bundled with the crate.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self::default()
    }

    /// Parse rules from JSON, filling omitted fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Chance that a captured ship of `category` survives. Unknown
    /// categories fall back to the `UnknownCategory` entry.
    #[must_use]
    pub fn post_capture_survival(&self, category: &str) -> f64 {
        if let Some(odds) = self.post_capture_survival_odds.get(category) {
            return *odds;
        }
        let fallback = self
            .post_capture_survival_odds
            .get(UNKNOWN_CATEGORY)
            .copied()
            .unwrap_or(DEFAULT_POST_CAPTURE_SURVIVAL);
        log::warn!(
            "no post-capture survival odds for ship category {category:?}; defaulting to {:.0}%",
            fallback * 100.0
        );
        fallback
    }

    /// Check every tunable is within a playable range.
    ///
    /// # Errors
    ///
    /// Returns the first [`RulesError`] found.
    pub fn validate(&self) -> Result<(), RulesError> {
        check_range(
            "casualty_percentage_per_action",
            self.casualty_percentage_per_action,
            0.0,
            1.0,
        )?;
        check_range(
            "self_destruct_casualty_power_multiplier",
            self.self_destruct_casualty_power_multiplier,
            1.0,
            100.0,
        )?;
        for (field, value) in [
            (
                "expected_cost_per_boarding_casualty",
                self.expected_cost_per_boarding_casualty,
            ),
            (
                "expected_cost_per_post_capture_casualty",
                self.expected_cost_per_post_capture_casualty,
            ),
        ] {
            if value < 0 {
                return Err(RulesError::NegativeCost { field, value });
            }
        }
        for (category, value) in &self.post_capture_survival_odds {
            if !(0.0..=1.0).contains(value) {
                return Err(RulesError::SurvivalOdds {
                    category: category.clone(),
                    value: *value,
                });
            }
        }
        if self.max_automatic_turns == 0 {
            return Err(RulesError::NoAutomaticTurns);
        }
        Ok(())
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), RulesError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(RulesError::RangeViolation {
            field,
            min,
            max,
            value,
        })
    }
}

impl Default for BoardingRules {
    fn default() -> Self {
        serde_json::from_str(DEFAULT_RULES_DATA).unwrap_or_else(|_| Self {
            casualty_percentage_per_action: Self::default_casualty_percentage(),
            self_destruct_casualty_power_multiplier: Self::default_self_destruct_multiplier(),
            inactive_frames_per_turn: Self::default_inactive_frames(),
            negotiations: false,
            post_capture_survival_odds: Self::default_survival_odds(),
            expected_cost_per_boarding_casualty: Self::default_boarding_casualty_cost(),
            expected_cost_per_post_capture_casualty: Self::default_post_capture_casualty_cost(),
            max_automatic_turns: Self::default_max_automatic_turns(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_rules_match_code_defaults() {
        let rules = BoardingRules::default();
        assert!((rules.casualty_percentage_per_action - 0.25).abs() < f64::EPSILON);
        assert!((rules.self_destruct_casualty_power_multiplier - 3.0).abs() < f64::EPSILON);
        assert_eq!(rules.inactive_frames_per_turn, 30);
        assert!(!rules.negotiations);
        assert!(rules.validate().is_ok());
    }

    #[test]
    fn empty_json_fills_every_default() {
        let rules = BoardingRules::from_json("{}").unwrap();
        assert_eq!(rules.max_automatic_turns, 500);
        assert_eq!(rules.post_capture_survival_odds.len(), 13);
    }

    #[test]
    fn unknown_category_falls_back() {
        let rules = BoardingRules::default();
        assert!((rules.post_capture_survival("Heavy Warship") - 0.8).abs() < f64::EPSILON);
        assert!((rules.post_capture_survival("Space Barge") - 0.5).abs() < f64::EPSILON);

        let mut bare = rules;
        bare.post_capture_survival_odds.clear();
        assert!((bare.post_capture_survival("Drone") - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn validation_flags_out_of_range_values() {
        let rules = BoardingRules {
            casualty_percentage_per_action: 1.5,
            ..BoardingRules::default()
        };
        assert!(matches!(
            rules.validate(),
            Err(RulesError::RangeViolation {
                field: "casualty_percentage_per_action",
                ..
            })
        ));

        let mut rules = BoardingRules::default();
        rules
            .post_capture_survival_odds
            .insert("Fighter".to_string(), 1.2);
        assert!(matches!(
            rules.validate(),
            Err(RulesError::SurvivalOdds { .. })
        ));

        let rules = BoardingRules {
            max_automatic_turns: 0,
            ..BoardingRules::default()
        };
        assert_eq!(rules.validate(), Err(RulesError::NoAutomaticTurns));
    }
}
