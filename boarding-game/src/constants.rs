//! Centralized tuning constants for the boarding combat engine.
//!
//! The AI thresholds are tuning values rather than derived figures.
//! Anything a host game should be able to tweak lives in
//! [`BoardingRules`](crate::rules::BoardingRules) instead.

// Logging keys -------------------------------------------------------------
pub(crate) const LOG_COMBAT_START: &str = "log.boarding.start";
pub(crate) const LOG_ADVANCE: &str = "log.boarding.advance";
pub(crate) const LOG_INVASION: &str = "log.boarding.invasion";
pub(crate) const LOG_REPELLED: &str = "log.boarding.repelled";
pub(crate) const LOG_WITHDRAW: &str = "log.boarding.withdraw";
pub(crate) const LOG_DISENGAGED: &str = "log.boarding.disengaged";
pub(crate) const LOG_CASUALTIES: &str = "log.boarding.casualties";
pub(crate) const LOG_CONQUERED: &str = "log.boarding.conquered";
pub(crate) const LOG_PLUNDER_TAKEN: &str = "log.boarding.plunder.taken";
pub(crate) const LOG_PLUNDER_EXHAUSTED: &str = "log.boarding.plunder.exhausted";
pub(crate) const LOG_SELF_DESTRUCT: &str = "log.boarding.self-destruct";
pub(crate) const LOG_SELF_DESTRUCT_FAILED: &str = "log.boarding.self-destruct.failed";
pub(crate) const LOG_CAPTURED: &str = "log.boarding.captured";
pub(crate) const LOG_DESTROYED: &str = "log.boarding.destroyed";
pub(crate) const LOG_LEFT: &str = "log.boarding.left";
pub(crate) const LOG_TALKS_OPENED: &str = "log.boarding.talks.opened";
pub(crate) const LOG_TALKS_REJECTED: &str = "log.boarding.talks.rejected";
pub(crate) const LOG_TALKS_FAILED: &str = "log.boarding.talks.failed";
pub(crate) const LOG_TALKS_NO_LANGUAGE: &str = "log.boarding.talks.no-language";
pub(crate) const LOG_SETTLEMENT: &str = "log.boarding.settlement";
pub(crate) const LOG_ACTION_VOIDED: &str = "log.boarding.action-voided";

// Power floors -------------------------------------------------------------
/// Minimum defense power, so a defenseless ship still resolves rolls.
pub(crate) const DEFENSE_POWER_FLOOR: f64 = 0.001;
pub(crate) const ATTACK_POWER_FLOOR: f64 = 0.0;

// AI thresholds ------------------------------------------------------------
pub(crate) const CAUTIOUS_MIN_VICTORY: f64 = 0.99;
pub(crate) const CAUTIOUS_MAX_CASUALTIES: f64 = 0.5;
pub(crate) const AGGRESSIVE_MIN_VICTORY: f64 = 0.99;
pub(crate) const RECKLESS_MIN_VICTORY: f64 = 0.5;
pub(crate) const FANATICAL_MIN_VICTORY: f64 = 0.01;
/// Below this, a self-destruct system is not worth considering.
pub(crate) const SELF_DESTRUCT_NEGLIGIBLE: f64 = 0.001;
/// Repel and Counter crews only scuttle once their defense is this hopeless.
pub(crate) const LAST_STAND_VICTORY: f64 = 0.1;
/// A side that still has this much chance of holding does not beg for terms.
pub(crate) const SURRENDER_VICTORY: f64 = 0.05;

// Defaults -----------------------------------------------------------------
pub(crate) const DEFAULT_POST_CAPTURE_SURVIVAL: f64 = 0.5;
pub(crate) const UNKNOWN_CATEGORY: &str = "UnknownCategory";
