//! Settlement offers exchanged while talks are active.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::vocabulary::Side;

/// The kind of value a term carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermValueKind {
    Flag,
    Count,
    Credits,
}

impl fmt::Display for TermValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Flag => "flag",
            Self::Count => "count",
            Self::Credits => "credits",
        })
    }
}

/// One clause of a settlement. Each term fixes the type of its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    BoarderSurrender,
    TargetSurrender,
    /// The boarder's government stops treating the target as hostile.
    BoarderPacified,
    TargetPacified,
    CreditsFromBoarder,
    CreditsFromTarget,
    CrewFromBoarder,
    CrewFromTarget,
    PassengersFromBoarder,
    PassengersFromTarget,
    PrisonersFromBoarder,
    PrisonersFromTarget,
}

impl Term {
    #[must_use]
    pub const fn value_kind(self) -> TermValueKind {
        match self {
            Self::BoarderSurrender
            | Self::TargetSurrender
            | Self::BoarderPacified
            | Self::TargetPacified => TermValueKind::Flag,
            Self::CreditsFromBoarder | Self::CreditsFromTarget => TermValueKind::Credits,
            Self::CrewFromBoarder
            | Self::CrewFromTarget
            | Self::PassengersFromBoarder
            | Self::PassengersFromTarget
            | Self::PrisonersFromBoarder
            | Self::PrisonersFromTarget => TermValueKind::Count,
        }
    }

    /// The side that gives something up under this term.
    #[must_use]
    pub const fn giver(self) -> Side {
        match self {
            Self::BoarderSurrender
            | Self::BoarderPacified
            | Self::CreditsFromBoarder
            | Self::CrewFromBoarder
            | Self::PassengersFromBoarder
            | Self::PrisonersFromBoarder => Side::Boarder,
            Self::TargetSurrender
            | Self::TargetPacified
            | Self::CreditsFromTarget
            | Self::CrewFromTarget
            | Self::PassengersFromTarget
            | Self::PrisonersFromTarget => Side::Target,
        }
    }

    #[must_use]
    pub const fn surrender_of(side: Side) -> Self {
        match side {
            Side::Boarder => Self::BoarderSurrender,
            Side::Target => Self::TargetSurrender,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BoarderSurrender => "boarder_surrender",
            Self::TargetSurrender => "target_surrender",
            Self::BoarderPacified => "boarder_pacified",
            Self::TargetPacified => "target_pacified",
            Self::CreditsFromBoarder => "credits_from_boarder",
            Self::CreditsFromTarget => "credits_from_target",
            Self::CrewFromBoarder => "crew_from_boarder",
            Self::CrewFromTarget => "crew_from_target",
            Self::PassengersFromBoarder => "passengers_from_boarder",
            Self::PassengersFromTarget => "passengers_from_target",
            Self::PrisonersFromBoarder => "prisoners_from_boarder",
            Self::PrisonersFromTarget => "prisoners_from_target",
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermValue {
    Flag(bool),
    Count(u32),
    Credits(i64),
}

impl TermValue {
    #[must_use]
    pub const fn kind(self) -> TermValueKind {
        match self {
            Self::Flag(_) => TermValueKind::Flag,
            Self::Count(_) => TermValueKind::Count,
            Self::Credits(_) => TermValueKind::Credits,
        }
    }
}

/// Raised when a term is paired with, or read as, the wrong value type.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OfferError {
    #[error("term {term} holds a {expected} value, not {actual}")]
    ValueKind {
        term: Term,
        expected: TermValueKind,
        actual: TermValueKind,
    },
}

/// A proposed settlement: a set of terms and their values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    terms: BTreeMap<Term, TermValue>,
}

impl Offer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The offer a beaten side makes: its own unconditional surrender.
    #[must_use]
    pub fn surrender(side: Side) -> Self {
        let mut offer = Self::new();
        offer
            .terms
            .insert(Term::surrender_of(side), TermValue::Flag(true));
        offer
    }

    /// Add a term, rejecting values of the wrong type.
    ///
    /// # Errors
    ///
    /// Returns [`OfferError::ValueKind`] if `value` does not match the type
    /// fixed by `term`.
    pub fn with(mut self, term: Term, value: TermValue) -> Result<Self, OfferError> {
        self.set(term, value)?;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns [`OfferError::ValueKind`] if `value` does not match the type
    /// fixed by `term`.
    pub fn set(&mut self, term: Term, value: TermValue) -> Result<(), OfferError> {
        check_kind(term, value.kind())?;
        self.terms.insert(term, value);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, term: Term) -> Option<TermValue> {
        self.terms.get(&term).copied()
    }

    /// # Errors
    ///
    /// Returns [`OfferError::ValueKind`] if `term` is not a flag term.
    pub fn flag(&self, term: Term) -> Result<bool, OfferError> {
        check_kind(term, TermValueKind::Flag)?;
        Ok(matches!(self.get(term), Some(TermValue::Flag(true))))
    }

    /// # Errors
    ///
    /// Returns [`OfferError::ValueKind`] if `term` is not a count term.
    pub fn count(&self, term: Term) -> Result<u32, OfferError> {
        check_kind(term, TermValueKind::Count)?;
        Ok(match self.get(term) {
            Some(TermValue::Count(count)) => count,
            _ => 0,
        })
    }

    /// # Errors
    ///
    /// Returns [`OfferError::ValueKind`] if `term` is not a credit term.
    pub fn credits(&self, term: Term) -> Result<i64, OfferError> {
        check_kind(term, TermValueKind::Credits)?;
        Ok(match self.get(term) {
            Some(TermValue::Credits(credits)) => credits,
            _ => 0,
        })
    }

    pub fn terms(&self) -> impl Iterator<Item = (Term, TermValue)> + '_ {
        self.terms.iter().map(|(term, value)| (*term, *value))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The side that surrenders under this offer, if any. A self-contradictory
    /// offer in which both sides surrender counts as no surrender.
    #[must_use]
    pub fn surrendering_side(&self) -> Option<Side> {
        let boarder = self.flag(Term::BoarderSurrender).unwrap_or(false);
        let target = self.flag(Term::TargetSurrender).unwrap_or(false);
        match (boarder, target) {
            (true, false) => Some(Side::Boarder),
            (false, true) => Some(Side::Target),
            _ => None,
        }
    }
}

fn check_kind(term: Term, actual: TermValueKind) -> Result<(), OfferError> {
    let expected = term.value_kind();
    if expected == actual {
        Ok(())
    } else {
        Err(OfferError::ValueKind {
            term,
            expected,
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms_reject_mismatched_values() {
        let err = Offer::new()
            .with(Term::CrewFromTarget, TermValue::Flag(true))
            .unwrap_err();
        assert_eq!(
            err,
            OfferError::ValueKind {
                term: Term::CrewFromTarget,
                expected: TermValueKind::Count,
                actual: TermValueKind::Flag,
            }
        );
    }

    #[test]
    fn typed_reads_check_the_term() {
        let offer = Offer::new()
            .with(Term::CreditsFromTarget, TermValue::Credits(25_000))
            .unwrap();
        assert_eq!(offer.credits(Term::CreditsFromTarget), Ok(25_000));
        assert_eq!(offer.credits(Term::CreditsFromBoarder), Ok(0));
        assert!(offer.count(Term::CreditsFromTarget).is_err());
    }

    #[test]
    fn surrender_offer_names_the_surrendering_side() {
        assert_eq!(
            Offer::surrender(Side::Target).surrendering_side(),
            Some(Side::Target)
        );
        let both = Offer::surrender(Side::Target)
            .with(Term::BoarderSurrender, TermValue::Flag(true))
            .unwrap();
        assert_eq!(both.surrendering_side(), None);
    }

    #[test]
    fn offers_compare_by_terms() {
        let a = Offer::new()
            .with(Term::PrisonersFromTarget, TermValue::Count(3))
            .unwrap();
        let b = Offer::new()
            .with(Term::PrisonersFromTarget, TermValue::Count(3))
            .unwrap();
        assert_eq!(a, b);
        assert_ne!(a, Offer::surrender(Side::Boarder));
    }
}
