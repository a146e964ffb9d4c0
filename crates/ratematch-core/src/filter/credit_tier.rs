//! Credit tier predicate.
//!
//! A lower credit bound at or above [`ELITE_MIN_CREDIT_SCORE`] restricts the
//! catalog to ELITE products. Below the threshold nothing is filtered: there
//! is no STANDARD-only rule.

use crate::criteria::FilterCriteria;
use crate::types::{LoanProduct, Tier};

use super::{PredicateKind, ProductPredicate};

/// Lowest credit score that qualifies for ELITE-only results.
pub const ELITE_MIN_CREDIT_SCORE: i32 = 700;

/// Keeps only ELITE products.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreditTierPredicate {
    min_score: i32,
}

impl CreditTierPredicate {
    /// Returns a predicate only when the criteria actually constrain tier.
    ///
    /// An open lower bound counts as 0.
    pub fn from_criteria(criteria: &FilterCriteria) -> Option<Self> {
        let min_score = criteria.credit_score_range?.effective_min();
        (min_score >= ELITE_MIN_CREDIT_SCORE).then_some(Self { min_score })
    }

    pub fn min_score(&self) -> i32 {
        self.min_score
    }
}

impl ProductPredicate for CreditTierPredicate {
    fn kind(&self) -> PredicateKind {
        PredicateKind::CreditTier
    }

    fn retains(&self, product: &LoanProduct) -> bool {
        product.tier == Tier::Elite
    }
}
