//! Loan term predicate.

use crate::criteria::FilterCriteria;
use crate::term::matches_term;
use crate::types::LoanProduct;

use super::{PredicateKind, ProductPredicate};

/// Keeps products whose term specification covers the requested years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanTermPredicate {
    years: i64,
}

impl LoanTermPredicate {
    pub fn new(years: i64) -> Self {
        Self { years }
    }

    pub fn from_criteria(criteria: &FilterCriteria) -> Option<Self> {
        criteria.loan_term.map(Self::new)
    }
}

impl ProductPredicate for LoanTermPredicate {
    fn kind(&self) -> PredicateKind {
        PredicateKind::LoanTerm
    }

    fn retains(&self, product: &LoanProduct) -> bool {
        matches_term(&product.term, self.years)
    }
}
