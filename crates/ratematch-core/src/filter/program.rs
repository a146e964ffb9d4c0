//! Program set predicate.
//!
//! CONV and USDA are always allowed. VA and FHA are opt-in: they are added
//! only when the matching flag is `true`, so an absent flag behaves exactly
//! like `false`.

use std::collections::BTreeSet;

use crate::criteria::FilterCriteria;
use crate::types::{LoanProduct, Program};

use super::{PredicateKind, ProductPredicate};

/// Keeps products whose program is in the allowed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramPredicate {
    allowed: BTreeSet<Program>,
}

impl ProgramPredicate {
    pub fn from_criteria(criteria: &FilterCriteria) -> Self {
        let mut allowed = BTreeSet::from([Program::Conv, Program::Usda]);

        if criteria.show_va_loans == Some(true) {
            allowed.insert(Program::Va);
        }
        if criteria.show_fha_loans == Some(true) {
            allowed.insert(Program::Fha);
        }

        Self { allowed }
    }

    pub fn allowed(&self) -> &BTreeSet<Program> {
        &self.allowed
    }
}

impl Default for ProgramPredicate {
    fn default() -> Self {
        Self::from_criteria(&FilterCriteria::default())
    }
}

impl ProductPredicate for ProgramPredicate {
    fn kind(&self) -> PredicateKind {
        PredicateKind::Program
    }

    fn retains(&self, product: &LoanProduct) -> bool {
        self.allowed.contains(&product.program)
    }
}
