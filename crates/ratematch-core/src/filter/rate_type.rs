//! Rate type predicate.
//!
//! The preference maps permissively: `"fix"` in any case selects FIXED and
//! every other non-empty value selects ARM. An empty string imposes nothing.

use crate::criteria::FilterCriteria;
use crate::types::{LoanProduct, RateType};

use super::{PredicateKind, ProductPredicate};

/// Keeps products with the requested rate type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateTypePredicate {
    required: RateType,
}

impl RateTypePredicate {
    pub fn new(required: RateType) -> Self {
        Self { required }
    }

    pub fn from_criteria(criteria: &FilterCriteria) -> Option<Self> {
        criteria
            .rate_type
            .as_deref()
            .filter(|preference| !preference.is_empty())
            .map(|preference| Self::new(RateType::from_preference(preference)))
    }

    pub fn required(&self) -> RateType {
        self.required
    }
}

impl ProductPredicate for RateTypePredicate {
    fn kind(&self) -> PredicateKind {
        PredicateKind::RateType
    }

    fn retains(&self, product: &LoanProduct) -> bool {
        product.arm_or_fixed == self.required
    }
}
