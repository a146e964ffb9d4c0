//! Catalog filtering.
//!
//! The filter is a fixed pipeline of independent predicates. Each predicate
//! narrows the running result set; since they are pure conjunctions, order
//! does not change the final set, but it is fixed so traces read the same:
//!
//! 1. Credit tier: a lower credit bound of 700 or more keeps only ELITE products
//! 2. Loan term: keeps products whose term specification covers the request
//! 3. Rate type: `"fix"` keeps FIXED, anything else keeps ARM
//! 4. Program set: CONV and USDA always, VA / FHA only when asked for
//!
//! Predicates 1-3 are only installed when their criterion is present.
//! The program predicate always runs.

mod credit_tier;
mod loan_term;
mod program;
mod rate_type;

pub use credit_tier::{CreditTierPredicate, ELITE_MIN_CREDIT_SCORE};
pub use loan_term::LoanTermPredicate;
pub use program::ProgramPredicate;
pub use rate_type::RateTypePredicate;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::criteria::FilterCriteria;
use crate::types::LoanProduct;

/// Identifies a predicate in traces and introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateKind {
    CreditTier,
    LoanTerm,
    RateType,
    Program,
}

/// A single, independent narrowing rule over catalog products.
pub trait ProductPredicate: Send + Sync {
    /// Which predicate this is.
    fn kind(&self) -> PredicateKind;

    /// Whether `product` survives this predicate.
    fn retains(&self, product: &LoanProduct) -> bool;
}

/// Predicate pipeline built from one set of criteria.
pub struct CatalogFilter {
    predicates: Vec<Box<dyn ProductPredicate>>,
}

impl CatalogFilter {
    /// Build the pipeline for `criteria`.
    pub fn new(criteria: &FilterCriteria) -> Self {
        let mut predicates: Vec<Box<dyn ProductPredicate>> = Vec::with_capacity(4);

        if let Some(p) = CreditTierPredicate::from_criteria(criteria) {
            predicates.push(Box::new(p));
        }
        if let Some(p) = LoanTermPredicate::from_criteria(criteria) {
            predicates.push(Box::new(p));
        }
        if let Some(p) = RateTypePredicate::from_criteria(criteria) {
            predicates.push(Box::new(p));
        }
        predicates.push(Box::new(ProgramPredicate::from_criteria(criteria)));

        Self { predicates }
    }

    /// Installed predicates, in application order.
    pub fn kinds(&self) -> Vec<PredicateKind> {
        self.predicates.iter().map(|p| p.kind()).collect()
    }

    /// Apply every predicate in order. Preserves catalog order.
    pub fn apply(&self, catalog: &[LoanProduct]) -> Vec<LoanProduct> {
        let mut remaining: Vec<&LoanProduct> = catalog.iter().collect();

        for predicate in &self.predicates {
            remaining.retain(|product| predicate.retains(product));
            debug!(
                predicate = ?predicate.kind(),
                remaining = remaining.len(),
                "Applied catalog predicate"
            );
        }

        remaining.into_iter().cloned().collect()
    }
}

/// Filter `catalog` by `criteria`.
///
/// `None` means no criteria at all: the catalog comes back unchanged.
/// `Some` with every field absent still applies the program predicate.
pub fn filter_products(catalog: &[LoanProduct], criteria: Option<&FilterCriteria>) -> Vec<LoanProduct> {
    match criteria {
        None => catalog.to_vec(),
        Some(criteria) => CatalogFilter::new(criteria).apply(catalog),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::CreditScoreRange;
    use crate::types::fixtures::product;
    use crate::types::{Program, RateType, Tier};
    use proptest::prelude::*;

    fn catalog() -> Vec<LoanProduct> {
        vec![
            product("Conv Elite 30", Program::Conv, Tier::Elite, RateType::Fixed, "21-30"),
            product("Conv 15", Program::Conv, Tier::Standard, RateType::Fixed, "15"),
            product("VA Elite 30", Program::Va, Tier::Elite, RateType::Fixed, "30"),
            product("FHA 30", Program::Fha, Tier::Standard, RateType::Fixed, "30"),
            product("Conv 5/6 ARM", Program::Conv, Tier::Standard, RateType::Arm, "5/6"),
            product("USDA Elite 30", Program::Usda, Tier::Elite, RateType::Fixed, "30"),
        ]
    }

    fn names(products: &[LoanProduct]) -> Vec<&str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_no_criteria_returns_catalog() {
        let catalog = catalog();
        assert_eq!(filter_products(&catalog, None), catalog);
    }

    #[test]
    fn test_empty_criteria_still_filters_programs() {
        let catalog = catalog();
        let result = filter_products(&catalog, Some(&FilterCriteria::default()));
        assert_eq!(
            names(&result),
            vec!["Conv Elite 30", "Conv 15", "Conv 5/6 ARM", "USDA Elite 30"]
        );
    }

    #[test]
    fn test_pipeline_order() {
        let criteria = FilterCriteria::new()
            .with_credit_score(CreditScoreRange::between(720, 800))
            .with_loan_term(30)
            .with_rate_type("fix");
        let filter = CatalogFilter::new(&criteria);
        assert_eq!(
            filter.kinds(),
            vec![
                PredicateKind::CreditTier,
                PredicateKind::LoanTerm,
                PredicateKind::RateType,
                PredicateKind::Program
            ]
        );

        let bare = CatalogFilter::new(&FilterCriteria::default());
        assert_eq!(bare.kinds(), vec![PredicateKind::Program]);
    }

    #[test]
    fn test_combined_criteria() {
        let criteria = FilterCriteria::new()
            .with_credit_score(CreditScoreRange::between(780, 850))
            .with_loan_term(30)
            .with_rate_type("fix")
            .with_va_loans(false)
            .with_fha_loans(false);
        let result = filter_products(&catalog(), Some(&criteria));
        assert_eq!(names(&result), vec!["Conv Elite 30", "USDA Elite 30"]);
    }

    #[test]
    fn test_va_opt_in() {
        let criteria = FilterCriteria::new()
            .with_credit_score(CreditScoreRange::between(780, 850))
            .with_va_loans(true);
        let result = filter_products(&catalog(), Some(&criteria));
        assert_eq!(names(&result), vec!["Conv Elite 30", "VA Elite 30", "USDA Elite 30"]);
    }

    #[test]
    fn test_does_not_mutate_catalog() {
        let catalog = catalog();
        let before = catalog.clone();
        let _ = filter_products(&catalog, Some(&FilterCriteria::new().with_loan_term(15)));
        assert_eq!(catalog, before);
    }

    fn arb_program() -> impl Strategy<Value = Program> {
        prop_oneof![
            Just(Program::Conv),
            Just(Program::Va),
            Just(Program::Fha),
            Just(Program::Usda)
        ]
    }

    fn arb_product() -> impl Strategy<Value = LoanProduct> {
        (
            arb_program(),
            prop_oneof![Just(Tier::Elite), Just(Tier::Standard)],
            prop_oneof![Just(RateType::Fixed), Just(RateType::Arm)],
            prop_oneof![
                Just("30".to_string()),
                Just("15".to_string()),
                Just("21-30".to_string()),
                Just("5/6".to_string()),
                Just("bogus".to_string()),
            ],
        )
            .prop_map(|(program, tier, rate_type, term)| {
                product("generated", program, tier, rate_type, &term)
            })
    }

    fn arb_criteria() -> impl Strategy<Value = FilterCriteria> {
        (
            proptest::option::of((proptest::option::of(300i32..850), proptest::option::of(300i32..850))),
            proptest::option::of(0i64..40),
            proptest::option::of(prop_oneof![Just("fix".to_string()), Just("arm".to_string()), Just("x".to_string())]),
            proptest::option::of(any::<bool>()),
            proptest::option::of(any::<bool>()),
        )
            .prop_map(|(score, term, rate, fha, va)| FilterCriteria {
                credit_score_range: score.map(|(min, max)| CreditScoreRange::new(min, max)),
                loan_term: term,
                rate_type: rate,
                show_fha_loans: fha,
                show_va_loans: va,
                ..FilterCriteria::default()
            })
    }

    proptest! {
        #[test]
        fn prop_filter_never_grows(
            catalog in proptest::collection::vec(arb_product(), 0..20),
            criteria in arb_criteria()
        ) {
            let result = filter_products(&catalog, Some(&criteria));
            prop_assert!(result.len() <= catalog.len());
        }

        #[test]
        fn prop_program_set_respected(
            catalog in proptest::collection::vec(arb_product(), 0..20),
            criteria in arb_criteria()
        ) {
            for p in filter_products(&catalog, Some(&criteria)) {
                let allowed = match p.program {
                    Program::Conv | Program::Usda => true,
                    Program::Va => criteria.show_va_loans == Some(true),
                    Program::Fha => criteria.show_fha_loans == Some(true),
                };
                prop_assert!(allowed);
            }
        }

        #[test]
        fn prop_high_credit_means_elite(
            catalog in proptest::collection::vec(arb_product(), 0..20),
            criteria in arb_criteria()
        ) {
            let high_credit = criteria
                .credit_score_range
                .map(|r| r.effective_min() >= ELITE_MIN_CREDIT_SCORE)
                .unwrap_or(false);
            for p in filter_products(&catalog, Some(&criteria)) {
                prop_assert!(!high_credit || p.tier == Tier::Elite);
            }
        }

        #[test]
        fn prop_result_preserves_catalog_order(
            catalog in proptest::collection::vec(arb_product(), 0..20),
            criteria in arb_criteria()
        ) {
            // Result must be a subsequence of the catalog
            let result = filter_products(&catalog, Some(&criteria));
            let mut cursor = catalog.iter();
            for kept in &result {
                prop_assert!(cursor.any(|p| p == kept));
            }
        }
    }
}
