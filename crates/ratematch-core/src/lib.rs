//! # ratematch-core
//!
//! Deterministic mortgage product matching.
//!
//! This crate answers two questions about a borrower:
//! - Which catalog products fit what they asked for?
//! - Which parts of their application are still missing?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same input always produces same output
//! 2. **No LLM calls**: Matching and completeness are rule-based
//! 3. **Total**: Malformed term strings never match and never fail
//! 4. **Order-preserving**: Results keep catalog and rule-table order
//!
//! ## Example
//!
//! ```rust,ignore
//! use ratematch_core::{Catalog, FilterCriteria, CreditScoreRange, check_missing, MortgageFormData};
//!
//! let catalog = Catalog::from_path("data/loan_products.json")?;
//! let criteria = FilterCriteria::new()
//!     .with_credit_score(CreditScoreRange::between(780, 850))
//!     .with_loan_term(30)
//!     .with_rate_type("fix");
//! let listing = catalog.listing(Some(&criteria));
//! println!("{} products", listing.total);
//!
//! let form = MortgageFormData::from_json(r#"{"zipCode": 94110}"#)?;
//! for field in check_missing(&form) {
//!     println!("ask for {} ({})", field.key, field.ui_type);
//! }
//! ```

pub mod catalog;
pub mod completeness;
pub mod criteria;
pub mod filter;
pub mod term;
pub mod types;

// Re-export main types at crate root
pub use catalog::{Catalog, CatalogError};
pub use completeness::{
    check_missing, FieldKey, FieldState, FormCompletenessChecker, MissingFieldDescriptor,
    MissingReason, MortgageFormData, UiType,
};
pub use criteria::{CreditScoreRange, CriteriaError, FilterCriteria};
pub use filter::{filter_products, CatalogFilter, PredicateKind, ProductPredicate};
pub use term::{matches_term, TermSpec};
pub use types::{
    BalanceBucket, ConstructionType, LoanProduct, LockPeriod, ProductListing, Program, RateType,
    Tier,
};

/// Outcome of recommending from a submitted form.
#[derive(Debug, Clone, PartialEq)]
pub enum Recommendation {
    /// Every field was answered; the filtered listing
    Products(ProductListing),

    /// The form still has gaps, in rule-table order
    Incomplete(Vec<MissingFieldDescriptor>),
}

/// Filter `catalog` by `criteria` and wrap the result as `{ total, products }`.
///
/// `None` means no criteria were supplied and returns the whole catalog.
pub fn recommend(catalog: &Catalog, criteria: Option<&FilterCriteria>) -> ProductListing {
    catalog.listing(criteria)
}

/// Recommend from a form, but only once it is complete.
pub fn recommend_for_form(catalog: &Catalog, form: &MortgageFormData) -> Recommendation {
    let missing = check_missing(form);
    if !missing.is_empty() {
        return Recommendation::Incomplete(missing);
    }

    let criteria = form.to_criteria();
    Recommendation::Products(catalog.listing(Some(&criteria)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::product;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            product("Conv Elite 30", Program::Conv, Tier::Elite, RateType::Fixed, "30"),
            product("Conv 15", Program::Conv, Tier::Standard, RateType::Fixed, "15"),
            product("FHA 30", Program::Fha, Tier::Standard, RateType::Fixed, "30"),
        ])
        .unwrap()
    }

    #[test]
    fn test_recommend_without_criteria() {
        let listing = recommend(&catalog(), None);
        assert_eq!(listing.total, 3);
    }

    #[test]
    fn test_recommend_for_incomplete_form() {
        let form = MortgageFormData::from_json(r#"{"loanTerm": 30}"#).unwrap();
        match recommend_for_form(&catalog(), &form) {
            Recommendation::Incomplete(missing) => assert_eq!(missing.len(), 8),
            other => panic!("expected incomplete form, got {:?}", other),
        }
    }

    #[test]
    fn test_recommend_for_complete_form() {
        let form = MortgageFormData::from_json(
            r#"{
                "mortgageType": "refinance",
                "zipCode": 10001,
                "purchasePrice": 600000,
                "downPayment": 0,
                "creditScore": [620, 679],
                "loanTerm": 30,
                "armOrFixed": "fix",
                "showFhaLoans": true,
                "showVaLoans": false
            }"#,
        )
        .unwrap();

        match recommend_for_form(&catalog(), &form) {
            Recommendation::Products(listing) => {
                let names: Vec<&str> = listing.products.iter().map(|p| p.name.as_str()).collect();
                assert_eq!(names, vec!["Conv Elite 30", "FHA 30"]);
            }
            other => panic!("expected products, got {:?}", other),
        }
    }
}
