//! Filter criteria supplied by the caller.
//!
//! Every field is optional; an absent field never narrows the result set.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from parsing criteria or form documents.
#[derive(Error, Debug)]
pub enum CriteriaError {
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Numeric fields that also accept their value as a string, so
/// `"zipCode": "94110"` reads the same as `"zipCode": 94110`.
pub(crate) mod lenient {
    use serde::de::{Deserialize, Deserializer, Error};
    use std::fmt::Display;
    use std::str::FromStr;

    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum NumberOrText<T> {
        Number(T),
        Text(String),
    }

    pub fn option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + FromStr,
        T::Err: Display,
    {
        match Option::<NumberOrText<T>>::deserialize(deserializer)? {
            None => Ok(None),
            Some(NumberOrText::Number(value)) => Ok(Some(value)),
            Some(NumberOrText::Text(text)) => text
                .trim()
                .parse()
                .map(Some)
                .map_err(|e| D::Error::custom(format!("invalid number '{}': {}", text, e))),
        }
    }
}

/// Credit score range `[min, max]`; either bound may be open.
///
/// On the wire this is a JSON array: `[780, null]` means "780 or above",
/// `[null, 600]` means "below 600". Extra elements are ignored and missing
/// elements are treated as open bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Option<i32>>", into = "Vec<Option<i32>>")]
pub struct CreditScoreRange {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

impl CreditScoreRange {
    pub fn new(min: Option<i32>, max: Option<i32>) -> Self {
        Self { min, max }
    }

    pub fn between(min: i32, max: i32) -> Self {
        Self::new(Some(min), Some(max))
    }

    /// Lower bound with an open bound read as 0.
    pub fn effective_min(&self) -> i32 {
        self.min.unwrap_or(0)
    }
}

impl From<Vec<Option<i32>>> for CreditScoreRange {
    fn from(bounds: Vec<Option<i32>>) -> Self {
        let mut bounds = bounds.into_iter();
        Self {
            min: bounds.next().flatten(),
            max: bounds.next().flatten(),
        }
    }
}

impl From<CreditScoreRange> for Vec<Option<i32>> {
    fn from(range: CreditScoreRange) -> Self {
        vec![range.min, range.max]
    }
}

/// Criteria for narrowing the product catalog.
///
/// `mortgage_type`, `zip_code`, `purchase_price` and `down_payment` are
/// carried for the caller's benefit and do not participate in filtering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mortgage_type: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub zip_code: Option<u32>,

    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub purchase_price: Option<f64>,

    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub down_payment: Option<f64>,

    #[serde(
        rename = "creditScore",
        alias = "creditScoreRange",
        skip_serializing_if = "Option::is_none"
    )]
    pub credit_score_range: Option<CreditScoreRange>,

    /// Requested loan term in years
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub loan_term: Option<i64>,

    /// `"fix"` or `"arm"`; anything other than `"fix"` is read as ARM
    #[serde(
        rename = "armOrFixed",
        alias = "rateType",
        skip_serializing_if = "Option::is_none"
    )]
    pub rate_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_fha_loans: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_va_loans: Option<bool>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse criteria from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, CriteriaError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse criteria from a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, CriteriaError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn with_credit_score(mut self, range: CreditScoreRange) -> Self {
        self.credit_score_range = Some(range);
        self
    }

    pub fn with_loan_term(mut self, years: i64) -> Self {
        self.loan_term = Some(years);
        self
    }

    pub fn with_rate_type(mut self, rate_type: impl Into<String>) -> Self {
        self.rate_type = Some(rate_type.into());
        self
    }

    pub fn with_fha_loans(mut self, show: bool) -> Self {
        self.show_fha_loans = Some(show);
        self
    }

    pub fn with_va_loans(mut self, show: bool) -> Self {
        self.show_va_loans = Some(show);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_criteria() {
        let json = r#"{
            "mortgageType": "refinance",
            "zipCode": 90011,
            "purchasePrice": 1310000,
            "downPayment": 524000,
            "creditScore": [780, 850],
            "loanTerm": 30,
            "armOrFixed": "fix",
            "showFhaLoans": false,
            "showVaLoans": false
        }"#;

        let criteria = FilterCriteria::from_json(json).unwrap();
        assert_eq!(criteria.mortgage_type.as_deref(), Some("refinance"));
        assert_eq!(criteria.zip_code, Some(90011));
        assert_eq!(criteria.purchase_price, Some(1_310_000.0));
        assert_eq!(criteria.credit_score_range, Some(CreditScoreRange::between(780, 850)));
        assert_eq!(criteria.loan_term, Some(30));
        assert_eq!(criteria.rate_type.as_deref(), Some("fix"));
        assert_eq!(criteria.show_va_loans, Some(false));
    }

    #[test]
    fn test_empty_document_is_all_absent() {
        let criteria = FilterCriteria::from_json("{}").unwrap();
        assert_eq!(criteria, FilterCriteria::default());
    }

    #[test]
    fn test_aliases_accepted() {
        let criteria =
            FilterCriteria::from_json(r#"{"creditScoreRange": [700, null], "rateType": "arm"}"#)
                .unwrap();
        assert_eq!(criteria.credit_score_range, Some(CreditScoreRange::new(Some(700), None)));
        assert_eq!(criteria.rate_type.as_deref(), Some("arm"));
    }

    #[test]
    fn test_open_bounds() {
        let criteria = FilterCriteria::from_json(r#"{"creditScore": [null, 600]}"#).unwrap();
        let range = criteria.credit_score_range.unwrap();
        assert_eq!(range.min, None);
        assert_eq!(range.max, Some(600));
        assert_eq!(range.effective_min(), 0);

        let empty = FilterCriteria::from_json(r#"{"creditScore": []}"#).unwrap();
        assert_eq!(empty.credit_score_range, Some(CreditScoreRange::default()));
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let criteria = FilterCriteria::from_json(
            r#"{"zipCode": "94110", "purchasePrice": "450000.50", "downPayment": 0, "loanTerm": " 30 "}"#,
        )
        .unwrap();
        assert_eq!(criteria.zip_code, Some(94110));
        assert_eq!(criteria.purchase_price, Some(450_000.5));
        assert_eq!(criteria.down_payment, Some(0.0));
        assert_eq!(criteria.loan_term, Some(30));

        let nulls = FilterCriteria::from_json(r#"{"zipCode": null, "loanTerm": null}"#).unwrap();
        assert_eq!(nulls, FilterCriteria::default());

        assert!(FilterCriteria::from_json(r#"{"zipCode": "SW1A"}"#).is_err());
        assert!(FilterCriteria::from_json(r#"{"loanTerm": true}"#).is_err());
    }

    #[test]
    fn test_credit_score_under_both_names_is_rejected() {
        let result =
            FilterCriteria::from_json(r#"{"creditScore": [700, 799], "creditScoreRange": [700, 799]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_yaml_criteria() {
        let yaml = r#"
loanTerm: 15
armOrFixed: arm
showVaLoans: true
"#;
        let criteria = FilterCriteria::from_yaml(yaml).unwrap();
        assert_eq!(criteria.loan_term, Some(15));
        assert_eq!(criteria.show_va_loans, Some(true));
        assert_eq!(criteria.show_fha_loans, None);
    }

    #[test]
    fn test_serialization_omits_absent_fields() {
        let criteria = FilterCriteria::new()
            .with_credit_score(CreditScoreRange::new(Some(780), None))
            .with_loan_term(30);
        let value = serde_json::to_value(&criteria).unwrap();
        assert_eq!(value, serde_json::json!({"creditScore": [780, null], "loanTerm": 30}));
    }
}
