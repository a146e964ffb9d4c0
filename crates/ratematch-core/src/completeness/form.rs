//! Mortgage form data with explicit presence tracking.
//!
//! A form field is in one of three states: the key was never supplied, it was
//! supplied as `null`, or it carries a value. The completeness rules treat
//! these differently per field, so the distinction survives deserialization.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::criteria::{lenient, CreditScoreRange, CriteriaError, FilterCriteria};

/// Presence state of a single form field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldState<T> {
    /// Key missing from the input
    Absent,

    /// Key supplied with `null`
    Null,

    /// Key supplied with a value
    Present(T),
}

impl<T> FieldState<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldState::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldState::Null)
    }

    pub fn is_present(&self) -> bool {
        matches!(self, FieldState::Present(_))
    }

    /// Borrow the value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            FieldState::Present(value) => Some(value),
            _ => None,
        }
    }

    /// Collapse absent and null into `None`.
    pub fn into_option(self) -> Option<T> {
        match self {
            FieldState::Present(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> Default for FieldState<T> {
    fn default() -> Self {
        FieldState::Absent
    }
}

impl<T> From<Option<T>> for FieldState<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => FieldState::Present(value),
            None => FieldState::Null,
        }
    }
}

// Only reached when the key exists; a missing key falls back to
// `Default`, i.e. `Absent`, through `#[serde(default)]`.
impl<'de, T> Deserialize<'de> for FieldState<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(FieldState::from)
    }
}

impl<T> Serialize for FieldState<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            FieldState::Present(value) => serializer.serialize_some(value),
            _ => serializer.serialize_none(),
        }
    }
}

fn lenient_number<'de, D, T>(deserializer: D) -> Result<FieldState<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lenient::option(deserializer).map(FieldState::from)
}

/// Mortgage application form as submitted by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageFormData {
    /// `"purchase"` or `"refinance"`
    #[serde(default, skip_serializing_if = "FieldState::is_absent")]
    pub mortgage_type: FieldState<String>,

    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "FieldState::is_absent"
    )]
    pub zip_code: FieldState<u32>,

    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "FieldState::is_absent"
    )]
    pub purchase_price: FieldState<f64>,

    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "FieldState::is_absent"
    )]
    pub down_payment: FieldState<f64>,

    #[serde(
        rename = "creditScore",
        alias = "creditScoreRange",
        default,
        skip_serializing_if = "FieldState::is_absent"
    )]
    pub credit_score_range: FieldState<CreditScoreRange>,

    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "FieldState::is_absent"
    )]
    pub loan_term: FieldState<i64>,

    /// `"fix"` or `"arm"`
    #[serde(
        rename = "armOrFixed",
        alias = "rateType",
        default,
        skip_serializing_if = "FieldState::is_absent"
    )]
    pub arm_or_fixed: FieldState<String>,

    #[serde(default, skip_serializing_if = "FieldState::is_absent")]
    pub show_fha_loans: FieldState<bool>,

    #[serde(default, skip_serializing_if = "FieldState::is_absent")]
    pub show_va_loans: FieldState<bool>,
}

impl MortgageFormData {
    /// Parse form data from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, CriteriaError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse form data from a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, CriteriaError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Lower the form into filter criteria. Null and absent both become `None`.
    pub fn to_criteria(&self) -> FilterCriteria {
        FilterCriteria {
            mortgage_type: self.mortgage_type.value().cloned(),
            zip_code: self.zip_code.value().copied(),
            purchase_price: self.purchase_price.value().copied(),
            down_payment: self.down_payment.value().copied(),
            credit_score_range: self.credit_score_range.value().copied(),
            loan_term: self.loan_term.value().copied(),
            rate_type: self.arm_or_fixed.value().cloned(),
            show_fha_loans: self.show_fha_loans.value().copied(),
            show_va_loans: self.show_va_loans.value().copied(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_null_and_present_are_distinct() {
        let form = MortgageFormData::from_json(
            r#"{"zipCode": null, "showFhaLoans": false, "purchasePrice": 0}"#,
        )
        .unwrap();

        assert!(form.zip_code.is_null());
        assert_eq!(form.show_fha_loans, FieldState::Present(false));
        assert!(form.show_va_loans.is_absent());
        assert_eq!(form.purchase_price.value(), Some(&0.0));
        assert!(form.mortgage_type.is_absent());
    }

    #[test]
    fn test_numeric_fields_accept_strings() {
        let form = MortgageFormData::from_json(
            r#"{"zipCode": "94110", "purchasePrice": "900000", "loanTerm": null}"#,
        )
        .unwrap();
        assert_eq!(form.zip_code, FieldState::Present(94110));
        assert_eq!(form.purchase_price, FieldState::Present(900_000.0));
        assert!(form.loan_term.is_null());
        assert!(form.down_payment.is_absent());

        let yaml = MortgageFormData::from_yaml("zipCode: \"10001\"\ndownPayment: 0\n").unwrap();
        assert_eq!(yaml.zip_code, FieldState::Present(10001));
        assert_eq!(yaml.down_payment, FieldState::Present(0.0));

        assert!(MortgageFormData::from_json(r#"{"zipCode": "not a zip"}"#).is_err());
    }

    #[test]
    fn test_credit_score_with_open_bound() {
        let form = MortgageFormData::from_json(r#"{"creditScore": [780, null]}"#).unwrap();
        assert_eq!(
            form.credit_score_range,
            FieldState::Present(CreditScoreRange::new(Some(780), None))
        );

        let null_form = MortgageFormData::from_json(r#"{"creditScore": null}"#).unwrap();
        assert!(null_form.credit_score_range.is_null());
    }

    #[test]
    fn test_serialization_keeps_presence() {
        let form = MortgageFormData {
            zip_code: FieldState::Null,
            loan_term: FieldState::Present(30),
            ..Default::default()
        };
        let value = serde_json::to_value(&form).unwrap();
        assert_eq!(value, serde_json::json!({"zipCode": null, "loanTerm": 30}));
    }

    #[test]
    fn test_to_criteria() {
        let form = MortgageFormData::from_json(
            r#"{
                "mortgageType": "purchase",
                "creditScore": [700, 759],
                "loanTerm": 15,
                "armOrFixed": "fix",
                "showVaLoans": true,
                "showFhaLoans": null
            }"#,
        )
        .unwrap();

        let criteria = form.to_criteria();
        assert_eq!(criteria.mortgage_type.as_deref(), Some("purchase"));
        assert_eq!(criteria.credit_score_range, Some(CreditScoreRange::between(700, 759)));
        assert_eq!(criteria.loan_term, Some(15));
        assert_eq!(criteria.rate_type.as_deref(), Some("fix"));
        assert_eq!(criteria.show_va_loans, Some(true));
        assert_eq!(criteria.show_fha_loans, None);
        assert_eq!(criteria.zip_code, None);
    }

    #[test]
    fn test_yaml_form() {
        let form = MortgageFormData::from_yaml("zipCode: 94110\nshowVaLoans: false\n").unwrap();
        assert_eq!(form.zip_code.value(), Some(&94110));
        assert_eq!(form.show_va_loans.value(), Some(&false));
    }
}
