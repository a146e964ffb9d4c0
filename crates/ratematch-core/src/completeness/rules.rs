//! The fixed field-rule table.
//!
//! Each rule pairs a form field with the UI affordance used to collect it and
//! a check that reports why the field is missing, if it is. Rules are
//! independent of one another and never look across fields.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::form::{FieldState, MortgageFormData};

/// Allowed values for `mortgageType`.
pub const MORTGAGE_TYPE_OPTIONS: &[&str] = &["purchase", "refinance"];

/// Allowed values for `armOrFixed`.
pub const RATE_TYPE_OPTIONS: &[&str] = &["fix", "arm"];

/// Form field identifiers, in rule-table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKey {
    #[serde(rename = "mortgageType")]
    MortgageType,
    #[serde(rename = "zipCode")]
    ZipCode,
    #[serde(rename = "purchasePrice")]
    PurchasePrice,
    #[serde(rename = "downPayment")]
    DownPayment,
    #[serde(rename = "creditScore")]
    CreditScore,
    #[serde(rename = "loanTerm")]
    LoanTerm,
    #[serde(rename = "armOrFixed")]
    ArmOrFixed,
    #[serde(rename = "showFhaLoans")]
    ShowFhaLoans,
    #[serde(rename = "showVaLoans")]
    ShowVaLoans,
}

impl FieldKey {
    pub const ALL: [FieldKey; 9] = [
        FieldKey::MortgageType,
        FieldKey::ZipCode,
        FieldKey::PurchasePrice,
        FieldKey::DownPayment,
        FieldKey::CreditScore,
        FieldKey::LoanTerm,
        FieldKey::ArmOrFixed,
        FieldKey::ShowFhaLoans,
        FieldKey::ShowVaLoans,
    ];

    /// Wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKey::MortgageType => "mortgageType",
            FieldKey::ZipCode => "zipCode",
            FieldKey::PurchasePrice => "purchasePrice",
            FieldKey::DownPayment => "downPayment",
            FieldKey::CreditScore => "creditScore",
            FieldKey::LoanTerm => "loanTerm",
            FieldKey::ArmOrFixed => "armOrFixed",
            FieldKey::ShowFhaLoans => "showFhaLoans",
            FieldKey::ShowVaLoans => "showVaLoans",
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// UI affordance used to collect a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiType {
    Input,
    Select,
    Boolean,
    Array,
}

impl UiType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UiType::Input => "input",
            UiType::Select => "select",
            UiType::Boolean => "boolean",
            UiType::Array => "array",
        }
    }
}

impl fmt::Display for UiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a field was reported.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MissingReason {
    /// Key not supplied
    Absent,

    /// Key supplied as `null`
    Null,

    /// Value outside the allowed option set
    Unrecognized { value: String },
}

impl fmt::Display for MissingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingReason::Absent => f.write_str("not provided"),
            MissingReason::Null => f.write_str("provided as null"),
            MissingReason::Unrecognized { value } => write!(f, "unrecognized value '{}'", value),
        }
    }
}

/// One row of the rule table.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub key: FieldKey,
    pub ui_type: UiType,

    /// Legal values; empty unless `ui_type` is [`UiType::Select`]
    pub options: &'static [&'static str],

    check: fn(&MortgageFormData) -> Option<MissingReason>,
}

impl FieldRule {
    /// Evaluate this rule against `form`.
    pub fn check(&self, form: &MortgageFormData) -> Option<MissingReason> {
        (self.check)(form)
    }
}

/// The rule table, in reporting order.
pub static FIELD_RULES: [FieldRule; 9] = [
    FieldRule {
        key: FieldKey::MortgageType,
        ui_type: UiType::Select,
        options: MORTGAGE_TYPE_OPTIONS,
        check: check_mortgage_type,
    },
    FieldRule {
        key: FieldKey::ZipCode,
        ui_type: UiType::Input,
        options: &[],
        check: check_zip_code,
    },
    FieldRule {
        key: FieldKey::PurchasePrice,
        ui_type: UiType::Input,
        options: &[],
        check: check_purchase_price,
    },
    FieldRule {
        key: FieldKey::DownPayment,
        ui_type: UiType::Input,
        options: &[],
        check: check_down_payment,
    },
    FieldRule {
        key: FieldKey::CreditScore,
        ui_type: UiType::Array,
        options: &[],
        check: check_credit_score,
    },
    FieldRule {
        key: FieldKey::LoanTerm,
        ui_type: UiType::Input,
        options: &[],
        check: check_loan_term,
    },
    FieldRule {
        key: FieldKey::ArmOrFixed,
        ui_type: UiType::Select,
        options: RATE_TYPE_OPTIONS,
        check: check_arm_or_fixed,
    },
    FieldRule {
        key: FieldKey::ShowFhaLoans,
        ui_type: UiType::Boolean,
        options: &[],
        check: check_show_fha_loans,
    },
    FieldRule {
        key: FieldKey::ShowVaLoans,
        ui_type: UiType::Boolean,
        options: &[],
        check: check_show_va_loans,
    },
];

/// Look up the rule for `key`.
pub fn rule_for(key: FieldKey) -> &'static FieldRule {
    // Table order matches FieldKey::ALL
    &FIELD_RULES[key as usize]
}

/// Null or absent is missing; any value is fine.
fn require_value<T>(state: &FieldState<T>) -> Option<MissingReason> {
    match state {
        FieldState::Absent => Some(MissingReason::Absent),
        FieldState::Null => Some(MissingReason::Null),
        FieldState::Present(_) => None,
    }
}

/// Null or absent is missing, and so is a value outside `options`.
fn require_option(state: &FieldState<String>, options: &[&str]) -> Option<MissingReason> {
    match state {
        FieldState::Present(value) if !options.contains(&value.as_str()) => {
            Some(MissingReason::Unrecognized {
                value: value.clone(),
            })
        }
        other => require_value(other),
    }
}

/// Only an absent key is missing; `null` and `false` both count as answered.
fn require_key<T>(state: &FieldState<T>) -> Option<MissingReason> {
    state.is_absent().then_some(MissingReason::Absent)
}

fn check_mortgage_type(form: &MortgageFormData) -> Option<MissingReason> {
    require_option(&form.mortgage_type, MORTGAGE_TYPE_OPTIONS)
}

fn check_zip_code(form: &MortgageFormData) -> Option<MissingReason> {
    require_value(&form.zip_code)
}

fn check_purchase_price(form: &MortgageFormData) -> Option<MissingReason> {
    require_value(&form.purchase_price)
}

fn check_down_payment(form: &MortgageFormData) -> Option<MissingReason> {
    require_value(&form.down_payment)
}

fn check_credit_score(form: &MortgageFormData) -> Option<MissingReason> {
    require_value(&form.credit_score_range)
}

fn check_loan_term(form: &MortgageFormData) -> Option<MissingReason> {
    require_value(&form.loan_term)
}

fn check_arm_or_fixed(form: &MortgageFormData) -> Option<MissingReason> {
    require_option(&form.arm_or_fixed, RATE_TYPE_OPTIONS)
}

fn check_show_fha_loans(form: &MortgageFormData) -> Option<MissingReason> {
    require_key(&form.show_fha_loans)
}

fn check_show_va_loans(form: &MortgageFormData) -> Option<MissingReason> {
    require_key(&form.show_va_loans)
}
