//! Form completeness checking.
//!
//! Walks the fixed rule table against a [`MortgageFormData`] and reports every
//! field that is missing or holds an unrecognized value, in table order. The
//! checker only decides *which* fields to ask for and *how*; turning a
//! descriptor into a sentence for the user is left to the caller.

mod form;
mod rules;

pub use form::{FieldState, MortgageFormData};
pub use rules::{
    rule_for, FieldKey, FieldRule, MissingReason, UiType, FIELD_RULES, MORTGAGE_TYPE_OPTIONS,
    RATE_TYPE_OPTIONS,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A field the user still has to supply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingFieldDescriptor {
    /// Field wire name
    pub key: FieldKey,

    /// UI affordance for collecting the field
    #[serde(rename = "type")]
    pub ui_type: UiType,

    /// Legal values, only for select fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,

    /// Why the field was reported
    pub reason: MissingReason,
}

impl MissingFieldDescriptor {
    fn from_rule(rule: &FieldRule, reason: MissingReason) -> Self {
        let options = (!rule.options.is_empty())
            .then(|| rule.options.iter().map(|o| o.to_string()).collect());

        Self {
            key: rule.key,
            ui_type: rule.ui_type,
            options,
            reason,
        }
    }
}

/// Evaluates the rule table against submitted forms.
#[derive(Debug, Clone, Copy)]
pub struct FormCompletenessChecker {
    rules: &'static [FieldRule],
}

impl Default for FormCompletenessChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl FormCompletenessChecker {
    pub fn new() -> Self {
        Self {
            rules: &FIELD_RULES,
        }
    }

    /// Report missing fields in rule-table order. Every rule is evaluated.
    pub fn check(&self, form: &MortgageFormData) -> Vec<MissingFieldDescriptor> {
        let missing: Vec<MissingFieldDescriptor> = self
            .rules
            .iter()
            .filter_map(|rule| {
                let reason = rule.check(form)?;
                debug!(field = %rule.key, reason = %reason, "Form field missing");
                Some(MissingFieldDescriptor::from_rule(rule, reason))
            })
            .collect();

        debug!(
            missing = missing.len(),
            total = self.rules.len(),
            "Checked form completeness"
        );
        missing
    }

    /// Whether `form` passes every rule.
    pub fn is_complete(&self, form: &MortgageFormData) -> bool {
        self.rules.iter().all(|rule| rule.check(form).is_none())
    }
}

/// Report missing fields of `form` using the standard rule table.
pub fn check_missing(form: &MortgageFormData) -> Vec<MissingFieldDescriptor> {
    FormCompletenessChecker::new().check(form)
}
