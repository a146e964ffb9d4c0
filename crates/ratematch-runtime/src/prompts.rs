//! Prompts for message synthesis.
//!
//! The system prompt is fixed and shared by every call, so providers that
//! cache prompt prefixes can reuse it. Only the per-field user prompt varies.

use crate::messages::MessageRequest;
use ratematch_core::completeness::{FieldKey, MissingReason, UiType};

/// System prompt for writing one missing-field message.
pub const SYSTEM_PROMPT: &str = r#"
You are a professional mortgage loan assistant for a mortgage recommendation website.
Your role is to help users find the best mortgage rates by collecting the information
their application still needs.

You will be told about ONE field of the mortgage form that is missing or invalid.
Write a single message asking the user to provide it.

## Form Fields
- mortgageType: "purchase" or "refinance"
- zipCode: ZIP code of the property
- purchasePrice: purchase price or home value (0 is valid)
- downPayment: down payment amount (0 is valid)
- creditScore: credit score range as [min, max]; [780, null] means 780 or above, [null, 600] means below 600
- loanTerm: loan term in years
- armOrFixed: "fix" for a fixed rate, "arm" for an adjustable rate
- showFhaLoans: whether to include FHA loans (yes or no)
- showVaLoans: whether to include VA loans (yes or no)

## Message Style
- Warm, professional, and conversational
- Explain why the information helps find better mortgage rates
- Natural English that a native speaker would use
- Concise but friendly: one or two sentences
- NEVER use sequential words like "To get started", "First", "Next", "Finally", "Firstly", "Secondly", "Lastly"
- The message must stand alone; messages are shown one at a time in a rotating carousel

## Output Format (JSON)
{"message": "string"}

Return only the JSON object.
"#;

/// Plain-language description of a field for the user prompt.
pub fn field_description(key: FieldKey) -> &'static str {
    match key {
        FieldKey::MortgageType => "whether the user is buying a home or refinancing",
        FieldKey::ZipCode => "the ZIP code of the property",
        FieldKey::PurchasePrice => "the purchase price or estimated home value",
        FieldKey::DownPayment => "how much the user plans to put down",
        FieldKey::CreditScore => "the user's approximate credit score range",
        FieldKey::LoanTerm => "how many years the user wants the loan to last",
        FieldKey::ArmOrFixed => "whether the user prefers a fixed or adjustable rate",
        FieldKey::ShowFhaLoans => "whether the user wants to see FHA loan options",
        FieldKey::ShowVaLoans => "whether the user wants to see VA loan options",
    }
}

fn input_hint(ui_type: UiType) -> &'static str {
    match ui_type {
        UiType::Input => "The user will type a value.",
        UiType::Select => "The user will pick one of the options shown.",
        UiType::Boolean => "The user will answer yes or no.",
        UiType::Array => "The user will pick a range.",
    }
}

/// Build the user prompt for one missing field.
pub fn build_field_prompt(request: &MessageRequest) -> String {
    let mut prompt = format!(
        "Field: {}\nMeaning: {}\nInput type: {}\n{}\n",
        request.key,
        field_description(request.key),
        request.ui_type,
        input_hint(request.ui_type),
    );

    if !request.options.is_empty() {
        prompt.push_str(&format!("Options: {}\n", request.options.join(", ")));
    }

    let status = match &request.reason {
        MissingReason::Absent | MissingReason::Null => {
            "Status: the user has not provided this yet.".to_string()
        }
        MissingReason::Unrecognized { value } => format!(
            "Status: the user entered \"{}\", which is not one of the options.",
            value
        ),
    };
    prompt.push_str(&status);
    prompt.push_str("\n\nWrite the message.");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_carries_tone_rules() {
        assert!(SYSTEM_PROMPT.contains("To get started"));
        assert!(SYSTEM_PROMPT.contains("carousel"));
        assert!(SYSTEM_PROMPT.contains(r#"{"message": "string"}"#));
    }

    #[test]
    fn test_field_prompt_for_select() {
        let request = MessageRequest {
            key: FieldKey::ArmOrFixed,
            ui_type: UiType::Select,
            options: vec!["fix".to_string(), "arm".to_string()],
            reason: MissingReason::Unrecognized {
                value: "balloon".to_string(),
            },
        };
        let prompt = build_field_prompt(&request);
        assert!(prompt.starts_with("Field: armOrFixed"));
        assert!(prompt.contains("Options: fix, arm"));
        assert!(prompt.contains("\"balloon\""));
    }

    #[test]
    fn test_field_prompt_for_input() {
        let request = MessageRequest {
            key: FieldKey::ZipCode,
            ui_type: UiType::Input,
            options: vec![],
            reason: MissingReason::Absent,
        };
        let prompt = build_field_prompt(&request);
        assert!(prompt.contains("Input type: input"));
        assert!(!prompt.contains("Options:"));
        assert!(prompt.contains("not provided this yet"));
    }
}
