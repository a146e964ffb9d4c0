//! Deterministic messages, one fixed sentence per field.

use async_trait::async_trait;
use ratematch_core::completeness::{FieldKey, MissingReason};

use super::{MessageRequest, MessageSource, MessageSynthesizer, SynthesisError, SynthesizedMessage};

/// Writes messages from built-in English templates. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateMessageSynthesizer;

impl TemplateMessageSynthesizer {
    pub fn new() -> Self {
        Self
    }

    /// The message for `request`, without going through the async trait.
    pub fn render(&self, request: &MessageRequest) -> String {
        let ask = match request.key {
            FieldKey::MortgageType => {
                "Are you buying a new home or refinancing the one you have? Knowing this helps us show the right rates."
            }
            FieldKey::ZipCode => {
                "What is the ZIP code of the property? Rates can vary by location, so this helps us find the best offers near you."
            }
            FieldKey::PurchasePrice => {
                "What is the purchase price or estimated value of the home? This lets us match you with loans that fit."
            }
            FieldKey::DownPayment => {
                "How much are you planning to put down? Any amount works, including zero, and it helps us estimate your rate."
            }
            FieldKey::CreditScore => {
                "Which range best describes your credit score? A rough range is enough to surface the rates you are likely to qualify for."
            }
            FieldKey::LoanTerm => {
                "How many years would you like your loan to last? The term has a big effect on your rate and monthly payment."
            }
            FieldKey::ArmOrFixed => {
                "Would you prefer a fixed rate or an adjustable rate? Each has its own advantages, and we can show you the best of either."
            }
            FieldKey::ShowFhaLoans => {
                "Would you like to include FHA loans in your results? They often allow lower down payments and more flexible credit."
            }
            FieldKey::ShowVaLoans => {
                "Would you like to include VA loans in your results? Eligible veterans and service members can get some of the best rates available."
            }
        };

        match &request.reason {
            MissingReason::Unrecognized { value } => format!(
                "We didn't recognize \"{}\" for this question. {}",
                value, ask
            ),
            MissingReason::Absent | MissingReason::Null => ask.to_string(),
        }
    }
}

#[async_trait]
impl MessageSynthesizer for TemplateMessageSynthesizer {
    async fn synthesize(&self, request: &MessageRequest) -> Result<SynthesizedMessage, SynthesisError> {
        Ok(SynthesizedMessage::new(self.render(request), MessageSource::Template))
    }

    fn name(&self) -> &str {
        "template"
    }
}
