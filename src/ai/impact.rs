//! One-paragraph commentary on the diversion chart

use serde::Serialize;
use tracing::warn;

use super::client::{ChatMessage, ChatRequest, LlmError};
use super::AiService;
use crate::market::analytics::MonthlyDiversion;

const EMPTY_REPORT: &str =
    "The platform is seeing steady activity in waste diversion and value creation.";
const OFFLINE_REPORT: &str = "The platform continues to facilitate valuable connections, turning \
waste into profitable resources for businesses nationwide.";

const SYSTEM_PROMPT: &str = "You are a financial analyst for a B2B circular economy marketplace \
called REVO. You will be given the last 6 months of data, showing the number of waste streams \
diverted from landfills and the total profit (value in INR) generated from those diversions each \
month. Your task is to provide a very short (1-2 sentences MAX) and insightful summary of the trend.
- Comment on the growth or decline in both diversions and profit.
- Be encouraging and professional.
- Example: \"Consistent growth in diversions over the past quarter demonstrates strong platform \
adoption, with a significant corresponding increase in market value creation.\"

VERY IMPORTANT: Only return the analysis text. Do not add any introductory text like \"Here is \
the analysis:\". Just the plain text.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactReport {
    pub report: String,
}

impl AiService {
    /// Summarize the monthly diversion trend. Only a missing key is an error.
    pub async fn analyze_impact(&self, months: &[MonthlyDiversion]) -> Result<ImpactReport, LlmError> {
        self.client.ensure_configured()?;

        let data = serde_json::to_string_pretty(months).unwrap_or_default();
        let request = ChatRequest::new(
            self.text_model.clone(),
            vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(format!("Here is the data for the last 6 months:\n{}", data)),
            ],
        )
        .temperature(0.7);

        let report = match self.client.complete(&request).await {
            Ok(Some(text)) => text,
            Ok(None) => EMPTY_REPORT.to_string(),
            Err(e) => {
                warn!(error = %e, "impact analysis failed");
                OFFLINE_REPORT.to_string()
            }
        };

        Ok(ImpactReport { report })
    }
}
