//! Waste appraisal: quality report, ideal buyer and recyclability score

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::client::{ChatMessage, ChatRequest, LlmError};
use super::AiService;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppraisalInput {
    pub product_name: String,
    pub description: String,
    pub category: String,
    /// Data URI or public URL of the listing photo
    pub photo_data_uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appraisal {
    pub quality_report: String,
    pub ideal_buyer_profile: String,
    pub recyclability_score: u8,
}

impl Appraisal {
    /// Answer used when the model replies with nothing usable
    pub fn standard_quality() -> Self {
        Self {
            quality_report: "The AI model could not provide an analysis, but this material \
                             generally appears to be of standard quality for its category."
                .to_string(),
            ideal_buyer_profile: "Typically purchased by manufacturers in the same or related sectors."
                .to_string(),
            recyclability_score: 75,
        }
    }

    /// Answer used when the model could not be reached
    pub fn offline() -> Self {
        Self {
            quality_report: "Material appears to be high-grade, uniform PET flakes, free of \
                             visible contaminants. Suitable for direct use in manufacturing."
                .to_string(),
            ideal_buyer_profile: "Ideal for polyester fiber producers or bottle-to-bottle recycling plants."
                .to_string(),
            recyclability_score: 95,
        }
    }
}

/// Model output before clamping; scores arrive as any JSON number
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAppraisal {
    quality_report: String,
    ideal_buyer_profile: String,
    recyclability_score: f64,
}

/// Pull the appraisal object out of the model's reply, tolerating code
/// fences or prose around it
pub fn parse_appraisal(text: &str) -> Option<Appraisal> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    let raw: RawAppraisal = serde_json::from_str(&text[start..=end]).ok()?;
    if raw.quality_report.trim().is_empty() || raw.ideal_buyer_profile.trim().is_empty() {
        return None;
    }
    if !raw.recyclability_score.is_finite() {
        return None;
    }

    Some(Appraisal {
        quality_report: raw.quality_report.trim().to_string(),
        ideal_buyer_profile: raw.ideal_buyer_profile.trim().to_string(),
        recyclability_score: raw.recyclability_score.round().clamp(0.0, 100.0) as u8,
    })
}

fn appraisal_prompt(input: &AppraisalInput) -> String {
    format!(
        "You are an expert industrial waste appraiser working for a B2B exchange. Your task is \
to analyze a waste material listing and provide a concise, professional appraisal for potential \
buyers.

Material Details:
- Type: {}
- Sector: {}
- Producer's Description: {}

The material image is attached.

Based on ALL the information provided (text and image), perform the following appraisal:

1. Recyclability Score: Estimate a recyclability percentage as an integer from 0 to 100. Base \
this on the material type (e.g., HDPE is highly recyclable, mixed textile sludge is less so) and \
its visible condition in the image (cleanliness, uniformity).
2. Quality Report: Write a 1-2 sentence report. Comment on purity, contamination, processing \
(e.g., shredded, baled), and overall value. Use professional language.
3. Ideal Buyer Profile: Identify the most likely industrial buyer in one sentence. For example, \
if it's 'Fly Ash', the ideal buyer is 'Cement Manufacturers'.

Respond with only a JSON object with the keys \"qualityReport\", \"idealBuyerProfile\" and \
\"recyclabilityScore\".",
        input.product_name, input.category, input.description
    )
}

impl AiService {
    /// Appraise a listing. Only a missing API key is reported as an error;
    /// every other failure yields a canned appraisal.
    pub async fn appraise_waste(&self, input: &AppraisalInput) -> Result<Appraisal, LlmError> {
        self.client.ensure_configured()?;

        let request = ChatRequest::new(
            self.vision_model.clone(),
            vec![ChatMessage::user_with_image(
                appraisal_prompt(input),
                input.photo_data_uri.clone(),
            )],
        )
        .temperature(0.2)
        .max_tokens(400)
        .json_object();

        match self.client.complete(&request).await {
            Ok(Some(text)) => Ok(parse_appraisal(&text).unwrap_or_else(|| {
                warn!(product = %input.product_name, "unparsable appraisal, using default");
                Appraisal::standard_quality()
            })),
            Ok(None) => Ok(Appraisal::standard_quality()),
            Err(e) => {
                warn!(error = %e, product = %input.product_name, "appraisal request failed");
                Ok(Appraisal::offline())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use mockito::Server;

    fn input() -> AppraisalInput {
        AppraisalInput {
            product_name: "Fly Ash".into(),
            description: "Dry fly ash from a coal power plant".into(),
            category: "Fly Ash & Slag".into(),
            photo_data_uri: "https://cdn.example.com/ash.jpg".into(),
        }
    }

    #[test]
    fn parses_fenced_json_and_clamps_score() {
        let text = "```json\n{\"qualityReport\": \"Fine, dry powder.\", \
                    \"idealBuyerProfile\": \"Cement manufacturers\", \
                    \"recyclabilityScore\": 140}\n```";
        let appraisal = parse_appraisal(text).unwrap();
        assert_eq!(appraisal.recyclability_score, 100);
        assert_eq!(appraisal.ideal_buyer_profile, "Cement manufacturers");
    }

    #[test]
    fn rejects_incomplete_objects() {
        assert!(parse_appraisal("no json here").is_none());
        assert!(parse_appraisal(r#"{"qualityReport": "x"}"#).is_none());
        assert!(parse_appraisal(
            r#"{"qualityReport": " ", "idealBuyerProfile": "y", "recyclabilityScore": 5}"#
        )
        .is_none());
    }

    #[tokio::test]
    async fn model_answer_is_used() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(
                serde_json::json!({"choices": [{"message": {"content":
                    "{\"qualityReport\":\"Uniform grey powder.\",\"idealBuyerProfile\":\"Cement Manufacturers\",\"recyclabilityScore\":88.6}"
                }}]})
                .to_string(),
            )
            .create_async()
            .await;

        let ai = AiService::new(&Config::for_tests(&server.url()));
        let appraisal = ai.appraise_waste(&input()).await.unwrap();
        assert_eq!(appraisal.recyclability_score, 89);
        assert_eq!(appraisal.quality_report, "Uniform grey powder.");
    }

    #[tokio::test]
    async fn upstream_failure_gives_offline_answer() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(503)
            .create_async()
            .await;

        let ai = AiService::new(&Config::for_tests(&server.url()));
        assert_eq!(ai.appraise_waste(&input()).await.unwrap(), Appraisal::offline());
    }

    #[tokio::test]
    async fn gibberish_gives_standard_answer() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"I cannot see the image."}}]}"#)
            .create_async()
            .await;

        let ai = AiService::new(&Config::for_tests(&server.url()));
        assert_eq!(
            ai.appraise_waste(&input()).await.unwrap(),
            Appraisal::standard_quality()
        );
    }

    #[tokio::test]
    async fn missing_key_is_an_error() {
        let mut config = Config::for_tests("http://127.0.0.1:9");
        config.groq_api_key = None;
        let ai = AiService::new(&config);
        assert!(matches!(
            ai.appraise_waste(&input()).await,
            Err(LlmError::NotConfigured)
        ));
    }
}
