//! Listing form helpers: description from a photo, category from text

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::client::{ChatMessage, ChatRequest, LlmError};
use super::AiService;

const DESCRIPTION_FALLBACK: &str = "Could not generate a description. Please write one manually.";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeInput {
    /// `data:<mime>;base64,<payload>`
    pub photo_data_uri: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeOutput {
    pub suggested_description: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub product_name: String,
    pub product_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryOutput {
    pub suggested_category: String,
}

fn describe_prompt(category: &str) -> String {
    format!(
        "You are a factory operations manager listing industrial waste on a B2B exchange \
platform. Your goal is to write an accurate, professional description for a potential buyer \
(e.g., a recycling plant).

Analyze the attached image of a waste material from the '{category}' industry sector.

Based on what you see in the image, write a short, technical description (1-2 sentences) of \
the material's composition and condition.
- Be specific and professional. For example, instead of \"looks clean,\" say \"Material \
appears free of contaminants and is uniformly processed.\"
- Mention packaging if visible (e.g., \"Packaged in 1-ton jumbo bags,\" \"Supplied in 200L drums\").
- Highlight key characteristics (e.g., \"Consistent shred size,\" \"Low moisture content\").
- Do NOT invent chemical properties you cannot see. Stick to the visual information and \
common knowledge for the material type.

VERY IMPORTANT: Only return the description text. Do not add any introductory text like \
\"Here is the description:\" or any markdown formatting. Just the plain text description."
    )
}

fn category_prompt(input: &CategoryInput, categories: &[&str]) -> String {
    format!(
        "You are an expert in product categorization. Given the name and description of a \
product, and a list of available categories, you will suggest the most appropriate category \
for the product.

Product Name: {}
Product Description: {}
Available Categories: {}

Answer with the single best category from the available categories, spelled exactly as \
listed, and nothing else.",
        input.product_name,
        input.product_description,
        categories.join(", ")
    )
}

/// Map a free-text answer onto one of `categories`
pub fn pick_category<'a>(answer: Option<&str>, categories: &[&'a str]) -> Option<&'a str> {
    let first = categories.first().copied();
    let Some(answer) = answer else {
        return first;
    };
    let cleaned = answer
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '.' || c == '*')
        .trim();

    categories
        .iter()
        .copied()
        .find(|c| c.eq_ignore_ascii_case(cleaned))
        .or_else(|| {
            let lowered = cleaned.to_lowercase();
            categories
                .iter()
                .copied()
                .find(|c| lowered.contains(&c.to_lowercase()))
        })
        .or(first)
}

impl AiService {
    /// Suggest a listing description from a photo of the material
    pub async fn suggest_description(&self, input: &DescribeInput) -> Result<DescribeOutput, LlmError> {
        let request = ChatRequest::new(
            self.vision_model.clone(),
            vec![ChatMessage::user_with_image(
                describe_prompt(&input.category),
                input.photo_data_uri.clone(),
            )],
        )
        .temperature(0.4)
        .max_tokens(256);

        let text = self.client.complete(&request).await.map_err(|e| {
            warn!(error = %e, "description suggestion failed");
            e
        })?;

        Ok(DescribeOutput {
            suggested_description: text.unwrap_or_else(|| DESCRIPTION_FALLBACK.to_string()),
        })
    }

    /// Suggest the best sector for a listing out of `categories`
    pub async fn suggest_category(
        &self,
        input: &CategoryInput,
        categories: &[&str],
    ) -> Result<CategoryOutput, LlmError> {
        let request = ChatRequest::new(
            self.text_model.clone(),
            vec![ChatMessage::user(category_prompt(input, categories))],
        )
        .temperature(0.0)
        .max_tokens(32);

        let answer = self.client.complete(&request).await?;
        let picked = pick_category(answer.as_deref(), categories).unwrap_or_default();

        Ok(CategoryOutput {
            suggested_category: picked.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use mockito::{Matcher, Server};

    const SECTORS: &[&str] = &["Plastics", "Metals & Scrap", "Fly Ash & Slag"];

    #[test]
    fn pick_category_tolerates_chatty_answers() {
        assert_eq!(pick_category(Some("plastics"), SECTORS), Some("Plastics"));
        assert_eq!(pick_category(Some("\"Fly Ash & Slag\"."), SECTORS), Some("Fly Ash & Slag"));
        assert_eq!(
            pick_category(Some("The best fit is Metals & Scrap"), SECTORS),
            Some("Metals & Scrap")
        );
        assert_eq!(pick_category(Some("Textiles"), SECTORS), Some("Plastics"));
        assert_eq!(pick_category(None, SECTORS), Some("Plastics"));
        assert_eq!(pick_category(None, &[]), None);
    }

    #[tokio::test]
    async fn describe_uses_vision_model_and_falls_back_on_blank() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::PartialJson(serde_json::json!({"model": "vision-model"})))
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"   "}}]}"#)
            .create_async()
            .await;

        let ai = AiService::new(&Config::for_tests(&server.url()));
        let out = ai
            .suggest_description(&DescribeInput {
                photo_data_uri: "data:image/png;base64,AAAA".into(),
                category: "Plastics".into(),
            })
            .await
            .unwrap();

        assert_eq!(out.suggested_description, DESCRIPTION_FALLBACK);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn describe_propagates_upstream_errors() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let ai = AiService::new(&Config::for_tests(&server.url()));
        let err = ai
            .suggest_description(&DescribeInput {
                photo_data_uri: "data:image/png;base64,AAAA".into(),
                category: "Plastics".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 500, .. }));
    }
}
