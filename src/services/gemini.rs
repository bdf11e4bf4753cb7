//! Thin client for the Gemini generateContent API.
//!
//! Every caller has a deterministic fallback, so errors here are reported
//! with `anyhow` and downgraded to a warning at the call site rather than
//! surfacing to the user.

use serde::de::DeserializeOwned;

use crate::config::Config;

#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        // 30-second timeout to prevent indefinite hangs
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
        })
    }

    /// Send a single-turn prompt and return the generated text.
    pub async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        if self.api_key.is_empty() {
            anyhow::bail!("GEMINI_API_KEY not configured");
        }

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({
                "contents": [{
                    "role": "user",
                    "parts": [{ "text": prompt }]
                }]
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error {}: {}", status, body);
        }

        let body: serde_json::Value = response.json().await?;
        let text = body["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Unexpected Gemini response shape"))?;

        Ok(text.to_string())
    }

    /// Prompt for a JSON object and parse it, tolerating the model wrapping
    /// its output in a markdown code fence.
    pub async fn generate_json<T: DeserializeOwned>(&self, prompt: &str) -> anyhow::Result<T> {
        let text = self.generate(prompt).await?;
        let cleaned = strip_code_fences(&text);
        serde_json::from_str(cleaned)
            .map_err(|e| anyhow::anyhow!("Malformed JSON from Gemini: {} in {:?}", e, cleaned))
    }
}

fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences_plain_json() {
        assert_eq!(strip_code_fences(r#"{"a": 1}"#), r#"{"a": 1}"#);
    }

    #[test]
    fn test_strip_code_fences_fenced_json() {
        let fenced = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(fenced), r#"{"a": 1}"#);
    }

    #[test]
    fn test_strip_code_fences_bare_fence() {
        let fenced = "```\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(fenced), r#"{"a": 1}"#);
    }
}
