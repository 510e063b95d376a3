use crate::traits::*;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini backend via the `generateContent` REST endpoint.
pub struct GoogleGenAiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GoogleGenAiProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            model,
        }
    }

    fn encode_message(message: &Message) -> serde_json::Value {
        // Gemini only knows "user" and "model"; tool output rides along as
        // user text.
        let role = if message.role == "assistant" {
            "model"
        } else {
            "user"
        };

        let mut parts = vec![json!({"text": message.content})];
        if let Some(image) = &message.image {
            parts.push(json!({
                "inline_data": {"mime_type": "image/png", "data": image}
            }));
        }

        json!({"role": role, "parts": parts})
    }

    /// Gemini wants bare function declarations, not the OpenAI envelope.
    fn function_declarations(tools: &[serde_json::Value]) -> Vec<serde_json::Value> {
        tools
            .iter()
            .filter_map(|t| {
                let f = t.get("function")?;
                Some(json!({
                    "name": f["name"],
                    "description": f["description"],
                    "parameters": f["parameters"],
                }))
            })
            .collect()
    }
}

pub(crate) fn parse_generate_content(
    json: &serde_json::Value,
) -> Result<GenerateResponse, ProviderError> {
    let candidate = json["candidates"]
        .get(0)
        .ok_or_else(|| ProviderError::Parse("No candidates in response".to_string()))?;

    let finish_reason = candidate["finishReason"]
        .as_str()
        .unwrap_or("STOP")
        .to_lowercase();

    let mut content: Option<String> = None;
    let mut tool_calls = Vec::new();

    if let Some(parts) = candidate["content"]["parts"].as_array() {
        for part in parts {
            if let Some(text) = part["text"].as_str() {
                content = Some(match content.take() {
                    Some(existing) => format!("{}\n{}", existing, text),
                    None => text.to_string(),
                });
            }
            if let Some(call) = part.get("functionCall") {
                if let Some(name) = call["name"].as_str() {
                    tool_calls.push(ToolCall {
                        name: name.to_string(),
                        arguments: call["args"].clone(),
                    });
                }
            }
        }
    }

    Ok(GenerateResponse {
        content,
        tool_calls,
        finish_reason,
    })
}

#[async_trait]
impl LlmProvider for GoogleGenAiProvider {
    async fn generate(
        &self,
        messages: &[Message],
        tools: Option<&[serde_json::Value]>,
    ) -> Result<GenerateResponse, ProviderError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let contents: Vec<serde_json::Value> =
            messages.iter().map(Self::encode_message).collect();
        let mut body = json!({"contents": contents});

        if let Some(tools) = tools {
            body["tools"] = json!([{
                "function_declarations": Self::function_declarations(tools)
            }]);
        }

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(format!("{}: {}", status, text)));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        parse_generate_content(&json)
    }

    fn name(&self) -> &str {
        "Google Gemini"
    }
}
