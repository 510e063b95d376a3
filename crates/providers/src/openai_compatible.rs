use crate::traits::*;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

pub struct OpenAiCompatibleProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiCompatibleProvider {
    pub fn new(base_url: String, api_key: Option<String>, model: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
            model,
        }
    }

    fn encode_message(message: &Message) -> serde_json::Value {
        match &message.image {
            Some(image) => json!({
                "role": message.role,
                "content": [
                    {"type": "text", "text": message.content},
                    {
                        "type": "image_url",
                        "image_url": {"url": format!("data:image/png;base64,{}", image)}
                    }
                ]
            }),
            None => json!({"role": message.role, "content": message.content}),
        }
    }
}

pub(crate) fn parse_chat_response(
    json: &serde_json::Value,
) -> Result<GenerateResponse, ProviderError> {
    let choice = json["choices"]
        .get(0)
        .ok_or_else(|| ProviderError::Parse("No choices in response".to_string()))?;

    let message = &choice["message"];
    let content = message["content"].as_str().map(|s| s.to_string());
    let finish_reason = choice["finish_reason"]
        .as_str()
        .unwrap_or("stop")
        .to_string();

    let tool_calls = if let Some(calls) = message["tool_calls"].as_array() {
        calls
            .iter()
            .filter_map(|call| {
                let name = call["function"]["name"].as_str()?.to_string();
                let arguments: serde_json::Value =
                    serde_json::from_str(call["function"]["arguments"].as_str()?).ok()?;
                Some(ToolCall { name, arguments })
            })
            .collect()
    } else {
        Vec::new()
    };

    Ok(GenerateResponse {
        content,
        tool_calls,
        finish_reason,
    })
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    async fn generate(
        &self,
        messages: &[Message],
        tools: Option<&[serde_json::Value]>,
    ) -> Result<GenerateResponse, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);

        let encoded: Vec<serde_json::Value> =
            messages.iter().map(Self::encode_message).collect();
        let mut body = json!({
            "model": self.model,
            "messages": encoded,
        });

        if let Some(tools) = tools {
            body["tools"] = json!(tools);
        }

        let mut request = self.client.post(&url).json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
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

        parse_chat_response(&json)
    }

    fn name(&self) -> &str {
        "OpenAI Compatible"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tool_calls() {
        let payload = json!({
            "choices": [{
                "finish_reason": "tool_calls",
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "function": {
                            "name": "shell_executor",
                            "arguments": "{\"command\": \"input text 123\"}"
                        }
                    }]
                }
            }]
        });
        let parsed = parse_chat_response(&payload).unwrap();
        assert_eq!(parsed.tool_calls.len(), 1);
        assert_eq!(parsed.tool_calls[0].name, "shell_executor");
        assert_eq!(parsed.tool_calls[0].arguments["command"], "input text 123");
    }

    #[test]
    fn parses_plain_content() {
        let payload = json!({
            "choices": [{
                "finish_reason": "stop",
                "message": {"content": "done"}
            }]
        });
        let parsed = parse_chat_response(&payload).unwrap();
        assert_eq!(parsed.content.as_deref(), Some("done"));
        assert!(parsed.tool_calls.is_empty());
        assert_eq!(parsed.finish_reason, "stop");
    }

    #[test]
    fn missing_choices_is_a_parse_error() {
        let parsed = parse_chat_response(&json!({}));
        assert!(matches!(parsed, Err(ProviderError::Parse(_))));
    }

    #[test]
    fn image_messages_become_content_parts() {
        let message = Message::with_image("user", "Current screen", "QUJD".to_string());
        let encoded = OpenAiCompatibleProvider::encode_message(&message);
        assert!(encoded["content"].is_array());
        assert_eq!(
            encoded["content"][1]["image_url"]["url"],
            "data:image/png;base64,QUJD"
        );
    }
}
