use crate::types::{AgentError, AgentOutcome, AgentRequest, CapabilityAgent};
use async_trait::async_trait;
use base64::Engine;
use ghostdroid_executor::Device;
use ghostdroid_providers::{LlmProvider, Message};
use ghostdroid_tools::ToolRegistry;
use serde_json::json;
use std::sync::Arc;

const COMPLETE_TOOL: &str = "complete";

/// In-process capability agent: a bounded step loop over an LLM provider and
/// a tool registry, with optional per-step screen capture for vision.
pub struct DroidAgent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    device: Device,
}

impl DroidAgent {
    pub fn new(provider: Arc<dyn LlmProvider>, tools: Arc<ToolRegistry>, device: Device) -> Self {
        Self {
            provider,
            tools,
            device,
        }
    }

    fn complete_schema() -> serde_json::Value {
        json!({
            "type": "function",
            "function": {
                "name": COMPLETE_TOOL,
                "description": "Call when the goal is finished (or cannot be finished) to end the run.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "success": {"type": "boolean", "description": "Whether the goal was achieved"},
                        "reason": {"type": "string", "description": "Short explanation of the outcome"},
                        "output": {"type": "object", "description": "Structured result when one was requested"}
                    },
                    "required": ["success"]
                }
            }
        })
    }

    fn goal_message(request: &AgentRequest) -> Message {
        let content = match &request.output_schema {
            Some(schema) => format!(
                "{}\n\nWhen you are done, call the `complete` tool and put a JSON object \
                 matching this schema in its `output` argument:\n{}",
                request.goal, schema
            ),
            None => request.goal.clone(),
        };
        Message::new("user", content)
    }

    /// The provider sometimes surfaces the structured payload under `output`
    /// and sometimes under `structured_output`; normalize here with a fixed
    /// priority so nothing downstream has to care.
    fn normalize_completion(arguments: &serde_json::Value) -> AgentOutcome {
        let output = ["output", "structured_output"]
            .iter()
            .filter_map(|key| arguments.get(*key))
            .find(|v| !v.is_null())
            .cloned();

        AgentOutcome {
            success: arguments["success"].as_bool().unwrap_or(false),
            output,
            reason: arguments["reason"].as_str().map(str::to_string),
        }
    }

    /// A plain-text stop without a `complete` call. With a structured schema
    /// pending, try to read the payload out of the final message.
    fn finish_from_text(content: Option<String>, request: &AgentRequest) -> AgentOutcome {
        match &request.output_schema {
            None => AgentOutcome {
                success: true,
                output: None,
                reason: content,
            },
            Some(_) => {
                let parsed = content.as_deref().and_then(extract_json);
                AgentOutcome {
                    success: parsed.is_some(),
                    output: parsed,
                    reason: content,
                }
            }
        }
    }

    async fn capture_screen(&self) -> Option<Message> {
        match self.device.screenshot_png().await {
            Ok(png) => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(png);
                Some(Message::with_image(
                    "user",
                    "Current device screen.",
                    encoded,
                ))
            }
            Err(e) => {
                tracing::warn!(error = %e, "screen capture for vision failed");
                None
            }
        }
    }
}

/// Pulls the first JSON object out of free text, tolerating markdown fences.
fn extract_json(text: &str) -> Option<serde_json::Value> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Some(value);
    }
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    // Prose like "sorry :} here {..." puts the last brace before the first;
    // there is no object to extract.
    if end < start {
        return None;
    }
    serde_json::from_str(&trimmed[start..=end]).ok()
}

#[async_trait]
impl CapabilityAgent for DroidAgent {
    async fn run(&self, request: AgentRequest) -> Result<AgentOutcome, AgentError> {
        tracing::info!(goal = %request.goal, vision = request.vision, "starting agent run");

        let mut history = vec![Self::goal_message(&request)];
        let mut schemas = self.tools.schemas();
        schemas.push(Self::complete_schema());

        for step in 0..request.max_steps {
            tracing::debug!(step = step + 1, max = request.max_steps, "agent step");

            let mut messages = history.clone();
            if request.vision {
                if let Some(screen) = self.capture_screen().await {
                    messages.push(screen);
                }
            }

            let response = self
                .provider
                .generate(&messages, Some(&schemas))
                .await
                .map_err(|e| AgentError::Provider(e.to_string()))?;

            if let Some(content) = &response.content {
                history.push(Message::new("assistant", content.clone()));
            }

            if response.tool_calls.is_empty() {
                if response.finish_reason == "stop" {
                    return Ok(Self::finish_from_text(response.content, &request));
                }
                continue;
            }

            for call in &response.tool_calls {
                if call.name == COMPLETE_TOOL {
                    let outcome = Self::normalize_completion(&call.arguments);
                    tracing::info!(success = outcome.success, "agent run complete");
                    return Ok(outcome);
                }

                let result = match self.tools.get(&call.name) {
                    Some(tool) => tool
                        .execute(call.arguments.clone())
                        .await
                        .map_err(|e| AgentError::Tool(e.to_string()))?,
                    None => ghostdroid_tools::ToolResult::failed(format!(
                        "Unknown tool: {}",
                        call.name
                    )),
                };

                history.push(Message::new(
                    "tool",
                    serde_json::to_string(&result).unwrap_or_default(),
                ));
            }
        }

        Ok(AgentOutcome {
            success: false,
            output: None,
            reason: Some("max steps reached".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghostdroid_executor::{CommandOutput, DeviceCommander, ExecutorError};
    use ghostdroid_providers::{GenerateResponse, ProviderError, ToolCall};
    use ghostdroid_tools::{Tool, ToolError, ToolResult};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    struct NullCommander;

    #[async_trait]
    impl DeviceCommander for NullCommander {
        async fn run(
            &self,
            _args: &[String],
            _timeout: Duration,
        ) -> Result<CommandOutput, ExecutorError> {
            Ok(CommandOutput {
                stdout: String::new(),
                stderr: String::new(),
            })
        }

        async fn run_raw(
            &self,
            _args: &[String],
            _timeout: Duration,
        ) -> Result<Vec<u8>, ExecutorError> {
            Ok(vec![0x89, 0x50, 0x4e, 0x47])
        }
    }

    struct ScriptedProvider {
        responses: Mutex<Vec<GenerateResponse>>,
        saw_image: Mutex<bool>,
    }

    impl ScriptedProvider {
        fn new(mut responses: Vec<GenerateResponse>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                saw_image: Mutex::new(false),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn generate(
            &self,
            messages: &[Message],
            _tools: Option<&[serde_json::Value]>,
        ) -> Result<GenerateResponse, ProviderError> {
            if messages.iter().any(|m| m.image.is_some()) {
                *self.saw_image.lock().unwrap() = true;
            }
            self.responses
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| ProviderError::Api("script exhausted".to_string()))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct CountingTool(AtomicUsize);

    #[async_trait]
    impl Tool for CountingTool {
        fn name(&self) -> &str {
            "counting"
        }
        fn description(&self) -> &str {
            "counts calls"
        }
        fn schema(&self) -> serde_json::Value {
            json!({"type": "object", "properties": {}})
        }
        async fn execute(&self, _args: serde_json::Value) -> Result<ToolResult, ToolError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(ToolResult::ok(json!({"count": true})))
        }
    }

    fn tool_call(name: &str, arguments: serde_json::Value) -> GenerateResponse {
        GenerateResponse {
            content: None,
            tool_calls: vec![ToolCall {
                name: name.to_string(),
                arguments,
            }],
            finish_reason: "tool_calls".to_string(),
        }
    }

    fn agent_with(
        responses: Vec<GenerateResponse>,
        tools: ToolRegistry,
    ) -> (DroidAgent, Arc<ScriptedProvider>) {
        let provider = Arc::new(ScriptedProvider::new(responses));
        let device = Device::new(Arc::new(NullCommander));
        (
            DroidAgent::new(provider.clone(), Arc::new(tools), device),
            provider,
        )
    }

    #[tokio::test]
    async fn tool_then_complete() {
        let counter = Arc::new(CountingTool(AtomicUsize::new(0)));
        let mut registry = ToolRegistry::new();
        registry.register(counter.clone());

        let (agent, _) = agent_with(
            vec![
                tool_call("counting", json!({})),
                tool_call(COMPLETE_TOOL, json!({"success": true, "reason": "joined"})),
            ],
            registry,
        );

        let outcome = agent.run(AgentRequest::new("join")).await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.reason.as_deref(), Some("joined"));
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn output_field_priority() {
        let args = json!({
            "success": true,
            "output": {"meetings": []},
            "structured_output": {"ignored": true}
        });
        let outcome = DroidAgent::normalize_completion(&args);
        assert_eq!(outcome.output.unwrap()["meetings"], json!([]));

        let args = json!({"success": true, "structured_output": {"meetings": [1]}});
        let outcome = DroidAgent::normalize_completion(&args);
        assert_eq!(outcome.output.unwrap()["meetings"], json!([1]));
    }

    #[tokio::test]
    async fn max_steps_is_a_failure() {
        let responses = vec![tool_call("counting", json!({})), tool_call("counting", json!({}))];
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(CountingTool(AtomicUsize::new(0))));
        let (agent, _) = agent_with(responses, registry);

        let outcome = agent
            .run(AgentRequest::new("loop forever").with_max_steps(2))
            .await
            .unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.reason.as_deref(), Some("max steps reached"));
    }

    #[tokio::test]
    async fn vision_attaches_a_screenshot() {
        let responses = vec![GenerateResponse {
            content: Some("done".to_string()),
            tool_calls: vec![],
            finish_reason: "stop".to_string(),
        }];
        let (agent, provider) = agent_with(responses, ToolRegistry::new());

        let outcome = agent
            .run(AgentRequest::new("look").with_vision())
            .await
            .unwrap();
        assert!(outcome.success);
        assert!(*provider.saw_image.lock().unwrap());
    }

    #[test]
    fn extract_json_tolerates_out_of_order_braces() {
        assert!(extract_json("sorry :} could not finish {incomplete").is_none());
        assert!(extract_json("no braces at all").is_none());
        assert!(extract_json("}{").is_none());
    }

    #[tokio::test]
    async fn structured_text_fallback_tolerates_prose() {
        let responses = vec![GenerateResponse {
            content: Some("sorry :} could not finish {incomplete".to_string()),
            tool_calls: vec![],
            finish_reason: "stop".to_string(),
        }];
        let (agent, _) = agent_with(responses, ToolRegistry::new());

        let outcome = agent
            .run(
                AgentRequest::new("scrape")
                    .with_output_schema(json!({"type": "object"})),
            )
            .await
            .unwrap();
        assert!(!outcome.success);
        assert!(outcome.output.is_none());
    }

    #[tokio::test]
    async fn structured_text_fallback_parses_json() {
        let responses = vec![GenerateResponse {
            content: Some("```json\n{\"meetings\": [], \"events\": []}\n```".to_string()),
            tool_calls: vec![],
            finish_reason: "stop".to_string(),
        }];
        let (agent, _) = agent_with(responses, ToolRegistry::new());

        let outcome = agent
            .run(
                AgentRequest::new("scrape")
                    .with_output_schema(json!({"type": "object"})),
            )
            .await
            .unwrap();
        assert!(outcome.success);
        assert!(outcome.output.unwrap().get("meetings").is_some());
    }
}
