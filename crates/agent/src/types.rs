use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Provider error: {0}")]
    Provider(String),
    #[error("Tool execution error: {0}")]
    Tool(String),
}

/// One bounded agent run: a natural-language goal plus the capability knobs
/// for this invocation.
#[derive(Debug, Clone)]
pub struct AgentRequest {
    pub goal: String,
    pub vision: bool,
    pub max_steps: usize,
    /// When set, the agent is asked to return a structured payload
    /// conforming to this JSON schema.
    pub output_schema: Option<serde_json::Value>,
}

impl AgentRequest {
    pub fn new(goal: impl Into<String>) -> Self {
        Self {
            goal: goal.into(),
            vision: false,
            max_steps: 50,
            output_schema: None,
        }
    }

    pub fn with_vision(mut self) -> Self {
        self.vision = true;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_output_schema(mut self, schema: serde_json::Value) -> Self {
        self.output_schema = Some(schema);
        self
    }
}

/// Normalized result of an agent run. Populated once at the collaborator
/// boundary; call sites never branch on payload field names.
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    pub success: bool,
    pub output: Option<serde_json::Value>,
    pub reason: Option<String>,
}

/// External reasoning+action executor with a bounded step budget and
/// optional vision/tool capabilities.
#[async_trait]
pub trait CapabilityAgent: Send + Sync {
    async fn run(&self, request: AgentRequest) -> Result<AgentOutcome, AgentError>;
}
