use crate::traits::{Tool, ToolError, ToolResult};
use async_trait::async_trait;
use ghostdroid_executor::{escape_input_text, Device, SHELL_TIMEOUT};
use serde_json::json;

/// Lets the agent run adb shell commands directly. The documented use is
/// typing IDs and passwords via `input text`, which is far more reliable
/// than entering credential strings through simulated touch gestures.
pub struct ShellTool {
    device: Device,
}

impl ShellTool {
    pub fn new(device: Device) -> Self {
        Self { device }
    }

    /// Normalizes an agent-supplied command line into shell arguments. A
    /// leading `adb shell` prefix is tolerated, and `input text` payloads
    /// get the percent-escape treatment before hitting the device.
    fn normalize(command: &str) -> Vec<String> {
        let mut rest = command.trim();
        if let Some(s) = rest.strip_prefix("adb") {
            rest = s.trim_start();
        }
        if let Some(s) = rest.strip_prefix("shell") {
            rest = s.trim_start();
        }

        if let Some(payload) = rest.strip_prefix("input text") {
            return vec![
                "input".to_string(),
                "text".to_string(),
                escape_input_text(payload),
            ];
        }

        rest.split_whitespace().map(str::to_string).collect()
    }
}

#[async_trait]
impl Tool for ShellTool {
    fn name(&self) -> &str {
        "shell_executor"
    }

    fn description(&self) -> &str {
        "Executes adb shell commands. Use 'input text <string>' to type IDs and passwords instantly."
    }

    fn schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "Shell command to run on the device"
                }
            },
            "required": ["command"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, ToolError> {
        let command = args["command"]
            .as_str()
            .ok_or_else(|| ToolError::Validation("Missing 'command' field".to_string()))?;

        let argv = Self::normalize(command);
        if argv.is_empty() {
            return Err(ToolError::Validation("Empty command".to_string()));
        }

        let argv_refs: Vec<&str> = argv.iter().map(String::as_str).collect();
        match self.device.shell(&argv_refs, SHELL_TIMEOUT).await {
            Ok(output) => Ok(ToolResult::ok(json!({
                "stdout": output.stdout.trim(),
                "stderr": output.stderr.trim(),
            }))),
            Err(e) => Ok(ToolResult::failed(e.to_string())),
        }
    }
}
