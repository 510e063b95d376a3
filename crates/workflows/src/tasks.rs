use crate::prompts;
use ghostdroid_agent::{AgentRequest, CapabilityAgent};
use ghostdroid_core::{Event, WorkflowError};
use ghostdroid_executor::{Device, NAV_TIMEOUT};
use std::sync::Arc;
use std::time::Duration;

const TASKS_SHORTCUT_ACTIVITY: &str =
    "com.google.android.apps.tasks/com.google.android.apps.tasks.ui.TaskShortcutActivity";
const TASK_MAX_STEPS: usize = 50;

/// Creates a Google Task for an event: a direct intent opens the new-task
/// overlay, the title is typed blind, then the agent takes over for the
/// details and save buttons, whose positions shift between app versions.
pub struct TaskWorkflow {
    device: Device,
    agent: Arc<dyn CapabilityAgent>,
    settle_delay: Duration,
}

impl TaskWorkflow {
    pub fn new(device: Device, agent: Arc<dyn CapabilityAgent>) -> Self {
        Self {
            device,
            agent,
            settle_delay: Duration::from_millis(1500),
        }
    }

    pub async fn create_google_task(&self, event: &Event) -> Result<(), WorkflowError> {
        tracing::info!(event = %event.name, "creating Google Task");

        self.device
            .shell(&["am", "start", "-n", TASKS_SHORTCUT_ACTIVITY], NAV_TIMEOUT)
            .await
            .map_err(|e| WorkflowError::CommandFailure(format!("open task overlay: {}", e)))?;
        tokio::time::sleep(self.settle_delay).await;

        // The title field has focus when the overlay slides up.
        self.device
            .input_text(&event.name)
            .await
            .map_err(|e| WorkflowError::CommandFailure(format!("type title: {}", e)))?;

        let request = AgentRequest::new(prompts::google_task_goal(event))
            .with_vision()
            .with_max_steps(TASK_MAX_STEPS);
        let outcome = self
            .agent
            .run(request)
            .await
            .map_err(|e| WorkflowError::AgentFailure(e.to_string()))?;

        if outcome.success {
            Ok(())
        } else {
            Err(WorkflowError::AgentFailure(
                outcome
                    .reason
                    .unwrap_or_else(|| "task agent failed".to_string()),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ghostdroid_agent::{AgentError, AgentOutcome};
    use ghostdroid_executor::{CommandOutput, DeviceCommander, ExecutorError};
    use std::sync::Mutex;

    struct RecordingCommander {
        calls: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl DeviceCommander for RecordingCommander {
        async fn run(
            &self,
            args: &[String],
            _timeout: Duration,
        ) -> Result<CommandOutput, ExecutorError> {
            self.calls.lock().unwrap().push(args.to_vec());
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
            Ok(Vec::new())
        }
    }

    struct OkAgent {
        goals: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CapabilityAgent for OkAgent {
        async fn run(&self, request: AgentRequest) -> Result<AgentOutcome, AgentError> {
            self.goals.lock().unwrap().push(request.goal);
            Ok(AgentOutcome {
                success: true,
                output: None,
                reason: None,
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn intent_then_title_then_agent() {
        let commander = Arc::new(RecordingCommander {
            calls: Mutex::new(Vec::new()),
        });
        let agent = Arc::new(OkAgent {
            goals: Mutex::new(Vec::new()),
        });
        let wf = TaskWorkflow::new(Device::new(commander.clone()), agent.clone());

        let event = Event {
            name: "Demo day".to_string(),
            time: "3:00 pm".to_string(),
            location: None,
            description: Some("Bring slides".to_string()),
            link: None,
        };
        wf.create_google_task(&event).await.unwrap();

        let calls = commander.calls.lock().unwrap();
        assert!(calls[0].iter().any(|a| a.contains("TaskShortcutActivity")));
        // Blind title entry goes through input-text escaping.
        assert!(calls[1].iter().any(|a| a == "Demo%sday"));

        let goals = agent.goals.lock().unwrap();
        assert!(goals[0].contains("Bring slides"));
    }
}
