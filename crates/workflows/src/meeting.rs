use crate::monitor::MonitorSession;
use crate::prompts::{self, JoinGoalParams};
use ghostdroid_agent::{AgentRequest, CapabilityAgent};
use ghostdroid_core::{
    classify, resolve, Credentials, JoinResult, LaunchOutcome, MeetingDescriptor,
    TargetApplication, WorkflowError,
};
use ghostdroid_executor::{Device, NAV_TIMEOUT};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct MeetingConfig {
    /// Pause after each blind navigation step, giving the UI time to settle.
    pub settle_delay: Duration,
    /// Hard wall-clock ceiling around any single agent call. The agent's own
    /// step budget is the primary bound; this is defense in depth.
    pub agent_ceiling: Duration,
    pub agent_max_steps: usize,
}

impl Default for MeetingConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(1500),
            agent_ceiling: Duration::from_secs(10 * 60),
            agent_max_steps: 50,
        }
    }
}

/// Per-meeting join orchestration: classify, resolve credentials, attempt
/// the deterministic fast path, fall back to the capability agent, and run
/// a monitoring session after a successful join.
///
/// The whole flow is a straight line; no state is ever revisited, and a
/// failed meeting never takes the rest of the batch down with it.
pub struct MeetingWorkflow {
    device: Device,
    agent: Arc<dyn CapabilityAgent>,
    monitor: MonitorSession,
    config: MeetingConfig,
}

impl MeetingWorkflow {
    pub fn new(
        device: Device,
        agent: Arc<dyn CapabilityAgent>,
        monitor: MonitorSession,
        config: MeetingConfig,
    ) -> Self {
        Self {
            device,
            agent,
            monitor,
            config,
        }
    }

    pub async fn join(&self, descriptor: &MeetingDescriptor) -> JoinResult {
        let target = classify(
            &descriptor.name,
            descriptor.description.as_deref().unwrap_or(""),
            descriptor.link.as_deref(),
        );
        tracing::info!(meeting = %descriptor.name, %target, "processing meeting");

        let creds = resolve(descriptor, target);
        if creds.id.is_empty() && target != TargetApplication::Browser {
            let err = WorkflowError::DataIncomplete(format!(
                "meeting id missing for {} target",
                target
            ));
            tracing::warn!(%err, "short-circuiting before any device command");
            return JoinResult::failed(err.to_string());
        }

        let result = match self.fast_launch(target, descriptor.link.as_deref()).await {
            LaunchOutcome::FastPathSucceeded if target == TargetApplication::Browser => {
                tracing::info!("link opened directly in browser");
                JoinResult::ok()
            }
            LaunchOutcome::FastPathSucceeded => {
                tracing::info!("app launched, waking agent for the in-app join");
                self.run_join_agent(target, &creds).await
            }
            LaunchOutcome::FastPathFailed(reason)
                if target == TargetApplication::Browser =>
            {
                // The browser path has no fallback; opening a link needs no
                // reasoning.
                JoinResult::failed(reason)
            }
            LaunchOutcome::FastPathFailed(reason) => {
                tracing::warn!(%reason, "fast launch failed, engaging safety net");
                self.run_join_agent(target, &creds).await
            }
            LaunchOutcome::NotApplicable => {
                tracing::info!(%target, "no deterministic path, engaging safety net");
                self.run_join_agent(target, &creds).await
            }
        };

        if result.success {
            // Runs to completion before the next meeting starts, so two
            // sessions never contend for the capture pipeline.
            self.monitor.run(&descriptor.name).await;
        }
        result
    }

    /// Deterministic launch attempt. Steps are not rolled back on failure;
    /// force-stop-then-relaunch is idempotent, so fail-forward is safe.
    pub async fn fast_launch(
        &self,
        target: TargetApplication,
        link: Option<&str>,
    ) -> LaunchOutcome {
        if target == TargetApplication::Browser {
            let Some(link) = link else {
                return LaunchOutcome::FastPathFailed("no link to open".to_string());
            };
            let escaped = link.replace('&', "\\&");
            return match self
                .fast_nav(
                    &["am", "start", "-a", "android.intent.action.VIEW", "-d", &escaped],
                    "Open link",
                )
                .await
            {
                Ok(()) => LaunchOutcome::FastPathSucceeded,
                Err(e) => LaunchOutcome::FastPathFailed(e.to_string()),
            };
        }

        let Some(package) = target.package() else {
            return LaunchOutcome::NotApplicable;
        };

        let steps: [(&[&str], &str); 2] = [
            (&["am", "force-stop", package], "Reset app"),
            (&["monkey", "-p", package, "1"], "Launch app"),
        ];
        for (args, description) in steps {
            if let Err(e) = self.fast_nav(args, description).await {
                return LaunchOutcome::FastPathFailed(e.to_string());
            }
        }
        LaunchOutcome::FastPathSucceeded
    }

    async fn fast_nav(&self, args: &[&str], description: &str) -> Result<(), WorkflowError> {
        tracing::debug!(description, "fast nav");
        self.device
            .shell(args, NAV_TIMEOUT)
            .await
            .map_err(|e| WorkflowError::CommandFailure(format!("{}: {}", description, e)))?;
        tokio::time::sleep(self.config.settle_delay).await;
        Ok(())
    }

    /// Single agent attempt per meeting; no retries. The goal carries the id
    /// and secret verbatim, with an explicit marker when there is no
    /// passcode.
    async fn run_join_agent(
        &self,
        target: TargetApplication,
        creds: &Credentials,
    ) -> JoinResult {
        let goal = prompts::join_meeting_goal(&JoinGoalParams {
            target,
            meeting_id: &creds.id,
            meeting_pass: &creds.secret,
        });
        let request = AgentRequest::new(goal)
            .with_vision()
            .with_max_steps(self.config.agent_max_steps);

        match tokio::time::timeout(self.config.agent_ceiling, self.agent.run(request)).await {
            Ok(Ok(outcome)) => JoinResult {
                success: outcome.success,
                reason: outcome.reason,
            },
            Ok(Err(e)) => {
                JoinResult::failed(WorkflowError::AgentFailure(e.to_string()).to_string())
            }
            Err(_) => JoinResult::failed("agent exceeded wall-clock ceiling"),
        }
    }
}
