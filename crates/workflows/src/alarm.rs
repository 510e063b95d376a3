use crate::prompts;
use chrono::{Local, Timelike};
use ghostdroid_agent::{AgentRequest, CapabilityAgent};
use ghostdroid_core::WorkflowError;
use regex::Regex;
use std::sync::Arc;
use std::sync::OnceLock;

const ALARM_MAX_STEPS: usize = 20;

fn time_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2}):(\d{2})([ap]m)?").unwrap())
}

/// Converts natural time strings ("1:50 am", "14:30") into 24-hour
/// hour/minute. Unparseable input falls back to the top of the next hour.
pub fn parse_time_string(time_str: &str) -> (u32, u32) {
    let cleaned = time_str.to_lowercase().replace(['.', ' '], "");

    if let Some(caps) = time_pattern().captures(&cleaned) {
        let mut hour: u32 = caps[1].parse().unwrap_or(0);
        let minute: u32 = caps[2].parse().unwrap_or(0);
        if hour <= 23 && minute <= 59 {
            match caps.get(3).map(|m| m.as_str()) {
                Some("pm") if hour != 12 => hour += 12,
                Some("am") if hour == 12 => hour = 0,
                _ => {}
            }
            if hour <= 23 {
                return (hour, minute);
            }
        }
    }

    tracing::warn!(time = time_str, "could not parse time, defaulting to +1 hour");
    ((Local::now().hour() + 1) % 24, 0)
}

/// Sets a device alarm for an event via the capability agent.
pub struct AlarmWorkflow {
    agent: Arc<dyn CapabilityAgent>,
}

impl AlarmWorkflow {
    pub fn new(agent: Arc<dyn CapabilityAgent>) -> Self {
        Self { agent }
    }

    pub async fn set_event_alarm(
        &self,
        event_name: &str,
        event_time: &str,
    ) -> Result<(), WorkflowError> {
        let (hour, minute) = parse_time_string(event_time);
        let normalized = format!("{:02}:{:02}", hour, minute);
        tracing::info!(event = event_name, time = %normalized, "setting alarm");

        let request = AgentRequest::new(prompts::set_alarm_goal(&normalized, event_name))
            .with_max_steps(ALARM_MAX_STEPS);
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
                    .unwrap_or_else(|| "alarm agent failed".to_string()),
            ))
        }
    }
}
