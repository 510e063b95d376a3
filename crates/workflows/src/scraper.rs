use crate::prompts;
use ghostdroid_agent::{AgentRequest, CapabilityAgent};
use ghostdroid_core::{GroupScrapeResult, WorkflowError};
use std::path::PathBuf;
use std::sync::Arc;

const SCRAPE_MAX_STEPS: usize = 20;

/// Drives the agent through one group chat and persists what it found.
pub struct ScraperWorkflow {
    agent: Arc<dyn CapabilityAgent>,
    data_dir: PathBuf,
}

impl ScraperWorkflow {
    pub fn new(agent: Arc<dyn CapabilityAgent>, data_dir: PathBuf) -> Self {
        Self { agent, data_dir }
    }

    pub async fn scrape_group(&self, group_name: &str) -> Result<GroupScrapeResult, WorkflowError> {
        tracing::info!(group = group_name, "scraping group");

        let request = AgentRequest::new(prompts::scrape_group_goal(group_name))
            .with_max_steps(SCRAPE_MAX_STEPS)
            .with_output_schema(GroupScrapeResult::output_schema());

        let outcome = self
            .agent
            .run(request)
            .await
            .map_err(|e| WorkflowError::AgentFailure(e.to_string()))?;

        if !outcome.success {
            return Err(WorkflowError::AgentFailure(
                outcome.reason.unwrap_or_else(|| "Unknown reason".to_string()),
            ));
        }

        let payload = outcome.output.ok_or_else(|| {
            WorkflowError::AgentFailure("agent reported success without output".to_string())
        })?;
        let result: GroupScrapeResult = serde_json::from_value(payload)
            .map_err(|e| WorkflowError::AgentFailure(format!("malformed scrape output: {}", e)))?;

        // Persistence is best-effort; a failed write must not sink the data
        // we already hold in memory.
        if let Err(e) = self.persist(group_name, &result).await {
            tracing::warn!(error = %e, "failed to persist scrape result");
        }

        tracing::info!(
            meetings = result.meetings.len(),
            events = result.events.len(),
            "scrape finished"
        );
        Ok(result)
    }

    async fn persist(
        &self,
        group_name: &str,
        result: &GroupScrapeResult,
    ) -> Result<PathBuf, std::io::Error> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        let filename = self
            .data_dir
            .join(format!("{}_data.json", group_name.replace(' ', "_")));
        let json = serde_json::to_string_pretty(result)?;
        tokio::fs::write(&filename, json).await?;
        Ok(filename)
    }
}
