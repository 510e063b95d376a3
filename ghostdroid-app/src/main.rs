mod config;

use anyhow::{Context, Result};
use config::{Config, LlmBackend};
use ghostdroid_agent::{AgentRequest, CapabilityAgent, DroidAgent};
use ghostdroid_core::MeetingDescriptor;
use ghostdroid_executor::{AdbExecutor, Device};
use ghostdroid_providers::{GoogleGenAiProvider, LlmProvider, OpenAiCompatibleProvider};
use ghostdroid_tools::{ShellTool, ToolRegistry};
use ghostdroid_workflows::{
    AlarmWorkflow, MeetingConfig, MeetingWorkflow, MonitorConfig, MonitorSession,
    ScraperWorkflow, TaskWorkflow,
};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║              Ghostdroid — Android Meeting Assistant              ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    let config = if Config::exists() {
        let cfg = Config::load()?;
        cfg.validate()?;
        cfg
    } else {
        let cfg = Config::default();
        cfg.save().context("Failed to write default config.toml")?;
        println!("ℹ️  Wrote default config.toml — edit it and set GEMINI_API_KEY.");
        cfg.validate()?;
        cfg
    };

    let provider = build_provider(&config)?;
    println!("Using provider: {}", provider.name());
    println!("Model: {}", config.llm.model());
    println!();

    let device = Device::new(Arc::new(AdbExecutor::new(config.device_serial.clone())));
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(ShellTool::new(device.clone())));
    let agent: Arc<dyn CapabilityAgent> =
        Arc::new(DroidAgent::new(provider, Arc::new(registry), device.clone()));

    let monitor = MonitorSession::new(
        device.clone(),
        MonitorConfig {
            duration: Duration::from_secs(config.monitor.duration_secs),
            interval: Duration::from_secs(config.monitor.interval_secs),
            output_root: config.data_dir.join("screenshots"),
        },
    );
    let meetings = MeetingWorkflow::new(
        device.clone(),
        agent.clone(),
        monitor,
        MeetingConfig::default(),
    );
    let scraper = ScraperWorkflow::new(agent.clone(), config.data_dir.clone());
    let alarms = AlarmWorkflow::new(agent.clone());
    let tasks = TaskWorkflow::new(device.clone(), agent.clone());

    loop {
        println!("\n{}", "=".repeat(40));
        println!("🤖 Ghostdroid Command Center");
        println!("{}", "=".repeat(40));
        println!("1. 🟢 Group workflow (scrape chats, join meetings, set events)");
        println!("2. 🔵 Custom request");
        println!("q. 🔴 Quit");

        let choice = prompt("\n👉 Select option: ")?.to_lowercase();
        match choice.as_str() {
            "1" => {
                let groups = load_groups(&config.groups_file);
                if groups.is_empty() {
                    println!(
                        "⚠️  No groups configured. Add a JSON array of group names to {}.",
                        config.groups_file.display()
                    );
                    continue;
                }
                for group in &groups {
                    run_group(group, &scraper, &meetings, &alarms, &tasks).await;
                }
            }
            "2" => {
                let goal = prompt("   💬 Describe your task: ")?;
                if goal.is_empty() {
                    continue;
                }
                match agent
                    .run(AgentRequest::new(goal).with_vision())
                    .await
                {
                    Ok(outcome) if outcome.success => println!("✅ Done."),
                    Ok(outcome) => println!(
                        "❌ Failed: {}",
                        outcome.reason.unwrap_or_else(|| "unknown".to_string())
                    ),
                    Err(e) => println!("❌ Agent error: {}", e),
                }
            }
            "q" => break,
            _ => {}
        }
    }

    println!("🏁 Shutdown.");
    Ok(())
}

fn build_provider(config: &Config) -> Result<Arc<dyn LlmProvider>> {
    match &config.llm {
        LlmBackend::Gemini { model } => {
            let api_key = config
                .llm
                .api_key()
                .context("GEMINI_API_KEY is not set")?;
            Ok(Arc::new(GoogleGenAiProvider::new(api_key, model.clone())))
        }
        LlmBackend::OpenAi { endpoint, model } => Ok(Arc::new(OpenAiCompatibleProvider::new(
            endpoint.clone(),
            config.llm.api_key(),
            model.clone(),
        ))),
    }
}

/// Processes one group end to end. Every meeting and event failure is
/// isolated; the batch always moves on.
async fn run_group(
    group: &str,
    scraper: &ScraperWorkflow,
    meetings: &MeetingWorkflow,
    alarms: &AlarmWorkflow,
    tasks: &TaskWorkflow,
) {
    println!("\n--- 🟢 Workflow: '{}' ---", group);

    let scraped = match scraper.scrape_group(group).await {
        Ok(result) => result,
        Err(e) => {
            println!("❌ Scrape failed for '{}': {}", group, e);
            return;
        }
    };
    println!(
        "   📝 Found {} meetings and {} events.",
        scraped.meetings.len(),
        scraped.events.len()
    );

    for meeting in &scraped.meetings {
        print_join(meeting, meetings.join(meeting).await.success);
    }

    for event in &scraped.events {
        if let Err(e) = alarms.set_event_alarm(&event.name, &event.time).await {
            println!("   ⚠️ Alarm for '{}' failed: {}", event.name, e);
        }
        if let Err(e) = tasks.create_google_task(event).await {
            println!("   ⚠️ Task for '{}' failed: {}", event.name, e);
        }
    }
}

fn print_join(meeting: &MeetingDescriptor, success: bool) {
    if success {
        println!("   ✅ Joined '{}'.", meeting.name);
    } else {
        println!("   ❌ Could not join '{}'.", meeting.name);
    }
}

/// Reads the target group list: a JSON array of strings. Non-strings are
/// skipped, a missing or unreadable file yields an empty list.
fn load_groups(path: &Path) -> Vec<String> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    match serde_json::from_str::<serde_json::Value>(&content) {
        Ok(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_groups_skips_non_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("groups.json");
        std::fs::write(&path, r#"["Family", 42, "Project Alpha", null]"#).unwrap();
        assert_eq!(load_groups(&path), vec!["Family", "Project Alpha"]);
    }

    #[test]
    fn load_groups_tolerates_missing_file() {
        assert!(load_groups(Path::new("/nonexistent/groups.json")).is_empty());
    }
}
