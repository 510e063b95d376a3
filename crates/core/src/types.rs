use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

fn default_meeting_name() -> String {
    "Unknown_Meeting".to_string()
}

fn name_or_placeholder<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let name: Option<String> = Option::deserialize(deserializer)?;
    Ok(match name {
        Some(n) if !n.trim().is_empty() => n,
        _ => default_meeting_name(),
    })
}

/// Normalized record of a meeting's joinable attributes, as produced by the
/// group scraper. Scraped payloads are inconsistent about field names, so
/// `meeting_id` and `password` are accepted as aliases rather than rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingDescriptor {
    #[serde(
        default = "default_meeting_name",
        deserialize_with = "name_or_placeholder"
    )]
    pub name: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default, alias = "meeting_id")]
    pub id: Option<String>,
    #[serde(default, rename = "code", alias = "password")]
    pub secret: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl MeetingDescriptor {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            link: None,
            id: None,
            secret: None,
            description: None,
        }
    }
}

/// The destination app a meeting should be opened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetApplication {
    Zoom,
    GoogleMeet,
    Teams,
    Browser,
}

impl TargetApplication {
    /// Android package name for targets with a deterministic launch path.
    pub fn package(&self) -> Option<&'static str> {
        match self {
            TargetApplication::Zoom => Some("us.zoom.videomeetings"),
            TargetApplication::GoogleMeet => Some("com.google.android.apps.meetings"),
            TargetApplication::Teams => Some("com.microsoft.teams"),
            TargetApplication::Browser => None,
        }
    }

    /// Platforms whose join IDs are numeric, making link-derived IDs viable.
    pub fn numeric_join_id(&self) -> bool {
        matches!(self, TargetApplication::Zoom)
    }
}

impl fmt::Display for TargetApplication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TargetApplication::Zoom => "Zoom",
            TargetApplication::GoogleMeet => "Google Meet",
            TargetApplication::Teams => "Teams",
            TargetApplication::Browser => "Browser",
        };
        f.write_str(name)
    }
}

/// Result of a deterministic launch attempt, consumed by the fallback
/// supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    FastPathSucceeded,
    FastPathFailed(String),
    NotApplicable,
}

/// Final outcome of a join workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinResult {
    pub success: bool,
    pub reason: Option<String>,
}

impl JoinResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            reason: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            reason: Some(reason.into()),
        }
    }
}

/// A calendar-style event found in chat, acted on via alarms and tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub time: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

/// Everything the scraper pulled out of one group chat.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupScrapeResult {
    #[serde(default)]
    pub meetings: Vec<MeetingDescriptor>,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl GroupScrapeResult {
    /// JSON schema handed to the capability agent as the required output
    /// shape for a scrape run.
    pub fn output_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "meetings": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": {"type": "string", "description": "Title or subject of the meeting"},
                            "link": {"type": "string", "description": "URL link to the meeting"},
                            "id": {"type": "string", "description": "Meeting ID if available"},
                            "code": {"type": "string", "description": "Passcode or password if available"}
                        },
                        "required": ["name"]
                    }
                },
                "events": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": {"type": "string", "description": "Name or title of the event"},
                            "time": {"type": "string", "description": "Date and time of the event"},
                            "location": {"type": "string"},
                            "description": {"type": "string"},
                            "link": {"type": "string"}
                        },
                        "required": ["name", "time"]
                    }
                }
            },
            "required": ["meetings", "events"]
        })
    }
}
