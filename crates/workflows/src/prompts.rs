//! Goal templates for agent runs. Each template is a pure function from a
//! typed parameter set to a string; there is no mutable template state.

use ghostdroid_core::{Event, TargetApplication};

/// Marker used whenever a meeting has no passcode. The agent is always told
/// so explicitly; an empty string would leave it guessing.
pub const NO_PASSWORD: &str = "No Password";

pub struct JoinGoalParams<'a> {
    pub target: TargetApplication,
    pub meeting_id: &'a str,
    pub meeting_pass: &'a str,
}

pub fn join_meeting_goal(params: &JoinGoalParams<'_>) -> String {
    let pass = if params.meeting_pass.is_empty() {
        NO_PASSWORD
    } else {
        params.meeting_pass
    };
    format!(
        "Open {}. Find the 'Join Meeting' button or join affordance. \
         Enter ID: {}. Enter Password: {}. \
         Prefer the shell_executor tool with 'input text' for typing the ID and password.",
        params.target, params.meeting_id, pass
    )
}

pub fn scrape_group_goal(group_name: &str) -> String {
    format!(
        "Open WhatsApp and open the group chat named '{}'. \
         Scroll through the recent messages and extract every meeting \
         (name, link, id, passcode) and every event (name, time, location, \
         description, link) mentioned there. Do not send any messages.",
        group_name
    )
}

pub fn set_alarm_goal(time: &str, label: &str) -> String {
    format!(
        "Open the Clock app. Create a new alarm at {} labelled '{}' and save it.",
        time, label
    )
}

pub fn google_task_goal(event: &Event) -> String {
    let mut details = event.description.clone().unwrap_or_default();
    if let Some(link) = &event.link {
        if !details.is_empty() {
            details.push_str("\n\n");
        }
        details.push_str("Link: ");
        details.push_str(link);
    }
    format!(
        "I have already typed the title '{}'.\n\
         1. Tap the 'Details' or 'Add details' icon/field.\n\
         2. Type the following text: '{}'\n\
         3. Tap the 'Date/Time' icon and set it to '{}' if possible.\n\
         4. Tap 'Save' or 'Done'.",
        event.name,
        details.trim(),
        event.time
    )
}

pub fn group_followup_goal(group_name: &str, scrape_json: &str) -> String {
    format!(
        "I have just run the scraper for '{}'. Here is the data found: {}\n\n\
         GOAL: Based on this data, navigate the phone to join any meetings \
         using Zoom/Meet or set event details in the Google Tasks app.",
        group_name, scrape_json
    )
}
