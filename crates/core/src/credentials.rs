use crate::types::{MeetingDescriptor, TargetApplication};
use regex::Regex;
use std::sync::OnceLock;

/// Joinable identifier and secret resolved from a descriptor. Empty strings
/// mean "absent"; the workflow decides whether that is fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub id: String,
    pub secret: String,
}

fn digit_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").unwrap())
}

/// Resolves credentials from a descriptor. Explicit fields always win; a
/// link-derived id is only attempted for numeric-join-id platforms when the
/// explicit id is absent.
pub fn resolve(descriptor: &MeetingDescriptor, target: TargetApplication) -> Credentials {
    let id = descriptor.id.clone().unwrap_or_default();
    let secret = descriptor.secret.clone().unwrap_or_default();

    let id = if id.is_empty() && target.numeric_join_id() {
        descriptor
            .link
            .as_deref()
            .and_then(longest_digit_run)
            .unwrap_or_default()
    } else {
        id
    };

    Credentials { id, secret }
}

/// Extracts the longest run of consecutive decimal digits from a link. Runs
/// are atomic tokens, never individual digits; among equal-longest runs the
/// first occurrence wins.
fn longest_digit_run(link: &str) -> Option<String> {
    let mut best: Option<&str> = None;
    for run in digit_runs().find_iter(link) {
        let run = run.as_str();
        if best.map_or(true, |b| run.len() > b.len()) {
            best = Some(run);
        }
    }
    best.map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(link: &str) -> MeetingDescriptor {
        MeetingDescriptor {
            name: "Standup".to_string(),
            link: Some(link.to_string()),
            id: None,
            secret: None,
            description: None,
        }
    }

    #[test]
    fn longest_run_wins() {
        let creds = resolve(
            &descriptor("https://zoom.us/j/88812345671?pwd=abc"),
            TargetApplication::Zoom,
        );
        assert_eq!(creds.id, "88812345671");
    }

    #[test]
    fn first_of_equal_longest_runs_wins() {
        assert_eq!(
            longest_digit_run("https://zoom.us/j/12345?alt=67890"),
            Some("12345".to_string())
        );
    }

    #[test]
    fn explicit_id_beats_link_derivation() {
        let mut d = descriptor("https://zoom.us/j/88812345671");
        d.id = Some("42".to_string());
        let creds = resolve(&d, TargetApplication::Zoom);
        assert_eq!(creds.id, "42");
    }

    #[test]
    fn no_derivation_for_non_numeric_platforms() {
        let creds = resolve(
            &descriptor("https://meet.google.com/abc-1234-def"),
            TargetApplication::GoogleMeet,
        );
        assert!(creds.id.is_empty());
    }

    #[test]
    fn missing_everything_yields_empty_credentials() {
        let creds = resolve(
            &MeetingDescriptor::named("Standup"),
            TargetApplication::Zoom,
        );
        assert!(creds.id.is_empty());
        assert!(creds.secret.is_empty());
    }
}
