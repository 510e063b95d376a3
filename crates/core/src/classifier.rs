use crate::types::TargetApplication;

/// Keyword table scanned against the meeting name + description. Declaration
/// order is the priority order; first match wins.
const KEYWORDS: &[(&str, TargetApplication)] = &[
    ("zoom", TargetApplication::Zoom),
    ("google meet", TargetApplication::GoogleMeet),
    ("gmeet", TargetApplication::GoogleMeet),
    ("teams", TargetApplication::Teams),
];

/// Link-domain table, consulted only when no keyword matched.
const DOMAINS: &[(&str, TargetApplication)] = &[
    ("zoom.us", TargetApplication::Zoom),
    ("meet.google", TargetApplication::GoogleMeet),
    ("teams.microsoft", TargetApplication::Teams),
];

/// Maps free-text meeting metadata to a target application. Total and
/// deterministic: empty or absent inputs degrade to the browser fallback.
pub fn classify(name: &str, description: &str, link: Option<&str>) -> TargetApplication {
    let haystack = format!("{} {}", name, description).to_lowercase();
    for (keyword, target) in KEYWORDS {
        if haystack.contains(keyword) {
            tracing::debug!(keyword = *keyword, %target, "classified by keyword");
            return *target;
        }
    }

    let link = link.unwrap_or("").to_lowercase();
    for (domain, target) in DOMAINS {
        if link.contains(domain) {
            tracing::debug!(domain = *domain, %target, "classified by link domain");
            return *target;
        }
    }

    TargetApplication::Browser
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_match() {
        assert_eq!(
            classify("Zoom catchup", "", None),
            TargetApplication::Zoom
        );
        assert_eq!(
            classify("Weekly", "on google meet", None),
            TargetApplication::GoogleMeet
        );
        assert_eq!(classify("gmeet sync", "", None), TargetApplication::GoogleMeet);
        assert_eq!(classify("Teams review", "", None), TargetApplication::Teams);
    }

    #[test]
    fn keyword_beats_link_domain() {
        assert_eq!(
            classify("Zoom catchup", "", Some("https://meet.google.com/xyz")),
            TargetApplication::Zoom
        );
    }

    #[test]
    fn link_domain_fallback() {
        assert_eq!(
            classify("Sync", "", Some("https://zoom.us/j/123")),
            TargetApplication::Zoom
        );
        assert_eq!(
            classify("Sync", "", Some("https://teams.microsoft.com/l/abc")),
            TargetApplication::Teams
        );
    }

    #[test]
    fn empty_inputs_degrade_to_browser() {
        assert_eq!(classify("", "", None), TargetApplication::Browser);
        assert_eq!(
            classify("Catchup", "", Some("https://example.com/room")),
            TargetApplication::Browser
        );
    }

    #[test]
    fn classification_is_stable() {
        for _ in 0..3 {
            assert_eq!(
                classify("Team Standup", "daily", Some("https://zoom.us/j/1")),
                TargetApplication::Zoom
            );
        }
    }
}
