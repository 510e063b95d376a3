use crate::command_executor::{CommandOutput, DeviceCommander, ExecutorError};
use std::sync::Arc;
use std::time::Duration;

/// Default timeout for blind navigation commands; these either take effect
/// within a couple of seconds or not at all.
pub const NAV_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for commands issued on behalf of the agent's shell tool.
pub const SHELL_TIMEOUT: Duration = Duration::from_secs(10);

/// Transforms text for Android's `input text` mechanism: wrapping quotes are
/// stripped and embedded spaces become `%s`, the only encoding the shim
/// accepts. Typing credentials through simulated touch is unreliable, so
/// all literal text entry funnels through here.
pub fn escape_input_text(text: &str) -> String {
    let trimmed = text.trim();
    let unquoted = trimmed
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .or_else(|| trimmed.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
        .unwrap_or(trimmed);
    unquoted.replace(' ', "%s")
}

/// Convenience handle over a [`DeviceCommander`] carrying the idiomatic adb
/// sub-commands the workflows need.
#[derive(Clone)]
pub struct Device {
    commander: Arc<dyn DeviceCommander>,
}

impl Device {
    pub fn new(commander: Arc<dyn DeviceCommander>) -> Self {
        Self { commander }
    }

    pub async fn run(
        &self,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput, ExecutorError> {
        self.commander.run(args, timeout).await
    }

    /// Runs `adb shell <args…>`.
    pub async fn shell(
        &self,
        args: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput, ExecutorError> {
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push("shell".to_string());
        full.extend(args.iter().map(|s| s.to_string()));
        self.commander.run(&full, timeout).await
    }

    /// Types literal text into the focused field via `input text`.
    pub async fn input_text(&self, text: &str) -> Result<CommandOutput, ExecutorError> {
        let escaped = escape_input_text(text);
        self.shell(&["input", "text", &escaped], SHELL_TIMEOUT).await
    }

    /// Captures the screen to a path on the device.
    pub async fn screencap(&self, remote_path: &str) -> Result<CommandOutput, ExecutorError> {
        self.shell(&["screencap", "-p", remote_path], SHELL_TIMEOUT)
            .await
    }

    /// Pulls a file from the device to the local filesystem.
    pub async fn pull(&self, remote_path: &str, local_path: &str) -> Result<(), ExecutorError> {
        let args = vec![
            "pull".to_string(),
            remote_path.to_string(),
            local_path.to_string(),
        ];
        self.commander.run(&args, SHELL_TIMEOUT).await?;
        Ok(())
    }

    /// Grabs one screenshot as PNG bytes without touching device storage.
    pub async fn screenshot_png(&self) -> Result<Vec<u8>, ExecutorError> {
        let args = vec![
            "exec-out".to_string(),
            "screencap".to_string(),
            "-p".to_string(),
        ];
        self.commander.run_raw(&args, SHELL_TIMEOUT).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spaces_become_percent_s() {
        assert_eq!(escape_input_text("hello world"), "hello%sworld");
    }

    #[test]
    fn wrapping_quotes_are_stripped() {
        assert_eq!(escape_input_text("'my secret'"), "my%ssecret");
        assert_eq!(escape_input_text("\"abc\""), "abc");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(escape_input_text("5551234567"), "5551234567");
    }
}
