use chrono::Local;
use ghostdroid_core::WorkflowError;
use ghostdroid_executor::Device;
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

const REMOTE_SHOT_PATH: &str = "/sdcard/ghost_screen.png";
const LABEL_MAX_LEN: usize = 20;

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub duration: Duration,
    pub interval: Duration,
    pub output_root: PathBuf,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(5 * 60),
            interval: Duration::from_secs(30),
            output_root: PathBuf::from("data/screenshots"),
        }
    }
}

/// Strips a meeting label down to filesystem-safe characters, capped so the
/// directory name stays readable.
pub fn sanitize_label(label: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9]").unwrap());
    let clean = re.replace_all(label, "_");
    clean.chars().take(LABEL_MAX_LEN).collect()
}

/// Bounded-duration periodic screen capture after a successful join.
///
/// Boundary policy: a capture happens at the top of each iteration while
/// `elapsed < duration`, then the loop sleeps one interval. duration 0 means
/// zero captures; 90s at a 30s interval means exactly three.
pub struct MonitorSession {
    device: Device,
    config: MonitorConfig,
}

impl MonitorSession {
    pub fn new(device: Device, config: MonitorConfig) -> Self {
        Self { device, config }
    }

    /// Runs the capture loop to completion and returns the number of ticks.
    /// Individual capture or transfer failures are logged and swallowed;
    /// the loop always spends its full duration budget.
    pub async fn run(&self, label: &str) -> usize {
        let folder = format!("{}_{}", Local::now().format("%Y%m%d"), sanitize_label(label));
        let dir = self.config.output_root.join(folder);
        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            tracing::warn!(dir = %dir.display(), error = %e, "cannot create capture dir, skipping monitoring");
            return 0;
        }

        tracing::info!(
            dir = %dir.display(),
            duration_secs = self.config.duration.as_secs(),
            "monitoring session started"
        );

        let start = tokio::time::Instant::now();
        let mut shots = 0usize;
        while start.elapsed() < self.config.duration {
            shots += 1;
            let filename = dir.join(format!(
                "shot_{:03}_{}.png",
                shots,
                Local::now().format("%H%M%S")
            ));
            match self.capture_to(&filename).await {
                Ok(()) => tracing::debug!(file = %filename.display(), "capture saved"),
                Err(e) => tracing::warn!(error = %e, "capture tick failed"),
            }
            tokio::time::sleep(self.config.interval).await;
        }

        tracing::info!(shots, "monitoring session finished");
        shots
    }

    async fn capture_to(&self, local: &std::path::Path) -> Result<(), WorkflowError> {
        self.device
            .screencap(REMOTE_SHOT_PATH)
            .await
            .map_err(|e| WorkflowError::CaptureFailure(format!("screencap: {}", e)))?;
        self.device
            .pull(REMOTE_SHOT_PATH, &local.to_string_lossy())
            .await
            .map_err(|e| WorkflowError::CaptureFailure(format!("pull: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ghostdroid_executor::{CommandOutput, DeviceCommander, ExecutorError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingCommander {
        screencaps: AtomicUsize,
        fail_screencap: bool,
    }

    impl CountingCommander {
        fn new(fail_screencap: bool) -> Self {
            Self {
                screencaps: AtomicUsize::new(0),
                fail_screencap,
            }
        }
    }

    #[async_trait]
    impl DeviceCommander for CountingCommander {
        async fn run(
            &self,
            args: &[String],
            _timeout: Duration,
        ) -> Result<CommandOutput, ExecutorError> {
            if args.iter().any(|a| a == "screencap") {
                self.screencaps.fetch_add(1, Ordering::SeqCst);
                if self.fail_screencap {
                    return Err(ExecutorError::NonZeroExit("no display".to_string()));
                }
            }
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

    fn session(commander: Arc<CountingCommander>, duration: Duration) -> MonitorSession {
        let dir = tempfile::tempdir().unwrap();
        MonitorSession::new(
            Device::new(commander),
            MonitorConfig {
                duration,
                interval: Duration::from_secs(30),
                output_root: dir.keep(),
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duration_means_zero_captures() {
        let commander = Arc::new(CountingCommander::new(false));
        let shots = session(commander.clone(), Duration::ZERO).run("Standup").await;
        assert_eq!(shots, 0);
        assert_eq!(commander.screencaps.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn ninety_seconds_at_thirty_means_three() {
        let commander = Arc::new(CountingCommander::new(false));
        let shots = session(commander.clone(), Duration::from_secs(90))
            .run("Team Standup")
            .await;
        assert_eq!(shots, 3);
        assert_eq!(commander.screencaps.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn capture_failures_do_not_abort_the_session() {
        let commander = Arc::new(CountingCommander::new(true));
        let shots = session(commander.clone(), Duration::from_secs(90))
            .run("Standup")
            .await;
        assert_eq!(shots, 3);
    }

    #[test]
    fn labels_are_sanitized_and_capped() {
        assert_eq!(sanitize_label("Team Standup #1"), "Team_Standup__1");
        assert_eq!(
            sanitize_label("a very long meeting name indeed"),
            "a_very_long_meeting_"
        );
    }
}
