use thiserror::Error;

/// Error taxonomy for the join workflow. None of these terminate a
/// multi-meeting batch; each meeting's failure is isolated and reported.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Nonzero exit or timeout from a direct device command. Aborts only the
    /// current fast-path attempt.
    #[error("device command failed: {0}")]
    CommandFailure(String),
    /// The capability agent reported failure or crashed. Terminal for the
    /// meeting.
    #[error("agent failed: {0}")]
    AgentFailure(String),
    /// Required id missing for a non-browser target; raised before any
    /// device interaction.
    #[error("meeting data incomplete: {0}")]
    DataIncomplete(String),
    /// Individual screenshot or transfer failure during monitoring. Logged
    /// and swallowed by the session loop.
    #[error("capture failed: {0}")]
    CaptureFailure(String),
}
