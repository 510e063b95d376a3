pub mod droid_agent;
pub mod types;

pub use droid_agent::DroidAgent;
pub use types::{AgentError, AgentOutcome, AgentRequest, CapabilityAgent};
