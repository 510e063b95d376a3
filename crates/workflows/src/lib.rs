pub mod alarm;
pub mod meeting;
pub mod monitor;
pub mod prompts;
pub mod scraper;
pub mod tasks;

pub use alarm::AlarmWorkflow;
pub use meeting::{MeetingConfig, MeetingWorkflow};
pub use monitor::{MonitorConfig, MonitorSession};
pub use scraper::ScraperWorkflow;
pub use tasks::TaskWorkflow;
