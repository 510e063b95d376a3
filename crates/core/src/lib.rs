pub mod classifier;
pub mod credentials;
pub mod error;
pub mod types;

pub use classifier::classify;
pub use credentials::{resolve, Credentials};
pub use error::WorkflowError;
pub use types::*;
