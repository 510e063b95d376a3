pub mod command_executor;
pub mod device;

pub use command_executor::{AdbExecutor, CommandOutput, DeviceCommander, ExecutorError};
pub use device::{escape_input_text, Device, NAV_TIMEOUT, SHELL_TIMEOUT};
