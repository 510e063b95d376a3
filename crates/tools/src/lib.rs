pub mod registry;
pub mod shell_tool;
pub mod traits;

pub use registry::ToolRegistry;
pub use shell_tool::ShellTool;
pub use traits::{Tool, ToolError, ToolResult};
