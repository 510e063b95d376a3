pub mod google_genai;
pub mod openai_compatible;
pub mod traits;

pub use google_genai::GoogleGenAiProvider;
pub use openai_compatible::OpenAiCompatibleProvider;
pub use traits::{GenerateResponse, LlmProvider, Message, ProviderError, ToolCall};
