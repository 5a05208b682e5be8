pub mod client;
pub mod extract;
pub mod prompt;

pub use client::{GeminiClient, GenerationSettings, ModelInvoker};
pub use extract::parse_structured;
pub use prompt::build_prompt;
