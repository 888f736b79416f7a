mod disabled;
mod gemini;

pub use disabled::DisabledCompletionClient;
pub use gemini::GeminiCompletionClient;
