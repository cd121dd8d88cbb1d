pub mod anthropic;
pub mod deepseek;
pub mod google;
pub mod openai;
mod openai_compatible;
pub mod xai;

pub use anthropic::AnthropicClient;
pub use deepseek::DeepSeekClient;
pub use google::GoogleClient;
pub use openai::OpenAiClient;
pub use xai::XaiClient;
