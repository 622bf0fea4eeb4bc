//! OpenAI chat-completions client for transcript annotation.

pub mod client;
pub mod types;

pub use client::OpenAiClient;
