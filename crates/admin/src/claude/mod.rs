//! Claude API integration for the seller listing assistant.
//!
//! Sellers upload a product photo; Claude looks at it and drafts a product
//! name and description. Only the non-streaming Messages API is used.

mod client;
mod error;
mod types;

pub use client::ClaudeClient;
pub use error::ClaudeError;
pub use types::{
    ChatRequest, ChatResponse, ContentBlock, ImageSource, Message, MessageContent, Role,
    StopReason, Usage,
};
