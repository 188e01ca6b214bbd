//! Text-Completion Capability
//!
//! - types: request/response envelopes
//! - prompt: system instruction and user content for list merges
//! - response: untrusted payload -> typed target list
//! - client: HTTP implementation (OpenAI-compatible chat completions)

mod client;
mod prompt;
mod response;
mod types;

use async_trait::async_trait;

use crate::domain::DomainResult;

pub use client::HttpCompletionClient;
pub use prompt::{build_request, MERGE_SYSTEM_INSTRUCTION};
pub use response::parse_target_list;
pub use types::{ChatCompletion, ChatMessage, Choice, CompletionRequest};

/// Anything that can turn a system instruction + user content into a completion
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> DomainResult<ChatCompletion>;
}
