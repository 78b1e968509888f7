//! External content generator capability.
//!
//! The prompting and image synthesis pipeline lives outside this crate and is
//! reached through the `ContentGenerator` trait. Injecting it as a capability
//! lets tests substitute a deterministic fake.

use crate::errors::AgentResult;
use async_trait::async_trait;

/// Successfully synthesized image bytes with their declared media type.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Outcome of the image synthesis step.
///
/// Image generation failing does not fail the overall content package; the
/// error text is carried into the summary instead.
#[derive(Debug, Clone)]
pub enum ImageOutcome {
    Ready(GeneratedImage),
    Failed { error: String },
}

/// Raw result of one generation run: the structured content record plus an
/// optional image outcome.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub content: serde_json::Value,
    pub image: Option<ImageOutcome>,
}

/// Capability interface for the external content/image generation pipeline.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn invoke(&self, query: &str) -> AgentResult<GenerationOutput>;
}
