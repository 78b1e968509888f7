//! Turns a raw generation result into ordered artifacts plus a summary line.

use base64::Engine as _;

use crate::a2a::{Artifact, FileContent, Part};
use crate::agent::{GenerationOutput, ImageOutcome};
use crate::errors::AgentResult;

const CONTENT_ARTIFACT_TITLE: &str = "Content Package";
const IMAGE_ARTIFACT_TITLE: &str = "Generated Image";
const IMAGE_FILE_NAME: &str = "generated_image.png";

/// Assemble the agent's raw output into the task's artifact list and a
/// human-readable summary.
///
/// Artifact order is fixed: index 0 is the serialized content record, index 1
/// (present only when image synthesis succeeded) embeds the image bytes.
pub fn assemble(output: &GenerationOutput) -> AgentResult<(Vec<Artifact>, String)> {
    let mut artifacts = Vec::with_capacity(2);

    let json_content = serde_json::to_string_pretty(&output.content)?;
    artifacts.push(Artifact {
        parts: vec![Part::Text {
            text: json_content,
            metadata: None,
        }],
        index: 0,
        title: Some(CONTENT_ARTIFACT_TITLE.to_string()),
    });

    if let Some(ImageOutcome::Ready(image)) = &output.image {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&image.bytes);
        artifacts.push(Artifact {
            parts: vec![Part::File {
                file: FileContent {
                    name: Some(IMAGE_FILE_NAME.to_string()),
                    mime_type: Some(image.mime_type.clone()),
                    bytes: Some(encoded),
                },
                metadata: None,
            }],
            index: 1,
            title: Some(IMAGE_ARTIFACT_TITLE.to_string()),
        });
    }

    let platforms = target_platforms(&output.content);
    let mut summary = format!(
        "Created content package with posts for {}.",
        platforms.join(", ")
    );
    match &output.image {
        Some(ImageOutcome::Ready(_)) => {
            summary.push_str(" Generated matching image based on content theme.");
        }
        Some(ImageOutcome::Failed { error }) => {
            summary.push_str(&format!(" Image generation failed: {error}"));
        }
        None => {}
    }

    Ok((artifacts, summary))
}

/// Collect the platform names referenced by the content record.
///
/// Each top-level object value carrying a non-empty string `platform` field
/// contributes one name; duplicates are dropped, first-seen order is kept.
fn target_platforms(content: &serde_json::Value) -> Vec<String> {
    let mut platforms: Vec<String> = Vec::new();

    if let Some(object) = content.as_object() {
        for value in object.values() {
            let Some(platform) = value.get("platform").and_then(|p| p.as_str()) else {
                continue;
            };
            if platform.is_empty() || platforms.iter().any(|seen| seen == platform) {
                continue;
            }
            platforms.push(platform.to_string());
        }
    }

    platforms
}
