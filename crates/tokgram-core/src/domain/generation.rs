//! Generation requests: the ephemeral value behind one provider call.
//!
//! A request lives from the moment the user triggers an operation until it
//! resolves into a post or an inline result. It is never persisted.

use serde::{Deserialize, Serialize};

use super::ids::GenerationId;
use super::media::{AspectRatio, MediaPayload};

/// What the provider is being asked to do. Kinds that transform existing
/// media carry their source payload, so an Animate/Edit/Analyze request
/// cannot exist without one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GenerationKind {
    /// Text-to-image.
    Image,
    /// Text-to-video.
    Video,
    /// Image-to-video.
    Animate { source: MediaPayload },
    /// Image editing.
    Edit { source: MediaPayload },
    /// Video understanding.
    Analyze { source: MediaPayload },
}

impl GenerationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Animate { .. } => "animate",
            Self::Edit { .. } => "edit",
            Self::Analyze { .. } => "analyze",
        }
    }
}

/// One outbound call, fully described.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub id: GenerationId,
    #[serde(flatten)]
    pub kind: GenerationKind,
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
}

impl GenerationRequest {
    pub fn new(
        id: GenerationId,
        kind: GenerationKind,
        prompt: impl Into<String>,
        aspect_ratio: AspectRatio,
    ) -> Self {
        Self {
            id,
            kind,
            prompt: prompt.into(),
            aspect_ratio,
        }
    }
}
