//! Error taxonomy for the authoring and generation flows.
//!
//! Every async boundary catches locally and converts to a user-facing
//! notice; nothing escalates to a global handler and nothing retries on
//! its own. The messages here are the exact alert texts the surfaces show.

use thiserror::Error;

/// Rejections raised before any state changes: bad files, missing fields.
///
/// Surfaced as a blocking alert; the triggering operation is aborted with
/// no partial state committed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("File is too large. Maximum size is 500MB.")]
    FileTooLarge { size_bytes: u64 },

    #[error("Please select a video file for Reels.")]
    ReelRequiresVideo { mime: String },

    #[error("Please select an audio file.")]
    MusicRequiresAudio { mime: String },

    #[error("Please upload an image to animate.")]
    AnimateRequiresImage,

    #[error("Please select media before saving a draft.")]
    DraftRequiresMedia,
}

/// Failures of the generative provider: no usable payload came back,
/// the poll budget ran out, or the caller gave up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// Provider answered but the response held no image payload.
    #[error("No image generated")]
    NoImage,

    /// Edit response held no inline image part.
    #[error("No edited image returned")]
    NoEditedImage,

    /// Video job finished without a downloadable result.
    #[error("No video generated")]
    NoVideo,

    /// Poll budget exhausted before the job reported done.
    #[error("generation timed out after {checks} status checks")]
    Timeout { checks: u32 },

    /// The cancellation token fired mid-poll.
    #[error("generation cancelled")]
    Cancelled,

    /// The host requires a user-selected API key and none was chosen.
    #[error("API key not selected")]
    KeyNotSelected,

    /// Transport or provider-side failure (HTTP error, bad response body).
    #[error("provider request failed: {0}")]
    Provider(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_match_alert_texts() {
        assert_eq!(
            ValidationError::FileTooLarge {
                size_bytes: 600 * 1024 * 1024
            }
            .to_string(),
            "File is too large. Maximum size is 500MB."
        );
        assert_eq!(
            ValidationError::ReelRequiresVideo {
                mime: "image/png".to_string()
            }
            .to_string(),
            "Please select a video file for Reels."
        );
        assert_eq!(
            ValidationError::AnimateRequiresImage.to_string(),
            "Please upload an image to animate."
        );
    }

    #[test]
    fn generation_messages_match_provider_wording() {
        assert_eq!(GenerationError::NoImage.to_string(), "No image generated");
        assert_eq!(
            GenerationError::NoEditedImage.to_string(),
            "No edited image returned"
        );
        assert_eq!(GenerationError::NoVideo.to_string(), "No video generated");
    }
}
