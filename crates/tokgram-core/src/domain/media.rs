//! Media model: kinds, aspect ratios, payloads, locations.
//!
//! This module is transport-agnostic: it only defines the "shape" of media
//! the client carries around. The one rule that matters lives in the split
//! between [`MediaLocation::Url`] (transient, may dangle after a reload) and
//! [`MediaLocation::Encoded`] (self-contained, safe to persist).

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of media a post/story/draft carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify a MIME type. Returns `None` for anything that is neither
    /// an image nor a video (audio, documents, ...).
    pub fn from_mime(mime: &str) -> Option<Self> {
        if mime.starts_with("image/") {
            Some(Self::Image)
        } else if mime.starts_with("video/") {
            Some(Self::Video)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aspect ratios the authoring flow offers.
///
/// Serialized as the provider-facing ratio strings ("1:1", "16:9", ...),
/// which are also what the create form displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "3:4")]
    ThreeByFour,
    #[serde(rename = "4:3")]
    FourByThree,
}

impl AspectRatio {
    /// Every ratio the create form offers, in display order.
    pub const ALL: [AspectRatio; 5] = [
        Self::Square,
        Self::Landscape,
        Self::Portrait,
        Self::ThreeByFour,
        Self::FourByThree,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
            Self::ThreeByFour => "3:4",
            Self::FourByThree => "4:3",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "1:1" => Some(Self::Square),
            "16:9" => Some(Self::Landscape),
            "9:16" => Some(Self::Portrait),
            "3:4" => Some(Self::ThreeByFour),
            "4:3" => Some(Self::FourByThree),
            _ => None,
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A self-contained, base64-encoded media blob.
///
/// This is the only media representation allowed into the draft store:
/// it survives a reload because the bytes travel with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaPayload {
    /// MIME type, e.g. "image/jpeg" or "video/mp4".
    pub mime: String,

    /// Base64-encoded bytes (standard alphabet, padded).
    pub data: String,
}

impl MediaPayload {
    /// Encode raw bytes into a payload.
    pub fn from_bytes(mime: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime: mime.into(),
            data: STANDARD.encode(bytes),
        }
    }

    /// Decode back into raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.data)
    }

    /// Render as a `data:` URL, the form preview surfaces consume.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.data)
    }

    /// Parse a `data:<mime>;base64,<data>` URL back into a payload.
    pub fn from_data_url(url: &str) -> Option<Self> {
        let rest = url.strip_prefix("data:")?;
        let (mime, data) = rest.split_once(";base64,")?;
        if mime.is_empty() {
            return None;
        }
        Some(Self {
            mime: mime.to_string(),
            data: data.to_string(),
        })
    }

    /// Media kind derived from the MIME type, if it is image/video.
    pub fn kind(&self) -> Option<MediaKind> {
        MediaKind::from_mime(&self.mime)
    }
}

/// Where a piece of media lives.
///
/// - `Url`: a transient reference (remote URL or an in-memory blob handle).
///   Cheap, but NOT guaranteed to survive a reload.
/// - `Encoded`: a self-contained payload. Required for drafts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum MediaLocation {
    Url(String),
    Encoded(MediaPayload),
}

impl MediaLocation {
    /// True when the media carries its own bytes.
    pub fn is_self_contained(&self) -> bool {
        matches!(self, Self::Encoded(_))
    }

    /// A URL a preview surface can point at directly.
    pub fn display_url(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::Encoded(payload) => payload.to_data_url(),
        }
    }
}
