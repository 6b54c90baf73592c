//! Draft records: an in-progress creation, parked for later.
//!
//! Drafts are the only domain value that must survive a reload, so the
//! media always travels as a self-contained [`MediaPayload`] (never a
//! transient URL). See the draft store for the persistence contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::DraftId;
use super::media::{MediaKind, MediaPayload};

/// Which authoring surface the draft belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftMode {
    Post,
    Reel,
    Story,
    Live,
}

impl DraftMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Reel => "reel",
            Self::Story => "story",
            Self::Live => "live",
        }
    }
}

impl fmt::Display for DraftMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A selected music track attached to a draft.
///
/// Only the reference is kept; the audio bytes stay with the host's file
/// handle until publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicRef {
    pub title: String,
    pub mime: String,
}

impl MusicRef {
    pub fn new(title: impl Into<String>, mime: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            mime: mime.into(),
        }
    }
}

/// One parked creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub id: DraftId,
    pub mode: DraftMode,
    pub caption: String,

    /// Self-contained media. Invariant: never a transient reference.
    pub media: MediaPayload,
    pub media_kind: MediaKind,

    pub saved_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music: Option<MusicRef>,
}

impl Draft {
    pub fn new(
        id: DraftId,
        mode: DraftMode,
        caption: impl Into<String>,
        media: MediaPayload,
        media_kind: MediaKind,
        saved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            mode,
            caption: caption.into(),
            media,
            media_kind,
            saved_at,
            music: None,
        }
    }

    pub fn with_music(mut self, music: MusicRef) -> Self {
        self.music = Some(music);
        self
    }
}
