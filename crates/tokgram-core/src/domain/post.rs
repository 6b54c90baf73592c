//! Post and Story records.
//!
//! Both are plain records owned by the content store; all mutation goes
//! through the store's entry points. Posts are never deleted in-session.

use serde::{Deserialize, Serialize};

use super::ids::{PostId, StoryId};
use super::media::{AspectRatio, MediaKind, MediaLocation};

/// A published feed entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub media_kind: MediaKind,
    pub media_location: MediaLocation,
    pub author: String,
    pub like_count: u32,
    pub caption: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<AspectRatio>,
}

impl Post {
    /// A fresh post with zero likes and no aspect-ratio hint.
    pub fn new(
        id: PostId,
        media_kind: MediaKind,
        media_location: MediaLocation,
        author: impl Into<String>,
        caption: impl Into<String>,
    ) -> Self {
        Self {
            id,
            media_kind,
            media_location,
            author: author.into(),
            like_count: 0,
            caption: caption.into(),
            aspect_ratio: None,
        }
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = Some(aspect_ratio);
        self
    }

    /// Seed helper: posts that arrive with an existing like count.
    pub fn with_like_count(mut self, like_count: u32) -> Self {
        self.like_count = like_count;
        self
    }
}

/// A story-strip entry.
///
/// Logically expires after a view window; expiry is modelled by the record
/// shape only, nothing enforces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: StoryId,
    pub username: String,
    pub avatar_location: MediaLocation,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_location: Option<MediaLocation>,

    pub media_kind: MediaKind,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_current_user: bool,
}

impl Story {
    pub fn new(id: StoryId, username: impl Into<String>, avatar_location: MediaLocation) -> Self {
        Self {
            id,
            username: username.into(),
            avatar_location,
            media_location: None,
            media_kind: MediaKind::Image,
            is_current_user: false,
        }
    }

    pub fn with_media(mut self, media_location: MediaLocation, media_kind: MediaKind) -> Self {
        self.media_location = Some(media_location);
        self.media_kind = media_kind;
        self
    }

    /// Marks the strip's own "Your Story" placeholder entry.
    pub fn current_user(mut self) -> Self {
        self.is_current_user = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulid::Ulid;

    fn any_location() -> MediaLocation {
        MediaLocation::Url("https://example.com/m.jpg".to_string())
    }

    #[test]
    fn new_post_starts_unliked() {
        let post = Post::new(
            PostId::from_ulid(Ulid::new()),
            MediaKind::Image,
            any_location(),
            "you",
            "hello",
        );
        assert_eq!(post.like_count, 0);
        assert!(post.aspect_ratio.is_none());
    }

    #[test]
    fn builders_compose() {
        let post = Post::new(
            PostId::from_ulid(Ulid::new()),
            MediaKind::Video,
            any_location(),
            "film_maker_x",
            "clip",
        )
        .with_aspect_ratio(AspectRatio::Landscape)
        .with_like_count(892);

        assert_eq!(post.aspect_ratio, Some(AspectRatio::Landscape));
        assert_eq!(post.like_count, 892);
    }

    #[test]
    fn post_serializes_camel_case() {
        let post = Post::new(
            PostId::from_ulid(Ulid::new()),
            MediaKind::Image,
            any_location(),
            "you",
            "hello",
        );
        let json = serde_json::to_value(&post).unwrap();
        assert!(json.get("mediaKind").is_some());
        assert!(json.get("likeCount").is_some());
        // aspectRatio omitted when unset
        assert!(json.get("aspectRatio").is_none());
    }

    #[test]
    fn story_placeholder_flag() {
        let story = Story::new(
            StoryId::from_ulid(Ulid::new()),
            "Your Story",
            any_location(),
        )
        .current_user();
        assert!(story.is_current_user);
        assert!(story.media_location.is_none());
    }
}
