//! Domain model (IDs, media, posts, drafts, errors).
//!
//! モジュール構成:
//! - ids: ULID ベースの strongly-typed ID
//! - media: MediaKind / AspectRatio / MediaPayload / MediaLocation
//! - post: Post / Story レコード
//! - draft: Draft / DraftMode / MusicRef
//! - generation: GenerationRequest / GenerationKind（ephemeral）
//! - errors: ValidationError / GenerationError

pub mod draft;
pub mod errors;
pub mod generation;
pub mod ids;
pub mod media;
pub mod post;

// 主要な型を再エクスポート
pub use self::draft::{Draft, DraftMode, MusicRef};
pub use self::errors::{GenerationError, ValidationError};
pub use self::generation::{GenerationKind, GenerationRequest};
pub use self::ids::{DraftId, GenerationId, MessageId, PostId, StoryId, ThreadId};
pub use self::media::{AspectRatio, MediaKind, MediaLocation, MediaPayload};
pub use self::post::{Post, Story};
