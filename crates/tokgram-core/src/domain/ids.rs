//! Domain identifiers (strongly-typed IDs).
//!
//! # ULID ベースの ID + ジェネリック実装
//! ID には ULID (Universally Unique Lexicographically Sortable Identifier) を使用します。
//! さらに、Phantom type パターンを使ってコードの重複を排除しています。
//!
//! ## ULID の特性
//! - **時刻でソート可能**: timestamp が先頭にあるため、生成順序でソートできる
//! - **衝突しない**: 同一ミリ秒内の連続作成でもランダム部分で区別できる
//!   （wall-clock 文字列 ID と違い、高速連打で ID が重複しない）
//! - **UUID互換**: 128-bit で UUID と同じサイズ
//!
//! ## Phantom Type パターン
//! `Id<T>` というジェネリック型で共通実装を提供しつつ、
//! `T` は実行時には使わない（PhantomData）マーカー型として、
//! コンパイル時の型安全性を提供します。
//! PostId と DraftId は混同できないため、「投稿 ID を下書きの削除に渡す」
//! 類のバグがコンパイル時に弾かれます。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// IdMarker は各 ID 型のマーカー trait
///
/// Display で使うプレフィックス（"post-", "draft-" など）を提供します。
pub trait IdMarker: Send + Sync + 'static {
    /// Display で使うプレフィックス（例: "post-", "draft-"）
    fn prefix() -> &'static str;
}

/// ジェネリック ID 型
///
/// `T` は PhantomData で、実行時にはメモリを消費しませんが、
/// コンパイル時に型安全性を提供します。
///
/// # 例
/// ```ignore
/// let post_id: PostId = Id::from(Ulid::new());
/// let draft_id: DraftId = Id::from(Ulid::new());
/// // post_id と draft_id は異なる型なので、混同できない
/// ```
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    /// ULID から Id を作成
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    /// 内部の ULID を取得
    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// Post のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Post {}

impl IdMarker for Post {
    fn prefix() -> &'static str {
        "post-"
    }
}

/// Story のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Story {}

impl IdMarker for Story {
    fn prefix() -> &'static str {
        "story-"
    }
}

/// Draft のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Draft {}

impl IdMarker for Draft {
    fn prefix() -> &'static str {
        "draft-"
    }
}

/// ChatThread のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Thread {}

impl IdMarker for Thread {
    fn prefix() -> &'static str {
        "thread-"
    }
}

/// ChatMessage のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Message {}

impl IdMarker for Message {
    fn prefix() -> &'static str {
        "msg-"
    }
}

/// Generation（生成リクエスト）のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Generation {}

impl IdMarker for Generation {
    fn prefix() -> &'static str {
        "gen-"
    }
}

// ========================================
// Type Alias（使いやすさのため）
// ========================================

/// Identifier of a published Post.
pub type PostId = Id<Post>;

/// Identifier of a Story strip entry.
pub type StoryId = Id<Story>;

/// Identifier of a saved Draft.
pub type DraftId = Id<Draft>;

/// Identifier of a direct-message thread.
pub type ThreadId = Id<Thread>;

/// Identifier of a single chat message.
pub type MessageId = Id<Message>;

/// Identifier of one generation request (ephemeral).
pub type GenerationId = Id<Generation>;
