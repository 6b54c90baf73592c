//! IdGenerator port - ID 生成の抽象化
//!
//! wall-clock 文字列を ID に使うと、同一ミリ秒内の連続作成で衝突します。
//! ここでは ULID を使い、さらにテスト容易性のために trait として抽象化しています。
//!
//! # 実装
//! - **UlidGenerator**: ULID ベース（本番用）

use crate::domain::ids::{DraftId, GenerationId, MessageId, PostId, StoryId, ThreadId};
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator はアプリ内の全 ID を生成
///
/// # ULID の特性
/// - 時刻でソート可能
/// - 同一ミリ秒内でもランダム部分で衝突しない
/// - 128-bit（UUID 互換）
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数タスクから使える）
pub trait IdGenerator: Send + Sync {
    /// Post ID を生成
    fn generate_post_id(&self) -> PostId;

    /// Story ID を生成
    fn generate_story_id(&self) -> StoryId;

    /// Draft ID を生成
    fn generate_draft_id(&self) -> DraftId;

    /// Thread ID を生成
    fn generate_thread_id(&self) -> ThreadId;

    /// Message ID を生成
    fn generate_message_id(&self) -> MessageId;

    /// Generation ID を生成
    fn generate_generation_id(&self) -> GenerationId;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// Clock を使って現在時刻ベースの ULID を生成します。
/// これにより、テスト時に FixedClock を使って決定的な timestamp 部分を持つ
/// ID を生成できます。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    /// 新しい UlidGenerator を作成
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    fn next_ulid(&self) -> Ulid {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        Ulid::from_parts(timestamp_ms, rand::random())
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_post_id(&self) -> PostId {
        PostId::from(self.next_ulid())
    }

    fn generate_story_id(&self) -> StoryId {
        StoryId::from(self.next_ulid())
    }

    fn generate_draft_id(&self) -> DraftId {
        DraftId::from(self.next_ulid())
    }

    fn generate_thread_id(&self) -> ThreadId {
        ThreadId::from(self.next_ulid())
    }

    fn generate_message_id(&self) -> MessageId {
        MessageId::from(self.next_ulid())
    }

    fn generate_generation_id(&self) -> GenerationId {
        GenerationId::from(self.next_ulid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{FixedClock, SystemClock};
    use chrono::{TimeZone, Utc};

    #[test]
    fn ulid_generator_generates_unique_ids() {
        let id_gen = UlidGenerator::new(SystemClock);

        let id1 = id_gen.generate_post_id();
        let id2 = id_gen.generate_post_id();
        let id3 = id_gen.generate_post_id();

        // 各 ID が一意であることを確認
        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
    }

    #[test]
    fn ulid_generator_with_fixed_clock_is_deterministic() {
        let fixed_time = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let clock = FixedClock::new(fixed_time);
        let id_gen = UlidGenerator::new(clock);

        let id1 = id_gen.generate_post_id();
        let id2 = id_gen.generate_post_id();

        // FixedClock を使っても、ランダム部分があるので ID は異なる
        assert_ne!(id1, id2);

        // ただし、timestamp 部分は同じはず
        let timestamp1 = (id1.as_ulid().0 >> 80) as u64;
        let timestamp2 = (id2.as_ulid().0 >> 80) as u64;
        assert_eq!(timestamp1, timestamp2);
        assert_eq!(timestamp1, fixed_time.timestamp_millis() as u64);
    }

    #[test]
    fn rapid_generation_does_not_collide() {
        // 同一ミリ秒内の連続生成でも ID が重複しないことを確認
        let id_gen = UlidGenerator::new(SystemClock);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(id_gen.generate_post_id()));
        }
    }

    #[test]
    fn different_id_types_are_generated() {
        let id_gen = UlidGenerator::new(SystemClock);

        let post_id = id_gen.generate_post_id();
        let draft_id = id_gen.generate_draft_id();
        let story_id = id_gen.generate_story_id();

        // 型が異なることを確認（コンパイル時チェック）
        // let _: PostId = draft_id; // <- これはコンパイルエラー

        // Display のプレフィックスが異なることを確認
        assert!(post_id.to_string().starts_with("post-"));
        assert!(draft_id.to_string().starts_with("draft-"));
        assert!(story_id.to_string().starts_with("story-"));
    }
}
