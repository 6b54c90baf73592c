//! In-memory content store implementation.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{Mutex, watch};

use crate::domain::media::{AspectRatio, MediaKind, MediaLocation};
use crate::domain::post::{Post, Story};
use crate::domain::{PostId, StoryId};
use crate::ports::IdGenerator;

/// Fixed reasons the report sheet offers, in display order.
pub const REPORT_REASONS: [&str; 5] = [
    "Spam",
    "Nudity or sexual activity",
    "Hate speech or symbols",
    "Violence or dangerous organizations",
    "Bullying or harassment",
];

/// Acknowledgement shown after a report is filed.
pub const REPORT_ACK: &str = "Thanks for reporting. We will review this post shortly.";

/// Authors treated as the signed-in user (publishing identity and profile).
const CURRENT_USER_AUTHORS: [&str; 2] = ["you", "you_creative_ai"];

/// One filed report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRecord {
    pub post_id: PostId,
    pub reason: String,
}

/// In-memory content state.
struct ContentState {
    /// Ordered most-recent-first. Single source of truth for the feed,
    /// discover grid and profile grid.
    posts: Vec<Post>,

    /// Story strip. Entry 0 is the current-user placeholder once seeded.
    stories: Vec<Story>,

    /// Posts the viewer has liked.
    liked: HashSet<PostId>,

    /// Authors the viewer follows.
    following: HashSet<String>,

    /// Filed reports (never surfaced back to the viewer).
    reports: Vec<ReportRecord>,
}

impl ContentState {
    fn new() -> Self {
        Self {
            posts: Vec::new(),
            stories: Vec::new(),
            liked: HashSet::new(),
            following: HashSet::new(),
            reports: Vec::new(),
        }
    }
}

/// ContentStore はフィード/ストーリーの単一所有ストア
///
/// # 設計原則
/// - 変更はすべてこのハンドルの entry point 経由（single writer）
/// - 読み取りはスナップショット（呼び出し側にリストの clone を返す）
/// - すべての変更で revision が進む。consumer は `subscribe()` で
///   revision を watch し、変わったら読み直す（全 consumer 再描画に相当）
///
/// ハンドルは Clone 可能で、依存注入でそのまま配れます。
pub struct ContentStore {
    state: Arc<Mutex<ContentState>>,
    revision: watch::Sender<u64>,
}

impl Clone for ContentStore {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            revision: self.revision.clone(),
        }
    }
}

impl Default for ContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentStore {
    /// 空のストアを作成
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            state: Arc::new(Mutex::new(ContentState::new())),
            revision,
        }
    }

    /// revision の watch receiver を取得
    ///
    /// フィード・グリッドなどの consumer はこれを待ち、変化したら
    /// スナップショットを読み直す。
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// 現在の revision
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    /// author が signed-in ユーザー自身か
    pub fn is_current_user(author: &str) -> bool {
        CURRENT_USER_AUTHORS.contains(&author)
    }

    /// デモ用の初期コンテンツを投入
    ///
    /// フィード 2 件 + ストーリー 6 件（先頭は current-user placeholder）。
    pub async fn seed_demo_content(&self, ids: &dyn IdGenerator) {
        {
            let mut state = self.state.lock().await;
            state.posts = vec![
                Post::new(
                    ids.generate_post_id(),
                    MediaKind::Image,
                    MediaLocation::Url("https://picsum.photos/600/800".to_string()),
                    "creative_soul",
                    "Exploring the abstract nature of reality. 🌌 #art #ai",
                )
                .with_like_count(1240),
                Post::new(
                    ids.generate_post_id(),
                    MediaKind::Video,
                    MediaLocation::Url(
                        "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/ForBiggerBlazes.mp4"
                            .to_string(),
                    ),
                    "film_maker_x",
                    "Cinematic moments captured in time. 🎬",
                )
                .with_like_count(892)
                .with_aspect_ratio(AspectRatio::Landscape),
            ];

            let avatar = |seed: &str| {
                MediaLocation::Url(format!(
                    "https://api.dicebear.com/7.x/avataaars/svg?seed={seed}"
                ))
            };
            state.stories = vec![
                Story::new(ids.generate_story_id(), "Your Story", avatar("Felix")).current_user(),
                Story::new(ids.generate_story_id(), "alex_dev", avatar("Alex")),
                Story::new(ids.generate_story_id(), "sarah_art", avatar("Sarah")),
                Story::new(ids.generate_story_id(), "mike_vids", avatar("Mike")),
                Story::new(ids.generate_story_id(), "jess_travel", avatar("Jess")),
                Story::new(ids.generate_story_id(), "dave_code", avatar("Dave")),
            ];
        }
        self.bump();
    }

    /// 投稿を先頭に追加（most-recent-first）
    pub async fn add_post(&self, post: Post) {
        {
            let mut state = self.state.lock().await;
            state.posts.insert(0, post);
        }
        // Notify outside the lock
        self.bump();
    }

    /// ストーリーを placeholder の直後に挿入
    ///
    /// 先頭は常に current-user placeholder。strip が空なら単純に追加。
    pub async fn add_story(&self, story: Story) {
        {
            let mut state = self.state.lock().await;
            if state.stories.is_empty() {
                state.stories.push(story);
            } else {
                state.stories.insert(1, story);
            }
        }
        self.bump();
    }

    /// フィードのスナップショット
    pub async fn posts(&self) -> Vec<Post> {
        let state = self.state.lock().await;
        state.posts.clone()
    }

    /// ストーリー strip のスナップショット
    pub async fn stories(&self) -> Vec<Story> {
        let state = self.state.lock().await;
        state.stories.clone()
    }

    /// Like をトグル。Some(now_liked) を返す（未知の投稿は None、無変更）
    pub async fn toggle_like(&self, post_id: PostId) -> Option<bool> {
        let now_liked = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            let post = state.posts.iter_mut().find(|p| p.id == post_id)?;
            if state.liked.contains(&post_id) {
                post.like_count = post.like_count.saturating_sub(1);
                state.liked.remove(&post_id);
                false
            } else {
                post.like_count += 1;
                state.liked.insert(post_id);
                true
            }
        };
        self.bump();
        Some(now_liked)
    }

    /// ダブルタップ: 未 like のときだけ like する（unlike はしない）
    pub async fn double_tap_like(&self, post_id: PostId) -> Option<bool> {
        let liked_now = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            let post = state.posts.iter_mut().find(|p| p.id == post_id)?;
            if state.liked.contains(&post_id) {
                false
            } else {
                post.like_count += 1;
                state.liked.insert(post_id);
                true
            }
        };
        if liked_now {
            self.bump();
        }
        Some(liked_now)
    }

    pub async fn is_liked(&self, post_id: PostId) -> bool {
        let state = self.state.lock().await;
        state.liked.contains(&post_id)
    }

    /// Follow をトグル。新しい follow 状態を返す
    pub async fn toggle_follow(&self, author: &str) -> bool {
        let now_following = {
            let mut state = self.state.lock().await;
            if state.following.contains(author) {
                state.following.remove(author);
                false
            } else {
                state.following.insert(author.to_string());
                true
            }
        };
        self.bump();
        now_following
    }

    pub async fn is_following(&self, author: &str) -> bool {
        let state = self.state.lock().await;
        state.following.contains(author)
    }

    /// 通報を記録し、定型の謝辞を返す
    pub async fn report(&self, post_id: PostId, reason: impl Into<String>) -> &'static str {
        {
            let mut state = self.state.lock().await;
            state.reports.push(ReportRecord {
                post_id,
                reason: reason.into(),
            });
        }
        REPORT_ACK
    }

    /// caption / author の部分一致検索（大文字小文字を無視）
    ///
    /// 空クエリは全件を返す。
    pub async fn search(&self, query: &str) -> Vec<Post> {
        let state = self.state.lock().await;
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return state.posts.clone();
        }
        state
            .posts
            .iter()
            .filter(|p| {
                p.caption.to_lowercase().contains(&needle)
                    || p.author.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    /// Discover グリッドのタイル（投稿を 3 周まで繰り返して最大 12 枚）
    pub async fn discover_tiles(&self) -> Vec<Post> {
        let state = self.state.lock().await;
        state
            .posts
            .iter()
            .cycle()
            .take(state.posts.len() * 3)
            .take(12)
            .cloned()
            .collect()
    }

    /// Get filed reports (for testing)
    #[cfg(test)]
    pub async fn reports(&self) -> Vec<ReportRecord> {
        let state = self.state.lock().await;
        state.reports.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{SystemClock, UlidGenerator};
    use ulid::Ulid;

    fn ids() -> UlidGenerator<SystemClock> {
        UlidGenerator::new(SystemClock)
    }

    fn image_post(ids: &dyn IdGenerator, author: &str, caption: &str) -> Post {
        Post::new(
            ids.generate_post_id(),
            MediaKind::Image,
            MediaLocation::Url("https://example.com/p.jpg".to_string()),
            author,
            caption,
        )
    }

    #[tokio::test]
    async fn add_post_prepends_and_grows_by_one() {
        let store = ContentStore::new();
        let ids = ids();

        let first = image_post(&ids, "you", "first");
        let second = image_post(&ids, "you", "second");

        store.add_post(first.clone()).await;
        assert_eq!(store.posts().await.len(), 1);

        store.add_post(second.clone()).await;
        let posts = store.posts().await;
        assert_eq!(posts.len(), 2);
        // 新しい投稿が先頭
        assert_eq!(posts[0].id, second.id);
        assert_eq!(posts[1].id, first.id);
    }

    #[tokio::test]
    async fn add_story_inserts_after_placeholder() {
        let store = ContentStore::new();
        let ids = ids();
        store.seed_demo_content(&ids).await;

        let story = Story::new(
            ids.generate_story_id(),
            "you",
            MediaLocation::Url("https://example.com/a.svg".to_string()),
        );
        store.add_story(story.clone()).await;

        let stories = store.stories().await;
        assert!(stories[0].is_current_user);
        assert_eq!(stories[1].id, story.id);
        assert_eq!(stories.len(), 7);
    }

    #[tokio::test]
    async fn add_story_to_empty_strip_appends() {
        let store = ContentStore::new();
        let ids = ids();
        let story = Story::new(
            ids.generate_story_id(),
            "alex_dev",
            MediaLocation::Url("https://example.com/a.svg".to_string()),
        );
        store.add_story(story.clone()).await;
        assert_eq!(store.stories().await[0].id, story.id);
    }

    #[tokio::test]
    async fn seed_has_expected_shape() {
        let store = ContentStore::new();
        store.seed_demo_content(&ids()).await;

        let posts = store.posts().await;
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].author, "creative_soul");
        assert_eq!(posts[0].like_count, 1240);
        assert_eq!(posts[1].author, "film_maker_x");
        assert_eq!(posts[1].aspect_ratio, Some(AspectRatio::Landscape));

        let stories = store.stories().await;
        assert_eq!(stories.len(), 6);
        assert!(stories[0].is_current_user);
        assert_eq!(stories[1].username, "alex_dev");
    }

    #[tokio::test]
    async fn toggle_like_round_trips_count() {
        let store = ContentStore::new();
        store.seed_demo_content(&ids()).await;
        let post_id = store.posts().await[0].id;
        let before = store.posts().await[0].like_count;

        assert_eq!(store.toggle_like(post_id).await, Some(true));
        assert_eq!(store.posts().await[0].like_count, before + 1);
        assert!(store.is_liked(post_id).await);

        assert_eq!(store.toggle_like(post_id).await, Some(false));
        assert_eq!(store.posts().await[0].like_count, before);
        assert!(!store.is_liked(post_id).await);
    }

    #[tokio::test]
    async fn toggle_like_unknown_post_is_noop() {
        let store = ContentStore::new();
        store.seed_demo_content(&ids()).await;
        let before = store.posts().await;

        let unknown = PostId::from_ulid(Ulid::new());
        assert_eq!(store.toggle_like(unknown).await, None);
        assert_eq!(store.posts().await, before);
    }

    #[tokio::test]
    async fn double_tap_never_unlikes() {
        let store = ContentStore::new();
        store.seed_demo_content(&ids()).await;
        let post_id = store.posts().await[0].id;
        let before = store.posts().await[0].like_count;

        assert_eq!(store.double_tap_like(post_id).await, Some(true));
        assert_eq!(store.posts().await[0].like_count, before + 1);

        // 2 度目のダブルタップは何もしない
        assert_eq!(store.double_tap_like(post_id).await, Some(false));
        assert_eq!(store.posts().await[0].like_count, before + 1);
    }

    #[tokio::test]
    async fn toggle_follow_flips_state() {
        let store = ContentStore::new();
        assert!(store.toggle_follow("creative_soul").await);
        assert!(store.is_following("creative_soul").await);
        assert!(!store.toggle_follow("creative_soul").await);
        assert!(!store.is_following("creative_soul").await);
    }

    #[tokio::test]
    async fn report_records_and_acknowledges() {
        let store = ContentStore::new();
        store.seed_demo_content(&ids()).await;
        let post_id = store.posts().await[0].id;

        let ack = store.report(post_id, REPORT_REASONS[0]).await;
        assert_eq!(ack, REPORT_ACK);

        let reports = store.reports().await;
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].post_id, post_id);
        assert_eq!(reports[0].reason, "Spam");
    }

    #[tokio::test]
    async fn search_is_case_insensitive_over_caption_and_author() {
        let store = ContentStore::new();
        store.seed_demo_content(&ids()).await;

        let by_author = store.search("FILM_maker").await;
        assert_eq!(by_author.len(), 1);
        assert_eq!(by_author[0].author, "film_maker_x");

        let by_caption = store.search("abstract").await;
        assert_eq!(by_caption.len(), 1);
        assert_eq!(by_caption[0].author, "creative_soul");

        // 空クエリは全件
        assert_eq!(store.search("  ").await.len(), 2);
        assert_eq!(store.search("nothing-matches").await.len(), 0);
    }

    #[tokio::test]
    async fn discover_tiles_cycle_posts() {
        let store = ContentStore::new();
        store.seed_demo_content(&ids()).await;

        // 2 投稿 × 3 周 = 6 タイル（12 が上限）
        let tiles = store.discover_tiles().await;
        assert_eq!(tiles.len(), 6);
        assert_eq!(tiles[0].id, tiles[2].id);
        assert_eq!(tiles[1].id, tiles[3].id);
    }

    #[tokio::test]
    async fn discover_tiles_cap_at_twelve() {
        let store = ContentStore::new();
        let ids = ids();
        for i in 0..5 {
            store
                .add_post(image_post(&ids, "you", &format!("post {i}")))
                .await;
        }
        assert_eq!(store.discover_tiles().await.len(), 12);
    }

    #[tokio::test]
    async fn mutations_bump_revision() {
        let store = ContentStore::new();
        let mut rx = store.subscribe();
        let ids = ids();

        let start = store.revision();
        store.add_post(image_post(&ids, "you", "bump")).await;
        assert!(store.revision() > start);

        // watch 越しに変更が観測できる
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), store.revision());
    }

    #[tokio::test]
    async fn current_user_check_covers_both_identities() {
        assert!(ContentStore::is_current_user("you"));
        assert!(ContentStore::is_current_user("you_creative_ai"));
        assert!(!ContentStore::is_current_user("creative_soul"));
    }
}
