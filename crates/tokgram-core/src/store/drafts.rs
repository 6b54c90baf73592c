//! Draft cache over durable local storage.
//!
//! The whole draft list is persisted as one JSON document under a fixed
//! key. Storage failures are logged and swallowed: the in-memory list keeps
//! working, persistence silently degrades. No retry, no quota handling.

use std::sync::{Arc, Mutex};

use crate::domain::draft::Draft;
use crate::domain::ids::DraftId;
use crate::ports::local_store::LocalStore;
use crate::ports::notifier::Notifier;

/// Fixed storage key for the draft document. No versioning beyond the name.
pub const DRAFTS_KEY: &str = "tokgram.drafts.v1";

/// Confirmation shown before a draft is deleted.
pub const DELETE_DRAFT_PROMPT: &str = "Delete this draft?";

/// DraftCache は下書きのインメモリリスト + 耐久ストレージ
///
/// # 設計原則
/// - 保存時は必ずリスト全体を 1 ドキュメントとして書き直す
/// - load はコピーを返すだけ（下書きは残る）
/// - delete だけが対話的確認を要求する
///
/// ハンドルは Clone 可能。LocalStore が同期 API のため、メソッドも同期。
pub struct DraftCache {
    drafts: Arc<Mutex<Vec<Draft>>>,
    store: Arc<dyn LocalStore>,
    notifier: Arc<dyn Notifier>,
}

impl Clone for DraftCache {
    fn clone(&self) -> Self {
        Self {
            drafts: Arc::clone(&self.drafts),
            store: Arc::clone(&self.store),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl DraftCache {
    /// ストレージから既存の下書きを読み込んでキャッシュを作成
    ///
    /// 読み込み失敗・壊れた JSON は警告を記録して空リストで開始する。
    pub fn new(store: Arc<dyn LocalStore>, notifier: Arc<dyn Notifier>) -> Self {
        let drafts = match store.get_item(DRAFTS_KEY) {
            Ok(Some(doc)) => match serde_json::from_str::<Vec<Draft>>(&doc) {
                Ok(drafts) => drafts,
                Err(e) => {
                    tracing::warn!(error = %e, "draft document unreadable, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "draft storage read failed, starting empty");
                Vec::new()
            }
        };
        Self {
            drafts: Arc::new(Mutex::new(drafts)),
            store,
            notifier,
        }
    }

    /// 下書きのスナップショット（新しい順）
    pub fn drafts(&self) -> Vec<Draft> {
        self.drafts.lock().map(|d| d.clone()).unwrap_or_default()
    }

    /// 下書きを先頭に追加して永続化
    ///
    /// media は [`Draft`] の型で self-contained が保証済み。フォームの
    /// クリアは呼び出し側（composer）の責務。
    pub fn save_draft(&self, draft: Draft) {
        if let Ok(mut drafts) = self.drafts.lock() {
            drafts.insert(0, draft);
            self.persist(&drafts);
        }
    }

    /// 下書きをフォームに戻すためのコピーを取得（リストからは消えない）
    pub fn load_draft(&self, id: DraftId) -> Option<Draft> {
        let drafts = self.drafts.lock().ok()?;
        drafts.iter().find(|d| d.id == id).cloned()
    }

    /// 下書きを削除（対話的確認つき）
    ///
    /// - 確認が拒否されたら何もしない
    /// - 存在しない id は no-op（エラーにも変更にもならない）
    pub fn delete_draft(&self, id: DraftId) {
        if !self.notifier.confirm(DELETE_DRAFT_PROMPT) {
            return;
        }
        if let Ok(mut drafts) = self.drafts.lock() {
            let before = drafts.len();
            drafts.retain(|d| d.id != id);
            if drafts.len() != before {
                self.persist(&drafts);
            }
        }
    }

    fn persist(&self, drafts: &[Draft]) {
        let doc = match serde_json::to_string(drafts) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode draft document");
                return;
            }
        };
        if let Err(e) = self.store.set_item(DRAFTS_KEY, &doc) {
            // Persistence silently degrades; the in-memory list stays usable.
            tracing::warn!(error = %e, "failed to persist drafts");
        }
    }
}
