//! Notifier port - ユーザー通知（alert / confirm）の抽象化
//!
//! ホストのブロッキングなダイアログ（alert, confirm）を trait として
//! 切り出します。削除確認や出金確認など、対話的な前提条件を
//! テストから決定的に駆動できるようにするためのポートです。

use std::collections::VecDeque;
use std::sync::Mutex;

/// Notifier はブロッキングなユーザー通知
pub trait Notifier: Send + Sync {
    /// メッセージを表示（ユーザーが閉じるまでブロック）
    fn alert(&self, message: &str);

    /// はい/いいえの確認。true = 承認
    fn confirm(&self, message: &str) -> bool;
}

/// RecordingNotifier はテスト・デモ用の Notifier
///
/// # 実装詳細
/// - alert / confirm のメッセージをすべて記録
/// - confirm の回答はスクリプト可能（キューが空なら既定値を返す）
#[derive(Debug)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
    answers: Mutex<VecDeque<bool>>,
    default_answer: bool,
}

impl RecordingNotifier {
    /// 既定で confirm に true を返す Notifier を作成
    pub fn new() -> Self {
        Self::with_default_answer(true)
    }

    /// confirm の既定回答を指定して作成
    pub fn with_default_answer(default_answer: bool) -> Self {
        Self {
            alerts: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
            answers: Mutex::new(VecDeque::new()),
            default_answer,
        }
    }

    /// 次の confirm への回答をキューに積む
    pub fn push_answer(&self, answer: bool) {
        if let Ok(mut answers) = self.answers.lock() {
            answers.push_back(answer);
        }
    }

    /// 表示された alert メッセージ（表示順）
    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().map(|a| a.clone()).unwrap_or_default()
    }

    /// 表示された confirm メッセージ（表示順）
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        if let Ok(mut alerts) = self.alerts.lock() {
            alerts.push(message.to_string());
        }
    }

    fn confirm(&self, message: &str) -> bool {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(message.to_string());
        }
        self.answers
            .lock()
            .ok()
            .and_then(|mut answers| answers.pop_front())
            .unwrap_or(self.default_answer)
    }
}
