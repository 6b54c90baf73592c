//! In-memory direct-message store.
//!
//! Threads and their canned openers are seeded; sending appends to a
//! thread and refreshes its list-row preview. Nothing leaves the device.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::ids::{MessageId, ThreadId};
use crate::ports::IdGenerator;

/// One chat message inside a thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    /// true = sent by the viewer, false = by the other party.
    pub from_me: bool,
    pub body: String,
}

/// One thread row plus its transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatThread {
    pub id: ThreadId,
    pub username: String,
    /// Single-letter avatar badge, as the list renders it.
    pub avatar_initial: char,
    /// Preview line under the username.
    pub last_message: String,
    /// Display-only relative time ("2m", "1h", ...).
    pub last_active: String,
    /// Green-dot presence indicator.
    pub active: bool,
    pub unread: bool,
    pub messages: Vec<ChatMessage>,
}

/// MessageStore は DM スレッドの単一所有ストア
///
/// ハンドルは Clone 可能。読み取りはスナップショット。
pub struct MessageStore {
    state: Arc<Mutex<Vec<ChatThread>>>,
}

impl Clone for MessageStore {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// デモ用のスレッドを投入（未読 3 件 = リストのバッジと一致）
    pub async fn seed_demo_threads(&self, ids: &dyn IdGenerator) {
        let seeds: [(&str, &str, &str, bool, bool); 5] = [
            ("creative_soul", "Loved your new reel! 🔥", "2m", true, true),
            ("film_maker_x", "Collab soon?", "1h", false, true),
            ("artistic_mind", "Sent a reel", "5h", true, true),
            ("travel_bug", "Where was that taken?", "1d", false, false),
            ("music_lover", "Liked a message", "2d", false, false),
        ];

        let mut threads = Vec::with_capacity(seeds.len());
        for (username, last_message, last_active, active, unread) in seeds {
            let initial = username
                .chars()
                .next()
                .map(|c| c.to_ascii_uppercase())
                .unwrap_or('?');
            let messages = vec![
                ChatMessage {
                    id: ids.generate_message_id(),
                    from_me: false,
                    body: "Hey! Saw your latest post. It's amazing! 🤩".to_string(),
                },
                ChatMessage {
                    id: ids.generate_message_id(),
                    from_me: true,
                    body: "Thanks! I used the new Veo model to generate it.".to_string(),
                },
                ChatMessage {
                    id: ids.generate_message_id(),
                    from_me: false,
                    body: last_message.to_string(),
                },
            ];
            threads.push(ChatThread {
                id: ids.generate_thread_id(),
                username: username.to_string(),
                avatar_initial: initial,
                last_message: last_message.to_string(),
                last_active: last_active.to_string(),
                active,
                unread,
                messages,
            });
        }

        let mut state = self.state.lock().await;
        *state = threads;
    }

    /// スレッド一覧のスナップショット
    pub async fn threads(&self) -> Vec<ChatThread> {
        let state = self.state.lock().await;
        state.clone()
    }

    /// 1 スレッドの transcript
    pub async fn messages(&self, thread_id: ThreadId) -> Option<Vec<ChatMessage>> {
        let state = self.state.lock().await;
        state
            .iter()
            .find(|t| t.id == thread_id)
            .map(|t| t.messages.clone())
    }

    /// メッセージを送信（transcript に追記、プレビュー行を更新）
    pub async fn send(
        &self,
        ids: &dyn IdGenerator,
        thread_id: ThreadId,
        body: impl Into<String>,
    ) -> Option<MessageId> {
        let body = body.into();
        let mut state = self.state.lock().await;
        let thread = state.iter_mut().find(|t| t.id == thread_id)?;
        let id = ids.generate_message_id();
        thread.messages.push(ChatMessage {
            id,
            from_me: true,
            body: body.clone(),
        });
        thread.last_message = body;
        thread.last_active = "now".to_string();
        Some(id)
    }

    /// 未読スレッド数（リストのバッジ）
    pub async fn unread_count(&self) -> usize {
        let state = self.state.lock().await;
        state.iter().filter(|t| t.unread).count()
    }

    /// スレッドを開いたら既読にする
    pub async fn mark_read(&self, thread_id: ThreadId) {
        let mut state = self.state.lock().await;
        if let Some(thread) = state.iter_mut().find(|t| t.id == thread_id) {
            thread.unread = false;
        }
    }
}
