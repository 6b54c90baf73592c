//! View controller - タブ/モード切り替え
//!
//! 固定の 5 ビューを選ぶだけの有限選択。ビュー切り替えは進行中の生成を
//! 一切キャンセルしない(完了した結果の採否は Composer のチケット比較に
//! 委ねる)。作成面の開閉だけが Composer の open/close に連動する。

use std::sync::{Arc, Mutex};

use crate::app::composer::Composer;

/// トップレベルのビュー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Home,
    Discover,
    Reels,
    Messages,
    Profile,
}

/// Home フィードの切り替え (Following / For You)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedLens {
    #[default]
    Following,
    ForYou,
}

#[derive(Debug, Clone, Copy, Default)]
struct ViewState {
    view: View,
    lens: FeedLens,
    create_open: bool,
}

/// Top-level navigation state plus the create-surface toggle.
#[derive(Clone)]
pub struct ViewController {
    composer: Composer,
    state: Arc<Mutex<ViewState>>,
}

impl ViewController {
    pub fn new(composer: Composer) -> Self {
        Self {
            composer,
            state: Arc::new(Mutex::new(ViewState::default())),
        }
    }

    pub fn view(&self) -> View {
        self.state.lock().map(|s| s.view).unwrap_or_default()
    }

    pub fn lens(&self) -> FeedLens {
        self.state.lock().map(|s| s.lens).unwrap_or_default()
    }

    pub fn is_create_open(&self) -> bool {
        self.state.lock().map(|s| s.create_open).unwrap_or(false)
    }

    /// Switch the active view. In-flight generations keep running.
    pub fn switch_to(&self, view: View) -> View {
        if let Ok(mut state) = self.state.lock() {
            state.view = view;
        }
        view
    }

    pub fn set_lens(&self, lens: FeedLens) {
        if let Ok(mut state) = self.state.lock() {
            state.lens = lens;
        }
    }

    /// Open the create surface with a fresh composer form.
    pub fn open_create(&self) {
        let mut opened = false;
        if let Ok(mut state) = self.state.lock() {
            if !state.create_open {
                state.create_open = true;
                opened = true;
            }
        }
        if opened {
            self.composer.open();
        }
    }

    /// Close the create surface; the composer drops or cancels whatever
    /// was still in flight.
    pub fn close_create(&self) {
        let mut closed = false;
        if let Ok(mut state) = self.state.lock() {
            if state.create_open {
                state.create_open = false;
                closed = true;
            }
        }
        if closed {
            self.composer.close();
        }
    }
}
