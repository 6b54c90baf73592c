//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）: プロバイダ未設定は build() で弾く
//! - 差し替え可能なポートは全て with_* で注入、残りは実用的な既定値

use std::sync::Arc;

use crate::app::composer::Composer;
use crate::app::settings::SettingsPanel;
use crate::app::view::ViewController;
use crate::capture::live::LiveSession;
use crate::genmedia::client::GenerativeClient;
use crate::genmedia::poll::PollPolicy;
use crate::impls::console::ConsoleNotifier;
use crate::impls::fake_devices::FakeMediaDevices;
use crate::ports::clock::{Clock, SystemClock};
use crate::ports::id_generator::{IdGenerator, UlidGenerator};
use crate::ports::local_store::{LocalStore, MemoryLocalStore};
use crate::ports::media_devices::MediaDevices;
use crate::ports::notifier::Notifier;
use crate::ports::provider::{AlwaysSelectedKey, GenerativeProvider, KeySelector};
use crate::store::content::ContentStore;
use crate::store::drafts::DraftCache;
use crate::store::messages::MessageStore;

/// AppBuilder はアプリケーションを構築
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::new()
///     .with_provider(Arc::new(GeminiProvider::new(config)?))
///     .with_local_store(Arc::new(FileLocalStore::new(path)))
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - 生成プロバイダだけは既定値を持たない（キーなしで黙って動かさない）
/// - 未設定のまま build() すると BuildError を返す
/// - それ以外のポートはデモ/テスト向けの既定実装で埋まる
pub struct AppBuilder {
    provider: Option<Arc<dyn GenerativeProvider>>,
    keys: Option<Arc<dyn KeySelector>>,
    notifier: Option<Arc<dyn Notifier>>,
    devices: Option<Arc<dyn MediaDevices>>,
    local_store: Option<Arc<dyn LocalStore>>,
    ids: Option<Arc<dyn IdGenerator>>,
    clock: Option<Arc<dyn Clock>>,
    poll_policy: Option<PollPolicy>,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(
        "No generative provider configured. Call with_provider() before build()."
    )]
    MissingProvider,
}

impl AppBuilder {
    /// 新しい AppBuilder を作成
    pub fn new() -> Self {
        Self {
            provider: None,
            keys: None,
            notifier: None,
            devices: None,
            local_store: None,
            ids: None,
            clock: None,
            poll_policy: None,
        }
    }

    /// 生成プロバイダを設定（必須）
    pub fn with_provider(mut self, provider: Arc<dyn GenerativeProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// API キー選択 UI を設定（既定: 常に選択済み）
    pub fn with_key_selector(mut self, keys: Arc<dyn KeySelector>) -> Self {
        self.keys = Some(keys);
        self
    }

    /// ダイアログ実装を設定（既定: コンソール出力）
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// カメラ/マイク実装を設定（既定: 常に許可するフェイク）
    pub fn with_devices(mut self, devices: Arc<dyn MediaDevices>) -> Self {
        self.devices = Some(devices);
        self
    }

    /// 下書き永続化先を設定（既定: メモリ内）
    pub fn with_local_store(mut self, store: Arc<dyn LocalStore>) -> Self {
        self.local_store = Some(store);
        self
    }

    /// ID 生成器を設定（既定: ULID）
    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// 時計を設定（既定: 実時刻）
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// 動画ジョブのポーリング方針を設定（既定: 5 秒間隔 × 60 回）
    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poll_policy = Some(policy);
        self
    }

    /// App を構築
    ///
    /// # 検証
    /// - プロバイダが設定されているかチェック
    /// - 不足していれば BuildError::MissingProvider を返す
    pub fn build(self) -> Result<App, BuildError> {
        let provider = self.provider.ok_or(BuildError::MissingProvider)?;
        let keys: Arc<dyn KeySelector> = self.keys.unwrap_or_else(|| Arc::new(AlwaysSelectedKey));
        let notifier: Arc<dyn Notifier> = self
            .notifier
            .unwrap_or_else(|| Arc::new(ConsoleNotifier::new()));
        let devices: Arc<dyn MediaDevices> = self
            .devices
            .unwrap_or_else(|| Arc::new(FakeMediaDevices::new()));
        let local_store: Arc<dyn LocalStore> = self
            .local_store
            .unwrap_or_else(|| Arc::new(MemoryLocalStore::new()));
        let ids: Arc<dyn IdGenerator> = self
            .ids
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(SystemClock)));
        let clock: Arc<dyn Clock> = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let policy = self.poll_policy.unwrap_or_else(PollPolicy::default_video);

        let content = ContentStore::new();
        let drafts = DraftCache::new(local_store, notifier.clone());
        let messages = MessageStore::new();
        let client = GenerativeClient::new(provider, keys).with_policy(policy);
        let composer = Composer::new(
            content.clone(),
            drafts.clone(),
            client,
            ids.clone(),
            clock,
            notifier.clone(),
        );
        let view = ViewController::new(composer.clone());
        let settings = SettingsPanel::new(notifier.clone());

        Ok(App {
            content,
            drafts,
            messages,
            composer,
            view,
            settings,
            devices,
            notifier,
            ids,
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// App は全サーフェスを束ねたルート
///
/// 各フィールドは Clone 可能なハンドルで、タスク間でそのまま共有できる。
/// Live だけは訪れるたびに [`App::live_session`] で作り直す
/// （セッションがキャプチャ資源を所有するため）。
#[derive(Clone)]
pub struct App {
    pub content: ContentStore,
    pub drafts: DraftCache,
    pub messages: MessageStore,
    pub composer: Composer,
    pub view: ViewController,
    pub settings: SettingsPanel,
    devices: Arc<dyn MediaDevices>,
    notifier: Arc<dyn Notifier>,
    ids: Arc<dyn IdGenerator>,
}

impl App {
    /// ID 生成器（メッセージ送信などに渡す）
    pub fn ids(&self) -> &dyn IdGenerator {
        self.ids.as_ref()
    }

    /// 新しい Live セッションを作成（Idle 状態から）
    pub fn live_session(&self) -> LiveSession {
        LiveSession::new(self.devices.clone(), self.notifier.clone())
    }

    /// デモ用の初期データを全ストアに投入
    pub async fn seed_demo(&self) {
        self.content.seed_demo_content(self.ids.as_ref()).await;
        self.messages.seed_demo_threads(self.ids.as_ref()).await;
    }
}
