//! App - アプリケーション層
//!
//! このモジュールは、ports とストアを組み合わせてアプリケーション
//! ロジックを実装します。
//!
//! # 主要コンポーネント
//! - **AppBuilder / App**: 構築とワイヤリング（Fail-fast 検証付き）
//! - **Composer**: 投稿作成フロー（生成タブ、アップロード検証、下書き）
//! - **ViewController**: トップレベルのビュー切り替えと作成面の開閉
//! - **SettingsPanel**: プライバシー / アクセシビリティ / 残高

pub mod builder;
pub mod composer;
pub mod settings;
pub mod view;

// 主要な型を再エクスポート
pub use self::builder::{App, AppBuilder, BuildError};
pub use self::composer::{Composer, ComposerError, ComposerForm, CreateTab, PickedFile};
pub use self::settings::{
    AccessibilitySettings, MonetizationEligibility, PayoutMethod, PrivacySettings, SettingsPanel,
    WithdrawError,
};
pub use self::view::{FeedLens, View, ViewController};
