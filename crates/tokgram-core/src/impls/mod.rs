//! Impls - 実装（開発用・テスト用）
//!
//! このモジュールには ports の実装を含めます。
//!
//! # 含まれる実装
//! - **FakeMediaDevices**: デバイス無しで動くカメラ/マイク
//! - **ConsoleNotifier**: 標準出力にダイアログを流す Notifier
//!
//! メモリ実装（`MemoryLocalStore` など）は各ポートの隣に、本物の
//! プロバイダ（`GeminiProvider`）は `genmedia` 側に置いています。

pub mod console;
pub mod fake_devices;

// 主要な型を再エクスポート
pub use self::console::ConsoleNotifier;
pub use self::fake_devices::FakeMediaDevices;
