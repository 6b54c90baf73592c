//! 生成メディアパイプライン。
//!
//! [`client::GenerativeClient`] がポリシー(最初の 1 枚を採用、上限付き
//! ポーリング、空応答のフォールバック)を持ち、プロバイダ実装
//! ([`gemini::GeminiProvider`] や テスト用スタブ)はワイヤの形をした
//! 結果を返すことに徹する。

pub mod client;
pub mod gemini;
pub mod poll;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{GenerationOutput, GenerativeClient, ANALYZE_FALLBACK, ASK_FALLBACK};
pub use gemini::{GeminiConfig, GeminiConfigError, GeminiProvider};
pub use poll::{CancelSource, CancelToken, PollPolicy};
