//! tokgram-core
//!
//! Core building blocks for the TokGram client: stores, the generation
//! pipeline, capture control and the app surfaces, all behind ports.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, post, draft, media, generation, errors）
//! - **ports**: 抽象化レイヤー（GenerativeProvider, MediaDevices, LocalStore, Notifier, など）
//! - **store**: 単一所有のアプリ内ストア（Content, Draft, Message）
//! - **genmedia**: 生成メディアパイプライン（クライアント + Gemini プロバイダ + ポーリング）
//! - **capture**: Live モードのキャプチャ制御
//! - **app**: アプリケーションロジック（builder, composer, view, settings）
//! - **impls**: ports の実装（開発用・テスト用）

pub mod app;
pub mod capture;
pub mod domain;
pub mod genmedia;
pub mod impls;
pub mod ports;
pub mod store;
