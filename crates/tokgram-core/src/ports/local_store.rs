//! LocalStore port - 耐久ローカルストレージの抽象化
//!
//! # 学習ポイント
//! - ホストの key-value ストレージ（同期 API）の抽象化
//! - テスト用 MemoryLocalStore / 永続化用 FileLocalStore の差し替え
//!
//! # 設計原則
//! - get/set/remove は同期呼び出し（ホスト側 API が同期のため）
//! - 値は不透明な文字列（1 キーに 1 つの JSON ドキュメント）
//! - バージョニング・マイグレーションはなし

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;

/// StorageError はローカルストレージの失敗
///
/// 呼び出し側は失敗を記録して黙って degrade する（ユーザー通知なし）。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage read failed: {0}")]
    ReadFailed(String),

    #[error("storage write failed: {0}")]
    WriteFailed(String),
}

/// LocalStore は key-value の耐久ストレージ
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数タスクから使える）
pub trait LocalStore: Send + Sync {
    /// キーの値を取得（未設定なら None）
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// キーに値を設定（上書き）
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// キーを削除（未設定でもエラーにしない）
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// MemoryLocalStore は開発・テスト用のインメモリ実装
///
/// # 実装詳細
/// - HashMap<String, String> を Mutex で保護
#[derive(Debug, Default)]
pub struct MemoryLocalStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryLocalStore {
    /// 新しい MemoryLocalStore を作成
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryLocalStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self
            .items
            .lock()
            .map_err(|e| StorageError::ReadFailed(e.to_string()))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self
            .items
            .lock()
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self
            .items
            .lock()
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        items.remove(key);
        Ok(())
    }
}

/// FileLocalStore はキーごとに 1 ファイルで保存する実装
///
/// # 実装詳細
/// - dir/<key> にそのまま書き込む（キーは "tokgram.drafts.v1" のような
///   ファイル名安全な名前空間のみを想定）
pub struct FileLocalStore {
    dir: PathBuf,
}

impl FileLocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl LocalStore for FileLocalStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadFailed(e.to_string())),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        std::fs::write(self.path_for(key), value)
            .map_err(|e| StorageError::WriteFailed(e.to_string()))
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::WriteFailed(e.to_string())),
        }
    }
}

/// FailingLocalStore は常に失敗するテスト用実装
///
/// StorageError の silent degrade（記録のみ、状態は維持）を検証するために使う。
#[cfg(test)]
#[derive(Debug, Default)]
pub struct FailingLocalStore;

#[cfg(test)]
impl LocalStore for FailingLocalStore {
    fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::ReadFailed("simulated outage".to_string()))
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::WriteFailed("simulated outage".to_string()))
    }

    fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::WriteFailed("simulated outage".to_string()))
    }
}
