//! Persisted session snapshots: which tabs were open and which was active.
//! 持久化的工作階段快照：曾開啟的分頁與作用中分頁。

use std::fs;
use std::io;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use mdpad_vfs::write_atomic;

/// Current session format version.
pub const SESSION_FORMAT_VERSION: u32 = 1;

/// Snapshot of the tab session, restorable across launches.
/// 可跨啟動還原的分頁工作階段快照。
///
/// Capabilities are never persisted: restoration re-resolves each path
/// against the freshly scanned tree and reports what no longer resolves.
/// 快照不含能力；還原時會對新掃描的樹重新解析路徑，無法解析者另行回報。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub format_version: u32,
    #[serde(default)]
    pub tabs: Vec<SessionTab>,
    #[serde(default)]
    pub active: Option<String>,
}

/// One persisted tab entry.
/// 單一持久化分頁條目。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTab {
    pub path: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub standalone: bool,
}

/// Records a tab that could not be restored.
/// 紀錄無法還原的分頁。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityIssue {
    pub message: String,
    pub path: Option<String>,
}

impl CompatibilityIssue {
    pub fn new(message: impl Into<String>, path: Option<String>) -> Self {
        Self {
            message: message.into(),
            path,
        }
    }
}

/// Error type for session persistence.
/// 工作階段持久化時可能出現的錯誤。
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session file IO error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid session payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

/// Loads and saves session snapshots as JSON with atomic writes.
/// 以 JSON 搭配原子寫入方式載入與儲存工作階段快照。
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the snapshot; a missing file returns `Ok(None)`.
    /// 載入快照；檔案不存在時回傳 `Ok(None)`。
    pub fn load(&self) -> Result<Option<SessionSnapshot>, SessionError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let snapshot: SessionSnapshot = serde_json::from_str(&contents)?;
                Ok(Some(snapshot))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(SessionError::Io(err)),
        }
    }

    /// Persists the snapshot atomically.
    /// 以原子寫入保存快照。
    pub fn save(&self, snapshot: &SessionSnapshot) -> Result<(), SessionError> {
        let json = serde_json::to_vec_pretty(snapshot)?;
        write_atomic(&self.path, &json)?;
        Ok(())
    }
}
