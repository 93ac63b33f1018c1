use std::fmt;
use std::io;
use std::sync::Arc;

use thiserror::Error;

/// 透過能力介面存取檔案時可能發生的錯誤。 / Errors raised while accessing files through a capability handle.
#[derive(Debug, Error)]
pub enum FileAccessError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("entry {0} not found")]
    NotFound(String),
    #[error("{0} is not a directory")]
    NotADirectory(String),
    #[error("file encoding is not supported or data is invalid")]
    InvalidEncoding,
    #[error("dialog was dismissed by the user")]
    Cancelled,
}

impl FileAccessError {
    /// 判斷錯誤是否為使用者取消（應無聲忽略）。 / Returns whether the error is a user cancellation (always ignored silently).
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FileAccessError::Cancelled)
    }

    /// 判斷錯誤是否為目標不存在。 / Returns whether the error means the target is absent.
    pub fn is_not_found(&self) -> bool {
        match self {
            FileAccessError::NotFound(_) => true,
            FileAccessError::Io(err) => err.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// 目錄列舉時回報的項目種類。 / Kind of an entry reported by directory enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// 目錄列舉回傳的單一項目：名稱加種類。 / A single enumerated directory entry: name plus kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub kind: EntryKind,
}

/// 指向單一檔案的不可複製能力。 / An opaque, non-duplicable capability onto a single file.
///
/// 能力一旦失效（例如重新選取根目錄）就必須重新取得，不可序列化。 /
/// A handle that lost validity (e.g. after a root reselect) requires a fresh
/// open; handles are never serialised.
pub trait FileHandle: fmt::Debug {
    /// 檔案名稱（最後一個路徑片段）。 / The file name (final path segment).
    fn name(&self) -> &str;

    /// 讀取完整文字內容。 / Reads the complete text content.
    fn read_text(&self) -> Result<String, FileAccessError>;

    /// 讀取原始位元組（供資產解析使用）。 / Reads raw bytes (used by asset resolution).
    fn read_bytes(&self) -> Result<Vec<u8>, FileAccessError>;

    /// 以範圍化的開啟-寫入-關閉流程覆寫內容。 / Replaces the content via a scoped open-write-close sequence.
    fn write_text(&self, text: &str) -> Result<(), FileAccessError>;
}

/// 指向單一目錄的能力，可列舉並開啟子項目。 / A capability onto a directory: enumerate and open children.
pub trait DirectoryHandle: fmt::Debug {
    /// 目錄名稱。 / The directory name.
    fn name(&self) -> &str;

    /// 列舉直接子項目（名稱 + 種類），順序未定。 / Enumerates immediate children (name + kind), order unspecified.
    fn entries(&self) -> Result<Vec<DirEntryInfo>, FileAccessError>;

    /// 開啟指名的子檔案。 / Opens the named child file.
    fn file(&self, name: &str) -> Result<FileHandleRef, FileAccessError>;

    /// 開啟指名的子目錄。 / Opens the named child directory.
    fn directory(&self, name: &str) -> Result<DirectoryHandleRef, FileAccessError>;
}

pub type FileHandleRef = Arc<dyn FileHandle>;
pub type DirectoryHandleRef = Arc<dyn DirectoryHandle>;
