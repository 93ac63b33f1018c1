//! 檔案能力（capability）介面與其 `std::fs` 實作。 / File capability traits and their `std::fs` implementation.
//!
//! 核心程式碼只透過 [`FileHandle`] 與 [`DirectoryHandle`] 存取檔案系統，
//! 不直接碰觸底層傳輸。 / The editor core reaches the file system solely
//! through [`FileHandle`] and [`DirectoryHandle`]; the transport behind a
//! handle stays opaque.

mod decode;
mod fs;
mod handle;

pub use fs::{write_atomic, FsDirectoryHandle, FsFileHandle};
pub use handle::{
    DirEntryInfo, DirectoryHandle, DirectoryHandleRef, EntryKind, FileAccessError, FileHandle,
    FileHandleRef,
};
