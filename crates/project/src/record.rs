//! Flat file records scanned from a directory capability.
//! 透過目錄能力掃描出的扁平檔案記錄。

use mdpad_vfs::{DirectoryHandle, EntryKind, FileAccessError, FileHandleRef};

/// Identity of a single file inside the opened root.
/// 已開啟根目錄中單一檔案的識別資訊。
///
/// Created when a root is scanned or a standalone file is opened, immutable
/// afterwards; the handle capability may be used many times but is never
/// serialised or duplicated beyond reference counting.
/// 於掃描根目錄或開啟獨立檔案時建立，之後不再變動；handle 能力可重複使用，
/// 但絕不序列化。
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// File name (final path segment).
    /// 檔案名稱（最後一個路徑片段）。
    pub name: String,
    /// Slash-delimited path relative to the root, unique within it.
    /// 相對於根目錄、以斜線分隔的路徑，於根內唯一。
    pub path: String,
    /// Root-relative canonical identity used as the document key.
    /// 作為文件鍵值使用的根相對正規識別。
    pub full_path: String,
    /// Opaque read/write capability for the file content.
    /// 讀寫檔案內容的不透明能力。
    pub handle: FileHandleRef,
}

/// Recursively scans a root directory handle into flat records.
/// 遞迴掃描根目錄能力，產生扁平的檔案記錄清單。
///
/// Only file names accepted by `is_tracked` are recorded. Entries are visited
/// in name order so repeated scans of an unchanged root yield identical
/// record sequences.
/// 僅記錄 `is_tracked` 接受的檔名；子項目依名稱排序走訪，確保相同根目錄
/// 重複掃描結果一致。
pub fn scan_root(
    root: &dyn DirectoryHandle,
    is_tracked: &dyn Fn(&str) -> bool,
) -> Result<Vec<FileRecord>, FileAccessError> {
    let mut records = Vec::new();
    scan_directory(root, "", is_tracked, &mut records)?;
    Ok(records)
}

fn scan_directory(
    directory: &dyn DirectoryHandle,
    prefix: &str,
    is_tracked: &dyn Fn(&str) -> bool,
    records: &mut Vec<FileRecord>,
) -> Result<(), FileAccessError> {
    let mut entries = directory.entries()?;
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    for entry in entries {
        let child_path = if prefix.is_empty() {
            entry.name.clone()
        } else {
            format!("{prefix}/{}", entry.name)
        };
        match entry.kind {
            EntryKind::Directory => {
                let child = directory.directory(&entry.name)?;
                scan_directory(&*child, &child_path, is_tracked, records)?;
            }
            EntryKind::File => {
                if !is_tracked(&entry.name) {
                    continue;
                }
                let handle = directory.file(&entry.name)?;
                records.push(FileRecord {
                    name: entry.name,
                    full_path: child_path.clone(),
                    path: child_path,
                    handle,
                });
            }
        }
    }
    Ok(())
}
