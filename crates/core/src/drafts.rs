use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use mdpad_vfs::write_atomic;

const DRAFT_EXTENSION: &str = "draft";

/// 組出文件路徑對應的草稿鍵值。 / Composes the draft key for a document path.
pub fn draft_key(path: &str) -> String {
    format!("draft:{path}")
}

/// 揮發性編輯內容的耐久鍵值儲存。 / Durable key-value store for volatile edit content.
///
/// 同步的 get/set/remove 介面；寫入失敗由呼叫端記錄，不中斷編輯流程。 /
/// Synchronous get/set/remove; write failures are logged by the caller and
/// never interrupt editing.
pub trait DraftStore: fmt::Debug {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> io::Result<()>;
    fn remove(&mut self, key: &str) -> io::Result<()>;
    /// 列出目前持有的鍵值。 / Lists the keys currently held.
    fn keys(&self) -> Vec<String>;
}

/// 以檔案系統為後盾的草稿儲存：每個鍵值一個檔案。 / File-backed draft store: one file per key.
///
/// 鍵值以 URL-safe base64 編碼為檔名，內容以原子寫入保存。 / Keys are
/// URL-safe base64 encoded into file names; payloads are written atomically.
#[derive(Debug)]
pub struct FsDraftStore {
    root: PathBuf,
}

impl FsDraftStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let encoded = URL_SAFE_NO_PAD.encode(key.as_bytes());
        self.root.join(format!("{encoded}.{DRAFT_EXTENSION}"))
    }
}

impl DraftStore for FsDraftStore {
    fn get(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.entry_path(key)) {
            Ok(contents) => Some(contents),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                log::warn!("reading draft {key} failed: {err}");
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.root)?;
        write_atomic(&self.entry_path(key), value.as_bytes())
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }

    fn keys(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return Vec::new();
        };
        let mut keys = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(DRAFT_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if let Ok(decoded) = URL_SAFE_NO_PAD.decode(stem.as_bytes()) {
                if let Ok(key) = String::from_utf8(decoded) {
                    keys.push(key);
                }
            }
        }
        keys.sort();
        keys
    }
}

/// 僅存在於記憶體的草稿儲存，供測試與無儲存宿主使用。 / In-memory draft store for tests and storage-less hosts.
#[derive(Debug, Default)]
pub struct MemoryDraftStore {
    entries: HashMap<String, String>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DraftStore for MemoryDraftStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn fs_store_round_trips_and_lists_keys() {
        let dir = tempdir().unwrap();
        let mut store = FsDraftStore::new(dir.path().join("drafts"));

        assert!(store.get("draft:a.md").is_none());
        store.set("draft:a.md", "alpha").unwrap();
        store.set("draft:docs/b.md", "beta").unwrap();

        assert_eq!(store.get("draft:a.md").as_deref(), Some("alpha"));
        assert_eq!(
            store.keys(),
            vec!["draft:a.md".to_string(), "draft:docs/b.md".to_string()]
        );

        store.remove("draft:a.md").unwrap();
        assert!(store.get("draft:a.md").is_none());
        // 重複移除視為成功。 / Removing an absent key succeeds.
        store.remove("draft:a.md").unwrap();
    }

    #[test]
    fn fs_store_survives_reopen() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("drafts");
        {
            let mut store = FsDraftStore::new(&root);
            store.set(&draft_key("notes.md"), "draft body").unwrap();
        }
        let store = FsDraftStore::new(&root);
        assert_eq!(
            store.get(&draft_key("notes.md")).as_deref(),
            Some("draft body")
        );
    }

    #[test]
    fn memory_store_round_trips() {
        let mut store = MemoryDraftStore::new();
        store.set("draft:x.md", "one").unwrap();
        assert_eq!(store.get("draft:x.md").as_deref(), Some("one"));
        store.remove("draft:x.md").unwrap();
        assert!(store.is_empty());
    }
}
