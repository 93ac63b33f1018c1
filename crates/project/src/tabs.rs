//! Ordered open-document tabs and the active selection.
//! 管理開啟文件分頁的順序與目前作用中的選取。

use mdpad_vfs::FileHandleRef;

use crate::record::FileRecord;
use crate::session_store::{SessionSnapshot, SessionTab};

/// Namespace prefix for documents opened outside the tree.
/// 樹外開啟文件所使用的命名空間前綴。
///
/// Tree paths are root-relative and never carry a scheme, so a prefixed path
/// can never collide with one.
/// 樹內路徑為根相對且不含 scheme，加上前綴後即不可能衝突。
pub const STANDALONE_PREFIX: &str = "standalone://";

/// A document opened into a tab.
/// 已開啟至分頁的文件。
#[derive(Debug, Clone)]
pub struct OpenDocument {
    /// Unique key; tree `full_path` or a `standalone://` synthetic path.
    /// 唯一鍵值；樹內 `full_path` 或 `standalone://` 合成路徑。
    pub path: String,
    pub display_name: String,
    /// `None` for pure in-memory documents awaiting a save-as.
    /// 純記憶體文件（尚待另存）為 `None`。
    pub handle: Option<FileHandleRef>,
    pub standalone: bool,
}

/// Owns the ordered tab list and the active selection.
/// 擁有分頁順序清單與作用中選取的管理器。
///
/// Invariants: at most one tab per distinct path; the active path is `None`
/// or present in the tab sequence.
/// 不變條件：每個路徑至多一個分頁；作用中路徑為 `None` 或存在於分頁序列。
#[derive(Debug, Default)]
pub struct TabSession {
    tabs: Vec<OpenDocument>,
    active: Option<String>,
}

impl TabSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tabs(&self) -> &[OpenDocument] {
        &self.tabs
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn get(&self, path: &str) -> Option<&OpenDocument> {
        self.tabs.iter().find(|tab| tab.path == path)
    }

    pub fn is_open(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Opens a tree-derived document, or re-activates its existing tab.
    /// 開啟樹內文件；若分頁已存在則僅重新作用。
    ///
    /// Returns `true` when a new tab was appended.
    /// 新增分頁時回傳 `true`。
    pub fn open_from_record(&mut self, record: &FileRecord) -> bool {
        let appended = if self.is_open(&record.full_path) {
            false
        } else {
            self.tabs.push(OpenDocument {
                path: record.full_path.clone(),
                display_name: record.name.clone(),
                handle: Some(record.handle.clone()),
                standalone: false,
            });
            true
        };
        self.active = Some(record.full_path.clone());
        appended
    }

    /// Opens a standalone document under a synthetic namespaced path.
    /// 以合成命名空間路徑開啟獨立文件。
    pub fn open_standalone(&mut self, name: &str, handle: FileHandleRef) -> String {
        let path = format!("{STANDALONE_PREFIX}{name}");
        if !self.is_open(&path) {
            self.tabs.push(OpenDocument {
                path: path.clone(),
                display_name: name.to_string(),
                handle: Some(handle),
                standalone: true,
            });
        }
        self.active = Some(path.clone());
        path
    }

    /// Opens an in-memory scratch document with no backing file.
    /// 開啟沒有後盾檔案的純記憶體文件。
    pub fn open_scratch(&mut self, name: &str) -> String {
        let path = format!("{STANDALONE_PREFIX}{name}");
        if !self.is_open(&path) {
            self.tabs.push(OpenDocument {
                path: path.clone(),
                display_name: name.to_string(),
                handle: None,
                standalone: true,
            });
        }
        self.active = Some(path.clone());
        path
    }

    /// Attaches a backing capability to an open tab (save-as).
    /// 為既有分頁補上後盾能力（另存新檔）。
    pub fn assign_handle(&mut self, path: &str, handle: FileHandleRef) -> bool {
        match self.tabs.iter_mut().find(|tab| tab.path == path) {
            Some(tab) => {
                tab.handle = Some(handle);
                true
            }
            None => false,
        }
    }

    /// Closes a tab; activation falls back to the preceding tab in order.
    /// 關閉分頁；作用中分頁回退至順序上的前一個分頁。
    ///
    /// Returns `false` when no such tab is open. Document content is not the
    /// tab list's concern and survives elsewhere.
    /// 分頁不存在時回傳 `false`；文件內容非此處職責，仍保留於他處。
    pub fn close(&mut self, path: &str) -> bool {
        let Some(index) = self.tabs.iter().position(|tab| tab.path == path) else {
            return false;
        };
        self.tabs.remove(index);
        if self.active.as_deref() == Some(path) {
            self.active = if self.tabs.is_empty() {
                None
            } else {
                let fallback = index.saturating_sub(1).min(self.tabs.len() - 1);
                Some(self.tabs[fallback].path.clone())
            };
        }
        true
    }

    /// Activates an open tab; unknown paths are a no-op.
    /// 作用指定分頁；未知路徑視為無操作。
    pub fn activate(&mut self, path: &str) -> bool {
        if self.is_open(path) {
            self.active = Some(path.to_string());
            true
        } else {
            false
        }
    }

    /// Drops every tree-derived tab, keeping standalone tabs alive.
    /// 移除所有樹內分頁，保留獨立分頁。
    ///
    /// Used on a root change: tree capabilities are no longer valid, while
    /// standalone capabilities are root-independent.
    /// 於更換根目錄時使用：樹內能力已失效，獨立能力則不受影響。
    pub fn close_tree_tabs(&mut self) {
        self.tabs.retain(|tab| tab.standalone);
        if let Some(active) = self.active.as_deref() {
            if !self.is_open(active) {
                self.active = self.tabs.last().map(|tab| tab.path.clone());
            }
        }
    }

    /// Captures the tab list as a persistable snapshot (handles excluded).
    /// 擷取分頁清單為可持久化的快照（不含 handle）。
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            format_version: crate::session_store::SESSION_FORMAT_VERSION,
            tabs: self
                .tabs
                .iter()
                .map(|tab| SessionTab {
                    path: tab.path.clone(),
                    display_name: Some(tab.display_name.clone()),
                    standalone: tab.standalone,
                })
                .collect(),
            active: self.active.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdpad_vfs::{FileAccessError, FileHandle};
    use std::sync::Arc;

    #[derive(Debug)]
    struct StubHandle;

    impl FileHandle for StubHandle {
        fn name(&self) -> &str {
            "stub"
        }
        fn read_text(&self) -> Result<String, FileAccessError> {
            Ok(String::new())
        }
        fn read_bytes(&self) -> Result<Vec<u8>, FileAccessError> {
            Ok(Vec::new())
        }
        fn write_text(&self, _text: &str) -> Result<(), FileAccessError> {
            Ok(())
        }
    }

    fn record(path: &str) -> FileRecord {
        FileRecord {
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
            path: path.to_string(),
            full_path: path.to_string(),
            handle: Arc::new(StubHandle),
        }
    }

    #[test]
    fn reopening_reactivates_instead_of_duplicating() {
        let mut session = TabSession::new();
        assert!(session.open_from_record(&record("a.md")));
        assert!(session.open_from_record(&record("b.md")));
        assert_eq!(session.active(), Some("b.md"));

        assert!(!session.open_from_record(&record("a.md")));
        assert_eq!(session.tabs().len(), 2);
        assert_eq!(session.active(), Some("a.md"));
    }

    #[test]
    fn closing_the_active_tab_falls_back_to_the_preceding_one() {
        let mut session = TabSession::new();
        session.open_from_record(&record("a.md"));
        session.open_from_record(&record("b.md"));
        session.open_from_record(&record("c.md"));

        assert!(session.close("c.md"));
        assert_eq!(session.active(), Some("b.md"));

        assert!(session.close("a.md"));
        assert_eq!(session.active(), Some("b.md"));

        assert!(session.close("b.md"));
        assert_eq!(session.active(), None);
        assert!(!session.close("b.md"));
    }

    #[test]
    fn closing_the_first_active_tab_moves_to_the_new_first() {
        let mut session = TabSession::new();
        session.open_from_record(&record("a.md"));
        session.open_from_record(&record("b.md"));
        session.activate("a.md");

        session.close("a.md");
        assert_eq!(session.active(), Some("b.md"));
    }

    #[test]
    fn standalone_paths_are_namespaced_and_deduplicated() {
        let mut session = TabSession::new();
        session.open_from_record(&record("notes.md"));
        let path = session.open_standalone("notes.md", Arc::new(StubHandle));
        assert_eq!(path, "standalone://notes.md");
        assert_eq!(session.tabs().len(), 2);

        let again = session.open_standalone("notes.md", Arc::new(StubHandle));
        assert_eq!(again, path);
        assert_eq!(session.tabs().len(), 2);
    }

    #[test]
    fn activate_unknown_path_is_a_no_op() {
        let mut session = TabSession::new();
        session.open_from_record(&record("a.md"));
        assert!(!session.activate("ghost.md"));
        assert_eq!(session.active(), Some("a.md"));
    }

    #[test]
    fn root_change_keeps_standalone_tabs_only() {
        let mut session = TabSession::new();
        session.open_from_record(&record("a.md"));
        let standalone = session.open_standalone("loose.md", Arc::new(StubHandle));
        session.activate("a.md");

        session.close_tree_tabs();
        assert_eq!(session.tabs().len(), 1);
        assert_eq!(session.active(), Some(standalone.as_str()));
    }

    #[test]
    fn scratch_documents_have_no_handle() {
        let mut session = TabSession::new();
        let path = session.open_scratch("untitled-1");
        let tab = session.get(&path).unwrap();
        assert!(tab.handle.is_none());
        assert!(tab.standalone);

        assert!(session.assign_handle(&path, Arc::new(StubHandle)));
        assert!(session.get(&path).unwrap().handle.is_some());
    }
}
