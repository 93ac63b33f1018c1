use std::time::Instant;

use thiserror::Error;

use mdpad_assets::{is_passthrough_reference, AssetResolver};
use mdpad_project::path::resolve_reference;
use mdpad_project::record::{scan_root, FileRecord};
use mdpad_project::session_store::{CompatibilityIssue, SessionError, SessionSnapshot, SessionStore};
use mdpad_project::tabs::{OpenDocument, TabSession, STANDALONE_PREFIX};
use mdpad_project::tree::{build, TreeNode};
use mdpad_vfs::{DirectoryHandleRef, FileAccessError, FileHandleRef};

use crate::config::WorkspaceConfig;
use crate::content::{ContentError, ContentStore};
use crate::drafts::DraftStore;

/// 文件內連結的解析結果。 / Resolution outcome for an in-document link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// 指向樹內文件，值為其正規識別。 / A tree document, by canonical id.
    Document(String),
    /// 外部參照，交由宿主開啟。 / An external reference for the host to open.
    External(String),
    /// 無法對應任何追蹤中的文件。 / Matches no tracked document.
    Unresolved,
}

/// 單一文件耐久寫入嘗試的結果。 / Outcome of one durable-write attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushOutcome {
    pub path: String,
    pub wrote: bool,
}

/// 工作區層級的錯誤。 / Workspace-level errors.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("no folder is currently open")]
    NoRootOpen,
    #[error("document {0} is not part of the current tree")]
    DocumentNotFound(String),
    #[error("tab {0} is not open")]
    TabNotOpen(String),
    #[error("document {0} has no backing file")]
    NoBackingFile(String),
    #[error(transparent)]
    Access(#[from] FileAccessError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// 編輯器核心的協調者：根目錄、記錄、樹、分頁、內容與資產。 / The editor
/// core's orchestrator: root, records, tree, tabs, content and assets.
///
/// 宿主事件迴圈驅動：使用者動作開啟/作用文件，編輯進入 [`ContentStore`]，
/// 並以 [`EditorWorkspace::tick`] 推動去抖動的耐久寫入；外部渲染器經由
/// [`EditorWorkspace::image_source`] 與 [`EditorWorkspace::follow_link`]
/// 取得其兩個注入點。 / Driven by the host event loop: user actions open and
/// activate documents, edits land in the [`ContentStore`], and
/// [`EditorWorkspace::tick`] pumps debounced durable writes; an external
/// renderer takes [`EditorWorkspace::image_source`] and
/// [`EditorWorkspace::follow_link`] as its two injection points.
#[derive(Debug)]
pub struct EditorWorkspace {
    config: WorkspaceConfig,
    root: Option<DirectoryHandleRef>,
    records: Vec<FileRecord>,
    tree: Vec<TreeNode>,
    tabs: TabSession,
    content: ContentStore,
    assets: AssetResolver,
}

impl EditorWorkspace {
    pub fn new(config: WorkspaceConfig, drafts: Box<dyn DraftStore>) -> Self {
        let content = ContentStore::with_autosave_delay(drafts, config.autosave_delay());
        Self {
            config,
            root: None,
            records: Vec::new(),
            tree: Vec::new(),
            tabs: TabSession::new(),
            content,
            assets: AssetResolver::new(),
        }
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn tree(&self) -> &[TreeNode] {
        &self.tree
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn tabs(&self) -> &TabSession {
        &self.tabs
    }

    pub fn assets(&self) -> &AssetResolver {
        &self.assets
    }

    pub fn drafts(&self) -> &dyn DraftStore {
        self.content.drafts()
    }

    pub fn active_document(&self) -> Option<&OpenDocument> {
        self.tabs.active().and_then(|path| self.tabs.get(path))
    }

    /// 開啟新的根目錄並重建所有根相依狀態。 / Opens a new root and rebuilds
    /// all root-scoped state.
    ///
    /// 舊根的目錄能力不再保證有效：樹內分頁關閉、內容與資產快取整批重置；
    /// 獨立分頁與其內容不受影響（其能力與根無關）。 / The old root's
    /// capabilities are no longer guaranteed valid: tree tabs close and the
    /// content and asset caches reset wholesale; standalone tabs and their
    /// content survive, their capabilities being root-independent.
    pub fn open_root(&mut self, root: DirectoryHandleRef) -> Result<(), WorkspaceError> {
        let config = &self.config;
        let records = scan_root(&*root, &|name| config.is_tracked_name(name))?;
        self.tree = build(&records);
        self.records = records;
        self.root = Some(root);
        self.tabs.close_tree_tabs();
        self.content
            .retain(|path| path.starts_with(STANDALONE_PREFIX));
        self.assets.clear();
        Ok(())
    }

    /// 重新掃描根目錄並整棵重建樹（純投影，不做增量比對）。 / Rescans the
    /// root and rebuilds the whole tree (a pure projection, no diffing).
    pub fn refresh_tree(&mut self) -> Result<(), WorkspaceError> {
        let root = self.root.clone().ok_or(WorkspaceError::NoRootOpen)?;
        let config = &self.config;
        let records = scan_root(&*root, &|name| config.is_tracked_name(name))?;
        self.tree = build(&records);
        self.records = records;
        Ok(())
    }

    /// 開啟（或重新作用）樹內文件並回傳其內容。 / Opens (or re-activates) a
    /// tree document and returns its content.
    pub fn open_path(&mut self, full_path: &str) -> Result<&str, WorkspaceError> {
        let record = self
            .records
            .iter()
            .find(|record| record.full_path == full_path)
            .ok_or_else(|| WorkspaceError::DocumentNotFound(full_path.to_string()))?
            .clone();
        self.tabs.open_from_record(&record);
        let handle = record.handle.clone();
        let text = self.content.open(&record.full_path, move || handle.read_text())?;
        Ok(text)
    }

    /// 以獨立能力開啟樹外文件，回傳其合成路徑。 / Opens a document outside
    /// the tree from a standalone capability, returning its synthetic path.
    pub fn open_standalone(&mut self, handle: FileHandleRef) -> Result<String, WorkspaceError> {
        let name = handle.name().to_string();
        let path = self.tabs.open_standalone(&name, handle.clone());
        self.content.open(&path, move || handle.read_text())?;
        Ok(path)
    }

    /// 開啟純記憶體的暫存文件。 / Opens a pure in-memory scratch document.
    pub fn open_scratch(&mut self, name: &str) -> String {
        let path = self.tabs.open_scratch(name);
        let _ = self.content.open(&path, || Ok(String::new()));
        path
    }

    pub fn content_of(&self, path: &str) -> Option<&str> {
        self.content.get(path)
    }

    pub fn is_dirty(&self, path: &str) -> bool {
        self.content.is_dirty(path)
    }

    pub fn dirty_paths(&self) -> Vec<String> {
        self.content.dirty_paths()
    }

    /// 套用編輯：更新快取、鏡射草稿並重設該文件的寫入期限。 / Applies an
    /// edit: cache update, draft mirror, per-document deadline re-arm.
    pub fn update(&mut self, path: &str, text: impl Into<String>, now: Instant) {
        self.content.update(path, text, now);
    }

    /// 推動到期的去抖動寫入。 / Pumps debounced writes whose deadline passed.
    ///
    /// 寫入失敗僅記錄並保留髒污狀態；沒有後盾檔案的文件解除排程，等待另存。 /
    /// Failures are logged and leave dirty state intact; documents without a
    /// backing file are disarmed until a save-as.
    pub fn tick(&mut self, now: Instant) -> Vec<FlushOutcome> {
        let mut outcomes = Vec::new();
        for path in self.content.due_paths(now) {
            match self.handle_for(&path) {
                Some(handle) => {
                    let wrote = match self.content.flush(&path, &*handle) {
                        Ok(wrote) => wrote,
                        Err(err) => {
                            log::error!("autosave for {path} failed: {err}");
                            false
                        }
                    };
                    outcomes.push(FlushOutcome { path, wrote });
                }
                None => {
                    log::debug!("document {path} has no backing file; waiting for save-as");
                    self.content.disarm(&path);
                }
            }
        }
        outcomes
    }

    /// 明確的儲存指令：略過去抖動，立即寫入。 / Explicit save command:
    /// bypasses the debounce and writes immediately.
    pub fn save(&mut self, path: &str) -> Result<bool, WorkspaceError> {
        let handle = self
            .handle_for(path)
            .ok_or_else(|| WorkspaceError::NoBackingFile(path.to_string()))?;
        Ok(self.content.flush(path, &*handle)?)
    }

    /// 另存新檔：為分頁補上能力後立即寫入。 / Save-as: attaches a capability
    /// to the tab, then writes immediately.
    pub fn save_as(&mut self, path: &str, handle: FileHandleRef) -> Result<bool, WorkspaceError> {
        if !self.tabs.assign_handle(path, handle.clone()) {
            return Err(WorkspaceError::TabNotOpen(path.to_string()));
        }
        Ok(self.content.flush(path, &*handle)?)
    }

    /// 關閉分頁：清除髒污簿記，內容保留以便同工作階段即時重開。 / Closes a
    /// tab: dirty bookkeeping cleared; content retained for instant re-show
    /// within the session.
    pub fn close_tab(&mut self, path: &str) -> bool {
        let closed = self.tabs.close(path);
        if closed {
            self.content.clear_dirty(path);
        }
        closed
    }

    pub fn activate(&mut self, path: &str) -> bool {
        self.tabs.activate(path)
    }

    /// 渲染器的圖片注入點。 / The renderer's image injection point.
    ///
    /// 未開啟根目錄時一律原樣回傳。 / With no root open every reference
    /// passes through unchanged.
    pub fn image_source(&mut self, raw: &str, document_path: &str) -> String {
        let Some(root) = self.root.clone() else {
            return raw.to_string();
        };
        self.assets.resolve(raw, document_path, &*root)
    }

    /// 渲染器的連結注入點。 / The renderer's link injection point.
    pub fn follow_link(&self, raw: &str, document_path: &str) -> LinkTarget {
        if is_passthrough_reference(raw) {
            return LinkTarget::External(raw.to_string());
        }
        let reference = raw.split('#').next().unwrap_or(raw);
        if reference.is_empty() {
            return LinkTarget::Unresolved;
        }
        let resolved = resolve_reference(document_path, reference);
        for candidate in [resolved.clone(), format!("{resolved}.md")] {
            if let Some(record) = self
                .records
                .iter()
                .find(|record| record.full_path == candidate)
            {
                return LinkTarget::Document(record.full_path.clone());
            }
        }
        log::debug!("link {raw} from {document_path} matches no tracked document");
        LinkTarget::Unresolved
    }

    /// 保存分頁工作階段快照。 / Persists the tab session snapshot.
    pub fn save_session(&self, store: &SessionStore) -> Result<(), WorkspaceError> {
        store.save(&self.tabs.snapshot())?;
        Ok(())
    }

    /// 還原工作階段快照，回報無法還原的分頁。 / Restores a session snapshot,
    /// reporting tabs that could not be restored.
    ///
    /// 獨立文件的能力無法持久化，必須重新挑選；樹內路徑對新掃描的樹解析。 /
    /// Standalone capabilities cannot be persisted and need a fresh pick;
    /// tree paths resolve against the freshly scanned tree.
    pub fn restore_session(&mut self, snapshot: &SessionSnapshot) -> Vec<CompatibilityIssue> {
        let mut issues = Vec::new();
        for tab in &snapshot.tabs {
            if tab.standalone {
                issues.push(CompatibilityIssue::new(
                    "standalone document needs a fresh pick",
                    Some(tab.path.clone()),
                ));
                continue;
            }
            if let Err(err) = self.open_path(&tab.path) {
                issues.push(CompatibilityIssue::new(
                    err.to_string(),
                    Some(tab.path.clone()),
                ));
            }
        }
        if let Some(active) = &snapshot.active {
            self.tabs.activate(active);
        }
        issues
    }

    fn handle_for(&self, path: &str) -> Option<FileHandleRef> {
        if let Some(tab) = self.tabs.get(path) {
            if let Some(handle) = &tab.handle {
                return Some(handle.clone());
            }
            if tab.standalone {
                return None;
            }
        }
        self.records
            .iter()
            .find(|record| record.full_path == path)
            .map(|record| record.handle.clone())
    }
}
