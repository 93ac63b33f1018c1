use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use thiserror::Error;

use mdpad_vfs::{FileAccessError, FileHandle};

use crate::drafts::{draft_key, DraftStore};

/// 自動儲存的預設延遲。 / Default debounce delay for automatic durable writes.
pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(2000);

/// 文件內容操作可能發生的錯誤。 / Errors raised by content operations.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("no cached content for {0}")]
    Unknown(String),
    #[error(transparent)]
    Access(#[from] FileAccessError),
}

/// 每份開啟文件的記憶體文字、髒污狀態與待寫入排程。 / In-memory text, dirty
/// state and pending-write schedule for every open document.
///
/// 每條路徑的狀態機：`Clean → update → Dirty(已排程) → (期限到 ∨ flush) →
/// 寫入 → {成功: Clean, 失敗: Dirty(未排程)}`；排程期間再次 update 僅重設
/// 期限。 / Per-path state machine: `Clean → update → Dirty(armed) →
/// (deadline ∨ flush) → write → {ok: Clean, err: Dirty(unarmed)}`; a further
/// update while armed only re-arms the deadline.
#[derive(Debug)]
pub struct ContentStore {
    contents: HashMap<String, String>,
    dirty: HashSet<String>,
    /// 每條路徑各自的寫入期限。 / One write deadline per path.
    pending: HashMap<String, Instant>,
    drafts: Box<dyn DraftStore>,
    autosave_delay: Duration,
}

impl ContentStore {
    pub fn new(drafts: Box<dyn DraftStore>) -> Self {
        Self::with_autosave_delay(drafts, DEFAULT_AUTOSAVE_DELAY)
    }

    pub fn with_autosave_delay(drafts: Box<dyn DraftStore>, autosave_delay: Duration) -> Self {
        Self {
            contents: HashMap::new(),
            dirty: HashSet::new(),
            pending: HashMap::new(),
            drafts,
            autosave_delay,
        }
    }

    pub fn autosave_delay(&self) -> Duration {
        self.autosave_delay
    }

    /// 取得已快取的文字。 / Returns the cached text, if any.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.contents.get(path).map(String::as_str)
    }

    pub fn is_dirty(&self, path: &str) -> bool {
        self.dirty.contains(path)
    }

    /// 目前仍有未儲存變更的路徑（排序後）。 / Paths with unsaved edits, sorted.
    pub fn dirty_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.dirty.iter().cloned().collect();
        paths.sort();
        paths
    }

    pub fn has_pending_write(&self, path: &str) -> bool {
        self.pending.contains_key(path)
    }

    /// 開啟文件內容：快取命中時不呼叫 loader。 / Opens document content; a
    /// cache hit never invokes the loader.
    ///
    /// 冷開啟時以 loader 取得耐久內容並與草稿對帳：草稿與磁碟不同則草稿勝出
    /// 並標記髒污（草稿保留）；相同則捨棄過期草稿。loader 失敗但草稿存在時，
    /// 以草稿還原並標記髒污。 / On a cold open the loader supplies durable
    /// content, reconciled against the draft: a differing draft wins and
    /// marks the path dirty (draft retained); a matching draft is stale and
    /// discarded. When the loader fails but a draft exists, the draft is
    /// recovered and the path marked dirty.
    pub fn open<F>(&mut self, path: &str, loader: F) -> Result<&str, ContentError>
    where
        F: FnOnce() -> Result<String, FileAccessError>,
    {
        if !self.contents.contains_key(path) {
            let key = draft_key(path);
            let draft = self.drafts.get(&key);
            let text = match loader() {
                Ok(disk) => match draft {
                    Some(draft) if draft != disk => {
                        self.dirty.insert(path.to_string());
                        draft
                    }
                    Some(_) => {
                        if let Err(err) = self.drafts.remove(&key) {
                            log::warn!("discarding stale draft for {path} failed: {err}");
                        }
                        disk
                    }
                    None => disk,
                },
                Err(err) => match draft {
                    Some(draft) => {
                        log::warn!("loading {path} failed ({err}); recovering from draft");
                        self.dirty.insert(path.to_string());
                        draft
                    }
                    None => return Err(err.into()),
                },
            };
            self.contents.insert(path.to_string(), text);
        }
        Ok(self
            .contents
            .get(path)
            .map(String::as_str)
            .unwrap_or_default())
    }

    /// 取代快取內容、鏡射草稿並重設該路徑的寫入期限。 / Replaces the cached
    /// text, mirrors the draft and re-arms the path's write deadline.
    ///
    /// 草稿鏡射為同步盡力而為：失敗記錄但不致命，崩潰時最多遺失尚未落盤的
    /// 最新輸入，且草稿仍在。 / Draft mirroring is synchronous best-effort:
    /// failures are logged, never fatal; after a crash at most the newest
    /// typed content is unsaved on disk yet present in the draft store.
    pub fn update(&mut self, path: &str, text: impl Into<String>, now: Instant) {
        let text = text.into();
        if let Err(err) = self.drafts.set(&draft_key(path), &text) {
            log::warn!("mirroring draft for {path} failed: {err}");
        }
        self.contents.insert(path.to_string(), text);
        self.dirty.insert(path.to_string());
        self.pending.insert(path.to_string(), now + self.autosave_delay);
    }

    /// 期限已到、等待耐久寫入的路徑（排序後）。 / Paths whose deadline has
    /// passed and await a durable write, sorted.
    pub fn due_paths(&self, now: Instant) -> Vec<String> {
        let mut due: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(path, _)| path.clone())
            .collect();
        due.sort();
        due
    }

    /// 立即將快取文字寫入後盾檔案。 / Writes the cached text through the
    /// backing handle immediately.
    ///
    /// 成功時清除髒污並移除草稿；失敗時髒污與草稿保持原狀且不再排程
    /// （`Dirty(未排程)`）。乾淨路徑的 flush 為無操作（冪等）。 / On success
    /// dirty is cleared and the draft removed; on failure dirty and draft
    /// stay intact with no re-armed deadline (`Dirty(unarmed)`). Flushing a
    /// clean path is a no-op (idempotence).
    pub fn flush(&mut self, path: &str, handle: &dyn FileHandle) -> Result<bool, ContentError> {
        self.pending.remove(path);
        if !self.dirty.contains(path) {
            return Ok(false);
        }
        let text = self
            .contents
            .get(path)
            .ok_or_else(|| ContentError::Unknown(path.to_string()))?;
        handle.write_text(text)?;
        self.dirty.remove(path);
        if let Err(err) = self.drafts.remove(&draft_key(path)) {
            // 磁碟此刻已是權威內容；留下的草稿與磁碟相同，下次開啟時會被
            // 對帳規則捨棄。 / Disk is authoritative now; a draft equal to
            // disk is discarded by the next open's reconciliation.
            log::warn!("removing draft for {path} after save failed: {err}");
        }
        Ok(true)
    }

    /// 取消該路徑的待寫入排程，髒污狀態不變。 / Drops the path's pending
    /// deadline without touching dirty state.
    pub fn disarm(&mut self, path: &str) {
        self.pending.remove(path);
    }

    /// 分頁關閉時的簿記：清除髒污旗標與排程，內容與草稿保留。 / Tab-close
    /// bookkeeping: dirty flag and deadline dropped, content and draft kept.
    pub fn clear_dirty(&mut self, path: &str) {
        self.dirty.remove(path);
        self.pending.remove(path);
    }

    /// 僅保留符合條件的路徑狀態；草稿儲存不受影響。 / Retains only state for
    /// paths accepted by the predicate; the draft store is untouched.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: Fn(&str) -> bool,
    {
        self.contents.retain(|path, _| keep(path));
        self.dirty.retain(|path| keep(path));
        self.pending.retain(|path, _| keep(path));
    }

    pub fn drafts(&self) -> &dyn DraftStore {
        &*self.drafts
    }

    pub fn drafts_mut(&mut self) -> &mut dyn DraftStore {
        &mut *self.drafts
    }
}
