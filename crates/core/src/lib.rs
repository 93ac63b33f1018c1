//! mdpad 的文件內容、草稿與工作區協調核心。 / Document content, drafts and
//! workspace orchestration for mdpad.

pub mod config;
pub mod content;
pub mod drafts;
pub mod workspace;

pub use config::{ConfigError, WorkspaceConfig};
pub use content::{ContentError, ContentStore, DEFAULT_AUTOSAVE_DELAY};
pub use drafts::{draft_key, DraftStore, FsDraftStore, MemoryDraftStore};
pub use workspace::{EditorWorkspace, FlushOutcome, LinkTarget, WorkspaceError};
