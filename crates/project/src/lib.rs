//! Path resolution, file identity and tab/session primitives for mdpad.
//! 管理 mdpad 的路徑解析、檔案識別與分頁/工作階段核心模組。

pub mod path;
pub mod record;
pub mod session_store;
pub mod tabs;
pub mod tree;

pub use record::{scan_root, FileRecord};
pub use session_store::{
    CompatibilityIssue, SessionError, SessionSnapshot, SessionStore, SessionTab,
    SESSION_FORMAT_VERSION,
};
pub use tabs::{OpenDocument, TabSession, STANDALONE_PREFIX};
pub use tree::{build, leaf_paths, TreeNode};
