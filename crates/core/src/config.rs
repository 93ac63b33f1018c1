use std::fs;
use std::io;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use mdpad_vfs::write_atomic;

fn default_autosave_delay_ms() -> u64 {
    2000
}

fn default_markdown_extensions() -> Vec<String> {
    ["md", "markdown", "mdown", "mkd"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// 工作區設定：自動儲存延遲與追蹤的副檔名。 / Workspace configuration:
/// autosave delay and tracked file extensions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkspaceConfig {
    #[serde(default = "default_autosave_delay_ms")]
    pub autosave_delay_ms: u64,
    #[serde(default = "default_markdown_extensions")]
    pub markdown_extensions: Vec<String>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            autosave_delay_ms: default_autosave_delay_ms(),
            markdown_extensions: default_markdown_extensions(),
        }
    }
}

/// 設定檔載入/儲存錯誤。 / Configuration persistence errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config IO error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid config payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

impl WorkspaceConfig {
    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    /// 判斷檔名是否屬於追蹤的文件類型。 / Returns whether a file name belongs
    /// to a tracked document type.
    pub fn is_tracked_name(&self, name: &str) -> bool {
        let Some((_, extension)) = name.rsplit_once('.') else {
            return false;
        };
        let extension = extension.to_ascii_lowercase();
        self.markdown_extensions.iter().any(|ext| *ext == extension)
    }

    /// 自 JSON 檔載入；檔案不存在時回傳預設值。 / Loads from a JSON file;
    /// a missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match fs::read_to_string(path.as_ref()) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    /// 以原子寫入保存設定。 / Persists the configuration atomically.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_vec_pretty(self)?;
        write_atomic(path.as_ref(), &json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let config = WorkspaceConfig::load(dir.path().join("absent.json")).unwrap();
        assert_eq!(config, WorkspaceConfig::default());
        assert_eq!(config.autosave_delay(), Duration::from_millis(2000));
    }

    #[test]
    fn save_and_load_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = WorkspaceConfig {
            autosave_delay_ms: 500,
            markdown_extensions: vec!["md".into()],
        };
        config.save(&path).unwrap();
        assert_eq!(WorkspaceConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn tracked_names_match_extensions_case_insensitively() {
        let config = WorkspaceConfig::default();
        assert!(config.is_tracked_name("notes.md"));
        assert!(config.is_tracked_name("NOTES.MD"));
        assert!(config.is_tracked_name("guide.markdown"));
        assert!(!config.is_tracked_name("logo.png"));
        assert!(!config.is_tracked_name("Makefile"));
    }
}
