use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::decode::decode_text;
use crate::handle::{
    DirEntryInfo, DirectoryHandle, DirectoryHandleRef, EntryKind, FileAccessError, FileHandle,
    FileHandleRef,
};

/// 以臨時檔案搭配 rename 實現原子寫入。 / Writes data atomically via a temporary sibling file plus rename.
pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, data)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// 以 `std::fs` 為後盾的檔案能力。 / File capability backed by `std::fs`.
#[derive(Debug)]
pub struct FsFileHandle {
    path: PathBuf,
    name: String,
}

impl FsFileHandle {
    /// 綁定既有檔案路徑；名稱取最後一個路徑片段。 / Binds an existing file path; the name is the final path segment.
    pub fn new(path: impl AsRef<Path>) -> Result<FileHandleRef, FileAccessError> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(FileAccessError::NotFound(path.display().to_string()));
        }
        let name = leaf_name(&path);
        Ok(Arc::new(Self { path, name }))
    }
}

impl FileHandle for FsFileHandle {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_text(&self) -> Result<String, FileAccessError> {
        let bytes = fs::read(&self.path)?;
        decode_text(&bytes)
    }

    fn read_bytes(&self) -> Result<Vec<u8>, FileAccessError> {
        Ok(fs::read(&self.path)?)
    }

    fn write_text(&self, text: &str) -> Result<(), FileAccessError> {
        write_atomic(&self.path, text.as_bytes())?;
        Ok(())
    }
}

/// 以 `std::fs` 為後盾的目錄能力。 / Directory capability backed by `std::fs`.
#[derive(Debug)]
pub struct FsDirectoryHandle {
    path: PathBuf,
    name: String,
}

impl FsDirectoryHandle {
    /// 綁定既有目錄路徑。 / Binds an existing directory path.
    pub fn open(path: impl AsRef<Path>) -> Result<DirectoryHandleRef, FileAccessError> {
        let path = path.as_ref().to_path_buf();
        if !path.is_dir() {
            return Err(FileAccessError::NotADirectory(path.display().to_string()));
        }
        let name = leaf_name(&path);
        Ok(Arc::new(Self { path, name }))
    }
}

impl DirectoryHandle for FsDirectoryHandle {
    fn name(&self) -> &str {
        &self.name
    }

    fn entries(&self) -> Result<Vec<DirEntryInfo>, FileAccessError> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else if file_type.is_file() {
                EntryKind::File
            } else {
                continue;
            };
            entries.push(DirEntryInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
            });
        }
        Ok(entries)
    }

    fn file(&self, name: &str) -> Result<FileHandleRef, FileAccessError> {
        let child = self.path.join(name);
        if !child.is_file() {
            return Err(FileAccessError::NotFound(name.to_string()));
        }
        Ok(Arc::new(FsFileHandle {
            path: child,
            name: name.to_string(),
        }))
    }

    fn directory(&self, name: &str) -> Result<DirectoryHandleRef, FileAccessError> {
        let child = self.path.join(name);
        if !child.is_dir() {
            return Err(FileAccessError::NotFound(name.to_string()));
        }
        Ok(Arc::new(FsDirectoryHandle {
            path: child,
            name: name.to_string(),
        }))
    }
}

fn leaf_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_handle_reads_and_writes_text() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("note.md");
        fs::write(&file_path, "# hello\n").unwrap();

        let handle = FsFileHandle::new(&file_path).unwrap();
        assert_eq!(handle.name(), "note.md");
        assert_eq!(handle.read_text().unwrap(), "# hello\n");

        handle.write_text("# edited\n").unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "# edited\n");
    }

    #[test]
    fn file_handle_rejects_missing_path() {
        let dir = tempdir().unwrap();
        let err = FsFileHandle::new(dir.path().join("absent.md")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn directory_handle_enumerates_children() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("readme.md"), "r").unwrap();

        let handle = FsDirectoryHandle::open(dir.path()).unwrap();
        let mut entries = handle.entries().unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(
            entries,
            vec![
                DirEntryInfo {
                    name: "docs".into(),
                    kind: EntryKind::Directory,
                },
                DirEntryInfo {
                    name: "readme.md".into(),
                    kind: EntryKind::File,
                },
            ]
        );

        let sub = handle.directory("docs").unwrap();
        assert!(sub.entries().unwrap().is_empty());
        assert!(handle.file("absent.md").unwrap_err().is_not_found());
    }

    #[test]
    fn write_atomic_replaces_content_without_partial_state() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("nested").join("out.txt");
        write_atomic(&target, b"first").unwrap();
        write_atomic(&target, b"second").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "second");
        assert!(!target.with_extension("tmp").exists());
    }
}
