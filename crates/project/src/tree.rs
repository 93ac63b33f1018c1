//! Derived folder/file tree projected from the flat record set.
//! 由扁平檔案記錄集合投影出的資料夾/檔案樹。

use std::collections::BTreeMap;

use crate::record::FileRecord;

/// A node of the derived document tree.
/// 文件樹中的單一節點。
///
/// The tree is a pure projection: it is rebuilt wholesale from the current
/// record set whenever that set changes and is never mutated in place.
/// 此樹為純投影：記錄集合改變時整棵重建，不做原地修改。
#[derive(Debug, Clone)]
pub enum TreeNode {
    Folder {
        name: String,
        /// Equals `parent.path + "/" + name`, except at root level.
        /// 等於父節點路徑加上名稱；根層級節點除外。
        path: String,
        children: Vec<TreeNode>,
    },
    File(FileRecord),
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            TreeNode::Folder { name, .. } => name,
            TreeNode::File(record) => &record.name,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            TreeNode::Folder { path, .. } => path,
            TreeNode::File(record) => &record.path,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, TreeNode::Folder { .. })
    }
}

/// Builds the nested tree from flat records.
/// 將扁平記錄建構為巢狀樹。
///
/// Records are grouped by their first path segment: single-segment records
/// become file leaves at the current level, multi-segment records contribute
/// to a folder named by the first segment whose children are built from the
/// stripped remainders. Folders precede files among siblings; each group is
/// ordered by name. An empty input yields an empty sequence.
/// 依第一個路徑片段分組：單片段記錄為當層檔案節點，多片段記錄歸入以首片段
/// 命名的資料夾並以剩餘路徑遞迴建構。資料夾一律排在檔案之前，同組內依名稱
/// 排序；空輸入產生空結果。
pub fn build(records: &[FileRecord]) -> Vec<TreeNode> {
    let items: Vec<(&str, &FileRecord)> = records
        .iter()
        .map(|record| (record.path.as_str(), record))
        .collect();
    build_level("", items)
}

fn build_level<'a>(prefix: &str, items: Vec<(&'a str, &'a FileRecord)>) -> Vec<TreeNode> {
    let mut folders: BTreeMap<&str, Vec<(&str, &FileRecord)>> = BTreeMap::new();
    let mut files: Vec<&FileRecord> = Vec::new();

    for (remainder, record) in items {
        match remainder.split_once('/') {
            Some((head, tail)) => folders.entry(head).or_default().push((tail, record)),
            None => files.push(record),
        }
    }

    let mut nodes = Vec::with_capacity(folders.len() + files.len());
    for (name, children) in folders {
        let path = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}/{name}")
        };
        nodes.push(TreeNode::Folder {
            children: build_level(&path, children),
            name: name.to_string(),
            path,
        });
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    nodes.extend(files.into_iter().cloned().map(TreeNode::File));
    nodes
}

/// Collects the leaf paths of a tree in depth-first order.
/// 以深度優先順序收集樹中所有檔案節點的路徑。
pub fn leaf_paths(nodes: &[TreeNode]) -> Vec<String> {
    let mut paths = Vec::new();
    collect_leaves(nodes, &mut paths);
    paths
}

fn collect_leaves(nodes: &[TreeNode], paths: &mut Vec<String>) {
    for node in nodes {
        match node {
            TreeNode::Folder { children, .. } => collect_leaves(children, paths),
            TreeNode::File(record) => paths.push(record.path.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdpad_vfs::{FileAccessError, FileHandle, FileHandleRef};
    use std::collections::BTreeSet;
    use std::sync::Arc;

    #[derive(Debug)]
    struct StubHandle(String);

    impl FileHandle for StubHandle {
        fn name(&self) -> &str {
            &self.0
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
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        let handle: FileHandleRef = Arc::new(StubHandle(name.clone()));
        FileRecord {
            name,
            path: path.to_string(),
            full_path: path.to_string(),
            handle,
        }
    }

    #[test]
    fn groups_records_into_nested_folders() {
        let records = vec![
            record("zeta.md"),
            record("docs/guide.md"),
            record("docs/api/index.md"),
            record("alpha.md"),
        ];
        let tree = build(&records);

        assert_eq!(tree.len(), 3);
        assert!(tree[0].is_folder());
        assert_eq!(tree[0].name(), "docs");
        assert_eq!(tree[1].name(), "alpha.md");
        assert_eq!(tree[2].name(), "zeta.md");

        let TreeNode::Folder { path, children, .. } = &tree[0] else {
            panic!("expected a folder");
        };
        assert_eq!(path, "docs");
        assert_eq!(children[0].name(), "api");
        assert_eq!(children[0].path(), "docs/api");
        assert_eq!(children[1].name(), "guide.md");
    }

    #[test]
    fn folders_precede_files_at_every_level() {
        let records = vec![
            record("a/aardvark.md"),
            record("a/z/deep.md"),
            record("a/banana.md"),
        ];
        let tree = build(&records);
        let TreeNode::Folder { children, .. } = &tree[0] else {
            panic!("expected a folder");
        };
        assert!(children[0].is_folder());
        assert_eq!(children[0].name(), "z");
        assert_eq!(children[1].name(), "aardvark.md");
        assert_eq!(children[2].name(), "banana.md");
    }

    #[test]
    fn flattening_preserves_the_input_leaf_set() {
        let inputs = vec![
            "readme.md",
            "docs/guide.md",
            "docs/api/index.md",
            "notes/todo.md",
        ];
        let records: Vec<FileRecord> = inputs.iter().map(|p| record(p)).collect();
        let tree = build(&records);

        let flattened: BTreeSet<String> = leaf_paths(&tree).into_iter().collect();
        let expected: BTreeSet<String> = inputs.iter().map(|p| p.to_string()).collect();
        assert_eq!(flattened, expected);
    }

    #[test]
    fn empty_input_yields_empty_tree() {
        assert!(build(&[]).is_empty());
    }
}
