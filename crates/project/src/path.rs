//! Pure resolution of slash-delimited document paths and references.
//! 以純函式解析以斜線分隔的文件路徑與相對參照。

/// Resolves `reference` against the directory containing `base_path`.
/// 以 `base_path` 所在的目錄為基準解析 `reference`。
///
/// The final segment of `base_path` is discarded (it names a file). Each
/// segment of `reference` is applied in order: `..` pops the accumulated
/// stack (popping past the root is a no-op, not an error), `.` and empty
/// segments are skipped, anything else is appended. Total and deterministic:
/// malformed input yields a best-effort path, never a failure.
/// `base_path` 的最後一個片段會被捨棄（它指向檔案本身）；`reference` 的每個
/// 片段依序套用：`..` 彈出堆疊（超出根目錄視為無操作）、`.` 與空片段略過、
/// 其餘片段附加。函式必定回傳結果，不會失敗。
pub fn resolve_relative(base_path: &str, reference: &str) -> String {
    let mut segments: Vec<&str> = base_path.split('/').collect();
    segments.pop();
    apply_segments(&mut segments, reference);
    segments.join("/")
}

/// Resolves a raw reference found in a document into a tree-absolute path.
/// 將文件中出現的原始參照解析為樹內的絕對路徑。
///
/// References written as relative (`./`, `../`) resolve against the document;
/// everything else is treated as already absolute within the tree (a leading
/// `/` is stripped, `.`/`..` still normalise against the root).
/// 以 `./` 或 `../` 開頭者視為相對參照；其餘視為樹內絕對路徑（去除開頭的
/// `/`，`.` 與 `..` 仍會對根目錄正規化）。
pub fn resolve_reference(document_path: &str, raw: &str) -> String {
    if is_relative_reference(raw) {
        return resolve_relative(document_path, raw);
    }
    let trimmed = raw.trim_start_matches('/');
    let mut segments = Vec::new();
    apply_segments(&mut segments, trimmed);
    segments.join("/")
}

/// Returns whether a reference is written as relative.
/// 判斷參照是否以相對形式書寫。
pub fn is_relative_reference(raw: &str) -> bool {
    raw.starts_with("./") || raw.starts_with("../")
}

/// Returns the final segment of a slash-delimited path.
/// 取得路徑的最後一個片段。
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn apply_segments<'a>(stack: &mut Vec<&'a str>, reference: &'a str) {
    for segment in reference.split('/') {
        match segment {
            ".." => {
                stack.pop();
            }
            "." | "" => {}
            other => stack.push(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_parent_references() {
        assert_eq!(resolve_relative("a/b/c.md", "../d.md"), "a/d.md");
    }

    #[test]
    fn resolves_sibling_references() {
        assert_eq!(resolve_relative("a/b/c.md", "./d.md"), "a/b/d.md");
    }

    #[test]
    fn popping_past_the_root_is_a_no_op() {
        assert_eq!(resolve_relative("c.md", "../../x.md"), "x.md");
    }

    #[test]
    fn skips_dot_and_empty_segments() {
        assert_eq!(resolve_relative("a/b.md", ".//./c.md"), "a/c.md");
    }

    #[test]
    fn bare_references_are_tree_absolute() {
        assert_eq!(resolve_reference("docs/guide.md", "img/logo.png"), "img/logo.png");
        assert_eq!(resolve_reference("docs/guide.md", "/img/logo.png"), "img/logo.png");
    }

    #[test]
    fn relative_references_resolve_against_the_document() {
        assert_eq!(
            resolve_reference("docs/guide.md", "./img/logo.png"),
            "docs/img/logo.png"
        );
        assert_eq!(resolve_reference("docs/guide.md", "../top.md"), "top.md");
    }

    #[test]
    fn file_name_returns_the_final_segment() {
        assert_eq!(file_name("docs/guide.md"), "guide.md");
        assert_eq!(file_name("guide.md"), "guide.md");
    }
}
