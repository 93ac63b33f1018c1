use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;

use mdpad_project::path::resolve_reference;
use mdpad_vfs::{DirectoryHandle, DirectoryHandleRef, FileAccessError};

static SCHEME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:https?|file|mailto):").expect("scheme pattern"));

/// Returns whether a reference must be handed to the renderer unchanged.
/// 判斷參照是否應原封不動交給渲染器。
///
/// Absolute remote references (recognised schemes) and embedded-data
/// references never touch the handle chain.
/// 絕對遠端參照（已知 scheme）與內嵌資料參照永不走訪目錄能力鏈。
pub fn is_passthrough_reference(raw: &str) -> bool {
    raw.starts_with("data:") || SCHEME_RE.is_match(raw)
}

/// Resolves relative image references against the opened tree.
/// 將相對圖片參照解析至已開啟的樹。
///
/// Resolved references are cached per `(document, raw reference)` pair for
/// the lifetime of the session; the cache is cleared wholesale when a new
/// root is opened, because the old directory capabilities are no longer
/// guaranteed valid.
/// 解析結果依（文件、原始參照）配對快取至工作階段結束；更換根目錄時整批清除，
/// 因舊目錄能力已不保證有效。
#[derive(Debug, Default)]
pub struct AssetResolver {
    cache: HashMap<(String, String), String>,
}

impl AssetResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `raw` as referenced from `document_path` into a displayable
    /// reference.
    /// 將 `document_path` 中出現的 `raw` 解析為可顯示的參照。
    ///
    /// Any lookup failure (absent directory, absent file, access denial)
    /// degrades to returning `raw` unchanged: rendering shows a broken but
    /// harmless reference, never an error.
    /// 任何查找失敗都退回原始參照：畫面顯示失效但無害的參照，不產生錯誤。
    pub fn resolve(&mut self, raw: &str, document_path: &str, root: &dyn DirectoryHandle) -> String {
        if is_passthrough_reference(raw) {
            return raw.to_string();
        }

        let key = (document_path.to_string(), raw.to_string());
        if let Some(resolved) = self.cache.get(&key) {
            return resolved.clone();
        }

        let target = resolve_reference(document_path, raw);
        match read_target(root, &target) {
            Ok(bytes) => {
                let name = mdpad_project::path::file_name(&target);
                let resolved = to_data_uri(mime_for_name(name), &bytes);
                self.cache.insert(key, resolved.clone());
                resolved
            }
            Err(err) => {
                log::warn!("asset {raw} referenced from {document_path} did not resolve: {err}");
                raw.to_string()
            }
        }
    }

    /// Drops every cached resolution. Called when the tree root changes.
    /// 清除所有快取；於根目錄更換時呼叫。
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

/// Walks the directory capability chain segment by segment to the target
/// file and reads its bytes.
/// 逐段走訪目錄能力鏈找到目標檔案並讀取位元組。
fn read_target(root: &dyn DirectoryHandle, target: &str) -> Result<Vec<u8>, FileAccessError> {
    let mut segments = target.split('/').peekable();
    let mut current: Option<DirectoryHandleRef> = None;

    while let Some(segment) = segments.next() {
        let directory: &dyn DirectoryHandle = match &current {
            Some(handle) => &**handle,
            None => root,
        };
        if segments.peek().is_none() {
            let file = directory.file(segment)?;
            return file.read_bytes();
        }
        let next = directory.directory(segment)?;
        current = Some(next);
    }
    Err(FileAccessError::NotFound(target.to_string()))
}

/// Guesses a MIME type from the file name extension.
/// 依副檔名推測 MIME 類型。
pub fn mime_for_name(name: &str) -> &'static str {
    let extension = name.rsplit('.').next().unwrap_or_default();
    match extension.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}

fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", BASE64.encode(bytes))
}
