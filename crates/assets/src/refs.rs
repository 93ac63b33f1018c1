use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static IMAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"!\[(?P<alt>[^\]]*)\]\((?P<ref>[^)\s]+)(?P<title>\s+"[^"]*")?\)"#)
        .expect("image reference pattern")
});

/// Rewrites every `![alt](ref)` occurrence through the provided resolver.
/// 以指定的解析函式改寫所有 `![alt](ref)` 圖片參照。
///
/// Seam for hosts whose external renderer consumes a resolved string instead
/// of an image-handler callback. Alt text and optional titles are preserved.
/// 供外部渲染器僅接受已解析字串的宿主使用；alt 文字與標題保持不變。
pub fn rewrite_image_references<F>(text: &str, mut resolve: F) -> String
where
    F: FnMut(&str) -> String,
{
    IMAGE_RE
        .replace_all(text, |captures: &Captures<'_>| {
            let alt = &captures["alt"];
            let resolved = resolve(&captures["ref"]);
            let title = captures.name("title").map(|m| m.as_str()).unwrap_or("");
            format!("![{alt}]({resolved}{title})")
        })
        .into_owned()
}
