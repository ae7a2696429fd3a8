//! CSS 处理模块
//!
//! 样式表中的 `url(...)` 引用（背景图、字体、`@import url(...)` 等）会被下载到
//! 资源目录中，并把引用改写为相对于样式表自身输出位置的路径。
//!
//! 处理是纯文本层面的：不解析 CSS 语法，只替换匹配到的 `url()` 片段，其余字节
//! 原样保留（包括非 UTF-8 内容）。单个资源失败时保留原片段不变；只有全局截止
//! 时间到期才会中止整个样式表的处理。
//!
//! 注意：`@import "x.css"` 这种不带 `url()` 的写法不会被跟随。

use regex::bytes::{Captures, Regex};
use std::path::Path;
use std::sync::OnceLock;
use tracing::warn;

use crate::core::MirrorError;
use crate::network::session::Session;
use crate::utils::path::relativize;
use crate::utils::url::BaseContext;

fn url_regex() -> &'static Regex {
    static URL_REGEX: OnceLock<Regex> = OnceLock::new();
    URL_REGEX.get_or_init(|| {
        Regex::new(r#"url\(\s*['"]?(.*?)['"]?\s*\)"#).expect("valid url() pattern")
    })
}

/// 改写样式表中的 `url()` 引用
///
/// # 参数
///
/// * `session` - 资源存储，负责下载和去重
/// * `data` - 样式表原始字节
/// * `base` - 样式表内引用的解析基准（样式表自身所在的目录或 URL）
/// * `stylesheet_dir` - 样式表在输出树中的目录，改写后的路径相对于它
///
/// # 返回值
///
/// 改写后的样式表字节；截止时间到期时返回 `DeadlineExceeded`
pub fn process_stylesheet(
    session: &mut Session,
    data: &[u8],
    base: &BaseContext,
    stylesheet_dir: &Path,
) -> Result<Vec<u8>, MirrorError> {
    let mut output: Vec<u8> = Vec::with_capacity(data.len());
    let mut last = 0;

    for captures in url_regex().captures_iter(data) {
        session.deadline().check()?;

        let Some(whole) = captures.get(0) else {
            continue;
        };
        output.extend_from_slice(&data[last..whole.start()]);
        last = whole.end();

        match rewrite_url(session, &captures, base, stylesheet_dir) {
            Ok(Some(replacement)) => output.extend_from_slice(replacement.as_bytes()),
            Ok(None) => output.extend_from_slice(whole.as_bytes()),
            Err(e) if e.is_deadline() => return Err(e),
            Err(e) => {
                warn!("keeping {}: {}", String::from_utf8_lossy(whole.as_bytes()), e);
                output.extend_from_slice(whole.as_bytes());
            }
        }
    }

    output.extend_from_slice(&data[last..]);
    Ok(output)
}

fn rewrite_url(
    session: &mut Session,
    captures: &Captures,
    base: &BaseContext,
    stylesheet_dir: &Path,
) -> Result<Option<String>, MirrorError> {
    let link = captures
        .get(1)
        .map(|link| String::from_utf8_lossy(link.as_bytes()).trim().to_string())
        .unwrap_or_default();

    let saved = match session.acquire_resource(&link, base)? {
        Some(saved) => saved,
        None => return Ok(None),
    };

    Ok(Some(format!("url('{}')", relativize(stylesheet_dir, &saved))))
}
