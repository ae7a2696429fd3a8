//! 引用解析
//!
//! 文档和样式表里的引用字符串需要先解析成唯一的抓取目标（绝对 URL 或
//! 绝对本地路径），资源缓存以此为键。无法抓取的引用（片段、`data:`、
//! `javascript:` 等）返回 `None`，调用方应保持原属性不变。

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
pub use url::Url;

use crate::core::MirrorError;

use super::path::{normalize_document_id, normalize_path};

/// Reference prefixes that never point at something worth downloading.
const IGNORED_PREFIXES: &[&str] = &[
    "#",
    "about:",
    "blob:",
    "chrome-extension:",
    "chrome:",
    "data:",
    "javascript:",
    "mailto:",
    "sms:",
    "tel:",
];

const FONT_EXTENSIONS: &[&str] = &["eot", "otf", "ttf", "woff", "woff2"];

/// Checks whether a reference must be left untouched (empty, fragment-only
/// or a non-fetchable scheme).
pub fn is_ignorable_link(link: &str) -> bool {
    let link = link.trim().to_ascii_lowercase();

    link.is_empty() || IGNORED_PREFIXES.iter().any(|prefix| link.starts_with(prefix))
}

/// Absolute `http(s)://` or scheme-relative `//host/...` references.
pub fn is_external_reference(link: &str) -> bool {
    let link = link.trim().to_ascii_lowercase();

    link.starts_with("http://") || link.starts_with("https://") || link.starts_with("//")
}

pub fn is_font_file(file_name: &str) -> bool {
    extension_of(file_name)
        .map(|extension| FONT_EXTENSIONS.contains(&extension.as_str()))
        .unwrap_or(false)
}

pub fn is_stylesheet_file(file_name: &str) -> bool {
    extension_of(file_name).as_deref() == Some("css")
}

fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .map(|extension| extension.to_string_lossy().to_ascii_lowercase())
}

/// The location references found inside a document or stylesheet are
/// resolved against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BaseContext {
    /// A directory inside the local source tree rooted at `root`.
    Local { root: PathBuf, dir: PathBuf },
    /// A remote URL prefix.
    Remote(Url),
}

impl BaseContext {
    pub fn is_remote(&self) -> bool {
        matches!(self, BaseContext::Remote(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetLocation {
    Local { root: PathBuf, path: PathBuf },
    Remote(Url),
}

/// A fully resolved resource location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchTarget {
    /// Absolute URL or absolute local path; the resource cache key.
    pub identity: String,
    pub location: TargetLocation,
}

impl FetchTarget {
    fn remote(mut url: Url) -> Option<Self> {
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        url.set_fragment(None);

        Some(FetchTarget {
            identity: url.to_string(),
            location: TargetLocation::Remote(url),
        })
    }

    fn local(root: &Path, path: PathBuf) -> Self {
        let identity = std::path::absolute(&path)
            .map(|absolute| normalize_path(&absolute))
            .unwrap_or_else(|_| path.clone());

        FetchTarget {
            identity: identity.to_string_lossy().into_owned(),
            location: TargetLocation::Local {
                root: root.to_path_buf(),
                path,
            },
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.location, TargetLocation::Remote(_))
    }

    /// Derives the flattened file name this resource is stored under.
    ///
    /// Best effort only: the last path segment with any query dropped. When
    /// nothing usable is left the name is synthesized as `<host>.js` for
    /// remote targets (typically extensionless script endpoints) and
    /// `resource.bin` otherwise.
    pub fn file_name(&self) -> String {
        let name = match &self.location {
            TargetLocation::Remote(url) => url
                .path()
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
                .unwrap_or_default(),
            TargetLocation::Local { path, .. } => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        let name = name
            .split('?')
            .next()
            .unwrap_or_default()
            .replace(['/', '\\'], "_");

        if name.is_empty() || name == "." || name == ".." {
            match &self.location {
                TargetLocation::Remote(url) if url.host_str().is_some() => {
                    format!("{}.js", url.host_str().unwrap_or_default())
                }
                _ => "resource.bin".to_string(),
            }
        } else {
            name
        }
    }

    /// Base context for references found inside this resource when it turns
    /// out to be a stylesheet.
    pub fn stylesheet_base(&self) -> BaseContext {
        match &self.location {
            TargetLocation::Remote(url) => BaseContext::Remote(url.clone()),
            TargetLocation::Local { root, path } => BaseContext::Local {
                root: root.clone(),
                dir: path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.clone()),
            },
        }
    }
}

/// Resolves `reference` against `base` into an absolute fetch target.
///
/// Returns `Ok(None)` for references that must be skipped. Absolute and
/// scheme-relative URLs found in local documents become remote targets.
pub fn resolve_fetch_target(
    reference: &str,
    base: &BaseContext,
) -> Result<Option<FetchTarget>, MirrorError> {
    let reference = reference.trim();
    if is_ignorable_link(reference) {
        return Ok(None);
    }

    match base {
        BaseContext::Remote(base_url) => {
            let url = base_url
                .join(reference)
                .map_err(|e| MirrorError::invalid_reference(reference, e))?;
            Ok(FetchTarget::remote(url))
        }
        BaseContext::Local { root, dir } => {
            if let Some(rest) = reference.strip_prefix("//") {
                let url = Url::parse(&format!("https://{rest}"))
                    .map_err(|e| MirrorError::invalid_reference(reference, e))?;
                return Ok(FetchTarget::remote(url));
            }
            if let Ok(url) = Url::parse(reference) {
                return Ok(FetchTarget::remote(url));
            }

            let relative = reference.split(['?', '#']).next().unwrap_or_default();
            if relative.is_empty() {
                return Ok(None);
            }

            let path = match relative.strip_prefix('/') {
                Some(from_root) => root.join(from_root),
                None => dir.join(relative),
            };

            Ok(Some(FetchTarget::local(root, normalize_path(&path))))
        }
    }
}

/// Base URL for references inside a rendered document: the containing
/// directory when the URL names a concrete file, the URL itself otherwise.
pub fn document_base_url(url: &Url) -> Url {
    let last_segment = url.path().rsplit('/').next().unwrap_or_default();

    if Path::new(last_segment).extension().is_none() {
        return url.clone();
    }

    let mut base = url.clone();
    base.set_query(None);
    base.set_fragment(None);
    if let Ok(mut segments) = base.path_segments_mut() {
        segments.pop().push("");
    }
    base
}

/// Resolves a nested document reference inside a rendered document.
///
/// The reference is joined onto the document's `base` URL the way a browser
/// would, then expressed as a document id relative to the remote `root`.
/// Returns `None` for other origins and for paths outside the root.
pub fn remote_document_id(root: &Url, base: &Url, reference: &str) -> Option<String> {
    let target = base.join(reference.trim()).ok()?;

    if target.origin() != root.origin() {
        return None;
    }

    let root_path = match root.path().rsplit_once('/') {
        Some((directory, _)) => format!("{directory}/"),
        None => "/".to_string(),
    };
    let relative = target.path().strip_prefix(root_path.as_str())?;
    normalize_document_id(relative)
}
