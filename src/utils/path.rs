//! 路径计算
//!
//! 输出树中的文档可能位于任意深度，而资源只会落在两个扁平目录中。
//! 这里的函数都是纯词法运算，不访问文件系统。

use std::path::{Component, Path, PathBuf};

/// Lexically resolves `.` and `..` components.
///
/// A `..` that would climb above a relative path's start is kept, one that
/// would climb above the filesystem root is dropped.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }

    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}

/// Renders a path with forward slashes regardless of platform.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter(|component| *component != Component::CurDir)
        .map(|component| match component {
            Component::RootDir => String::new(),
            other => other.as_os_str().to_string_lossy().into_owned(),
        })
        .collect::<Vec<String>>()
        .join("/")
}

/// Computes the link a file living in `from_dir` must use to reach `to_path`.
///
/// Both paths must be expressed in the same space (both relative to the same
/// working directory, or both absolute).
pub fn relativize(from_dir: &Path, to_path: &Path) -> String {
    let from = normalize_path(from_dir);
    let to = normalize_path(to_path);

    let from_components: Vec<Component> = from
        .components()
        .filter(|component| *component != Component::CurDir)
        .collect();
    let to_components: Vec<Component> = to
        .components()
        .filter(|component| *component != Component::CurDir)
        .collect();

    let common = from_components
        .iter()
        .zip(to_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    for _ in common..from_components.len() {
        parts.push("..".to_string());
    }
    for component in &to_components[common..] {
        parts.push(component.as_os_str().to_string_lossy().into_owned());
    }

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Turns a document reference into the identifier used by the visited set
/// and the output tree: forward slashes, no leading slash, no query or
/// fragment, dot segments resolved.
///
/// Returns `None` when the reference is empty or escapes the source root.
pub fn normalize_document_id(reference: &str) -> Option<String> {
    let reference = reference
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim()
        .replace('\\', "/");
    let reference = reference.trim_start_matches('/');

    if reference.is_empty() {
        return None;
    }

    let normalized = normalize_path(Path::new(reference));
    match normalized.components().next() {
        Some(Component::Normal(_)) => Some(to_slash(&normalized)),
        _ => None,
    }
}

/// Resolves a nested document reference found inside `current_document`.
///
/// Root-relative references (`/about.html`) are taken from the source root,
/// everything else from the referencing document's directory.
pub fn join_document_path(current_document: &str, reference: &str) -> Option<String> {
    let reference = reference.trim().replace('\\', "/");

    if reference.starts_with('/') {
        return normalize_document_id(&reference);
    }

    match current_document.rsplit_once('/') {
        Some((directory, _)) => normalize_document_id(&format!("{directory}/{reference}")),
        None => normalize_document_id(&reference),
    }
}
