//! HTML 元素处理器模块
//!
//! 遍历器只关心一个封闭的元素集合：`script`、`link`、`img`、`iframe`，其余元素
//! 一律视为 `Other`，只继续遍历其子节点。每种元素对应一个显式的处理函数。
//!
//! # 处理规则
//!
//! | 元素 | 属性 | 行为 |
//! |------|------|------|
//! | `script` | `src` | 下载资源并改写为相对路径；本地模式下还会扫描内联脚本中的 `.html` 字面量 |
//! | `link` | `href` | 下载资源（样式表会继续处理其中的 `url()`）并改写 |
//! | `img` | `src`、`data-src` | 下载资源并改写 |
//! | `iframe` | `src` | 作为嵌套文档递归处理，成功后规范化路径分隔符（远程根相对引用改写为相对路径） |
//!
//! 单个资源失败时保留原属性；截止时间到期的错误始终向上传播。

use markup5ever_rcdom::Handle;
use tracing::{debug, warn};

use crate::core::{Mirror, MirrorError};
use crate::parsers::js::scan_document_references;
use crate::utils::path::{join_document_path, relativize};
use crate::utils::url::{is_external_reference, is_ignorable_link, BaseContext};

use super::dom::{get_node_attr, get_node_name, get_node_text, set_node_attr};
use super::walker::DocumentPass;

/// 遍历器识别的元素种类
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
    Script,
    Link,
    Img,
    Iframe,
    Other,
}

impl ElementKind {
    pub fn of(node: &Handle) -> Option<Self> {
        let kind = match get_node_name(node)? {
            "script" => ElementKind::Script,
            "link" => ElementKind::Link,
            "img" => ElementKind::Img,
            "iframe" => ElementKind::Iframe,
            _ => ElementKind::Other,
        };
        Some(kind)
    }
}

/// 按元素种类分派处理
pub fn handle_element(
    mirror: &mut Mirror,
    pass: &DocumentPass,
    node: &Handle,
    kind: ElementKind,
) -> Result<(), MirrorError> {
    match kind {
        ElementKind::Script => handle_script(mirror, pass, node),
        ElementKind::Link => rewrite_resource_attr(mirror, pass, node, "href"),
        ElementKind::Img => {
            rewrite_resource_attr(mirror, pass, node, "src")?;
            rewrite_resource_attr(mirror, pass, node, "data-src")
        }
        ElementKind::Iframe => handle_iframe(mirror, pass, node),
        ElementKind::Other => Ok(()),
    }
}

/// SCRIPT 元素：外部脚本按资源处理，内联脚本（仅本地模式）扫描文档引用
fn handle_script(mirror: &mut Mirror, pass: &DocumentPass, node: &Handle) -> Result<(), MirrorError> {
    rewrite_resource_attr(mirror, pass, node, "src")?;

    if pass.base.is_remote() {
        return Ok(());
    }

    for reference in scan_document_references(&get_node_text(node)) {
        mirror.deadline().check()?;

        if is_ignorable_link(&reference) || is_external_reference(&reference) {
            continue;
        }
        let Some(document_id) = join_document_path(&pass.id, &reference) else {
            continue;
        };
        if mirror.visited().contains(&document_id) {
            continue;
        }

        if mirror.local_document_exists(&document_id) {
            debug!("script in {} references {}", pass.id, document_id);
            mirror.process_nested_document(&document_id)?;
        }
    }

    Ok(())
}

/// IFRAME 元素：嵌套文档
///
/// 输出树保持源文档的目录结构，所以原相对引用仍然有效，成功后只把 `\` 换成 `/`。
/// 远程模式下引用按浏览器规则相对当前文档 URL 解析，以 `/` 开头的引用指向站点根目录，
/// 成功后改写为相对输出路径。
fn handle_iframe(mirror: &mut Mirror, pass: &DocumentPass, node: &Handle) -> Result<(), MirrorError> {
    let Some(value) = get_node_attr(node, "src") else {
        return Ok(());
    };
    let reference = value.trim();

    if is_ignorable_link(reference) || is_external_reference(reference) {
        return Ok(());
    }
    let document_id = match &pass.base {
        BaseContext::Remote(base) => mirror.remote_document_id(base, reference),
        BaseContext::Local { .. } => join_document_path(&pass.id, reference),
    };
    let Some(document_id) = document_id else {
        warn!("iframe in {} points outside the source root: {}", pass.id, reference);
        return Ok(());
    };

    if !mirror.process_nested_document(&document_id)? {
        return Ok(());
    }

    let rewritten = if pass.base.is_remote() && reference.starts_with('/') {
        relativize(&pass.output_dir, &mirror.layout().document_path(&document_id))
    } else {
        reference.replace('\\', "/")
    };
    set_node_attr(node, "src", &rewritten);

    Ok(())
}

/// 下载属性引用的资源，并把属性改写为相对于当前文档输出目录的路径
fn rewrite_resource_attr(
    mirror: &mut Mirror,
    pass: &DocumentPass,
    node: &Handle,
    attr_name: &str,
) -> Result<(), MirrorError> {
    let Some(value) = get_node_attr(node, attr_name) else {
        return Ok(());
    };
    let reference = value.trim();

    if is_ignorable_link(reference) {
        return Ok(());
    }

    match mirror.session.acquire_resource(reference, &pass.base) {
        Ok(Some(saved)) => {
            set_node_attr(node, attr_name, &relativize(&pass.output_dir, &saved));
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(e) if e.is_deadline() => Err(e),
        Err(e) => {
            warn!("leaving {}=\"{}\" unchanged: {}", attr_name, reference, e);
            Ok(())
        }
    }
}
