//! DOM遍历器模块
//!
//! 深度优先遍历一个文档的 DOM 树，对识别的元素调用处理器并就地改写属性。
//! 遍历在每个节点上检查截止时间，到期时立即中止并向上传播，而不是静默地
//! 输出一个不完整的文档。

use markup5ever_rcdom::Handle;
use std::path::PathBuf;

use crate::core::{Mirror, MirrorError};
use crate::utils::url::BaseContext;

use super::element_handlers::{handle_element, ElementKind};

/// 一次文档处理所需的上下文
#[derive(Clone, Debug)]
pub struct DocumentPass {
    /// 规范化的文档标识（相对于源根目录）
    pub id: String,
    /// 文档内引用的解析基准
    pub base: BaseContext,
    /// 文档在输出树中的所在目录，改写后的资源路径相对于它
    pub output_dir: PathBuf,
}

/// DOM遍历和处理的入口函数
pub fn walk(mirror: &mut Mirror, pass: &DocumentPass, node: &Handle) -> Result<(), MirrorError> {
    mirror.deadline().check()?;

    if let Some(kind) = ElementKind::of(node) {
        handle_element(mirror, pass, node, kind)?;
    }

    let children: Vec<Handle> = node.children.borrow().iter().cloned().collect();
    for child_node in children.iter() {
        walk(mirror, pass, child_node)?;
    }

    Ok(())
}
