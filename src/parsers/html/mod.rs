//! HTML解析和处理模块
//!
//! - `dom`: 解析、编码检测与基础DOM操作
//! - `serializer`: 序列化并还原文档编码
//! - `element_handlers`: 按元素种类改写引用
//! - `walker`: DOM遍历核心逻辑

pub mod dom;
pub mod element_handlers;
pub mod serializer;
pub mod walker;

pub use dom::{
    find_nodes, get_charset, get_node_attr, get_node_name, get_node_text, html_to_dom,
    parse_document_bytes, set_node_attr,
};
pub use element_handlers::ElementKind;
pub use serializer::serialize_document;
pub use walker::{walk, DocumentPass};
