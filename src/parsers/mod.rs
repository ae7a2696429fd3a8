//! # 解析器模块
//!
//! 这个模块包含所有用于解析和改写不同类型web资源的功能：
//!
//! - HTML解析、遍历与属性改写
//! - CSS中 `url()` 引用的下载与改写
//! - 内联JavaScript中文档引用的扫描
//!
//! # 模块组织
//!
//! - `html` - HTML文档解析、DOM遍历、元素处理
//! - `css` - 样式表 `url()` 处理
//! - `js` - 脚本文本中的 `.html` 引用扫描

pub mod css;
pub mod html;
pub mod js;

// Re-export commonly used items for convenience
pub use css::process_stylesheet;
pub use html::{parse_document_bytes, serialize_document, walk, DocumentPass};
pub use js::scan_document_references;
