//! # 工具模块
//!
//! 这个模块包含各种工具函数和实用程序：
//!
//! - 引用解析：把文档或样式表中的引用解析为绝对的抓取目标
//! - 路径计算：输出目录之间的相对路径、文档标识规范化
//! - 全局截止时间
//!
//! # 模块组织
//!
//! - `url` - 引用过滤、抓取目标解析、文件名推导
//! - `path` - 词法路径规范化与相对路径计算
//! - `deadline` - 整个运行共享的截止时间令牌

pub mod deadline;
pub mod path;
pub mod url;

// Re-export commonly used items for convenience
pub use deadline::Deadline;
pub use path::{join_document_path, normalize_document_id, normalize_path, relativize, to_slash};
pub use url::{
    document_base_url, is_external_reference, is_font_file, is_ignorable_link,
    is_stylesheet_file, remote_document_id, resolve_fetch_target, BaseContext, FetchTarget, TargetLocation, Url,
};
