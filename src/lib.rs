//! # Sitemirror Library
//!
//! 将一个网页（本地目录或远程 URL）及其引用的所有资源镜像到一个可离线浏览的输出目录中。
//!
//! ## 模块组织
//!
//! - `core` - 错误类型、运行配置、输出布局与镜像流程编排
//! - `acquirer` - 文档获取（本地读取或无头浏览器渲染）
//! - `parsers` - 资源解析器（HTML、CSS、JavaScript）
//! - `network` - 资源下载、缓存与后台渲染
//! - `utils` - 引用解析、路径计算与截止时间
//! - `env` - 环境变量配置
//! - `cli` - 命令行交互（可选）

pub mod acquirer;
#[cfg(feature = "cli")]
pub mod cli;
pub mod core;
pub mod env;
pub mod network;
pub mod parsers;
pub mod utils;

// Re-export commonly used items for convenience
pub use crate::core::{
    CrawlContext, Mirror, MirrorError, MirrorOptions, MirrorOutcome, OutputLayout, Preflight,
    Statistics,
};
pub use crate::network::{HeadlessRenderer, Renderer, Session};
pub use crate::utils::Deadline;
