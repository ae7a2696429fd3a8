//! # 网络模块
//!
//! 这个模块包含所有与资源获取、缓存和页面渲染相关的功能：
//!
//! - HTTP会话管理和资源下载（本地文件读取同样经过这里）
//! - 按抓取标识去重的资源缓存
//! - 无头浏览器渲染以及入口文档的后台预取
//!
//! # 模块组织
//!
//! - `session` - 资源存储：下载、样式表处理、落盘与统计
//! - `cache` - 抓取标识到输出路径的映射
//! - `render` - 无头浏览器渲染器与单槽预取结果

pub mod cache;
pub mod render;
pub mod session;

// Re-export commonly used items for convenience
pub use cache::ResourceCache;
pub use render::{HeadlessRenderer, RenderFuture, Renderer};
pub use session::Session;
