//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量访问，命令行参数在此基础上覆盖。

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::MirrorOptions;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "SITEMIRROR_LOG_LEVEL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!("Invalid log level '{}'. Use: trace, debug, info, warn, error", value),
                }),
            }
        }
    }

    /// 禁用颜色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // NO_COLOR 遵循标准：任何值都表示禁用颜色
            Ok(!value.is_empty())
        }
    }
}

/// 镜像任务相关环境变量
pub mod mirror {
    use super::*;

    /// 输出目录
    pub struct OutputDir;
    impl EnvVar<PathBuf> for OutputDir {
        const NAME: &'static str = "SITEMIRROR_OUTPUT_DIR";
        const DEFAULT: Option<PathBuf> = None;

        fn get() -> EnvResult<PathBuf> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(PathBuf::from(crate::core::DEFAULT_OUTPUT_DIR)),
            }
        }
        const DESCRIPTION: &'static str = "Directory the mirrored tree is written to ('.' means the default)";

        fn parse(value: &str) -> EnvResult<PathBuf> {
            let value = value.trim();
            if value.is_empty() || value == "." {
                Ok(PathBuf::from(crate::core::DEFAULT_OUTPUT_DIR))
            } else {
                Ok(PathBuf::from(value))
            }
        }
    }

    /// 全局超时
    pub struct Timeout;
    impl EnvVar<Duration> for Timeout {
        const NAME: &'static str = "SITEMIRROR_TIMEOUT";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(60));
        const DESCRIPTION: &'static str = "Global deadline for the whole run in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_seconds(value, Self::NAME, 3600)
        }
    }

    /// 单个资源请求超时
    pub struct ResourceTimeout;
    impl EnvVar<Duration> for ResourceTimeout {
        const NAME: &'static str = "SITEMIRROR_RESOURCE_TIMEOUT";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(30));
        const DESCRIPTION: &'static str = "Per-request timeout for resource downloads in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_seconds(value, Self::NAME, 3600)
        }
    }

    /// 无头浏览器会话超时
    pub struct RenderTimeout;
    impl EnvVar<Duration> for RenderTimeout {
        const NAME: &'static str = "SITEMIRROR_RENDER_TIMEOUT";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(30));
        const DESCRIPTION: &'static str = "Headless browser session timeout in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_seconds(value, Self::NAME, 3600)
        }
    }

    /// 等待预取结果的时间
    pub struct RenderWait;
    impl EnvVar<Duration> for RenderWait {
        const NAME: &'static str = "SITEMIRROR_RENDER_WAIT";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(15));
        const DESCRIPTION: &'static str = "How long to wait for the pre-rendered entry document in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_seconds(value, Self::NAME, 3600)
        }
    }

    /// 页面稳定等待
    pub struct RenderSettle;
    impl EnvVar<Duration> for RenderSettle {
        const NAME: &'static str = "SITEMIRROR_RENDER_SETTLE";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(5));
        const DESCRIPTION: &'static str = "Pause after navigation and after scrolling, in seconds (0 disables)";

        fn parse(value: &str) -> EnvResult<Duration> {
            let seconds: u64 = value.trim().parse().map_err(|_| EnvError {
                variable: Self::NAME.to_string(),
                message: "Must be a valid number of seconds".to_string(),
            })?;
            Ok(Duration::from_secs(seconds))
        }
    }

    /// User-Agent
    pub struct UserAgent;
    impl EnvVar<String> for UserAgent {
        const NAME: &'static str = "SITEMIRROR_USER_AGENT";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(crate::core::DEFAULT_USER_AGENT.to_string()),
            }
        }
        const DESCRIPTION: &'static str = "User-Agent sent with resource requests and by the headless browser";

        fn parse(value: &str) -> EnvResult<String> {
            let value = value.trim();
            if value.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "User-Agent must not be empty".to_string(),
                });
            }
            Ok(value.to_string())
        }
    }
}

/// 辅助函数
fn parse_seconds(value: &str, var_name: &str, max: u64) -> EnvResult<Duration> {
    let seconds: u64 = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid number of seconds".to_string(),
    })?;

    if seconds == 0 {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: "Timeout must be greater than 0".to_string(),
        });
    }

    if seconds > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Timeout too long (max {} seconds)", max),
        });
    }

    Ok(Duration::from_secs(seconds))
}

/// 按优先级加载 .env 文件，找到第一个存在的文件即停止
pub fn load_dotenv() {
    let env_files = [".env.local", ".env"];

    for env_file in &env_files {
        if Path::new(env_file).exists() {
            match dotenv::from_filename(env_file) {
                Ok(_) => {
                    tracing::debug!("已加载环境变量文件: {}", env_file);
                    return;
                }
                Err(e) => {
                    tracing::warn!("无法加载环境变量文件 {}: {}", env_file, e);
                }
            }
        }
    }
}

impl MirrorOptions {
    /// 从环境变量加载配置，未设置的项使用默认值
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            output_dir: mirror::OutputDir::get()?,
            timeout: mirror::Timeout::get()?,
            resource_timeout: mirror::ResourceTimeout::get()?,
            render_timeout: mirror::RenderTimeout::get()?,
            render_wait: mirror::RenderWait::get()?,
            render_settle: mirror::RenderSettle::get()?,
            user_agent: mirror::UserAgent::get()?,
            ..Self::default()
        })
    }
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("# Environment Variables Documentation\n\n");

    docs.push_str("## Core Configuration\n\n");
    docs.push_str(&format!(
        "- `{}`: {} (default: \"info\")\n",
        core::LogLevel::NAME,
        core::LogLevel::DESCRIPTION
    ));
    docs.push_str(&format!(
        "- `{}`: {} (default: {:?})\n",
        core::NoColor::NAME,
        core::NoColor::DESCRIPTION,
        core::NoColor::DEFAULT
    ));

    docs.push_str("\n## Mirror Configuration\n\n");
    docs.push_str(&format!(
        "- `{}`: {} (default: {:?})\n",
        mirror::OutputDir::NAME,
        mirror::OutputDir::DESCRIPTION,
        crate::core::DEFAULT_OUTPUT_DIR
    ));

    let durations = [
        (mirror::Timeout::NAME, mirror::Timeout::DESCRIPTION, mirror::Timeout::DEFAULT),
        (
            mirror::ResourceTimeout::NAME,
            mirror::ResourceTimeout::DESCRIPTION,
            mirror::ResourceTimeout::DEFAULT,
        ),
        (
            mirror::RenderTimeout::NAME,
            mirror::RenderTimeout::DESCRIPTION,
            mirror::RenderTimeout::DEFAULT,
        ),
        (mirror::RenderWait::NAME, mirror::RenderWait::DESCRIPTION, mirror::RenderWait::DEFAULT),
        (
            mirror::RenderSettle::NAME,
            mirror::RenderSettle::DESCRIPTION,
            mirror::RenderSettle::DEFAULT,
        ),
    ];
    for (name, description, default) in durations {
        docs.push_str(&format!(
            "- `{}`: {} (default: {})\n",
            name,
            description,
            default.map(|d| d.as_secs()).unwrap_or_default()
        ));
    }

    docs.push_str(&format!(
        "- `{}`: {} (default: {:?})\n",
        mirror::UserAgent::NAME,
        mirror::UserAgent::DESCRIPTION,
        crate::core::DEFAULT_USER_AGENT
    ));

    docs
}
