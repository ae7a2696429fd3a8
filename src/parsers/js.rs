//! JavaScript 扫描模块
//!
//! 内联脚本里经常以字符串字面量的形式引用其他页面（如 `location.href = "sub/a.html"`），
//! 这些页面不会出现在任何 HTML 属性中。此模块从脚本文本中提取这类引用，
//! 交由遍历器判断是否为源目录中存在的文档。
//!
//! 只识别以 `.html` 结尾、被单引号或双引号包围的字面量。

use regex::Regex;
use std::sync::OnceLock;

fn document_literal_regex() -> &'static Regex {
    static DOCUMENT_LITERAL_REGEX: OnceLock<Regex> = OnceLock::new();
    DOCUMENT_LITERAL_REGEX
        .get_or_init(|| Regex::new(r#"['"]([^'"]+\.html)['"]"#).expect("valid document literal pattern"))
}

/// 提取脚本文本中引用的 `.html` 文档，按出现顺序返回（可能重复）
pub fn scan_document_references(script: &str) -> Vec<String> {
    document_literal_regex()
        .captures_iter(script)
        .filter_map(|captures| captures.get(1))
        .map(|reference| reference.as_str().trim().to_string())
        .collect()
}
