use encoding_rs::Encoding;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::core::MirrorError;

/// 将 HTML 字节按给定编码解码后转换为 DOM
pub fn html_to_dom(data: &[u8], document_encoding: &str) -> Result<RcDom, MirrorError> {
    let s: String = match Encoding::for_label(document_encoding.as_bytes()) {
        Some(encoding) => {
            let (string, _, _) = encoding.decode(data);
            string.into_owned()
        }
        None => String::from_utf8_lossy(data).into_owned(),
    };

    parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut s.as_bytes())
        .map_err(|e| MirrorError::Markup(e.to_string()))
}

/// 解析文档并确定其编码
///
/// 已知编码（远程渲染结果固定为 UTF-8）直接使用；否则先按 UTF-8 解析，
/// 若 `<meta charset>` 声明了有效的其他编码，再按该编码重新解析。
pub fn parse_document_bytes(
    data: &[u8],
    known_encoding: Option<&str>,
) -> Result<(RcDom, String), MirrorError> {
    if let Some(encoding) = known_encoding {
        return Ok((html_to_dom(data, encoding)?, encoding.to_string()));
    }

    let mut document_encoding = "utf-8".to_string();
    let mut dom = html_to_dom(data, &document_encoding)?;

    if let Some(html_charset) = get_charset(&dom.document) {
        if let Some(charset) = Encoding::for_label_no_replacement(html_charset.trim().as_bytes()) {
            if charset != encoding_rs::UTF_8 {
                document_encoding = charset.name().to_string();
                dom = html_to_dom(data, &document_encoding)?;
            }
        }
    }

    Ok((dom, document_encoding))
}

/// 查找指定路径的DOM节点
pub fn find_nodes(node: &Handle, node_names: &[&str]) -> Vec<Handle> {
    let mut found_nodes = Vec::new();

    let Some((node_name, rest)) = node_names.split_first() else {
        return found_nodes;
    };

    match get_node_name(node) {
        Some(name) if name == *node_name && rest.is_empty() => {
            found_nodes.push(node.clone());
            for child_node in node.children.borrow().iter() {
                found_nodes.append(&mut find_nodes(child_node, node_names));
            }
        }
        Some(name) if name == *node_name => {
            for child_node in node.children.borrow().iter() {
                found_nodes.append(&mut find_nodes(child_node, rest));
            }
        }
        _ => {
            for child_node in node.children.borrow().iter() {
                found_nodes.append(&mut find_nodes(child_node, node_names));
            }
        }
    }

    found_nodes
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == attr_name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 设置已存在的节点属性
///
/// 只改写已有属性的值；引用被跳过时原属性保持不变，所以这里从不新增属性。
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: &str) {
    if let NodeData::Element { attrs, .. } = &node.data {
        for attr in attrs.borrow_mut().iter_mut() {
            if &*attr.name.local == attr_name {
                attr.value.clear();
                attr.value.push_slice(attr_value);
            }
        }
    }
}

/// 拼接节点直接子文本节点的内容（用于内联脚本）
pub fn get_node_text(node: &Handle) -> String {
    let mut text = String::new();

    for child_node in node.children.borrow().iter() {
        if let NodeData::Text { contents } = &child_node.data {
            text.push_str(&contents.borrow());
        }
    }

    text
}

/// 获取文档声明的字符集
pub fn get_charset(node: &Handle) -> Option<String> {
    for meta_node in find_nodes(node, &["html", "head", "meta"]).iter() {
        // <meta charset="..." />
        if let Some(charset) = get_node_attr(meta_node, "charset") {
            return Some(charset);
        }

        // <meta http-equiv="content-type" content="text/html; charset=..." />
        if get_node_attr(meta_node, "http-equiv")
            .unwrap_or_default()
            .eq_ignore_ascii_case("content-type")
        {
            if let Some(content) = get_node_attr(meta_node, "content") {
                if let Some(charset) = parse_content_type_charset(&content) {
                    return Some(charset);
                }
            }
        }
    }

    None
}

fn parse_content_type_charset(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|parameter| {
        let (key, value) = parameter.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\'']).to_string())
    })
}
