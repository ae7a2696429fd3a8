use encoding_rs::Encoding;
use html5ever::serialize::{serialize, SerializeOpts};
use markup5ever_rcdom::{RcDom, SerializableHandle};

use crate::core::MirrorError;

/// 序列化文档，并按文档原有编码重新编码
pub fn serialize_document(dom: RcDom, document_encoding: &str) -> Result<Vec<u8>, MirrorError> {
    let mut buf: Vec<u8> = Vec::new();

    let serializable: SerializableHandle = dom.document.into();
    serialize(&mut buf, &serializable, SerializeOpts::default())
        .map_err(|e| MirrorError::Markup(format!("unable to serialize DOM: {e}")))?;

    if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
        if encoding != encoding_rs::UTF_8 {
            let s: &str = &String::from_utf8_lossy(&buf);
            let (data, _, _) = encoding.encode(s);
            buf = data.into_owned();
        }
    }

    Ok(buf)
}
