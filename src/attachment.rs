use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{MarkupError, MarkupResult};

/// Encode an image attachment as an inline `data:` URI. The bytes are passed
/// through untouched; only `image/*` MIME types are accepted.
pub fn encode_image_attachment(mime: &str, bytes: &[u8]) -> MarkupResult<String> {
    let mime = mime.trim().to_ascii_lowercase();
    let subtype = mime.strip_prefix("image/").unwrap_or_default();
    if subtype.is_empty()
        || !subtype
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-'))
    {
        return Err(MarkupError::InvalidArgument(format!(
            "attachment type '{}' is not an image",
            mime
        )));
    }
    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encodes_png() {
        let uri = encode_image_attachment("image/png", b"\x89PNG").unwrap();
        assert_eq!(uri, "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn test_mime_is_normalized() {
        let uri = encode_image_attachment(" Image/SVG+XML ", b"<svg/>").unwrap();
        assert!(uri.starts_with("data:image/svg+xml;base64,"));
    }

    #[test]
    fn test_rejects_non_images() {
        assert!(encode_image_attachment("application/pdf", b"%PDF").is_err());
        assert!(encode_image_attachment("image/", b"").is_err());
        assert!(encode_image_attachment("image/png\"onerror", b"").is_err());
    }
}
