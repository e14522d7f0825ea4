use anyhow::Context;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;

/// Raw image bytes as received from a multipart upload.
pub struct UploadItem<'a> {
    pub body: Bytes,
    pub content_type: &'a str,
}

const DEFAULT_MIME: &str = "image/jpeg";

/// Normalise an image payload sent as text. Data URLs pass through; bare
/// base64 is assumed to be JPEG. Blank input yields `None`.
pub fn to_data_url(payload: &str) -> Option<String> {
    let payload = payload.trim();
    if payload.is_empty() {
        return None;
    }
    if payload.starts_with("data:") {
        return Some(payload.to_string());
    }
    Some(format!("data:{};base64,{}", DEFAULT_MIME, payload))
}

/// Encode an uploaded image as a data URL the gateway accepts inline.
pub fn upload_to_data_url(item: &UploadItem<'_>) -> anyhow::Result<String> {
    anyhow::ensure!(!item.body.is_empty(), "empty image upload");
    let mime = canonical_mime(item.content_type)
        .with_context(|| format!("unsupported content type {}", item.content_type))?;
    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(&item.body)))
}

pub fn is_image(content_type: &str) -> bool {
    content_type.trim().to_ascii_lowercase().starts_with("image/")
}

fn canonical_mime(ct: &str) -> Option<&'static str> {
    match ct.trim().to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => Some("image/jpeg"),
        "image/png" => Some("image/png"),
        "image/webp" => Some("image/webp"),
        "image/heic" => Some("image/heic"),
        "image/gif" => Some("image/gif"),
        _ => None,
    }
}

#[cfg(test)]
mod image_tests {
    use super::*;

    #[test]
    fn test_canonical_mime() {
        assert_eq!(canonical_mime("image/jpeg"), Some("image/jpeg"));
        assert_eq!(canonical_mime("image/jpg"), Some("image/jpeg"));
        assert_eq!(canonical_mime("IMAGE/PNG"), Some("image/png"));
        assert_eq!(canonical_mime("image/webp"), Some("image/webp"));
        assert_eq!(canonical_mime("image/heic"), Some("image/heic"));
        assert_eq!(canonical_mime("application/octet-stream"), None);
        assert_eq!(canonical_mime("whatever/else"), None);
    }

    #[test]
    fn test_to_data_url() {
        assert_eq!(to_data_url("   "), None);
        assert_eq!(
            to_data_url("data:image/png;base64,AAAA").as_deref(),
            Some("data:image/png;base64,AAAA")
        );
        assert_eq!(
            to_data_url(" /9j/4AAQ ").as_deref(),
            Some("data:image/jpeg;base64,/9j/4AAQ")
        );
    }

    #[test]
    fn test_upload_to_data_url() {
        let item = UploadItem {
            body: Bytes::from_static(b"\x89PNG"),
            content_type: "image/png",
        };
        assert_eq!(upload_to_data_url(&item).unwrap(), "data:image/png;base64,iVBORw==");

        let empty = UploadItem {
            body: Bytes::new(),
            content_type: "image/png",
        };
        assert!(upload_to_data_url(&empty).is_err());

        let text = UploadItem {
            body: Bytes::from_static(b"hello"),
            content_type: "text/plain",
        };
        let err = upload_to_data_url(&text).unwrap_err();
        assert!(err.to_string().contains("text/plain"));
    }

    #[test]
    fn test_is_image() {
        assert!(is_image("image/png"));
        assert!(is_image("Image/HEIC"));
        assert!(!is_image("application/pdf"));
    }
}
