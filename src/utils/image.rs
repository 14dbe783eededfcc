use base64::Engine;

use super::error::AppError;

/// Detecta o tipo da imagem pelos primeiros bytes
fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

/// Normalizes an uploaded avatar into a `data:<mime>;base64,<payload>` URI.
///
/// Accepts either a data URI or bare base64. The payload must decode, be
/// non-empty and fit in `max_bytes`. Bare base64 must be a recognizable
/// PNG/JPEG/GIF/WEBP image.
pub fn normalize_image_data(input: &str, max_bytes: usize) -> Result<String, AppError> {
    let input = input.trim();

    let (declared_mime, payload) = match input.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest
                .split_once(',')
                .ok_or_else(|| AppError::InvalidRequest("malformed image data URI".to_string()))?;
            let mime = header
                .strip_suffix(";base64")
                .ok_or_else(|| AppError::InvalidRequest("image data URI must be base64 encoded".to_string()))?;
            if !mime.starts_with("image/") {
                return Err(AppError::InvalidRequest(format!("unsupported media type: {}", mime)));
            }
            (Some(mime), payload)
        }
        None => (None, input),
    };

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|_| AppError::InvalidRequest("image data is not valid base64".to_string()))?;

    if bytes.is_empty() {
        return Err(AppError::InvalidRequest("image data is empty".to_string()));
    }
    if bytes.len() > max_bytes {
        return Err(AppError::InvalidRequest(format!(
            "image is too large ({} bytes, max {})",
            bytes.len(),
            max_bytes
        )));
    }

    let mime = match declared_mime {
        Some(m) => m,
        None => sniff_mime(&bytes)
            .ok_or_else(|| AppError::InvalidRequest("unrecognized image format".to_string()))?,
    };

    Ok(format!("data:{};base64,{}", mime, payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_base64() -> String {
        let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
        bytes.extend_from_slice(&[0u8; 16]);
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    #[test]
    fn test_data_uri_is_kept() {
        let uri = format!("data:image/png;base64,{}", png_base64());
        assert_eq!(normalize_image_data(&uri, 1024).unwrap(), uri);
    }

    #[test]
    fn test_bare_base64_gets_sniffed_mime() {
        let out = normalize_image_data(&png_base64(), 1024).unwrap();
        assert!(out.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_rejects_invalid_base64() {
        let err = normalize_image_data("data:image/png;base64,@@not-base64@@", 1024).unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[test]
    fn test_rejects_non_image_mime() {
        let err = normalize_image_data("data:text/plain;base64,aGVsbG8=", 1024).unwrap_err();
        assert_eq!(err.client_message(), "unsupported media type: text/plain");
    }

    #[test]
    fn test_rejects_oversized_payload() {
        let err = normalize_image_data(&png_base64(), 8).unwrap_err();
        assert!(err.client_message().starts_with("image is too large"));
    }

    #[test]
    fn test_rejects_unknown_bare_bytes() {
        // "hello world"
        let err = normalize_image_data("aGVsbG8gd29ybGQ=", 1024).unwrap_err();
        assert_eq!(err.client_message(), "unrecognized image format");
    }
}
