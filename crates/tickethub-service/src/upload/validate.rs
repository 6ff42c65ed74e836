//! Upload validation: extension allowlist and content signature checks.
//!
//! Image files are verified against their magic bytes — an upload whose
//! content does not match its image extension is rejected, which blocks
//! content-type tricks on the static uploads route.

use tickethub_core::error::AppError;
use tickethub_core::result::AppResult;

/// Extensions accepted for message attachments.
const ALLOWED_EXTENSIONS: &[&str] = &[
    "jpeg", "jpg", "png", "gif", "webp", "pdf", "doc", "docx", "txt", "zip", "rar", "7z", "log",
    "conf", "json", "xml", "csv", "mp4", "webm",
];

/// Extensions accepted for avatar uploads.
const AVATAR_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Lowercased extension of a filename, without the dot.
pub fn extension_of(filename: &str) -> Option<String> {
    std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// Whether the extension is allowed for attachments.
pub fn extension_allowed(ext: &str) -> bool {
    ALLOWED_EXTENSIONS.contains(&ext)
}

/// Whether the extension is allowed for avatars.
pub fn avatar_extension_allowed(ext: &str) -> bool {
    AVATAR_EXTENSIONS.contains(&ext)
}

/// Validate an upload's content against its extension and detect its
/// MIME type. Non-image extensions pass through with a type from the
/// extension map.
pub fn validate_and_detect(filename: &str, bytes: &[u8]) -> AppResult<Option<String>> {
    let ext = extension_of(filename)
        .ok_or_else(|| AppError::validation("File has no extension"))?;

    if !extension_allowed(&ext) {
        return Err(AppError::validation("File type not allowed"));
    }

    if let Some(mime) = image_mime(&ext) {
        if !image_signature_valid(&ext, bytes) {
            return Err(AppError::validation("Invalid image file"));
        }
        return Ok(Some(mime.to_string()));
    }

    Ok(mime_by_extension(&ext).map(str::to_string))
}

fn image_mime(ext: &str) -> Option<&'static str> {
    match ext {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

fn mime_by_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "pdf" => Some("application/pdf"),
        "txt" | "log" | "conf" => Some("text/plain"),
        "json" => Some("application/json"),
        "xml" => Some("application/xml"),
        "csv" => Some("text/csv"),
        "zip" => Some("application/zip"),
        "mp4" => Some("video/mp4"),
        "webm" => Some("video/webm"),
        _ => None,
    }
}

/// Check the content signature for an image extension.
fn image_signature_valid(ext: &str, bytes: &[u8]) -> bool {
    match ext {
        "jpg" | "jpeg" => jpeg_valid(bytes),
        "gif" => gif_valid(bytes),
        "webp" => webp_valid(bytes),
        "png" => png_valid(bytes),
        _ => false,
    }
}

/// JPEG: SOI marker at the start, EOI marker at the end.
fn jpeg_valid(bytes: &[u8]) -> bool {
    bytes.len() >= 4
        && bytes[0] == 0xff
        && bytes[1] == 0xd8
        && bytes[bytes.len() - 2] == 0xff
        && bytes[bytes.len() - 1] == 0xd9
}

/// GIF: `GIF87a`/`GIF89a` header and the `;` trailer.
fn gif_valid(bytes: &[u8]) -> bool {
    bytes.len() >= 7
        && (bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a"))
        && bytes[bytes.len() - 1] == 0x3b
}

/// WEBP: RIFF container with a WEBP tag and a plausible chunk size.
fn webp_valid(bytes: &[u8]) -> bool {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WEBP" {
        return false;
    }
    // The RIFF size excludes the first 8 bytes.
    let riff_size = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
    bytes.len() >= riff_size + 8
}

/// PNG: signature, an IHDR first chunk of length 13, chunks that stay in
/// bounds, and a zero-length IEND.
fn png_valid(bytes: &[u8]) -> bool {
    const SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];
    // Signature (8) + IHDR (25) + IEND (12).
    if bytes.len() < 45 || bytes[0..8] != SIGNATURE {
        return false;
    }

    let mut pos = 8usize;
    let mut saw_ihdr = false;

    while pos + 8 <= bytes.len() {
        let len = u32::from_be_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]])
            as usize;
        let chunk_type = &bytes[pos + 4..pos + 8];
        pos += 8;

        // Chunk data plus 4 CRC bytes must fit.
        if pos + len + 4 > bytes.len() {
            return false;
        }

        if !saw_ihdr {
            if chunk_type != b"IHDR" || len != 13 {
                return false;
            }
            saw_ihdr = true;
        }

        if chunk_type == b"IEND" {
            return len == 0;
        }

        pos += len + 4;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_png() -> Vec<u8> {
        let mut bytes = vec![0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];
        // IHDR: length 13, type, 13 data bytes, 4 CRC bytes.
        bytes.extend_from_slice(&13u32.to_be_bytes());
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&[0u8; 13]);
        bytes.extend_from_slice(&[0u8; 4]);
        // IEND: length 0, type, 4 CRC bytes.
        bytes.extend_from_slice(&0u32.to_be_bytes());
        bytes.extend_from_slice(b"IEND");
        bytes.extend_from_slice(&[0u8; 4]);
        bytes
    }

    #[test]
    fn test_png_round_trip() {
        let mime = validate_and_detect("shot.png", &minimal_png()).expect("valid");
        assert_eq!(mime.as_deref(), Some("image/png"));
    }

    #[test]
    fn test_png_with_wrong_signature_rejected() {
        let mut bytes = minimal_png();
        bytes[0] = 0x00;
        assert!(validate_and_detect("shot.png", &bytes).is_err());
    }

    #[test]
    fn test_jpeg_markers() {
        let bytes = [0xff, 0xd8, 0x00, 0x11, 0xff, 0xd9];
        let mime = validate_and_detect("photo.jpg", &bytes).expect("valid");
        assert_eq!(mime.as_deref(), Some("image/jpeg"));

        let truncated = [0xff, 0xd8, 0x00, 0x11];
        assert!(validate_and_detect("photo.jpg", &truncated).is_err());
    }

    #[test]
    fn test_gif_header_and_trailer() {
        let mut bytes = b"GIF89a".to_vec();
        bytes.push(0x3b);
        assert!(validate_and_detect("anim.gif", &bytes).is_ok());

        bytes.pop();
        bytes.push(0x00);
        assert!(validate_and_detect("anim.gif", &bytes).is_err());
    }

    #[test]
    fn test_renamed_binary_rejected_as_image() {
        // A text payload renamed to .png must not pass.
        assert!(validate_and_detect("evil.png", b"#!/bin/sh\necho pwned").is_err());
    }

    #[test]
    fn test_disallowed_extension_rejected() {
        assert!(validate_and_detect("tool.exe", &[0u8; 16]).is_err());
    }

    #[test]
    fn test_plain_text_passes_with_mime() {
        let mime = validate_and_detect("notes.txt", b"hello").expect("valid");
        assert_eq!(mime.as_deref(), Some("text/plain"));
    }

    #[test]
    fn test_avatar_extensions() {
        assert!(avatar_extension_allowed("png"));
        assert!(!avatar_extension_allowed("pdf"));
    }
}
