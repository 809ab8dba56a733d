/// How many leading bytes of a whole-blob response are inspected.
pub const PEEK_SIZE: usize = 1024;

/// Below this many bytes no guess is made.
const MIN_SNIFF_LEN: usize = 8;

pub const OCTET_STREAM: &str = "application/octet-stream";

const JPEG_MAGIC: &[u8] = &[0xff, 0xd8, 0xff];
const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// Best-effort content type for a blob from its first bytes.
pub fn sniff_content_type(head: &[u8]) -> &'static str {
    if head.len() < MIN_SNIFF_LEN {
        return OCTET_STREAM;
    }
    if is_utf8_prefix(head) {
        "text/plain; charset=utf-8"
    } else if head.starts_with(JPEG_MAGIC) {
        "image/jpeg"
    } else if head.starts_with(PNG_MAGIC) {
        "image/png"
    } else {
        OCTET_STREAM
    }
}

/// Valid UTF-8, allowing a multi-byte sequence cut off at the end.
fn is_utf8_prefix(bytes: &[u8]) -> bool {
    match std::str::from_utf8(bytes) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none(),
    }
}
