//! # URI Decoding
//!
//! Asset URIs handed to texture uploads arrive percent-encoded.

/// Decodes `%XX` escapes and `+` (as a space).
///
/// An escape without two hex digits after the `%` is copied verbatim. Byte
/// sequences that do not form valid UTF-8 after decoding are replaced with
/// U+FFFD.
#[must_use]
pub fn decode_percent(src: &str) -> String {
    let bytes = src.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hi = bytes.get(i + 1).copied().and_then(hex_value);
                let lo = bytes.get(i + 2).copied().and_then(hex_value);
                if let (Some(hi), Some(lo)) = (hi, lo) {
                    out.push((hi << 4) | lo);
                    i += 3;
                } else {
                    out.push(b'%');
                    i += 1;
                }
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Filesystem path of a `file://` URI, decoded. `None` for other schemes.
#[must_use]
pub fn local_path(uri: &str) -> Option<String> {
    uri.strip_prefix("file://").map(decode_percent)
}

const fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}
