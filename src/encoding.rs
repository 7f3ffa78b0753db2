//! Charset detection and decoding using chardetng and `encoding_rs`.

use std::borrow::Cow;
use std::fmt;

use chardetng::EncodingDetector;
use simdutf8::basic::from_utf8;

/// Check if the given bytes are valid UTF-8.
///
/// Uses SIMD-accelerated validation for performance.
pub fn is_utf8(data: &[u8]) -> bool {
    from_utf8(data).is_ok()
}

/// A character encoding a byte source can be decoded from.
///
/// The UTF variants are handled directly; everything else goes through
/// `encoding_rs` by label (windows-1251, ISO-8859 variants, GBK and so
/// on). Decoding is always lossy: undecodable input turns into U+FFFD
/// rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    Utf16Be,
    Utf16Le,
    Utf32Be,
    Utf32Le,
    /// Any other encoding known to `encoding_rs`.
    Labeled(&'static encoding_rs::Encoding),
}

impl Charset {
    /// Canonical name of the encoding.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Utf16Be => "UTF-16BE",
            Self::Utf16Le => "UTF-16LE",
            Self::Utf32Be => "UTF-32BE",
            Self::Utf32Le => "UTF-32LE",
            Self::Labeled(encoding) => encoding.name(),
        }
    }

    /// Look up a charset by label, e.g. `"utf-8"`, `"latin1"` or
    /// `"windows-1251"`. Returns `None` for unknown labels.
    pub fn for_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_lowercase();
        match normalized.as_str() {
            "utf-8" | "utf8" => Some(Self::Utf8),
            "utf-16be" | "utf16be" => Some(Self::Utf16Be),
            "utf-16le" | "utf16le" | "utf-16" | "utf16" => Some(Self::Utf16Le),
            "utf-32be" | "utf32be" => Some(Self::Utf32Be),
            "utf-32le" | "utf32le" | "utf-32" | "utf32" => Some(Self::Utf32Le),
            _ => encoding_rs::Encoding::for_label(normalized.as_bytes()).map(Self::Labeled),
        }
    }

    /// Decode a byte buffer to text.
    ///
    /// A leading byte order mark matching this charset is dropped. Valid
    /// UTF-8 input is borrowed without copying; everything else is
    /// transcoded, with invalid sequences replaced by U+FFFD.
    pub fn decode<'a>(&self, data: &'a [u8]) -> Cow<'a, str> {
        match self {
            Self::Utf8 => {
                let data = data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data);
                match from_utf8(data) {
                    Ok(text) => Cow::Borrowed(text),
                    Err(_) => encoding_rs::UTF_8.decode_without_bom_handling(data).0,
                }
            }
            Self::Utf16Be => {
                let data = data.strip_prefix(&[0xFE, 0xFF]).unwrap_or(data);
                encoding_rs::UTF_16BE.decode_without_bom_handling(data).0
            }
            Self::Utf16Le => {
                let data = data.strip_prefix(&[0xFF, 0xFE]).unwrap_or(data);
                encoding_rs::UTF_16LE.decode_without_bom_handling(data).0
            }
            Self::Utf32Be => {
                let data = data.strip_prefix(&[0x00, 0x00, 0xFE, 0xFF]).unwrap_or(data);
                Cow::Owned(decode_utf32(data, true))
            }
            Self::Utf32Le => {
                let data = data.strip_prefix(&[0xFF, 0xFE, 0x00, 0x00]).unwrap_or(data);
                Cow::Owned(decode_utf32(data, false))
            }
            Self::Labeled(encoding) => encoding.decode_without_bom_handling(data).0,
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Probe the first bytes for a byte order mark.
///
/// Returns the charset the mark announces and the mark's length in bytes.
/// UTF-32LE is checked before UTF-16LE because its mark starts with the
/// same FF FE pair.
pub fn detect_bom(data: &[u8]) -> Option<(Charset, usize)> {
    if data.starts_with(&[0x00, 0x00, 0xFE, 0xFF]) {
        Some((Charset::Utf32Be, 4))
    } else if data.starts_with(&[0xFF, 0xFE, 0x00, 0x00]) {
        Some((Charset::Utf32Le, 4))
    } else if data.starts_with(&[0xEF, 0xBB, 0xBF]) {
        Some((Charset::Utf8, 3))
    } else if data.starts_with(&[0xFE, 0xFF]) {
        Some((Charset::Utf16Be, 2))
    } else if data.starts_with(&[0xFF, 0xFE]) {
        Some((Charset::Utf16Le, 2))
    } else {
        None
    }
}

/// Guess the charset of a byte buffer.
///
/// A byte order mark wins outright. Valid UTF-8 is reported as UTF-8.
/// Anything else is fed to chardetng, which recognizes the common legacy
/// encodings (windows-125x, ISO-8859 variants, GBK and more).
pub fn sniff_charset(data: &[u8]) -> Charset {
    if let Some((charset, _)) = detect_bom(data) {
        return charset;
    }
    if is_utf8(data) {
        return Charset::Utf8;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(data, true);
    let encoding = detector.guess(None, true);
    if encoding == encoding_rs::UTF_8 {
        Charset::Utf8
    } else {
        Charset::Labeled(encoding)
    }
}

fn decode_utf32(data: &[u8], big_endian: bool) -> String {
    let mut text = String::with_capacity(data.len() / 4);
    for chunk in data.chunks(4) {
        let Ok(bytes) = <[u8; 4]>::try_from(chunk) else {
            // Truncated trailing code unit.
            text.push(char::REPLACEMENT_CHARACTER);
            continue;
        };
        let code = if big_endian {
            u32::from_be_bytes(bytes)
        } else {
            u32::from_le_bytes(bytes)
        };
        text.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_utf8() {
        assert!(is_utf8(b"Hello, World!"));
        assert!(is_utf8("こんにちは".as_bytes()));
        assert!(is_utf8(b""));
        assert!(!is_utf8(&[0x80, 0x81, 0x82]));
    }

    #[test]
    fn test_bom_detection() {
        assert_eq!(
            detect_bom(&[0xEF, 0xBB, 0xBF, b'a']),
            Some((Charset::Utf8, 3))
        );
        assert_eq!(
            detect_bom(&[0xFE, 0xFF, 0x00, b'a']),
            Some((Charset::Utf16Be, 2))
        );
        assert_eq!(
            detect_bom(&[0xFF, 0xFE, b'a', 0x00]),
            Some((Charset::Utf16Le, 2))
        );
        assert_eq!(
            detect_bom(&[0x00, 0x00, 0xFE, 0xFF, 0x00, 0x00, 0x00, b'a']),
            Some((Charset::Utf32Be, 4))
        );
        assert_eq!(detect_bom(b"abc"), None);
    }

    #[test]
    fn test_utf32_le_bom_beats_utf16_le() {
        // FF FE 00 00 is a UTF-32LE mark, not a UTF-16LE mark followed
        // by a NUL character.
        let data = [0xFF, 0xFE, 0x00, 0x00, b'a', 0x00, 0x00, 0x00];
        assert_eq!(detect_bom(&data), Some((Charset::Utf32Le, 4)));
        assert_eq!(Charset::Utf32Le.decode(&data), "a");
    }

    #[test]
    fn test_decode_utf8_borrows() {
        let decoded = Charset::Utf8.decode(b"plain text");
        assert!(matches!(decoded, Cow::Borrowed(_)));
        assert_eq!(decoded, "plain text");
    }

    #[test]
    fn test_decode_utf16_le() {
        let data: &[u8] = &[0xFF, 0xFE, b'H', 0x00, b'i', 0x00];
        assert_eq!(Charset::Utf16Le.decode(data), "Hi");
    }

    #[test]
    fn test_decode_utf32_be() {
        let data: &[u8] = &[0x00, 0x00, 0x00, 0x48, 0x00, 0x00, 0x00, 0x69];
        assert_eq!(Charset::Utf32Be.decode(data), "Hi");
    }

    #[test]
    fn test_decode_utf32_truncated_is_lossy() {
        let data: &[u8] = &[0x00, 0x00, 0x00, 0x48, 0x00, 0x00];
        assert_eq!(Charset::Utf32Be.decode(data), "H\u{FFFD}");
    }

    #[test]
    fn test_sniff_windows1251() {
        let text = "Привет, мир! Это достаточно длинная строка по-русски.";
        let (data, _, _) = encoding_rs::WINDOWS_1251.encode(text);
        let charset = sniff_charset(&data);
        assert_ne!(charset, Charset::Utf8);
        assert_eq!(charset.decode(&data), text);
    }

    #[test]
    fn test_label_lookup() {
        assert_eq!(Charset::for_label("UTF-8"), Some(Charset::Utf8));
        assert_eq!(Charset::for_label("utf-32le"), Some(Charset::Utf32Le));
        assert!(matches!(
            Charset::for_label("latin1"),
            Some(Charset::Labeled(_))
        ));
        assert_eq!(Charset::for_label("not-a-charset"), None);
    }
}
