use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

use crate::handle::FileAccessError;

/// 將讀入的位元組解碼為文字。 / Decodes raw file bytes into text.
///
/// 依序處理 UTF-8/UTF-16 BOM、純 UTF-8，最後交給 `chardetng` 推測傳統編碼。 /
/// Handles UTF-8/UTF-16 BOMs, plain UTF-8, then falls back to a `chardetng`
/// guess for legacy encodings.
pub(crate) fn decode_text(bytes: &[u8]) -> Result<String, FileAccessError> {
    if let Some(stripped) = bytes.strip_prefix(b"\xEF\xBB\xBF") {
        return std::str::from_utf8(stripped)
            .map(str::to_owned)
            .map_err(|_| FileAccessError::InvalidEncoding);
    }

    if let Some(stripped) = bytes.strip_prefix(b"\xFF\xFE") {
        return decode_utf16(stripped, false);
    }
    if let Some(stripped) = bytes.strip_prefix(b"\xFE\xFF") {
        return decode_utf16(stripped, true);
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(text.to_owned());
    }

    let guess = guess_encoding(bytes);
    let (decoded, had_errors) = guess.decode_without_bom_handling(bytes);
    if had_errors {
        return Err(FileAccessError::InvalidEncoding);
    }
    Ok(decoded.into_owned())
}

fn decode_utf16(bytes: &[u8], big_endian: bool) -> Result<String, FileAccessError> {
    if bytes.len() % 2 != 0 {
        return Err(FileAccessError::InvalidEncoding);
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|chunk| {
            let pair = [chunk[0], chunk[1]];
            if big_endian {
                u16::from_be_bytes(pair)
            } else {
                u16::from_le_bytes(pair)
            }
        })
        .collect();
    String::from_utf16(&units).map_err(|_| FileAccessError::InvalidEncoding)
}

fn guess_encoding(bytes: &[u8]) -> &'static Encoding {
    if bytes.is_empty() {
        return UTF_8;
    }
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::GBK;

    #[test]
    fn decodes_plain_utf8() {
        assert_eq!(decode_text(b"hello\n").unwrap(), "hello\n");
    }

    #[test]
    fn strips_utf8_bom() {
        assert_eq!(decode_text(b"\xEF\xBB\xBFhi").unwrap(), "hi");
    }

    #[test]
    fn decodes_utf16_le_with_bom() {
        let payload: &[u8] = b"\xFF\xFEh\x00i\x00";
        assert_eq!(decode_text(payload).unwrap(), "hi");
    }

    #[test]
    fn decodes_utf16_be_with_bom() {
        let payload = [0xFE, 0xFF, 0x00, b'h', 0x00, b'i'];
        assert_eq!(decode_text(&payload).unwrap(), "hi");
    }

    #[test]
    fn falls_back_to_legacy_detection() {
        let (encoded, _, _) = GBK.encode("中文測試");
        assert_eq!(decode_text(encoded.as_ref()).unwrap(), "中文測試");
    }

    #[test]
    fn rejects_odd_length_utf16() {
        let payload: &[u8] = b"\xFF\xFEh\x00i";
        assert!(matches!(
            decode_text(payload),
            Err(FileAccessError::InvalidEncoding)
        ));
    }
}
