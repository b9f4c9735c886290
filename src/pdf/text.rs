//! PDF text string decoding
//!
//! Text strings are either UTF-16BE with a byte order mark, UTF-8 with a byte
//! order mark (PDF 2.0), or single-byte PDFDocEncoding.

use encoding_rs::UTF_16BE;

/// PDFDocEncoding code points that differ from Latin-1, for bytes 0x18..=0x1F
const LOW_DIFFERENCES: [char; 8] = [
    '\u{02D8}', '\u{02C7}', '\u{02C6}', '\u{02D9}', '\u{02DD}', '\u{02DB}', '\u{02DA}', '\u{02DC}',
];

/// PDFDocEncoding code points for bytes 0x80..=0xA0
const HIGH_DIFFERENCES: [char; 33] = [
    '\u{2022}', '\u{2020}', '\u{2021}', '\u{2026}', '\u{2014}', '\u{2013}', '\u{0192}', '\u{2044}',
    '\u{2039}', '\u{203A}', '\u{2212}', '\u{2030}', '\u{201E}', '\u{201C}', '\u{201D}', '\u{2018}',
    '\u{2019}', '\u{201A}', '\u{2122}', '\u{FB01}', '\u{FB02}', '\u{0141}', '\u{0152}', '\u{0160}',
    '\u{0178}', '\u{017D}', '\u{0131}', '\u{0142}', '\u{0153}', '\u{0161}', '\u{017E}', '\u{FFFD}',
    '\u{20AC}',
];

/// Decode the raw bytes of a PDF text string
///
/// Returns `None` only when a UTF-16 or UTF-8 string is malformed.
pub fn decode_text_string(bytes: &[u8]) -> Option<String> {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let (text, had_errors) = UTF_16BE.decode_without_bom_handling(rest);
        return if had_errors { None } else { Some(text.into_owned()) };
    }

    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return std::str::from_utf8(rest).ok().map(str::to_string);
    }

    Some(bytes.iter().map(|&b| pdf_doc_char(b)).collect())
}

/// Map one PDFDocEncoding byte to its character
fn pdf_doc_char(byte: u8) -> char {
    match byte {
        0x18..=0x1F => LOW_DIFFERENCES[(byte - 0x18) as usize],
        0x80..=0xA0 => HIGH_DIFFERENCES[(byte - 0x80) as usize],
        0xAD => '\u{FFFD}',
        _ => byte as char,
    }
}

/// Decode a name object; names are byte sequences that are UTF-8 in practice
pub fn decode_name(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
