//! Ordered text-encoding attempts for delimited files.

use std::fmt;

use encoding_rs::{Encoding, GBK, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};

/// A text encoding tried when decoding a delimited file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Gbk,
    Gb2312,
    /// UTF-16 with BOM detection, little-endian when no BOM is present.
    Utf16,
    /// ISO-8859-1, decoded with the windows-1252 table (the WHATWG mapping of the label).
    Latin1,
}

impl TextEncoding {
    /// Default attempt order.
    pub const DEFAULT_ORDER: [TextEncoding; 5] = [
        TextEncoding::Utf8,
        TextEncoding::Gbk,
        TextEncoding::Gb2312,
        TextEncoding::Utf16,
        TextEncoding::Latin1,
    ];

    /// Conventional label, as used in logs.
    pub fn label(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Gbk => "gbk",
            TextEncoding::Gb2312 => "gb2312",
            TextEncoding::Utf16 => "utf-16",
            TextEncoding::Latin1 => "latin-1",
        }
    }

    /// Parse a label (case-insensitive, `_` and `-` interchangeable).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Some(TextEncoding::Utf8),
            "gbk" | "cp936" => Some(TextEncoding::Gbk),
            "gb2312" => Some(TextEncoding::Gb2312),
            "utf-16" | "utf16" => Some(TextEncoding::Utf16),
            "latin-1" | "latin1" | "iso-8859-1" => Some(TextEncoding::Latin1),
            _ => None,
        }
    }

    /// Decode `bytes`, treating any malformed sequence as a failure.
    ///
    /// A leading byte-order mark matching the encoding is stripped.
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        let (encoding, body) = self.resolve(bytes);
        encoding
            .decode_without_bom_handling_and_without_replacement(body)
            .map(|text| text.into_owned())
    }

    fn resolve(self, bytes: &[u8]) -> (&'static Encoding, &[u8]) {
        match self {
            TextEncoding::Utf8 => (UTF_8, bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes)),
            TextEncoding::Gbk | TextEncoding::Gb2312 => (GBK, bytes),
            TextEncoding::Utf16 => {
                if let Some(rest) = bytes.strip_prefix(b"\xFE\xFF") {
                    (UTF_16BE, rest)
                } else {
                    (UTF_16LE, bytes.strip_prefix(b"\xFF\xFE").unwrap_or(bytes))
                }
            }
            TextEncoding::Latin1 => (WINDOWS_1252, bytes),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
