// Text encodings tried, in order, when decoding a source file.
use std::borrow::Cow;
use std::fmt;

use encoding_rs::WINDOWS_1252;
use serde::{Deserialize, Serialize};

use crate::error::EncodingAttempt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextEncoding {
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    #[serde(rename = "latin-1", alias = "latin1", alias = "iso-8859-1")]
    Latin1,
    #[serde(rename = "cp1252", alias = "windows-1252")]
    Cp1252,
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Cp1252 => "cp1252",
        };
        f.write_str(name)
    }
}

impl TextEncoding {
    /// Strict decode: malformed input is an error, never replaced.
    pub fn decode(self, bytes: &[u8]) -> Result<Cow<'_, str>, String> {
        match self {
            TextEncoding::Utf8 => std::str::from_utf8(bytes)
                .map(Cow::Borrowed)
                .map_err(|e| format!("invalid byte sequence: {}", e)),
            TextEncoding::Latin1 => {
                // 0x80..=0x9F are C1 controls in ISO-8859-1; real text there means cp1252.
                if let Some(pos) = bytes.iter().position(|b| (0x80..=0x9F).contains(b)) {
                    return Err(format!(
                        "byte 0x{:02X} at offset {} is a C1 control character",
                        bytes[pos], pos
                    ));
                }
                Ok(Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()))
            }
            // The WHATWG table maps all 256 bytes (0x81, 0x8D, 0x8F, 0x90 and 0x9D
            // to their C1 code points), so cp1252 is the fallback that always decodes.
            TextEncoding::Cp1252 => Ok(WINDOWS_1252.decode_without_bom_handling(bytes).0),
        }
    }

    /// Re-encodes text with a single-byte encoding. `None` for UTF-8 or when a
    /// character has no byte in the target encoding.
    pub fn encode_single_byte(self, text: &str) -> Option<Vec<u8>> {
        match self {
            TextEncoding::Utf8 => None,
            TextEncoding::Latin1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).ok())
                .collect(),
            TextEncoding::Cp1252 => {
                let (bytes, _, had_unmappable) = WINDOWS_1252.encode(text);
                if had_unmappable {
                    None
                } else {
                    Some(bytes.into_owned())
                }
            }
        }
    }
}

/// Runs `attempt` for each encoding in order and returns the first success.
/// Every failure is kept so the caller can report all of them.
pub fn first_success<T, F>(
    encodings: &[TextEncoding],
    mut attempt: F,
) -> Result<(TextEncoding, T), Vec<EncodingAttempt>>
where
    F: FnMut(TextEncoding) -> Result<T, String>,
{
    let mut failures = Vec::with_capacity(encodings.len());
    for &encoding in encodings {
        match attempt(encoding) {
            Ok(value) => return Ok((encoding, value)),
            Err(reason) => {
                tracing::debug!(%encoding, %reason, "Encoding attempt failed");
                failures.push(EncodingAttempt { encoding, reason });
            }
        }
    }
    Err(failures)
}
