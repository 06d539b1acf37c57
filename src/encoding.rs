//! # Base64 Transcoding
//!
//! Binary ⇄ text conversion for sealed tokens.
//!
//! Source files can be several megabytes, so both directions are
//! table-driven, single-pass, and allocate the output once up front.
//! Nothing here recurses or grows the stack with the input size.
//!
//! Decoding is forgiving in the same ways the format's original readers
//! were: ASCII whitespace anywhere in the text is ignored, the trailing `=`
//! padding may be left off, and unused bits in the final symbol need not be
//! zero. Encoding always produces canonical, padded standard base64.

use base64::alphabet;
use base64::engine::general_purpose::STANDARD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;

use crate::error::Result;

/// Standard alphabet, padding optional and trailing bits ignored on decode
const FORGIVING: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Encode bytes as padded standard base64
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard base64, tolerating whitespace, missing padding and
/// non-zero trailing bits
///
/// ## Errors
///
/// Returns `MalformedToken` for characters outside the alphabet, a
/// truncated final quantum, or misplaced padding.
pub fn decode_base64(text: &str) -> Result<Vec<u8>> {
    if text.bytes().any(|b| b.is_ascii_whitespace()) {
        let compact: Vec<u8> = text
            .bytes()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        return Ok(FORGIVING.decode(compact)?);
    }

    Ok(FORGIVING.decode(text)?)
}
