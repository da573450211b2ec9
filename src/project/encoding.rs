// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Base64 data URLs (`data:<media type>;base64,<payload>`).

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{Result, SoundboardError};

/// Encode bytes as a base64 data URL
pub fn to_data_url(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", media_type, STANDARD.encode(bytes))
}

/// Split a base64 data URL into its media type and decoded bytes.
///
/// Extra parameters before `;base64` (e.g. `;codecs=opus`) stay part of
/// the media type.
pub fn parse_data_url(url: &str) -> Result<(String, Vec<u8>)> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| invalid("sound data is not a data URL"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| invalid("data URL has no payload"))?;
    let media_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| invalid("data URL is not base64 encoded"))?;

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| invalid(&format!("bad base64 payload: {}", e)))?;
    Ok((media_type.to_string(), bytes))
}

fn invalid(message: &str) -> SoundboardError {
    SoundboardError::InvalidFormat(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(to_data_url("audio/mpeg", b"abc"), "data:audio/mpeg;base64,YWJj");
        assert_eq!(to_data_url("audio/wav", &[]), "data:audio/wav;base64,");
    }

    #[test]
    fn test_parse() {
        let (media_type, bytes) = parse_data_url("data:audio/mpeg;base64,YWJj").unwrap();
        assert_eq!(media_type, "audio/mpeg");
        assert_eq!(bytes, b"abc");

        let (media_type, _) = parse_data_url("data:audio/webm;codecs=opus;base64,AA==").unwrap();
        assert_eq!(media_type, "audio/webm;codecs=opus");
    }

    #[test]
    fn test_parse_rejects() {
        for bad in [
            "audio/mpeg;base64,YWJj",
            "data:audio/mpeg;base64",
            "data:audio/mpeg,YWJj",
            "data:audio/mpeg;base64,!!!",
        ] {
            assert!(
                matches!(parse_data_url(bad), Err(SoundboardError::InvalidFormat(_))),
                "{} should be rejected",
                bad
            );
        }
    }
}
