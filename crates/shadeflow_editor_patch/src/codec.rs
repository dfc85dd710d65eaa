// SPDX-License-Identifier: MIT OR Apache-2.0
//! Embedded-region codec.
//!
//! A persisted patch file is generator-produced shader source with the
//! serialized graph hidden inside it, delimited by [`REGION_START`] and
//! [`REGION_END`]. The delimiters are matched with a plain substring scan:
//! only the first region is used, the match spans newlines, and malformed or
//! unterminated markers simply mean "no region" rather than an error.

use crate::PatchGraph;

/// Opening delimiter of the embedded region.
pub const REGION_START: &str = "NEStart{";
/// Closing delimiter of the embedded region.
pub const REGION_END: &str = "}NEEnd";

/// Extract the serialized payload from shader text.
///
/// Returns the substring strictly between the first [`REGION_START`] and the
/// first [`REGION_END`] that follows it, or `None` when no complete region
/// exists.
pub fn extract(text: &str) -> Option<&str> {
    let start = text.find(REGION_START)? + REGION_START.len();
    let end = text[start..].find(REGION_END)? + start;
    Some(&text[start..end])
}

/// Wrap a serialized payload in the region delimiters.
///
/// Placing the wrapped text inside a comment is the shader generator's
/// concern, not the codec's.
pub fn embed(payload: &str) -> String {
    format!("{REGION_START}{payload}{REGION_END}")
}

/// Encode a patch into the embeddable payload text.
pub fn encode(graph: &PatchGraph) -> Result<String, CodecError> {
    Ok(serde_json::to_string(graph)?)
}

/// Decode a payload previously produced by [`encode`].
pub fn decode(payload: &str) -> Result<PatchGraph, CodecError> {
    let graph = serde_json::from_str(payload)?;
    Ok(graph)
}

/// Error decoding or encoding an embedded payload.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Payload text is not a valid serialized patch
    #[error("malformed graph payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Direction, PatchConstant, PatchItem, PatchNode, PatchNodeKind};

    fn sample_patch() -> PatchGraph {
        PatchGraph {
            nodes: vec![PatchNode {
                id: 7,
                kind: PatchNodeKind::Procedure {
                    archive: "lighting.sh:DiffuseLight".to_string(),
                },
                items: vec![PatchItem {
                    name: "intensity".to_string(),
                    type_name: "float".to_string(),
                    direction: Direction::Input,
                    semantic: None,
                }],
            }],
            connections: vec![],
            constants: vec![PatchConstant {
                node: 7,
                item: 0,
                value: "0.5f".to_string(),
            }],
        }
    }

    #[test]
    fn extract_region_among_noise() {
        let text = "// header\nNEStart{payload body}NEEnd\n// tail";
        assert_eq!(extract(text), Some("payload body"));
    }

    #[test]
    fn extract_spans_newlines() {
        let text = "prefix NEStart{line one\nline two}NEEnd suffix";
        assert_eq!(extract(text), Some("line one\nline two"));
    }

    #[test]
    fn extract_uses_first_region_only() {
        let text = "NEStart{first}NEEnd noise NEStart{second}NEEnd";
        assert_eq!(extract(text), Some("first"));
    }

    #[test]
    fn extract_without_markers_is_none() {
        assert_eq!(extract("float4 main() { return 1; }"), None);
    }

    #[test]
    fn extract_unterminated_is_none() {
        assert_eq!(extract("NEStart{never closed"), None);
        assert_eq!(extract("}NEEnd before NEStart{"), None);
    }

    #[test]
    fn embed_then_extract_round_trips() {
        let wrapped = format!("/* {} */\nfloat4 main();", embed("abc {nested} def"));
        assert_eq!(extract(&wrapped), Some("abc {nested} def"));
    }

    #[test]
    fn encode_decode_round_trips() {
        let patch = sample_patch();
        let payload = encode(&patch).unwrap();
        assert_eq!(decode(&payload).unwrap(), patch);
    }

    #[test]
    fn encoded_payload_survives_embedding() {
        // the JSON payload ends in '}', which must not confuse the scan for
        // the closing delimiter
        let patch = sample_patch();
        let wrapped = embed(&encode(&patch).unwrap());
        let payload = extract(&wrapped).unwrap();
        assert_eq!(decode(payload).unwrap(), patch);
    }

    #[test]
    fn decode_rejects_malformed_payload() {
        assert!(matches!(
            decode("not a graph"),
            Err(CodecError::Malformed(_))
        ));
    }
}
