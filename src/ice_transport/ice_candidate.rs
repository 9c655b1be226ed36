use serde::{Deserialize, Serialize};

/// ICECandidateInit is used to serialize ice candidates sent over the
/// application's signaling channel.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RTCIceCandidateInit {
    pub candidate: String,
    pub sdp_mid: Option<String>,
    #[serde(rename = "sdpMLineIndex")]
    pub sdp_mline_index: Option<u16>,
    pub username_fragment: Option<String>,
}

impl RTCIceCandidateInit {
    /// The bare candidate attribute value, with the `candidate:` prefix
    /// stripped if present. This is the form the ICE agent consumes.
    pub fn attribute(&self) -> &str {
        self.candidate
            .strip_prefix("candidate:")
            .unwrap_or(&self.candidate)
    }
}
