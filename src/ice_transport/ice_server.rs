use serde::{Deserialize, Serialize};

/// RTCIceServer describes a single STUN or TURN server that can be used by
/// the ICE agent to establish a connection with a peer.
///
/// ## Specifications
///
/// * [MDN]
/// * [W3C]
///
/// [MDN]: https://developer.mozilla.org/en-US/docs/Web/API/RTCIceServer
/// [W3C]: https://w3c.github.io/webrtc-pc/#dom-rtciceserver
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct RTCIceServer {
    pub urls: Vec<String>,
    pub username: String,
    pub credential: String,
}

impl RTCIceServer {
    /// The STUN URLs of this server entry. TURN URLs are handled by the
    /// external agent directly and are not part of the seed list.
    pub(crate) fn stun_urls(&self) -> impl Iterator<Item = &str> {
        self.urls
            .iter()
            .map(|u| u.as_str())
            .filter(|u| u.starts_with("stun:") || u.starts_with("stuns:"))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_ice_server_stun_urls() {
        let server = RTCIceServer {
            urls: vec![
                "stun:stun.l.google.com:19302".to_owned(),
                "turn:turn.example.org".to_owned(),
                "stuns:stun.example.org".to_owned(),
            ],
            ..Default::default()
        };

        let stun: Vec<&str> = server.stun_urls().collect();
        assert_eq!(
            stun,
            vec!["stun:stun.l.google.com:19302", "stuns:stun.example.org"]
        );
    }
}
