//! Media track identities.

use std::hash::{Hash, Hasher};

use crate::rtp_transceiver::rtp_codec::RTPCodecType;
use crate::util::math_rand_alpha;

const TRACK_ID_LEN: usize = 16;

/// MediaStreamTrack is an identity-bearing handle for one source of audio or
/// video. The application creates tracks and attaches them to transceivers;
/// remote tracks are created by the peer connection when a remote description
/// announces them.
///
/// Equality and hashing consider the id only.
#[derive(Debug, Clone)]
pub struct MediaStreamTrack {
    id: String,
    kind: RTPCodecType,
    stream_ids: Vec<String>,
}

impl MediaStreamTrack {
    /// Creates a track of the given kind with a fresh opaque id. `stream_ids`
    /// lists the media streams the track belongs to, in order; it may be
    /// empty.
    pub fn new(kind: RTPCodecType, stream_ids: Vec<String>) -> Self {
        MediaStreamTrack {
            id: math_rand_alpha(TRACK_ID_LEN),
            kind,
            stream_ids,
        }
    }

    /// Produces a fresh opaque media stream id.
    pub fn generate_stream_id() -> String {
        math_rand_alpha(TRACK_ID_LEN)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> RTPCodecType {
        self.kind
    }

    pub fn stream_ids(&self) -> &[String] {
        &self.stream_ids
    }
}

impl PartialEq for MediaStreamTrack {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MediaStreamTrack {}

impl Hash for MediaStreamTrack {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
