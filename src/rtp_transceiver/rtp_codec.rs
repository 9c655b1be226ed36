use std::fmt;

/// MIME_TYPE_OPUS Opus MIME type.
/// Note: Matching should be case insensitive.
pub const MIME_TYPE_OPUS: &str = "audio/opus";
/// MIME_TYPE_VP8 VP8 MIME type.
/// Note: Matching should be case insensitive.
pub const MIME_TYPE_VP8: &str = "video/VP8";
/// MIME_TYPE_H264 H264 MIME type.
/// Note: Matching should be case insensitive.
pub const MIME_TYPE_H264: &str = "video/H264";
/// MIME_TYPE_RTX RTX MIME type (RFC 4588 retransmission format).
pub const MIME_TYPE_RTX: &str = "video/rtx";

/// RTPCodecType determines the type of a codec.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RTPCodecType {
    #[default]
    Unspecified = 0,

    /// RTPCodecTypeAudio indicates this is an audio codec.
    Audio,

    /// RTPCodecTypeVideo indicates this is a video codec.
    Video,
}

const RTP_CODEC_TYPE_AUDIO_STR: &str = "audio";
const RTP_CODEC_TYPE_VIDEO_STR: &str = "video";

impl From<&str> for RTPCodecType {
    fn from(raw: &str) -> Self {
        match raw {
            RTP_CODEC_TYPE_AUDIO_STR => RTPCodecType::Audio,
            RTP_CODEC_TYPE_VIDEO_STR => RTPCodecType::Video,
            _ => RTPCodecType::Unspecified,
        }
    }
}

impl fmt::Display for RTPCodecType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            RTPCodecType::Audio => write!(f, "{RTP_CODEC_TYPE_AUDIO_STR}"),
            RTPCodecType::Video => write!(f, "{RTP_CODEC_TYPE_VIDEO_STR}"),
            _ => write!(f, "{}", crate::UNSPECIFIED_STR),
        }
    }
}

/// RTCPFeedback signals the connection's use of additional RTCP messages,
/// serialized as `a=rtcp-fb` attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RTCPFeedback {
    /// Type is the type of feedback, e.g. "nack" or "ccm".
    pub typ: String,

    /// The parameter value, e.g. "pli" for `nack pli`. Often empty.
    pub parameter: String,
}

/// RTCRtpCodecCapability provides information about codec capabilities.
///
/// <https://w3c.github.io/webrtc-pc/#dictionary-rtcrtpcodeccapability-members>
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct RTCRtpCodecCapability {
    /// The codec MIME media type/subtype, e.g. "video/VP8".
    pub mime_type: String,
    /// Clock rate in Hertz.
    pub clock_rate: u32,
    /// The number of audio channels, 0 for video.
    pub channels: u16,
    /// The `a=fmtp` line content for this codec.
    pub sdp_fmtp_line: String,
    /// The RTCP feedback messages advertised for this codec.
    pub rtcp_feedback: Vec<RTCPFeedback>,
}

/// RTCRtpCodecParameters is a codec capability bound to a payload type.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct RTCRtpCodecParameters {
    pub capability: RTCRtpCodecCapability,
    pub payload_type: u8,
}

impl RTCRtpCodecParameters {
    /// Whether this entry is an RTX retransmission pairing rather than a
    /// primary codec.
    pub fn is_rtx(&self) -> bool {
        self.capability
            .mime_type
            .to_ascii_lowercase()
            .ends_with("/rtx")
    }

    /// The name part of the MIME type, as written into `a=rtpmap`.
    pub(crate) fn name(&self) -> &str {
        self.capability
            .mime_type
            .split_once('/')
            .map(|(_, name)| name)
            .unwrap_or(&self.capability.mime_type)
    }
}
