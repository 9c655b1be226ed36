use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::ice_transport::ice_server::RTCIceServer;
use crate::peer_connection::certificate::RTCCertificate;
use crate::rtp_transceiver::rtp_codec::{
    RTCPFeedback, RTCRtpCodecCapability, RTCRtpCodecParameters, RTPCodecType, MIME_TYPE_OPUS,
    MIME_TYPE_RTX, MIME_TYPE_VP8,
};

/// SDES_MID_URI is the URI of the sdes mid RTP header extension.
pub const SDES_MID_URI: &str = "urn:ietf:params:rtp-hdrext:sdes:mid";
/// SDES_RTP_STREAM_ID_URI is the URI of the sdes rtp-stream-id extension.
pub const SDES_RTP_STREAM_ID_URI: &str = "urn:ietf:params:rtp-hdrext:sdes:rtp-stream-id";
/// AUDIO_LEVEL_URI is the URI of the ssrc-audio-level extension.
pub const AUDIO_LEVEL_URI: &str = "urn:ietf:params:rtp-hdrext:ssrc-audio-level";
/// ABS_SEND_TIME_URI is the URI of the abs-send-time extension.
pub const ABS_SEND_TIME_URI: &str = "http://www.webrtc.org/experiments/rtp-hdrext/abs-send-time";
/// TRANSPORT_CC_URI is the URI of the transport-wide congestion control
/// extension.
pub const TRANSPORT_CC_URI: &str =
    "http://www.ietf.org/id/draft-holmer-rmcat-transport-wide-cc-extensions-01";

const SUPPORTED_HEADER_EXTENSIONS: [&str; 5] = [
    SDES_MID_URI,
    SDES_RTP_STREAM_ID_URI,
    AUDIO_LEVEL_URI,
    ABS_SEND_TIME_URI,
    TRANSPORT_CC_URI,
];

/// Optional features of a peer connection.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Feature {
    /// Negotiate RTX retransmission streams for codecs that carry an RTX
    /// pairing.
    Rtx,
}

/// RTCConfiguration defines the codecs, header extensions, features and ICE
/// servers of a peer connection. It is immutable once built; use
/// [`RTCConfigurationBuilder`] to construct one.
#[derive(Debug, Clone)]
pub struct RTCConfiguration {
    ice_servers: Vec<RTCIceServer>,
    audio_codecs: Vec<RTCRtpCodecParameters>,
    video_codecs: Vec<RTCRtpCodecParameters>,
    features: Vec<Feature>,
    header_extensions: Vec<String>,
    certificates: Vec<RTCCertificate>,
}

impl RTCConfiguration {
    pub fn ice_servers(&self) -> &[RTCIceServer] {
        &self.ice_servers
    }

    pub fn audio_codecs(&self) -> &[RTCRtpCodecParameters] {
        &self.audio_codecs
    }

    pub fn video_codecs(&self) -> &[RTCRtpCodecParameters] {
        &self.video_codecs
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn header_extensions(&self) -> &[String] {
        &self.header_extensions
    }

    pub fn certificates(&self) -> &[RTCCertificate] {
        &self.certificates
    }

    /// Whether RTX retransmission streams are negotiated.
    pub fn rtx_enabled(&self) -> bool {
        self.features.contains(&Feature::Rtx)
    }

    /// The configured codec list for one media kind.
    pub fn codecs_for(&self, kind: RTPCodecType) -> &[RTCRtpCodecParameters] {
        match kind {
            RTPCodecType::Audio => &self.audio_codecs,
            RTPCodecType::Video => &self.video_codecs,
            RTPCodecType::Unspecified => &[],
        }
    }

    /// The STUN URLs the ICE agent is seeded with.
    pub(crate) fn stun_urls(&self) -> Vec<String> {
        self.ice_servers
            .iter()
            .flat_map(|s| s.stun_urls())
            .map(|u| u.to_owned())
            .collect()
    }

    /// Checks that every codec carries a unique payload type and that every
    /// listed header extension is supported.
    pub(crate) fn validate(&self) -> Result<()> {
        let mut payload_types = HashSet::new();
        for codec in self.audio_codecs.iter().chain(self.video_codecs.iter()) {
            if !payload_types.insert(codec.payload_type) {
                return Err(Error::ErrDuplicatePayloadType);
            }
        }

        for uri in &self.header_extensions {
            if !SUPPORTED_HEADER_EXTENSIONS.contains(&uri.as_str()) {
                return Err(Error::ErrUnsupportedHeaderExtension);
            }
        }

        Ok(())
    }
}

/// Builder for [`RTCConfiguration`]. Defaults: no ICE servers, Opus audio,
/// VP8 video with its RTX pairing, the RTX feature on, and the sdes mid
/// header extension.
#[derive(Debug, Clone)]
pub struct RTCConfigurationBuilder {
    ice_servers: Vec<RTCIceServer>,
    audio_codecs: Vec<RTCRtpCodecParameters>,
    video_codecs: Vec<RTCRtpCodecParameters>,
    features: Vec<Feature>,
    header_extensions: Vec<String>,
    certificates: Vec<RTCCertificate>,
}

impl Default for RTCConfigurationBuilder {
    fn default() -> Self {
        RTCConfigurationBuilder {
            ice_servers: vec![],
            audio_codecs: default_audio_codecs(),
            video_codecs: default_video_codecs(),
            features: vec![Feature::Rtx],
            header_extensions: vec![SDES_MID_URI.to_owned()],
            certificates: vec![],
        }
    }
}

impl RTCConfigurationBuilder {
    pub fn new() -> Self {
        RTCConfigurationBuilder::default()
    }

    pub fn with_ice_servers(mut self, ice_servers: Vec<RTCIceServer>) -> Self {
        self.ice_servers = ice_servers;
        self
    }

    pub fn with_audio_codecs(mut self, codecs: Vec<RTCRtpCodecParameters>) -> Self {
        self.audio_codecs = codecs;
        self
    }

    pub fn with_video_codecs(mut self, codecs: Vec<RTCRtpCodecParameters>) -> Self {
        self.video_codecs = codecs;
        self
    }

    pub fn with_features(mut self, features: Vec<Feature>) -> Self {
        self.features = features;
        self
    }

    pub fn with_header_extensions(mut self, header_extensions: Vec<String>) -> Self {
        self.header_extensions = header_extensions;
        self
    }

    pub fn with_certificates(mut self, certificates: Vec<RTCCertificate>) -> Self {
        self.certificates = certificates;
        self
    }

    /// Validates and freezes the configuration.
    pub fn build(self) -> Result<RTCConfiguration> {
        let config = RTCConfiguration {
            ice_servers: self.ice_servers,
            audio_codecs: self.audio_codecs,
            video_codecs: self.video_codecs,
            features: self.features,
            header_extensions: self.header_extensions,
            certificates: self.certificates,
        };
        config.validate()?;
        Ok(config)
    }
}

fn default_audio_codecs() -> Vec<RTCRtpCodecParameters> {
    vec![RTCRtpCodecParameters {
        capability: RTCRtpCodecCapability {
            mime_type: MIME_TYPE_OPUS.to_owned(),
            clock_rate: 48000,
            channels: 2,
            sdp_fmtp_line: "minptime=10;useinbandfec=1".to_owned(),
            rtcp_feedback: vec![],
        },
        payload_type: 111,
    }]
}

fn default_video_codecs() -> Vec<RTCRtpCodecParameters> {
    let video_rtcp_feedback = vec![
        RTCPFeedback {
            typ: "goog-remb".to_owned(),
            parameter: "".to_owned(),
        },
        RTCPFeedback {
            typ: "ccm".to_owned(),
            parameter: "fir".to_owned(),
        },
        RTCPFeedback {
            typ: "nack".to_owned(),
            parameter: "".to_owned(),
        },
        RTCPFeedback {
            typ: "nack".to_owned(),
            parameter: "pli".to_owned(),
        },
    ];

    vec![
        RTCRtpCodecParameters {
            capability: RTCRtpCodecCapability {
                mime_type: MIME_TYPE_VP8.to_owned(),
                clock_rate: 90000,
                channels: 0,
                sdp_fmtp_line: "".to_owned(),
                rtcp_feedback: video_rtcp_feedback,
            },
            payload_type: 96,
        },
        RTCRtpCodecParameters {
            capability: RTCRtpCodecCapability {
                mime_type: MIME_TYPE_RTX.to_owned(),
                clock_rate: 90000,
                channels: 0,
                sdp_fmtp_line: "apt=96".to_owned(),
                rtcp_feedback: vec![],
            },
            payload_type: 97,
        },
    ]
}
