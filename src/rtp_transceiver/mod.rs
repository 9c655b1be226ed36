//! RTP transceivers: the pairing of one sender and one receiver under a
//! shared mid.

pub mod rtp_codec;
pub mod rtp_transceiver_direction;


use crate::error::{Error, Result};
use crate::media_stream::MediaStreamTrack;
use crate::peer_connection::configuration::RTCConfiguration;
use rtp_codec::{RTCRtpCodecParameters, RTPCodecType};
use rtp_transceiver_direction::RTCRtpTransceiverDirection;

/// SSRC represents a synchronization source: a randomly chosen value meant to
/// be globally unique within a particular RTP session.
pub type SSRC = u32;

/// RTCRtpTransceiverInit enumerates the options accepted when creating a
/// transceiver. Unset SSRCs are drawn at random; an unset direction defaults
/// to sendrecv; an unset codec list inherits the configuration's list for the
/// transceiver's kind.
#[derive(Default, Debug, Clone)]
pub struct RTCRtpTransceiverInit {
    pub direction: RTCRtpTransceiverDirection,
    pub ssrc: Option<SSRC>,
    pub rtx_ssrc: Option<SSRC>,
    pub codecs: Option<Vec<RTCRtpCodecParameters>>,
}

/// The sending half of a transceiver.
#[derive(Debug, Clone)]
pub struct RTCRtpSender {
    pub(crate) track: Option<MediaStreamTrack>,
    pub(crate) ssrc: SSRC,
    pub(crate) rtx_ssrc: Option<SSRC>,
}

impl RTCRtpSender {
    pub fn track(&self) -> Option<&MediaStreamTrack> {
        self.track.as_ref()
    }

    pub fn ssrc(&self) -> SSRC {
        self.ssrc
    }

    pub fn rtx_ssrc(&self) -> Option<SSRC> {
        self.rtx_ssrc
    }
}

/// The receiving half of a transceiver. The track and SSRC are filled in
/// when a remote description announces the stream.
#[derive(Default, Debug, Clone)]
pub struct RTCRtpReceiver {
    pub(crate) track: Option<MediaStreamTrack>,
    pub(crate) ssrc: Option<SSRC>,
}

impl RTCRtpReceiver {
    pub fn track(&self) -> Option<&MediaStreamTrack> {
        self.track.as_ref()
    }

    pub fn ssrc(&self) -> Option<SSRC> {
        self.ssrc
    }
}

/// RTCRtpTransceiver represents a combination of an RTCRtpSender and an
/// RTCRtpReceiver that share a common mid.
///
/// Transceivers are owned exclusively by their peer connection; callers
/// observe them through cloned snapshots.
#[derive(Debug, Clone)]
pub struct RTCRtpTransceiver {
    mid: Option<String>,
    kind: RTPCodecType,
    direction: RTCRtpTransceiverDirection,
    sender: RTCRtpSender,
    receiver: RTCRtpReceiver,
    codecs: Vec<RTCRtpCodecParameters>,
}

impl RTCRtpTransceiver {
    /// Creates a transceiver of the given kind, optionally carrying a send
    /// track. An RTX SSRC is allocated only when the configuration enables
    /// RTX and the negotiated codec list contains an RTX entry.
    pub fn new(
        kind: RTPCodecType,
        track: Option<MediaStreamTrack>,
        config: &RTCConfiguration,
        init: RTCRtpTransceiverInit,
    ) -> Result<Self> {
        let direction = match init.direction {
            RTCRtpTransceiverDirection::Unspecified => RTCRtpTransceiverDirection::Sendrecv,
            d => d,
        };

        let codecs = init
            .codecs
            .unwrap_or_else(|| config.codecs_for(kind).to_vec());
        let codecs: Vec<RTCRtpCodecParameters> = if config.rtx_enabled() {
            codecs
        } else {
            codecs.into_iter().filter(|c| !c.is_rtx()).collect()
        };

        let ssrc = init.ssrc.unwrap_or_else(rand::random::<SSRC>);
        let has_rtx_codec = codecs.iter().any(|c| c.is_rtx());
        let rtx_ssrc = if config.rtx_enabled() && has_rtx_codec {
            match init.rtx_ssrc {
                Some(rtx) if rtx == ssrc => return Err(Error::ErrRTPTransceiverSSRCConflict),
                Some(rtx) => Some(rtx),
                None => {
                    let mut rtx = rand::random::<SSRC>();
                    while rtx == ssrc {
                        rtx = rand::random::<SSRC>();
                    }
                    Some(rtx)
                }
            }
        } else {
            None
        };

        Ok(RTCRtpTransceiver {
            mid: None,
            kind,
            direction,
            sender: RTCRtpSender {
                track,
                ssrc,
                rtx_ssrc,
            },
            receiver: RTCRtpReceiver::default(),
            codecs,
        })
    }

    pub fn mid(&self) -> Option<&str> {
        self.mid.as_deref()
    }

    pub(crate) fn set_mid(&mut self, mid: String) {
        self.mid = Some(mid);
    }

    pub fn kind(&self) -> RTPCodecType {
        self.kind
    }

    pub fn direction(&self) -> RTCRtpTransceiverDirection {
        self.direction
    }

    pub(crate) fn set_direction(&mut self, direction: RTCRtpTransceiverDirection) {
        self.direction = direction;
    }

    pub fn sender(&self) -> &RTCRtpSender {
        &self.sender
    }

    pub fn receiver(&self) -> &RTCRtpReceiver {
        &self.receiver
    }

    pub(crate) fn receiver_mut(&mut self) -> &mut RTCRtpReceiver {
        &mut self.receiver
    }

    pub fn codecs(&self) -> &[RTCRtpCodecParameters] {
        &self.codecs
    }

    /// Whether this transceiver negotiated an RTX retransmission stream.
    pub fn rtx_enabled(&self) -> bool {
        self.sender.rtx_ssrc.is_some()
    }

    /// Stops the transceiver. Stopped transceivers keep their mid and stay
    /// in the connection's list, but no longer send or receive.
    pub(crate) fn stop(&mut self) {
        self.direction = RTCRtpTransceiverDirection::Stopped;
    }
}
