use thiserror::Error;

use crate::peer_connection::sdp::sdp_type::RTCSdpType;
use crate::peer_connection::signaling_state::RTCSignalingState;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// ErrConnectionClosed indicates an operation executed after the
    /// connection has already been closed.
    #[error("connection closed")]
    ErrConnectionClosed,

    /// ErrIncorrectSignalingState indicates that the signaling state of the
    /// PeerConnection does not permit the requested operation.
    #[error("operation can not be run in current signaling state")]
    ErrIncorrectSignalingState,

    /// ErrSignalingStateProposedTransitionInvalid indicates that applying the
    /// description would perform a state transition outside the JSEP table.
    #[error("invalid proposed signaling state transition: {from} applying {applying} (local: {is_local})")]
    ErrSignalingStateProposedTransitionInvalid {
        from: RTCSignalingState,
        applying: RTCSdpType,
        is_local: bool,
    },

    /// ErrUnsupportedCodec indicates a codec the configuration cannot carry.
    #[error("unable to use codec, not supported")]
    ErrUnsupportedCodec,

    /// ErrDuplicatePayloadType indicates two configured codecs share one
    /// payload type.
    #[error("codec payload type registered twice")]
    ErrDuplicatePayloadType,

    /// ErrUnsupportedHeaderExtension indicates a configured header extension
    /// URI that is not recognized.
    #[error("a header extension with this URI is not supported")]
    ErrUnsupportedHeaderExtension,

    /// ErrICEAgentNotExist indicates that the PeerConnection was started
    /// without an ICE agent.
    #[error("ICEAgent does not exist")]
    ErrICEAgentNotExist,

    /// ErrRTPTransceiverSSRCConflict indicates that a transceiver was created
    /// with identical primary and RTX SSRCs.
    #[error("RTX SSRC must differ from the primary SSRC")]
    ErrRTPTransceiverSSRCConflict,

    #[error("remoteDescription contained media section without mid value")]
    ErrPeerConnRemoteDescriptionWithoutMidValue,
    #[error("remoteDescription has not been set yet")]
    ErrPeerConnRemoteDescriptionNil,

    #[error("SetRemoteDescription called with no fingerprint")]
    ErrSessionDescriptionNoFingerprint,
    #[error("SetRemoteDescription called with an invalid fingerprint")]
    ErrSessionDescriptionInvalidFingerprint,
    #[error("SetRemoteDescription called with multiple conflicting fingerprint")]
    ErrSessionDescriptionConflictingFingerprints,
    #[error("SetRemoteDescription called with no ice-ufrag")]
    ErrSessionDescriptionMissingIceUfrag,
    #[error("SetRemoteDescription called with no ice-pwd")]
    ErrSessionDescriptionMissingIcePwd,
    #[error("SetRemoteDescription called with multiple conflicting ice-ufrag values")]
    ErrSessionDescriptionConflictingIceUfrag,
    #[error("SetRemoteDescription called with multiple conflicting ice-pwd values")]
    ErrSessionDescriptionConflictingIcePwd,

    #[error("SdpError: {0}")]
    ErrSdpError(#[from] sdp::Error),

    #[error("Other errors: {0}")]
    ErrOthers(String),
}
