use std::fmt;

use crate::error::{Error, Result};
use crate::peer_connection::sdp::sdp_type::RTCSdpType;

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum StateChangeOp {
    #[default]
    SetLocal,
    SetRemote,
}

impl fmt::Display for StateChangeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            StateChangeOp::SetLocal => write!(f, "SetLocal"),
            StateChangeOp::SetRemote => write!(f, "SetRemote"),
        }
    }
}

/// RTCSignalingState indicates the signaling state of the offer/answer
/// process.
///
/// ## Specifications
///
/// * [MDN]
/// * [W3C]
///
/// [MDN]: https://developer.mozilla.org/en-US/docs/Web/API/RTCPeerConnection/signalingState
/// [W3C]: https://w3c.github.io/webrtc-pc/#dom-peerconnection-signaling-state
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RTCSignalingState {
    #[default]
    Unspecified = 0,

    /// Stable indicates there is no offer/answer exchange in progress. This
    /// is also the initial state, in which case the local and remote
    /// descriptions are empty.
    Stable,

    /// HaveLocalOffer indicates that a local description of type "offer" has
    /// been successfully applied.
    HaveLocalOffer,

    /// HaveRemoteOffer indicates that a remote description of type "offer"
    /// has been successfully applied.
    HaveRemoteOffer,

    /// HaveLocalPranswer indicates that a remote description of type "offer"
    /// has been successfully applied and a local description of type
    /// "pranswer" has been successfully applied.
    HaveLocalPranswer,

    /// HaveRemotePranswer indicates that a local description of type "offer"
    /// has been successfully applied and a remote description of type
    /// "pranswer" has been successfully applied.
    HaveRemotePranswer,

    /// Closed indicates the PeerConnection has been closed.
    Closed,
}

const SIGNALING_STATE_STABLE_STR: &str = "stable";
const SIGNALING_STATE_HAVE_LOCAL_OFFER_STR: &str = "have-local-offer";
const SIGNALING_STATE_HAVE_REMOTE_OFFER_STR: &str = "have-remote-offer";
const SIGNALING_STATE_HAVE_LOCAL_PRANSWER_STR: &str = "have-local-pranswer";
const SIGNALING_STATE_HAVE_REMOTE_PRANSWER_STR: &str = "have-remote-pranswer";
const SIGNALING_STATE_CLOSED_STR: &str = "closed";

impl From<&str> for RTCSignalingState {
    fn from(raw: &str) -> Self {
        match raw {
            SIGNALING_STATE_STABLE_STR => RTCSignalingState::Stable,
            SIGNALING_STATE_HAVE_LOCAL_OFFER_STR => RTCSignalingState::HaveLocalOffer,
            SIGNALING_STATE_HAVE_REMOTE_OFFER_STR => RTCSignalingState::HaveRemoteOffer,
            SIGNALING_STATE_HAVE_LOCAL_PRANSWER_STR => RTCSignalingState::HaveLocalPranswer,
            SIGNALING_STATE_HAVE_REMOTE_PRANSWER_STR => RTCSignalingState::HaveRemotePranswer,
            SIGNALING_STATE_CLOSED_STR => RTCSignalingState::Closed,
            _ => RTCSignalingState::Unspecified,
        }
    }
}

impl fmt::Display for RTCSignalingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            RTCSignalingState::Stable => write!(f, "{SIGNALING_STATE_STABLE_STR}"),
            RTCSignalingState::HaveLocalOffer => {
                write!(f, "{SIGNALING_STATE_HAVE_LOCAL_OFFER_STR}")
            }
            RTCSignalingState::HaveRemoteOffer => {
                write!(f, "{SIGNALING_STATE_HAVE_REMOTE_OFFER_STR}")
            }
            RTCSignalingState::HaveLocalPranswer => {
                write!(f, "{SIGNALING_STATE_HAVE_LOCAL_PRANSWER_STR}")
            }
            RTCSignalingState::HaveRemotePranswer => {
                write!(f, "{SIGNALING_STATE_HAVE_REMOTE_PRANSWER_STR}")
            }
            RTCSignalingState::Closed => write!(f, "{SIGNALING_STATE_CLOSED_STR}"),
            _ => write!(f, "{}", crate::UNSPECIFIED_STR),
        }
    }
}

/// Validates one step of the offer/answer process.
///
/// Rollback is accepted from every non-closed state and returns to stable,
/// discarding the pending description on the rolled-back side; everything
/// else must match a row of the JSEP transition table.
pub(crate) fn check_next_signaling_state(
    cur: RTCSignalingState,
    next: RTCSignalingState,
    op: StateChangeOp,
    sdp_type: RTCSdpType,
) -> Result<RTCSignalingState> {
    if cur == RTCSignalingState::Closed {
        return Err(Error::ErrConnectionClosed);
    }

    // Rollbacks restore the previous stable state from anywhere.
    if sdp_type == RTCSdpType::Rollback {
        return Ok(RTCSignalingState::Stable);
    }

    // 4.3.1 valid state transitions
    match cur {
        RTCSignalingState::Stable => {
            match op {
                StateChangeOp::SetLocal => {
                    // stable->SetLocal(offer)->have-local-offer
                    if sdp_type == RTCSdpType::Offer && next == RTCSignalingState::HaveLocalOffer {
                        return Ok(next);
                    }
                }
                StateChangeOp::SetRemote => {
                    // stable->SetRemote(offer)->have-remote-offer
                    if sdp_type == RTCSdpType::Offer && next == RTCSignalingState::HaveRemoteOffer {
                        return Ok(next);
                    }
                }
            }
        }
        RTCSignalingState::HaveLocalOffer => {
            if op == StateChangeOp::SetRemote {
                match sdp_type {
                    // have-local-offer->SetRemote(answer)->stable
                    RTCSdpType::Answer => {
                        if next == RTCSignalingState::Stable {
                            return Ok(next);
                        }
                    }
                    // have-local-offer->SetRemote(pranswer)->have-remote-pranswer
                    RTCSdpType::Pranswer => {
                        if next == RTCSignalingState::HaveRemotePranswer {
                            return Ok(next);
                        }
                    }
                    _ => {}
                }
            } else if op == StateChangeOp::SetLocal
                && sdp_type == RTCSdpType::Offer
                && next == RTCSignalingState::HaveLocalOffer
            {
                // have-local-offer->SetLocal(offer)->have-local-offer (re-offer)
                return Ok(next);
            }
        }
        RTCSignalingState::HaveRemoteOffer => {
            if op == StateChangeOp::SetLocal {
                match sdp_type {
                    // have-remote-offer->SetLocal(answer)->stable
                    RTCSdpType::Answer => {
                        if next == RTCSignalingState::Stable {
                            return Ok(next);
                        }
                    }
                    // have-remote-offer->SetLocal(pranswer)->have-local-pranswer
                    RTCSdpType::Pranswer => {
                        if next == RTCSignalingState::HaveLocalPranswer {
                            return Ok(next);
                        }
                    }
                    _ => {}
                }
            } else if op == StateChangeOp::SetRemote
                && sdp_type == RTCSdpType::Offer
                && next == RTCSignalingState::HaveRemoteOffer
            {
                // have-remote-offer->SetRemote(offer)->have-remote-offer (re-offer)
                return Ok(next);
            }
        }
        RTCSignalingState::HaveLocalPranswer => {
            if op == StateChangeOp::SetLocal {
                match sdp_type {
                    // have-local-pranswer->SetLocal(answer)->stable
                    RTCSdpType::Answer => {
                        if next == RTCSignalingState::Stable {
                            return Ok(next);
                        }
                    }
                    // have-local-pranswer->SetLocal(pranswer)->have-local-pranswer
                    RTCSdpType::Pranswer => {
                        if next == RTCSignalingState::HaveLocalPranswer {
                            return Ok(next);
                        }
                    }
                    _ => {}
                }
            }
        }
        RTCSignalingState::HaveRemotePranswer => {
            if op == StateChangeOp::SetRemote {
                match sdp_type {
                    // have-remote-pranswer->SetRemote(answer)->stable
                    RTCSdpType::Answer => {
                        if next == RTCSignalingState::Stable {
                            return Ok(next);
                        }
                    }
                    // have-remote-pranswer->SetRemote(pranswer)->have-remote-pranswer
                    RTCSdpType::Pranswer => {
                        if next == RTCSignalingState::HaveRemotePranswer {
                            return Ok(next);
                        }
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    };

    Err(Error::ErrSignalingStateProposedTransitionInvalid {
        from: cur,
        is_local: op == StateChangeOp::SetLocal,
        applying: sdp_type,
    })
}

/// The state a successfully applied description leads to.
pub(crate) fn next_signaling_state(
    cur: RTCSignalingState,
    op: StateChangeOp,
    sdp_type: RTCSdpType,
) -> RTCSignalingState {
    match (op, sdp_type) {
        (_, RTCSdpType::Rollback) => RTCSignalingState::Stable,
        (StateChangeOp::SetLocal, RTCSdpType::Offer) => RTCSignalingState::HaveLocalOffer,
        (StateChangeOp::SetRemote, RTCSdpType::Offer) => RTCSignalingState::HaveRemoteOffer,
        (StateChangeOp::SetLocal, RTCSdpType::Pranswer) => RTCSignalingState::HaveLocalPranswer,
        (StateChangeOp::SetRemote, RTCSdpType::Pranswer) => RTCSignalingState::HaveRemotePranswer,
        (_, RTCSdpType::Answer) => RTCSignalingState::Stable,
        _ => cur,
    }
}
