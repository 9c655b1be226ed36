use std::fmt;

use crate::ice_transport::ice_connection_state::RTCIceConnectionState;

/// RTCPeerConnectionState indicates the combined transport state of the
/// connection, reported to the owner through `connection_state_change`
/// events.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RTCPeerConnectionState {
    #[default]
    Unspecified,

    /// The connection was just created and no transport activity happened
    /// yet.
    New,

    /// A transport is in the process of establishing a connection.
    Connecting,

    /// All transports are connected.
    Connected,

    /// At least one transport lost connectivity; recovery is still possible.
    Disconnected,

    /// A transport failed permanently. This state is terminal.
    Failed,

    /// The connection has been closed.
    Closed,
}

const PEER_CONNECTION_STATE_NEW_STR: &str = "new";
const PEER_CONNECTION_STATE_CONNECTING_STR: &str = "connecting";
const PEER_CONNECTION_STATE_CONNECTED_STR: &str = "connected";
const PEER_CONNECTION_STATE_DISCONNECTED_STR: &str = "disconnected";
const PEER_CONNECTION_STATE_FAILED_STR: &str = "failed";
const PEER_CONNECTION_STATE_CLOSED_STR: &str = "closed";

impl From<&str> for RTCPeerConnectionState {
    fn from(raw: &str) -> Self {
        match raw {
            PEER_CONNECTION_STATE_NEW_STR => RTCPeerConnectionState::New,
            PEER_CONNECTION_STATE_CONNECTING_STR => RTCPeerConnectionState::Connecting,
            PEER_CONNECTION_STATE_CONNECTED_STR => RTCPeerConnectionState::Connected,
            PEER_CONNECTION_STATE_DISCONNECTED_STR => RTCPeerConnectionState::Disconnected,
            PEER_CONNECTION_STATE_FAILED_STR => RTCPeerConnectionState::Failed,
            PEER_CONNECTION_STATE_CLOSED_STR => RTCPeerConnectionState::Closed,
            _ => RTCPeerConnectionState::Unspecified,
        }
    }
}

impl fmt::Display for RTCPeerConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            RTCPeerConnectionState::New => write!(f, "{PEER_CONNECTION_STATE_NEW_STR}"),
            RTCPeerConnectionState::Connecting => {
                write!(f, "{PEER_CONNECTION_STATE_CONNECTING_STR}")
            }
            RTCPeerConnectionState::Connected => write!(f, "{PEER_CONNECTION_STATE_CONNECTED_STR}"),
            RTCPeerConnectionState::Disconnected => {
                write!(f, "{PEER_CONNECTION_STATE_DISCONNECTED_STR}")
            }
            RTCPeerConnectionState::Failed => write!(f, "{PEER_CONNECTION_STATE_FAILED_STR}"),
            RTCPeerConnectionState::Closed => write!(f, "{PEER_CONNECTION_STATE_CLOSED_STR}"),
            _ => write!(f, "{}", crate::UNSPECIFIED_STR),
        }
    }
}

impl From<RTCIceConnectionState> for RTCPeerConnectionState {
    fn from(state: RTCIceConnectionState) -> Self {
        match state {
            RTCIceConnectionState::New => RTCPeerConnectionState::New,
            RTCIceConnectionState::Checking => RTCPeerConnectionState::Connecting,
            RTCIceConnectionState::Connected | RTCIceConnectionState::Completed => {
                RTCPeerConnectionState::Connected
            }
            RTCIceConnectionState::Disconnected => RTCPeerConnectionState::Disconnected,
            RTCIceConnectionState::Failed => RTCPeerConnectionState::Failed,
            RTCIceConnectionState::Closed => RTCPeerConnectionState::Closed,
            RTCIceConnectionState::Unspecified => RTCPeerConnectionState::Unspecified,
        }
    }
}
