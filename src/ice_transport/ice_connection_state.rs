use std::fmt;

/// RTCIceConnectionState indicates the state of the agent's connectivity
/// checks, as reported through [`IceAgentEvent::StateChange`].
///
/// [`IceAgentEvent::StateChange`]: crate::ice_transport::IceAgentEvent
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RTCIceConnectionState {
    #[default]
    Unspecified,

    /// The agent is gathering addresses or waiting for remote candidates.
    New,

    /// The agent has been given remote candidates and is checking pairs.
    Checking,

    /// A usable pairing has been found for all components.
    Connected,

    /// The agent has finished checking and found a connection.
    Completed,

    /// Connectivity was lost; checks may still recover the connection.
    Disconnected,

    /// All candidate pairs failed. This state is terminal.
    Failed,

    /// The agent has shut down.
    Closed,
}

const ICE_CONNECTION_STATE_NEW_STR: &str = "new";
const ICE_CONNECTION_STATE_CHECKING_STR: &str = "checking";
const ICE_CONNECTION_STATE_CONNECTED_STR: &str = "connected";
const ICE_CONNECTION_STATE_COMPLETED_STR: &str = "completed";
const ICE_CONNECTION_STATE_DISCONNECTED_STR: &str = "disconnected";
const ICE_CONNECTION_STATE_FAILED_STR: &str = "failed";
const ICE_CONNECTION_STATE_CLOSED_STR: &str = "closed";

impl From<&str> for RTCIceConnectionState {
    fn from(raw: &str) -> Self {
        match raw {
            ICE_CONNECTION_STATE_NEW_STR => RTCIceConnectionState::New,
            ICE_CONNECTION_STATE_CHECKING_STR => RTCIceConnectionState::Checking,
            ICE_CONNECTION_STATE_CONNECTED_STR => RTCIceConnectionState::Connected,
            ICE_CONNECTION_STATE_COMPLETED_STR => RTCIceConnectionState::Completed,
            ICE_CONNECTION_STATE_DISCONNECTED_STR => RTCIceConnectionState::Disconnected,
            ICE_CONNECTION_STATE_FAILED_STR => RTCIceConnectionState::Failed,
            ICE_CONNECTION_STATE_CLOSED_STR => RTCIceConnectionState::Closed,
            _ => RTCIceConnectionState::Unspecified,
        }
    }
}

impl fmt::Display for RTCIceConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            RTCIceConnectionState::New => write!(f, "{ICE_CONNECTION_STATE_NEW_STR}"),
            RTCIceConnectionState::Checking => write!(f, "{ICE_CONNECTION_STATE_CHECKING_STR}"),
            RTCIceConnectionState::Connected => write!(f, "{ICE_CONNECTION_STATE_CONNECTED_STR}"),
            RTCIceConnectionState::Completed => write!(f, "{ICE_CONNECTION_STATE_COMPLETED_STR}"),
            RTCIceConnectionState::Disconnected => {
                write!(f, "{ICE_CONNECTION_STATE_DISCONNECTED_STR}")
            }
            RTCIceConnectionState::Failed => write!(f, "{ICE_CONNECTION_STATE_FAILED_STR}"),
            RTCIceConnectionState::Closed => write!(f, "{ICE_CONNECTION_STATE_CLOSED_STR}"),
            _ => write!(f, "{}", crate::UNSPECIFIED_STR),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_new_ice_connection_state() {
        let tests = vec![
            ("Unspecified", RTCIceConnectionState::Unspecified),
            ("new", RTCIceConnectionState::New),
            ("checking", RTCIceConnectionState::Checking),
            ("connected", RTCIceConnectionState::Connected),
            ("completed", RTCIceConnectionState::Completed),
            ("disconnected", RTCIceConnectionState::Disconnected),
            ("failed", RTCIceConnectionState::Failed),
            ("closed", RTCIceConnectionState::Closed),
        ];

        for (state_string, expected_state) in tests {
            assert_eq!(RTCIceConnectionState::from(state_string), expected_state);
        }
    }

    #[test]
    fn test_ice_connection_state_string() {
        let tests = vec![
            (RTCIceConnectionState::Unspecified, "Unspecified"),
            (RTCIceConnectionState::New, "new"),
            (RTCIceConnectionState::Checking, "checking"),
            (RTCIceConnectionState::Connected, "connected"),
            (RTCIceConnectionState::Completed, "completed"),
            (RTCIceConnectionState::Disconnected, "disconnected"),
            (RTCIceConnectionState::Failed, "failed"),
            (RTCIceConnectionState::Closed, "closed"),
        ];

        for (state, expected_string) in tests {
            assert_eq!(state.to_string(), expected_string);
        }
    }
}
