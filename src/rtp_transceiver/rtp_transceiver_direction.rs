use std::fmt;

/// RTCRtpTransceiverDirection indicates the direction of the RTCRtpTransceiver.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RTCRtpTransceiverDirection {
    #[default]
    Unspecified,

    /// Sendrecv indicates the RTPSender will offer
    /// to send RTP and the RTPReceiver will offer to receive RTP.
    Sendrecv,

    /// Sendonly indicates the RTPSender will offer to send RTP.
    Sendonly,

    /// Recvonly indicates the RTPReceiver will offer to receive RTP.
    Recvonly,

    /// Inactive indicates the RTPSender won't offer
    /// to send RTP and the RTPReceiver won't offer to receive RTP.
    Inactive,

    /// Stopped indicates the transceiver has been stopped and will no
    /// longer send or receive.
    Stopped,
}

const RTP_TRANSCEIVER_DIRECTION_SENDRECV_STR: &str = "sendrecv";
const RTP_TRANSCEIVER_DIRECTION_SENDONLY_STR: &str = "sendonly";
const RTP_TRANSCEIVER_DIRECTION_RECVONLY_STR: &str = "recvonly";
const RTP_TRANSCEIVER_DIRECTION_INACTIVE_STR: &str = "inactive";
const RTP_TRANSCEIVER_DIRECTION_STOPPED_STR: &str = "stopped";

impl From<&str> for RTCRtpTransceiverDirection {
    fn from(raw: &str) -> Self {
        match raw {
            RTP_TRANSCEIVER_DIRECTION_SENDRECV_STR => RTCRtpTransceiverDirection::Sendrecv,
            RTP_TRANSCEIVER_DIRECTION_SENDONLY_STR => RTCRtpTransceiverDirection::Sendonly,
            RTP_TRANSCEIVER_DIRECTION_RECVONLY_STR => RTCRtpTransceiverDirection::Recvonly,
            RTP_TRANSCEIVER_DIRECTION_INACTIVE_STR => RTCRtpTransceiverDirection::Inactive,
            RTP_TRANSCEIVER_DIRECTION_STOPPED_STR => RTCRtpTransceiverDirection::Stopped,
            _ => RTCRtpTransceiverDirection::Unspecified,
        }
    }
}

impl fmt::Display for RTCRtpTransceiverDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            RTCRtpTransceiverDirection::Sendrecv => {
                write!(f, "{RTP_TRANSCEIVER_DIRECTION_SENDRECV_STR}")
            }
            RTCRtpTransceiverDirection::Sendonly => {
                write!(f, "{RTP_TRANSCEIVER_DIRECTION_SENDONLY_STR}")
            }
            RTCRtpTransceiverDirection::Recvonly => {
                write!(f, "{RTP_TRANSCEIVER_DIRECTION_RECVONLY_STR}")
            }
            RTCRtpTransceiverDirection::Inactive => {
                write!(f, "{RTP_TRANSCEIVER_DIRECTION_INACTIVE_STR}")
            }
            RTCRtpTransceiverDirection::Stopped => {
                write!(f, "{RTP_TRANSCEIVER_DIRECTION_STOPPED_STR}")
            }
            _ => write!(f, "{}", crate::UNSPECIFIED_STR),
        }
    }
}

impl RTCRtpTransceiverDirection {
    /// Whether this direction offers to send RTP.
    pub fn has_send(&self) -> bool {
        matches!(
            self,
            RTCRtpTransceiverDirection::Sendrecv | RTCRtpTransceiverDirection::Sendonly
        )
    }

    /// Whether this direction offers to receive RTP.
    pub fn has_recv(&self) -> bool {
        matches!(
            self,
            RTCRtpTransceiverDirection::Sendrecv | RTCRtpTransceiverDirection::Recvonly
        )
    }

    /// Builds a direction from its send and receive halves.
    pub fn from_send_recv(send: bool, recv: bool) -> Self {
        match (send, recv) {
            (true, true) => RTCRtpTransceiverDirection::Sendrecv,
            (true, false) => RTCRtpTransceiverDirection::Sendonly,
            (false, true) => RTCRtpTransceiverDirection::Recvonly,
            (false, false) => RTCRtpTransceiverDirection::Inactive,
        }
    }

    /// The direction seen from the remote side: sendonly and recvonly swap,
    /// everything else is symmetric.
    pub fn reverse(&self) -> Self {
        match self {
            RTCRtpTransceiverDirection::Sendonly => RTCRtpTransceiverDirection::Recvonly,
            RTCRtpTransceiverDirection::Recvonly => RTCRtpTransceiverDirection::Sendonly,
            other => *other,
        }
    }

    /// The largest direction allowed by both: sending requires both to send,
    /// receiving requires both to receive.
    pub fn intersect(&self, other: Self) -> Self {
        Self::from_send_recv(
            self.has_send() && other.has_send(),
            self.has_recv() && other.has_recv(),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_new_rtp_transceiver_direction() {
        let tests = vec![
            ("Unspecified", RTCRtpTransceiverDirection::Unspecified),
            ("sendrecv", RTCRtpTransceiverDirection::Sendrecv),
            ("sendonly", RTCRtpTransceiverDirection::Sendonly),
            ("recvonly", RTCRtpTransceiverDirection::Recvonly),
            ("inactive", RTCRtpTransceiverDirection::Inactive),
            ("stopped", RTCRtpTransceiverDirection::Stopped),
        ];

        for (ct_str, expected_type) in tests {
            assert_eq!(RTCRtpTransceiverDirection::from(ct_str), expected_type);
        }
    }

    #[test]
    fn test_rtp_transceiver_direction_string() {
        let tests = vec![
            (RTCRtpTransceiverDirection::Unspecified, "Unspecified"),
            (RTCRtpTransceiverDirection::Sendrecv, "sendrecv"),
            (RTCRtpTransceiverDirection::Sendonly, "sendonly"),
            (RTCRtpTransceiverDirection::Recvonly, "recvonly"),
            (RTCRtpTransceiverDirection::Inactive, "inactive"),
            (RTCRtpTransceiverDirection::Stopped, "stopped"),
        ];

        for (d, expected_string) in tests {
            assert_eq!(d.to_string(), expected_string);
        }
    }

    #[test]
    fn test_rtp_transceiver_direction_reverse() {
        let tests = vec![
            (
                RTCRtpTransceiverDirection::Sendonly,
                RTCRtpTransceiverDirection::Recvonly,
            ),
            (
                RTCRtpTransceiverDirection::Recvonly,
                RTCRtpTransceiverDirection::Sendonly,
            ),
            (
                RTCRtpTransceiverDirection::Sendrecv,
                RTCRtpTransceiverDirection::Sendrecv,
            ),
            (
                RTCRtpTransceiverDirection::Inactive,
                RTCRtpTransceiverDirection::Inactive,
            ),
        ];

        for (d, expected) in tests {
            assert_eq!(d.reverse(), expected);
        }
    }

    #[test]
    fn test_rtp_transceiver_direction_intersect() {
        let tests = vec![
            (
                RTCRtpTransceiverDirection::Sendrecv,
                RTCRtpTransceiverDirection::Sendrecv,
                RTCRtpTransceiverDirection::Sendrecv,
            ),
            (
                RTCRtpTransceiverDirection::Sendrecv,
                RTCRtpTransceiverDirection::Recvonly,
                RTCRtpTransceiverDirection::Recvonly,
            ),
            (
                RTCRtpTransceiverDirection::Sendonly,
                RTCRtpTransceiverDirection::Recvonly,
                RTCRtpTransceiverDirection::Inactive,
            ),
            (
                RTCRtpTransceiverDirection::Recvonly,
                RTCRtpTransceiverDirection::Sendrecv,
                RTCRtpTransceiverDirection::Recvonly,
            ),
            (
                RTCRtpTransceiverDirection::Inactive,
                RTCRtpTransceiverDirection::Sendrecv,
                RTCRtpTransceiverDirection::Inactive,
            ),
        ];

        for (a, b, expected) in tests {
            assert_eq!(a.intersect(b), expected);
        }
    }
}
