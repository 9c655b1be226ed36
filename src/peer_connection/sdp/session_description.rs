use std::io::Cursor;

use sdp::description::session::SessionDescription;
use serde::{Deserialize, Serialize};

use super::sdp_type::RTCSdpType;
use crate::error::Result;

/// RTCSessionDescription is used to expose local and remote session
/// descriptions. Its serde representation is the `{type, sdp}` schema carried
/// over the application's signaling channel.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct RTCSessionDescription {
    #[serde(rename = "type")]
    pub sdp_type: RTCSdpType,

    pub sdp: String,

    /// This will never be initialized by callers, internal use only.
    #[serde(skip)]
    pub(crate) parsed: Option<SessionDescription>,
}

impl RTCSessionDescription {
    /// Creates an offer description from raw SDP. The SDP is parsed eagerly
    /// so malformed input is rejected here rather than at apply time.
    pub fn offer(sdp: String) -> Result<Self> {
        RTCSessionDescription::new(RTCSdpType::Offer, sdp)
    }

    /// Creates a provisional answer description from raw SDP.
    pub fn pranswer(sdp: String) -> Result<Self> {
        RTCSessionDescription::new(RTCSdpType::Pranswer, sdp)
    }

    /// Creates a final answer description from raw SDP.
    pub fn answer(sdp: String) -> Result<Self> {
        RTCSessionDescription::new(RTCSdpType::Answer, sdp)
    }

    /// Creates a rollback description. Rollbacks carry no SDP.
    pub fn rollback() -> Self {
        RTCSessionDescription {
            sdp_type: RTCSdpType::Rollback,
            sdp: String::new(),
            parsed: None,
        }
    }

    fn new(sdp_type: RTCSdpType, sdp: String) -> Result<Self> {
        let mut desc = RTCSessionDescription {
            sdp_type,
            sdp,
            parsed: None,
        };
        let parsed = desc.unmarshal()?;
        desc.parsed = Some(parsed);
        Ok(desc)
    }

    /// Unmarshal is a helper to deserialize the sdp.
    pub fn unmarshal(&self) -> Result<SessionDescription> {
        let mut reader = Cursor::new(self.sdp.as_bytes());
        let parsed = SessionDescription::unmarshal(&mut reader)?;
        Ok(parsed)
    }
}
