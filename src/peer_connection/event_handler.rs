use crate::ice_transport::ice_candidate::RTCIceCandidateInit;
use crate::media_stream::MediaStreamTrack;
use crate::peer_connection::peer_connection_state::RTCPeerConnectionState;
use crate::peer_connection::signaling_state::RTCSignalingState;

/// Trait for handling peer connection events.
///
/// The owning task awaits each callback, so events arrive one at a time and
/// in causal order: the candidates produced by applying a description are
/// delivered after that operation's reply. A slow handler delays only its
/// own connection. All methods default to no-ops.
#[async_trait::async_trait]
pub trait PeerConnectionEventHandler: Send + Sync + 'static {
    /// Called when a new local ICE candidate is available.
    async fn on_ice_candidate(&self, _candidate: RTCIceCandidateInit) {}

    /// Called when the signaling state changes.
    async fn on_signaling_state_change(&self, _state: RTCSignalingState) {}

    /// Called when the connection state changes.
    async fn on_connection_state_change(&self, _state: RTCPeerConnectionState) {}

    /// Called when a remote description announces a new inbound track.
    async fn on_track(&self, _track: MediaStreamTrack) {}

    /// Called for each RTP packet released by an inbound track's jitter
    /// buffer, in release order. `rid` carries the simulcast stream id when
    /// one was negotiated.
    async fn on_rtp(&self, _track_id: String, _rid: Option<String>, _packet: rtp::packet::Packet) {
    }
}

/// The handler used when the application does not install one.
pub(crate) struct NoopEventHandler;

#[async_trait::async_trait]
impl PeerConnectionEventHandler for NoopEventHandler {}
