//! Interface to the external ICE agent.
//!
//! Candidate gathering and connectivity checking are not part of this crate;
//! the peer connection drives an [`IceAgent`] implementation supplied by the
//! application and consumes its [`IceAgentEvent`] stream.

pub mod ice_candidate;
pub mod ice_connection_state;
pub mod ice_role;
pub mod ice_server;

use crate::error::Result;
use ice_connection_state::RTCIceConnectionState;
use ice_role::RTCIceRole;

/// Local ICE username fragment and password, as produced by the agent and
/// written into `a=ice-ufrag` / `a=ice-pwd`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IceCredentials {
    pub ufrag: String,
    pub pwd: String,
}

/// Events emitted by the ICE agent. They arrive in the peer connection's
/// mailbox and are processed in the order received.
#[derive(Debug, Clone)]
pub enum IceAgentEvent {
    /// A new local candidate, as a raw SDP candidate attribute value
    /// (without the `candidate:` prefix).
    NewCandidate(String),
    /// The agent's connection state changed.
    StateChange(RTCIceConnectionState),
}

/// The contract the peer connection expects from an ICE agent.
///
/// All methods are issued from the connection's owning task. Implementations
/// report asynchronous progress (candidates, state changes) on the event
/// channel handed to the peer connection at build time.
pub trait IceAgent: Send + Sync {
    /// Starts the agent in the given role, seeded with STUN server URLs.
    fn start(&self, role: RTCIceRole, stun_servers: Vec<String>) -> Result<()>;

    /// Returns the local credentials advertised in offers and answers.
    fn local_credentials(&self) -> Result<IceCredentials>;

    /// Configures the remote credentials learned from a remote description.
    fn set_remote_credentials(&self, ufrag: String, pwd: String) -> Result<()>;

    /// Begins (or resumes) candidate gathering.
    fn gather_candidates(&self) -> Result<()>;

    /// Adds a remote candidate, as a raw SDP candidate attribute value.
    fn add_remote_candidate(&self, attr: String) -> Result<()>;

    /// Discards the current credentials and candidates so the next
    /// offer triggers a full ICE restart.
    fn restart(&self) -> Result<()>;

    /// Stops the agent and aborts in-flight work.
    fn close(&self) -> Result<()>;
}
