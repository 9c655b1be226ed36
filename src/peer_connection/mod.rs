//! Peer connection: the single-owner controller of transceivers,
//! descriptions and the ICE agent handle.
//!
//! A [`PeerConnection`] is a handle onto a spawned task that exclusively
//! owns the connection's mutable state. Operations are sent as messages and
//! processed serially; events are delivered to the application's
//! [`PeerConnectionEventHandler`] in FIFO order.
//!
//! ```no_run
//! use std::sync::Arc;
//! use webrtc_core::media_stream::MediaStreamTrack;
//! use webrtc_core::peer_connection::configuration::RTCConfigurationBuilder;
//! use webrtc_core::peer_connection::{PeerConnectionBuilder, PeerConnectionEventHandler};
//! use webrtc_core::rtp_transceiver::rtp_codec::RTPCodecType;
//!
//! # struct Handler;
//! # #[async_trait::async_trait]
//! # impl PeerConnectionEventHandler for Handler {}
//! # async fn example(
//! #     agent: Arc<dyn webrtc_core::ice_transport::IceAgent>,
//! #     events: tokio::sync::mpsc::UnboundedReceiver<webrtc_core::ice_transport::IceAgentEvent>,
//! # ) -> webrtc_core::error::Result<()> {
//! let config = RTCConfigurationBuilder::new().build()?;
//! let pc = PeerConnectionBuilder::new(config)
//!     .with_event_handler(Arc::new(Handler))
//!     .with_ice_agent(agent, events)
//!     .start()?;
//!
//! let track = MediaStreamTrack::new(RTPCodecType::Video, vec!["stream".to_owned()]);
//! pc.add_track(track).await?;
//!
//! let offer = pc.create_offer(None).await?;
//! pc.set_local_description(offer).await?;
//! // send the offer over signaling, apply the peer's answer...
//! # Ok(())
//! # }
//! ```

pub mod certificate;
pub mod configuration;
pub mod event_handler;
pub mod offer_answer_options;
pub mod peer_connection_state;
pub mod sdp;
pub mod signaling_state;

mod connection;

#[cfg(test)]
mod connection_test;

pub use connection::{PeerConnection, PeerConnectionBuilder};
pub use event_handler::PeerConnectionEventHandler;
